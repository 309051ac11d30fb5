//! Strongly connected components and cycle search over rule references.

use indexmap::{IndexMap, IndexSet};

/// Reference graph keyed by rule name.
pub type Graph = IndexMap<String, IndexSet<String>>;

/// Tarjan's algorithm. Components come out in reverse topological order:
/// a component is emitted after every component it references.
pub fn find_sccs(graph: &Graph) -> Vec<Vec<String>> {
    struct State<'a> {
        graph: &'a Graph,
        index: usize,
        stack: Vec<String>,
        on_stack: IndexSet<String>,
        indices: IndexMap<String, usize>,
        lowlinks: IndexMap<String, usize>,
        sccs: Vec<Vec<String>>,
    }

    fn lower(state: &mut State<'_>, name: &str, value: usize) {
        if let Some(lowlink) = state.lowlinks.get_mut(name) {
            *lowlink = (*lowlink).min(value);
        }
    }

    fn strongconnect(name: &str, state: &mut State<'_>) {
        state.indices.insert(name.to_string(), state.index);
        state.lowlinks.insert(name.to_string(), state.index);
        state.index += 1;
        state.stack.push(name.to_string());
        state.on_stack.insert(name.to_string());

        let graph = state.graph;
        if let Some(refs) = graph.get(name) {
            for ref_name in refs {
                if !graph.contains_key(ref_name) {
                    continue;
                }
                if !state.indices.contains_key(ref_name) {
                    strongconnect(ref_name, state);
                    let ref_lowlink = state.lowlinks[ref_name];
                    lower(state, name, ref_lowlink);
                } else if state.on_stack.contains(ref_name) {
                    let ref_index = state.indices[ref_name];
                    lower(state, name, ref_index);
                }
            }
        }

        if state.lowlinks[name] == state.indices[name] {
            let mut scc = Vec::new();
            while let Some(w) = state.stack.pop() {
                state.on_stack.swap_remove(&w);
                let done = w == name;
                scc.push(w);
                if done {
                    break;
                }
            }
            scc.reverse();
            state.sccs.push(scc);
        }
    }

    let mut state = State {
        graph,
        index: 0,
        stack: Vec::new(),
        on_stack: IndexSet::new(),
        indices: IndexMap::new(),
        lowlinks: IndexMap::new(),
        sccs: Vec::new(),
    };

    for name in graph.keys() {
        if !state.indices.contains_key(name) {
            strongconnect(name, &mut state);
        }
    }

    state.sccs
}

/// Whether the component contains a cycle (more than one member, or a self-loop).
pub fn is_recursive(graph: &Graph, scc: &[String]) -> bool {
    match scc {
        [single] => graph.get(single).is_some_and(|refs| refs.contains(single)),
        _ => scc.len() > 1,
    }
}

/// First cycle found in `adj`, as the path from the repeated node back to itself.
pub fn find_cycle(nodes: &[String], adj: &Graph) -> Option<Vec<String>> {
    let mut visited = IndexSet::new();
    let mut stack = IndexSet::new();

    for start in nodes {
        if let Some(target) = detect_cycle(start, adj, &mut visited, &mut stack) {
            let index = stack.get_index_of(&target)?;
            return Some(stack.iter().skip(index).cloned().collect());
        }
    }

    None
}

fn detect_cycle(
    node: &String,
    adj: &Graph,
    visited: &mut IndexSet<String>,
    stack: &mut IndexSet<String>,
) -> Option<String> {
    if stack.contains(node) {
        return Some(node.clone());
    }
    if visited.contains(node) {
        return None;
    }

    visited.insert(node.clone());
    stack.insert(node.clone());

    if let Some(neighbors) = adj.get(node) {
        for neighbor in neighbors {
            if let Some(target) = detect_cycle(neighbor, adj, visited, stack) {
                return Some(target);
            }
        }
    }

    stack.pop();
    None
}

/// Render a cycle as `a -> b -> a`.
pub fn format_cycle(cycle: &[String]) -> String {
    let mut parts: Vec<&str> = cycle.iter().map(String::as_str).collect();
    if let Some(first) = cycle.first() {
        parts.push(first);
    }
    parts.join(" -> ")
}
