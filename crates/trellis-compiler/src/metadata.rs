//! Field and alias metadata of compiled variables.
//!
//! Counts are saturated at two: all that matters is whether a field appears
//! at most once and whether it appears at all.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::ir::Expr;
use crate::normalize::NormalizedGrammar;

/// A node that can appear in some position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeType {
    pub name: String,
    pub named: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    /// Can hold more than one node.
    pub multiple: bool,
    /// Present in every derivation.
    pub required: bool,
    pub types: Vec<NodeType>,
}

/// One alias name and the nodes it renames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasInfo {
    pub named: bool,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Default)]
struct FieldCount {
    min: u8,
    max: u8,
    types: IndexSet<NodeType>,
}

type Summary = IndexMap<String, FieldCount>;

/// Fields of one variable body.
pub fn fields_of(expr: &Expr, grammar: &NormalizedGrammar) -> IndexMap<String, FieldInfo> {
    summarize(expr, grammar)
        .into_iter()
        .map(|(name, count)| {
            let info = FieldInfo {
                multiple: count.max > 1,
                required: count.min > 0,
                types: count.types.into_iter().collect(),
            };
            (name, info)
        })
        .collect()
}

fn summarize(expr: &Expr, grammar: &NormalizedGrammar) -> Summary {
    match expr {
        Expr::Symbol(_) => Summary::new(),
        Expr::Seq(members) => {
            let mut total = Summary::new();
            for member in members {
                for (name, count) in summarize(member, grammar) {
                    let entry = total.entry(name).or_default();
                    entry.min = saturate(entry.min + count.min);
                    entry.max = saturate(entry.max + count.max);
                    entry.types.extend(count.types);
                }
            }
            total
        }
        Expr::Choice(members) => {
            let summaries: Vec<Summary> = members.iter().map(|m| summarize(m, grammar)).collect();
            let mut total = Summary::new();
            for summary in &summaries {
                for (name, count) in summary {
                    let min = summaries
                        .iter()
                        .map(|s| s.get(name).map_or(0, |c| c.min))
                        .min()
                        .unwrap_or(0);
                    let entry = total.entry(name.clone()).or_default();
                    entry.min = min;
                    entry.max = entry.max.max(count.max);
                    entry.types.extend(count.types.iter().cloned());
                }
            }
            total
        }
        Expr::Repeat(content) => summarize(content, grammar)
            .into_iter()
            .map(|(name, mut count)| {
                count.min = 0;
                if count.max > 0 {
                    count.max = 2;
                }
                (name, count)
            })
            .collect(),
        Expr::Prec { content, .. } | Expr::Alias { content, .. } => summarize(content, grammar),
        Expr::Field { name, content } => {
            let mut summary = summarize(content, grammar);
            let entry = summary.entry(name.clone()).or_default();
            entry.min = saturate(entry.min + 1);
            entry.max = saturate(entry.max + 1);
            entry.types.extend(node_types(content, grammar));
            summary
        }
    }
}

fn saturate(count: u8) -> u8 {
    count.min(2)
}

/// Nodes an expression can surface as.
pub fn node_types(expr: &Expr, grammar: &NormalizedGrammar) -> IndexSet<NodeType> {
    let mut types = IndexSet::new();
    collect_node_types(expr, grammar, &mut types);
    types
}

fn collect_node_types(expr: &Expr, grammar: &NormalizedGrammar, out: &mut IndexSet<NodeType>) {
    match expr {
        Expr::Symbol(symbol) => {
            out.insert(NodeType {
                name: grammar.symbol_name(*symbol).to_string(),
                named: grammar.symbol_named(*symbol),
            });
        }
        Expr::Alias { value, named, .. } => {
            out.insert(NodeType {
                name: value.clone(),
                named: *named,
            });
        }
        _ => {
            for child in expr.children() {
                collect_node_types(child, grammar, out);
            }
        }
    }
}

/// Every alias in the grammar, keyed by alias name.
pub fn aliases(grammar: &NormalizedGrammar) -> IndexMap<String, AliasInfo> {
    fn walk(expr: &Expr, grammar: &NormalizedGrammar, out: &mut IndexMap<String, AliasInfo>) {
        if let Expr::Alias {
            content,
            value,
            named,
        } = expr
        {
            let info = out.entry(value.clone()).or_insert_with(|| AliasInfo {
                named: *named,
                sources: Vec::new(),
            });
            for source in node_types(content, grammar) {
                if !info.sources.contains(&source.name) {
                    info.sources.push(source.name);
                }
            }
        }
        for child in expr.children() {
            walk(child, grammar, out);
        }
    }

    let mut out = IndexMap::new();
    for variable in &grammar.variables {
        walk(&variable.body, grammar, &mut out);
    }
    out
}
