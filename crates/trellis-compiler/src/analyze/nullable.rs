//! Nullability: whether a rule can derive the empty string.
//!
//! Rule-level results are a least fixpoint over the reference graph, so
//! left-recursive rules without a base case come out non-nullable.

use indexmap::{IndexMap, IndexSet};

use trellis_core::{Repetition, Rule, Terminal};

use super::pattern::pattern_matches_empty;
use crate::ir::{Expr, SymbolRef};

/// Nullability of a rule tree, given the nullability of referenced rules.
pub fn rule_nullable(rule: &Rule, is_nullable: &impl Fn(&str) -> bool) -> bool {
    match rule {
        Rule::Terminal(terminal) => terminal_nullable(terminal),
        Rule::Symbol(name) => is_nullable(name),
        Rule::Seq(members) => members.iter().all(|m| rule_nullable(m, is_nullable)),
        Rule::Choice(members) => members.iter().any(|m| rule_nullable(m, is_nullable)),
        Rule::Repeat {
            content,
            repetition,
        } => match repetition {
            Repetition::ZeroOrMore => true,
            Repetition::OneOrMore => rule_nullable(content, is_nullable),
        },
        Rule::Optional(_) => true,
        Rule::Token { content, .. }
        | Rule::Prec { content, .. }
        | Rule::Alias { content, .. }
        | Rule::Field { content, .. } => rule_nullable(content, is_nullable),
    }
}

pub fn terminal_nullable(terminal: &Terminal) -> bool {
    match terminal {
        Terminal::Literal(text) => text.is_empty(),
        Terminal::Pattern { value, flags } => pattern_matches_empty(value, flags.as_deref()),
    }
}

/// Names of all nullable rules among `bodies`.
pub fn nullable_rules(bodies: &IndexMap<String, Rule>) -> IndexSet<String> {
    let mut nullable: IndexSet<String> = IndexSet::new();
    loop {
        let mut changed = false;
        for (name, body) in bodies {
            if nullable.contains(name) {
                continue;
            }
            if rule_nullable(body, &|n| nullable.contains(n)) {
                nullable.insert(name.clone());
                changed = true;
            }
        }
        if !changed {
            return nullable;
        }
    }
}

/// Nullability of an index-based expression.
pub fn expr_nullable(expr: &Expr, is_nullable: &impl Fn(SymbolRef) -> bool) -> bool {
    match expr {
        Expr::Symbol(symbol) => is_nullable(*symbol),
        Expr::Seq(members) => members.iter().all(|m| expr_nullable(m, is_nullable)),
        Expr::Choice(members) => members.iter().any(|m| expr_nullable(m, is_nullable)),
        Expr::Repeat(_) => true,
        Expr::Prec { content, .. } | Expr::Alias { content, .. } | Expr::Field { content, .. } => {
            expr_nullable(content, is_nullable)
        }
    }
}

/// Least fixpoint over syntactic variables. `terminal` answers for
/// lexical and external symbols.
pub fn nullable_variables<'a>(
    bodies: impl Iterator<Item = &'a Expr> + Clone,
    terminal: &impl Fn(SymbolRef) -> bool,
) -> Vec<bool> {
    let count = bodies.clone().count();
    let mut nullable = vec![false; count];
    loop {
        let mut changed = false;
        for (index, body) in bodies.clone().enumerate() {
            if nullable[index] {
                continue;
            }
            let is_nullable = expr_nullable(body, &|symbol| match symbol {
                SymbolRef::Rule(id) => nullable.get(id.index()).copied().unwrap_or(false),
                other => terminal(other),
            });
            if is_nullable {
                nullable[index] = true;
                changed = true;
            }
        }
        if !changed {
            return nullable;
        }
    }
}
