//! Well-formedness checks on the disambiguated grammar.

use std::collections::VecDeque;

use indexmap::IndexSet;

use trellis_core::{Rule, Terminal};

use super::conflicts::ConflictRegistry;
use super::first::FirstSets;
use crate::analyze::nullable::rule_nullable;
use crate::analyze::pattern::parse_pattern;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::ir::{Expr, SymbolRef};
use crate::normalize::NormalizedGrammar;
use crate::precedence::DisambiguationTable;

/// Repeats whose body can match empty input never terminate.
pub fn check_infinite_repeats(grammar: &NormalizedGrammar, first: &FirstSets, diag: &mut Diagnostics) {
    let nullable_in = |name: &str| {
        grammar
            .expansions
            .get(name)
            .is_some_and(|expr| has_nullable_repeat(expr, first))
    };

    for variable in &grammar.variables {
        if !has_nullable_repeat(&variable.body, first) {
            continue;
        }
        let mut builder = diag
            .report(DiagnosticKind::InfiniteRepeat)
            .message(&variable.name)
            .rule(&variable.name);
        for hidden in variable.inlined.iter().filter(|h| nullable_in(h.as_str())) {
            builder = builder.note(format!("the repeat comes from inlined rule `{hidden}`"));
        }
        builder.emit();
    }

    // Hidden rules already checked through the variables they expand into.
    let inlined: IndexSet<&str> = grammar
        .variables
        .iter()
        .flat_map(|v| v.inlined.iter().map(String::as_str))
        .collect();
    for name in grammar.expansions.keys() {
        if !inlined.contains(name.as_str()) && nullable_in(name.as_str()) {
            report_repeat(name, diag);
        }
    }

    for (_, entry) in grammar.lexical.iter() {
        if has_nullable_lexical_repeat(&entry.content) {
            report_repeat(&entry.name, diag);
        }
    }
}

fn report_repeat(owner: &str, diag: &mut Diagnostics) {
    diag.report(DiagnosticKind::InfiniteRepeat)
        .message(owner)
        .rule(owner)
        .emit();
}

fn has_nullable_repeat(expr: &Expr, first: &FirstSets) -> bool {
    match expr {
        Expr::Repeat(content) => first.is_nullable(content) || has_nullable_repeat(content, first),
        _ => expr.children().iter().any(|c| has_nullable_repeat(c, first)),
    }
}

fn has_nullable_lexical_repeat(rule: &Rule) -> bool {
    match rule {
        Rule::Repeat { content, .. } => {
            rule_nullable(content, &|_| false) || has_nullable_lexical_repeat(content)
        }
        _ => rule.children().iter().any(has_nullable_lexical_repeat),
    }
}

/// Patterns must parse, and no token may match the empty string.
pub fn check_tokens(grammar: &NormalizedGrammar, diag: &mut Diagnostics) {
    for (_, entry) in grammar.lexical.iter() {
        let mut valid = true;
        for_each_terminal(&entry.content, &mut |terminal| {
            if let Terminal::Pattern { value, flags } = terminal
                && let Err(err) = parse_pattern(value, flags.as_deref())
            {
                valid = false;
                diag.report(DiagnosticKind::InvalidPattern)
                    .message(format!("/{value}/"))
                    .rule(&entry.name)
                    .note(err.to_string())
                    .emit();
            }
        });

        if valid && rule_nullable(&entry.content, &|_| false) {
            diag.report(DiagnosticKind::EmptyToken)
                .message(&entry.name)
                .rule(&entry.name)
                .emit();
        }
    }
}

fn for_each_terminal(rule: &Rule, f: &mut impl FnMut(&Terminal)) {
    match rule {
        Rule::Terminal(terminal) => f(terminal),
        _ => {
            for child in rule.children() {
                for_each_terminal(child, f);
            }
        }
    }
}

/// Rules the start rule never reaches, directly or through extras.
pub fn check_reachability(grammar: &NormalizedGrammar, start: &str, diag: &mut Diagnostics) {
    let symbols = &grammar.symbols;
    let mut seen: IndexSet<&str> = IndexSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();

    let mut roots = vec![start];
    for extra in &grammar.extras {
        roots.push(grammar.symbol_name(*extra));
    }
    if let Some(SymbolRef::Lexical(id)) = grammar.word
        && let Some(entry) = grammar.lexical.get(id)
    {
        roots.push(&entry.name);
    }

    for root in roots {
        if symbols.contains(root) && seen.insert(root) {
            queue.push_back(root);
        }
    }
    while let Some(name) = queue.pop_front() {
        let Some(symbol) = symbols.get(name) else {
            continue;
        };
        for next in &symbol.refs {
            if symbols.contains(next) && seen.insert(next.as_str()) {
                queue.push_back(next);
            }
        }
    }

    for symbol in symbols.iter() {
        if !seen.contains(symbol.name.as_str()) {
            diag.report(DiagnosticKind::UnreachableRule)
                .message(&symbol.name)
                .rule(&symbol.name)
                .emit();
        }
    }
}

/// Every unresolved pair must belong to a rule listed in some conflict set.
pub fn check_ambiguity(
    grammar: &NormalizedGrammar,
    tables: &[DisambiguationTable],
    registry: &ConflictRegistry,
    diag: &mut Diagnostics,
) {
    for table in tables {
        let pairs: Vec<_> = table.unresolved().collect();
        if pairs.is_empty() {
            continue;
        }
        let Some(variable) = grammar.variable(table.id) else {
            continue;
        };
        if registry.covers(variable) {
            continue;
        }

        let mut builder = diag
            .report(DiagnosticKind::UndeclaredAmbiguity)
            .message(&table.rule)
            .rule(&table.rule);
        for pair in pairs {
            builder = builder.note(format!(
                "alternative #{} can be extended by alternative #{} and neither has precedence",
                pair.reduce + 1,
                pair.shift + 1
            ));
        }
        builder.emit();
    }
}
