//! Precedence resolution.
//!
//! Named levels are replaced by numbers, then every self-referential rule
//! (directly, or through an umbrella rule such as `expression`) gets a table saying how two of its alternatives combine when one is
//! complete and the other could extend it (`1 + 2 + 3`, `-a + b`).

mod table;

#[cfg(test)]
mod precedence_tests;

use indexmap::IndexSet;

use trellis_core::{Assoc, Precedence, PrecedenceTable, Rule};

pub use table::{
    AlternativeInfo, AlternativePrecedence, DisambiguationTable, Resolution, TieBreak,
    resolve_pair,
};

use crate::analyze::nullable::{expr_nullable, nullable_variables};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::ir::{Expr, RuleId, SymbolRef};
use crate::normalize::NormalizedGrammar;

/// Numeric levels for every precedence name: configured levels first, then
/// levels derived from the grammar's own orderings.
pub fn build_table(
    grammar: &NormalizedGrammar,
    configured: Option<&PrecedenceTable>,
    diag: &mut Diagnostics,
) -> PrecedenceTable {
    let mut table = configured.cloned().unwrap_or_default();
    match PrecedenceTable::from_orderings(&grammar.precedences) {
        Ok(derived) => table.merge_missing(&derived),
        Err(cycle) => diag
            .report(DiagnosticKind::PrecedenceCycle)
            .message(cycle.names.join(", "))
            .emit(),
    }
    table
}

/// Rewrite named precedences into numbers, in variables, hidden expansions
/// and lexical content.
pub fn resolve_names(grammar: &mut NormalizedGrammar, table: &PrecedenceTable, diag: &mut Diagnostics) {
    let mut report = |owner: &str, unknown: IndexSet<String>| {
        for name in unknown {
            diag.report(DiagnosticKind::UnknownPrecedence)
                .message(&name)
                .rule(owner)
                .emit();
        }
    };

    for variable in &mut grammar.variables {
        let mut unknown = IndexSet::new();
        resolve_expr(&mut variable.body, table, &mut unknown);
        report(&variable.name, unknown);
    }
    for (name, expr) in &mut grammar.expansions {
        let mut unknown = IndexSet::new();
        resolve_expr(expr, table, &mut unknown);
        report(name, unknown);
    }
    for entry in grammar.lexical.entries_mut() {
        let mut unknown = IndexSet::new();
        resolve_rule(&mut entry.content, table, &mut unknown);
        report(&entry.name, unknown);
    }
}

fn resolve_value(
    value: &mut Precedence,
    assoc: &mut Assoc,
    table: &PrecedenceTable,
    unknown: &mut IndexSet<String>,
) {
    let Precedence::Name(name) = value else {
        return;
    };
    match table.get(name) {
        Some(level) => {
            if *assoc == Assoc::None {
                *assoc = level.assoc;
            }
            *value = Precedence::Integer(level.level);
        }
        None => {
            unknown.insert(name.clone());
            *value = Precedence::Integer(0);
        }
    }
}

fn resolve_expr(expr: &mut Expr, table: &PrecedenceTable, unknown: &mut IndexSet<String>) {
    match expr {
        Expr::Symbol(_) => {}
        Expr::Seq(members) | Expr::Choice(members) => {
            for member in members {
                resolve_expr(member, table, unknown);
            }
        }
        Expr::Prec {
            value,
            assoc,
            content,
        } => {
            resolve_value(value, assoc, table, unknown);
            resolve_expr(content, table, unknown);
        }
        Expr::Repeat(content) | Expr::Alias { content, .. } | Expr::Field { content, .. } => {
            resolve_expr(content, table, unknown)
        }
    }
}

fn resolve_rule(rule: &mut Rule, table: &PrecedenceTable, unknown: &mut IndexSet<String>) {
    match rule {
        Rule::Terminal(_) | Rule::Symbol(_) => {}
        Rule::Seq(members) | Rule::Choice(members) => {
            for member in members {
                resolve_rule(member, table, unknown);
            }
        }
        Rule::Prec {
            value,
            assoc,
            content,
        } => {
            resolve_value(value, assoc, table, unknown);
            resolve_rule(content, table, unknown);
        }
        Rule::Repeat { content, .. }
        | Rule::Optional(content)
        | Rule::Token { content, .. }
        | Rule::Alias { content, .. }
        | Rule::Field { content, .. } => resolve_rule(content, table, unknown),
    }
}

/// Build the disambiguation table of every rule that needs one.
pub fn disambiguate(grammar: &NormalizedGrammar) -> Vec<DisambiguationTable> {
    let nullable = nullable_variables(grammar.variables.iter().map(|v| &v.body), &|_| false);
    let is_nullable = |symbol: SymbolRef| match symbol {
        SymbolRef::Rule(id) => nullable.get(id.index()).copied().unwrap_or(false),
        _ => false,
    };
    let units = unit_closure(grammar);

    let mut tables = Vec::new();
    for (index, variable) in grammar.variables.iter().enumerate() {
        let id = RuleId::from_index(index);
        // `expression` stands for `binary_expression` when it can derive it alone.
        let stands_for = |symbol: SymbolRef| match symbol {
            SymbolRef::Rule(rule) => units.get(rule.index()).is_some_and(|set| set.contains(&id)),
            _ => false,
        };

        let alternatives: Vec<AlternativeInfo> = variable
            .body
            .alternatives()
            .iter()
            .map(|alt| AlternativeInfo {
                precedence: AlternativePrecedence::of(alt),
                self_referential: mentions(alt, &stands_for),
                left_open: starts_with(alt, &stands_for, &is_nullable),
                right_open: ends_with(alt, &stands_for, &is_nullable),
            })
            .collect();

        let wanted = alternatives
            .iter()
            .any(|a| a.self_referential || a.precedence.is_annotated());
        if !wanted {
            continue;
        }

        let mut tie_breaks = Vec::new();
        for (r, reduce) in alternatives.iter().enumerate() {
            if !reduce.right_open {
                continue;
            }
            for (s, shift) in alternatives.iter().enumerate() {
                if !shift.left_open {
                    continue;
                }
                tie_breaks.push(TieBreak {
                    reduce: r,
                    shift: s,
                    resolution: resolve_pair(&reduce.precedence, &shift.precedence),
                });
            }
        }

        tables.push(DisambiguationTable {
            rule: variable.name.clone(),
            id,
            alternatives,
            tie_breaks,
        });
    }

    log::debug!(
        "{} disambiguation tables, {} unresolved pairs",
        tables.len(),
        tables.iter().map(|t| t.unresolved().count()).sum::<usize>()
    );
    tables
}

/// Rules each variable derives through chains of unit alternatives, itself
/// included.
fn unit_closure(grammar: &NormalizedGrammar) -> Vec<IndexSet<RuleId>> {
    let direct: Vec<IndexSet<RuleId>> = grammar
        .variables
        .iter()
        .map(|v| {
            let mut out = IndexSet::new();
            collect_units(&v.body, &mut out);
            out
        })
        .collect();

    (0..direct.len())
        .map(|index| {
            let start = RuleId::from_index(index);
            let mut seen = IndexSet::from([start]);
            let mut stack = vec![start];
            while let Some(id) = stack.pop() {
                for next in direct.get(id.index()).into_iter().flatten() {
                    if seen.insert(*next) {
                        stack.push(*next);
                    }
                }
            }
            seen
        })
        .collect()
}

fn collect_units(expr: &Expr, out: &mut IndexSet<RuleId>) {
    match expr {
        Expr::Symbol(SymbolRef::Rule(id)) => {
            out.insert(*id);
        }
        Expr::Choice(members) => {
            for member in members {
                collect_units(member, out);
            }
        }
        Expr::Prec { content, .. } | Expr::Alias { content, .. } | Expr::Field { content, .. } => {
            collect_units(content, out)
        }
        Expr::Symbol(_) | Expr::Seq(_) | Expr::Repeat(_) => {}
    }
}

fn mentions(expr: &Expr, target: &impl Fn(SymbolRef) -> bool) -> bool {
    let mut found = false;
    expr.for_each_symbol(&mut |symbol| found |= target(symbol));
    found
}

/// Whether `expr` can derive a string whose first symbol is a `target`.
pub fn starts_with(
    expr: &Expr,
    target: &impl Fn(SymbolRef) -> bool,
    nullable: &impl Fn(SymbolRef) -> bool,
) -> bool {
    match expr {
        Expr::Symbol(symbol) => target(*symbol),
        Expr::Seq(members) => {
            for member in members {
                if starts_with(member, target, nullable) {
                    return true;
                }
                if !expr_nullable(member, nullable) {
                    return false;
                }
            }
            false
        }
        Expr::Choice(members) => members.iter().any(|m| starts_with(m, target, nullable)),
        Expr::Repeat(content)
        | Expr::Prec { content, .. }
        | Expr::Alias { content, .. }
        | Expr::Field { content, .. } => starts_with(content, target, nullable),
    }
}

/// Whether `expr` can derive a string whose last symbol is a `target`.
pub fn ends_with(
    expr: &Expr,
    target: &impl Fn(SymbolRef) -> bool,
    nullable: &impl Fn(SymbolRef) -> bool,
) -> bool {
    match expr {
        Expr::Symbol(symbol) => target(*symbol),
        Expr::Seq(members) => {
            for member in members.iter().rev() {
                if ends_with(member, target, nullable) {
                    return true;
                }
                if !expr_nullable(member, nullable) {
                    return false;
                }
            }
            false
        }
        Expr::Choice(members) => members.iter().any(|m| ends_with(m, target, nullable)),
        Expr::Repeat(content)
        | Expr::Prec { content, .. }
        | Expr::Alias { content, .. }
        | Expr::Field { content, .. } => ends_with(content, target, nullable),
    }
}
