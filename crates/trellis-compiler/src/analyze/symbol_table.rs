//! Symbol table: rule definitions and their resolved references.
//!
//! Two-pass approach:
//! 1. Collect all definitions (reporting duplicate names)
//! 2. Check every reference and classify each rule

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use trellis_core::{Grammar, PrecedenceEntry, Rule};

use super::nullable::{nullable_rules, rule_nullable};
use super::recursion::{Graph, find_cycle, find_sccs, format_cycle, is_recursive};
use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// How a rule participates in the compiled grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    /// Ordinary syntactic rule.
    Nonterminal,
    /// Body is a single token (or terminal), lifted into the lexical table.
    Token,
    /// Built only from terminals and other lexical rules.
    Lexical,
    /// Inlined at every use site.
    Hidden,
    /// Choice of symbols standing for any of its members.
    Supertype,
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolKind::Nonterminal => write!(f, "nonterminal"),
            SymbolKind::Token => write!(f, "token"),
            SymbolKind::Lexical => write!(f, "lexical"),
            SymbolKind::Hidden => write!(f, "hidden"),
            SymbolKind::Supertype => write!(f, "supertype"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SymbolInfo {
    pub name: String,
    /// Position among the grammar's rule definitions.
    pub index: usize,
    pub kind: SymbolKind,
    pub body: Rule,
    /// Names referenced by the body, in first-occurrence order.
    pub refs: IndexSet<String>,
    pub nullable: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: IndexMap<String, SymbolInfo>,
    externals: IndexSet<String>,
}

impl SymbolTable {
    pub fn get(&self, name: &str) -> Option<&SymbolInfo> {
        self.symbols.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn kind(&self, name: &str) -> Option<SymbolKind> {
        self.symbols.get(name).map(|s| s.kind)
    }

    /// Whether `name` is inlined rather than kept as a variable.
    pub fn is_inlined(&self, name: &str) -> bool {
        self.kind(name) == Some(SymbolKind::Hidden)
    }

    /// Named external token without a rule definition of the same name.
    pub fn is_external(&self, name: &str) -> bool {
        !self.contains(name) && self.externals.contains(name)
    }

    pub fn externals(&self) -> impl Iterator<Item = &str> {
        self.externals.iter().map(String::as_str)
    }

    pub fn first(&self) -> Option<&SymbolInfo> {
        self.symbols.values().next()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbolInfo> {
        self.symbols.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.symbols.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

pub fn resolve_symbols(grammar: &Grammar, diag: &mut Diagnostics) -> SymbolTable {
    let mut table = SymbolTable::default();

    // Pass 1: definitions
    for (index, def) in grammar.rules.iter().enumerate() {
        if let Some(first) = table.symbols.get(&def.name) {
            diag.report(DiagnosticKind::DuplicateRuleName)
                .message(&def.name)
                .rule(&def.name)
                .note(format!(
                    "first defined as rule #{}, again as rule #{}",
                    first.index + 1,
                    index + 1
                ))
                .emit();
            continue;
        }

        let hidden = def.hidden || grammar.inline.contains(&def.name);
        table.symbols.insert(
            def.name.clone(),
            SymbolInfo {
                name: def.name.clone(),
                index,
                kind: if hidden {
                    SymbolKind::Hidden
                } else {
                    SymbolKind::Nonterminal
                },
                body: def.body.clone(),
                refs: def.body.symbols(),
                nullable: false,
            },
        );
    }

    for external in &grammar.externals {
        if let Rule::Symbol(name) = external {
            table.externals.insert(name.clone());
        }
    }

    // Pass 2: references
    check_references(&table, grammar, diag);

    classify(&mut table, grammar, diag);
    check_supertypes(&table, grammar, diag);
    check_word(&table, grammar, diag);

    table
}

fn check_references(table: &SymbolTable, grammar: &Grammar, diag: &mut Diagnostics) {
    let defined = |name: &str| table.contains(name) || table.externals.contains(name);
    let mut unresolved = |name: &str, context: &str, owner: Option<&str>| {
        let mut builder = diag
            .report(DiagnosticKind::UnresolvedSymbol)
            .message(name)
            .note(format!("referenced from {context}"));
        if let Some(owner) = owner {
            builder = builder.rule(owner);
        }
        builder.emit();
    };

    for symbol in table.symbols.values() {
        for name in &symbol.refs {
            if !defined(name) {
                unresolved(name, &format!("`{}`", symbol.name), Some(&symbol.name));
            }
        }
    }

    for extra in &grammar.extras {
        for name in extra.symbols() {
            if !defined(&name) {
                unresolved(&name, "extras", None);
            }
        }
    }

    for set in &grammar.conflicts {
        for name in set {
            if !table.contains(name) {
                unresolved(name, "conflicts", None);
            }
        }
    }

    for name in &grammar.inline {
        if !table.contains(name) {
            unresolved(name, "inline", None);
        }
    }

    for name in &grammar.supertypes {
        if !table.contains(name) {
            unresolved(name, "supertypes", None);
        }
    }

    for ordering in &grammar.precedences {
        for entry in ordering {
            if let PrecedenceEntry::Symbol(name) = entry
                && !table.contains(name)
            {
                unresolved(name, "precedences", None);
            }
        }
    }

    if let Some(word) = &grammar.word
        && !table.contains(word)
    {
        unresolved(word, "word", None);
    }
}

fn classify(table: &mut SymbolTable, grammar: &Grammar, diag: &mut Diagnostics) {
    let bodies: IndexMap<String, Rule> = table
        .symbols
        .iter()
        .map(|(name, s)| (name.clone(), s.body.clone()))
        .collect();
    let nullable = nullable_rules(&bodies);

    let graph: Graph = table
        .symbols
        .iter()
        .map(|(name, s)| {
            let refs = s
                .refs
                .iter()
                .filter(|r| table.symbols.contains_key(*r))
                .cloned()
                .collect();
            (name.clone(), refs)
        })
        .collect();

    let mut lexical: IndexSet<String> = IndexSet::new();
    for scc in find_sccs(&graph) {
        if is_recursive(&graph, &scc) {
            for name in &scc {
                if is_token_shaped(&bodies[name]) {
                    lexical.insert(name.clone());
                }
            }
            let hidden: IndexSet<&str> = scc
                .iter()
                .filter(|name| table.symbols[*name].kind == SymbolKind::Hidden)
                .map(String::as_str)
                .collect();
            report_unit_cycle(&scc, &bodies, &nullable, &hidden, diag);
            continue;
        }

        let name = &scc[0];
        let body = &bodies[name];
        let refs_lexical = table.symbols[name]
            .refs
            .iter()
            .all(|r| lexical.contains(r) || table.externals.contains(r));
        if is_token_shaped(body) || (!has_field(body) && refs_lexical) {
            lexical.insert(name.clone());
        }
    }

    for symbol in table.symbols.values_mut() {
        symbol.nullable = nullable.contains(&symbol.name);
        if symbol.kind == SymbolKind::Hidden {
            continue;
        }
        symbol.kind = if is_token_shaped(&symbol.body) {
            SymbolKind::Token
        } else if grammar.supertypes.contains(&symbol.name) {
            SymbolKind::Supertype
        } else if lexical.contains(&symbol.name) {
            SymbolKind::Lexical
        } else if is_symbol_choice(&symbol.body) {
            SymbolKind::Supertype
        } else {
            SymbolKind::Nonterminal
        };
    }
}

/// A recursive component whose rules can derive themselves without consuming input.
///
/// Cycles through hidden or token-shaped rules are lexical; cycles among
/// visible syntactic rules are unit cycles.
fn report_unit_cycle(
    scc: &[String],
    bodies: &IndexMap<String, Rule>,
    nullable: &IndexSet<String>,
    hidden: &IndexSet<&str>,
    diag: &mut Diagnostics,
) {
    let members: IndexSet<&str> = scc.iter().map(String::as_str).collect();
    let mut adj = Graph::new();
    for name in scc {
        let body = &bodies[name];
        if has_field(body) {
            continue;
        }
        let mut refs = IndexSet::new();
        collect_unit_refs(body, &|n| nullable.contains(n), &mut refs);
        refs.retain(|r: &String| members.contains(r.as_str()));
        adj.insert(name.clone(), refs);
    }

    if let Some(cycle) = find_cycle(scc, &adj) {
        let lexical = cycle
            .iter()
            .any(|name| hidden.contains(name.as_str()) || is_token_shaped(&bodies[name]));
        let kind = if lexical {
            DiagnosticKind::CyclicLexicalRule
        } else {
            DiagnosticKind::UnitCycle
        };
        diag.report(kind)
            .message(format_cycle(&cycle))
            .rules(cycle)
            .emit();
    }
}

/// Symbols the rule can derive alone, with everything around them deriving empty.
pub fn collect_unit_refs(
    rule: &Rule,
    is_nullable: &impl Fn(&str) -> bool,
    out: &mut IndexSet<String>,
) {
    match rule {
        Rule::Terminal(_) => {}
        Rule::Symbol(name) => {
            out.insert(name.clone());
        }
        Rule::Seq(members) => {
            for (i, member) in members.iter().enumerate() {
                let rest_nullable = members
                    .iter()
                    .enumerate()
                    .all(|(j, m)| j == i || rule_nullable(m, is_nullable));
                if rest_nullable {
                    collect_unit_refs(member, is_nullable, out);
                }
            }
        }
        Rule::Choice(members) => {
            for member in members {
                collect_unit_refs(member, is_nullable, out);
            }
        }
        Rule::Repeat { content, .. }
        | Rule::Optional(content)
        | Rule::Token { content, .. }
        | Rule::Prec { content, .. }
        | Rule::Alias { content, .. }
        | Rule::Field { content, .. } => collect_unit_refs(content, is_nullable, out),
    }
}

fn check_supertypes(table: &SymbolTable, grammar: &Grammar, diag: &mut Diagnostics) {
    for name in &grammar.supertypes {
        let Some(symbol) = table.get(name) else {
            continue;
        };
        if !is_symbol_choice(&symbol.body) {
            diag.report(DiagnosticKind::InvalidSupertype)
                .message(name)
                .rule(name)
                .emit();
        }
    }
}

fn check_word(table: &SymbolTable, grammar: &Grammar, diag: &mut Diagnostics) {
    let Some(word) = &grammar.word else {
        return;
    };
    let Some(symbol) = table.get(word) else {
        return;
    };
    if symbol.kind != SymbolKind::Token {
        diag.report(DiagnosticKind::InvalidWordRule)
            .message(word)
            .rule(word)
            .note(format!("`{word}` is classified as {}", symbol.kind))
            .emit();
    }
}

/// A token or terminal, possibly under precedence annotations.
pub fn is_token_shaped(rule: &Rule) -> bool {
    match rule {
        Rule::Terminal(_) | Rule::Token { .. } => true,
        Rule::Prec { content, .. } => is_token_shaped(content),
        _ => false,
    }
}

/// Choice whose members are all symbols, possibly aliased.
pub fn is_symbol_choice(rule: &Rule) -> bool {
    fn is_symbol(rule: &Rule) -> bool {
        match rule {
            Rule::Symbol(_) => true,
            Rule::Alias { content, .. } => is_symbol(content),
            _ => false,
        }
    }

    matches!(rule, Rule::Choice(members) if !members.is_empty() && members.iter().all(is_symbol))
}

fn has_field(rule: &Rule) -> bool {
    matches!(rule, Rule::Field { .. }) || rule.children().iter().any(has_field)
}

