//! Normalization: canonical, index-based variables.
//!
//! Every rule body is canonicalized, hidden rules are expanded at their use
//! sites, and terminals are lifted into a deduplicated lexical table. The
//! start rule is always kept as a variable, even when hidden.

mod inline;
mod lexical;
mod lower;


use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use trellis_core::{Grammar, PrecedenceEntry, Rule};

pub use inline::{Inlined, Inliner};
pub use lexical::{LexicalTable, LexicalVariable};
pub use lower::Lowerer;

use crate::analyze::{SymbolKind, SymbolTable};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::ir::{Expr, ExternalId, RuleId, SymbolRef};
use crate::metadata::FieldInfo;

/// A syntactic variable of the normalized grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub kind: SymbolKind,
    pub body: Expr,
    /// Hidden rules expanded into `body`.
    pub inlined: Vec<String>,
    pub fields: IndexMap<String, FieldInfo>,
}

impl Variable {
    /// Only the start rule can be a hidden variable.
    pub fn is_hidden(&self) -> bool {
        self.kind == SymbolKind::Hidden
    }
}

/// Token produced by an external scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalToken {
    pub name: String,
    /// Declared as a symbol rather than as literal text.
    pub named: bool,
}

#[derive(Debug, Clone)]
pub struct NormalizedGrammar {
    pub name: String,
    /// Start rule first, then the remaining rules in definition order.
    pub variables: Vec<Variable>,
    pub lexical: LexicalTable,
    pub externals: Vec<ExternalToken>,
    pub extras: Vec<SymbolRef>,
    pub word: Option<SymbolRef>,
    /// Lowered bodies of hidden rules, kept for analyses that name them.
    pub expansions: IndexMap<String, Expr>,
    pub conflicts: Vec<Vec<String>>,
    /// Supertype name to the names of its members.
    pub supertypes: IndexMap<String, Vec<String>>,
    pub precedences: Vec<Vec<PrecedenceEntry>>,
    pub symbols: SymbolTable,
}

impl NormalizedGrammar {
    pub fn start(&self) -> Option<&Variable> {
        self.variables.first()
    }

    pub fn variable(&self, id: RuleId) -> Option<&Variable> {
        self.variables.get(id.index())
    }

    pub fn rule_id(&self, name: &str) -> Option<RuleId> {
        self.variables
            .iter()
            .position(|v| v.name == name)
            .map(RuleId::from_index)
    }

    /// Reference for a rule, token rule or external name.
    pub fn lookup(&self, name: &str) -> Option<SymbolRef> {
        if let Some(id) = self.rule_id(name) {
            return Some(SymbolRef::Rule(id));
        }
        if let Some(id) = self.lexical.find_named(name) {
            return Some(SymbolRef::Lexical(id));
        }
        self.externals
            .iter()
            .position(|e| e.named && e.name == name)
            .map(|i| SymbolRef::External(ExternalId::from_index(i)))
    }

    /// Display name of a resolved symbol.
    pub fn symbol_name(&self, symbol: SymbolRef) -> &str {
        match symbol {
            SymbolRef::Rule(id) => self.variable(id).map_or("?", |v| v.name.as_str()),
            SymbolRef::Lexical(id) => self.lexical.get(id).map_or("?", |l| l.name.as_str()),
            SymbolRef::External(id) => self
                .externals
                .get(id.index())
                .map_or("?", |e| e.name.as_str()),
        }
    }

    /// Whether a symbol appears as a named node.
    pub fn symbol_named(&self, symbol: SymbolRef) -> bool {
        match symbol {
            SymbolRef::Rule(id) => self.variable(id).is_some_and(|v| !v.is_hidden()),
            SymbolRef::Lexical(id) => self.lexical.get(id).is_some_and(|l| l.named),
            SymbolRef::External(id) => self
                .externals
                .get(id.index())
                .is_some_and(|e| e.named && !e.name.starts_with('_')),
        }
    }

    /// Body of a variable or hidden rule, by name.
    pub fn body_of(&self, name: &str) -> Option<&Expr> {
        match self.rule_id(name) {
            Some(id) => self.variable(id).map(|v| &v.body),
            None => self.expansions.get(name),
        }
    }
}

pub fn normalize(
    grammar: &Grammar,
    symbols: SymbolTable,
    start: &str,
    diag: &mut Diagnostics,
) -> NormalizedGrammar {
    let mut inliner = Inliner::new(&symbols);
    let mut bodies: IndexMap<String, Rule> = IndexMap::new();
    let mut used: IndexMap<String, Vec<String>> = IndexMap::new();
    for symbol in symbols.iter() {
        let inlined = inliner.body(&symbol.name, diag);
        bodies.insert(symbol.name.clone(), inlined.rule);
        used.insert(symbol.name.clone(), inlined.used.into_iter().collect());
    }
    let extras: Vec<Rule> = grammar
        .extras
        .iter()
        .map(|e| inliner.inline(e, diag).rule)
        .collect();

    let mut order: Vec<(&str, SymbolKind)> = Vec::new();
    if let Some(symbol) = symbols.get(start) {
        order.push((symbol.name.as_str(), symbol.kind));
    }
    for symbol in symbols.iter() {
        let kept = matches!(
            symbol.kind,
            SymbolKind::Nonterminal | SymbolKind::Lexical | SymbolKind::Supertype
        );
        if kept && symbol.name != start {
            order.push((symbol.name.as_str(), symbol.kind));
        }
    }
    let rule_ids: IndexMap<String, RuleId> = order
        .iter()
        .enumerate()
        .map(|(i, (name, _))| (name.to_string(), RuleId::from_index(i)))
        .collect();

    let externals = collect_externals(grammar);
    let mut lowerer = Lowerer::new(&symbols, &bodies, &rule_ids, &externals);

    let mut variables = Vec::with_capacity(order.len());
    for (name, kind) in &order {
        let body = if *kind == SymbolKind::Token {
            Expr::Symbol(SymbolRef::Lexical(lowerer.named_token(name, diag)))
        } else {
            let rule = bodies.get(*name).cloned().unwrap_or_else(Rule::blank);
            lowerer.lower(&rule, name, diag)
        };
        variables.push(Variable {
            name: name.to_string(),
            kind: *kind,
            body,
            inlined: used.get(*name).cloned().unwrap_or_default(),
            fields: IndexMap::new(),
        });
    }

    let mut extra_refs = Vec::new();
    for (i, extra) in extras.iter().enumerate() {
        match lowerer.lower(extra, "extras", diag) {
            Expr::Symbol(symbol) => extra_refs.push(symbol),
            _ => diag
                .report(DiagnosticKind::InvalidExtra)
                .message(format!("#{}", i + 1))
                .emit(),
        }
    }

    let word = grammar
        .word
        .as_deref()
        .and_then(|w| lowerer.resolve(w, diag));

    // Token rules nothing refers to still get an entry.
    for symbol in symbols.iter() {
        if symbol.kind == SymbolKind::Token {
            lowerer.named_token(&symbol.name, diag);
        }
    }

    let mut expansions = IndexMap::new();
    for symbol in symbols.iter() {
        if symbol.kind == SymbolKind::Hidden
            && symbol.name != start
            && let Some(rule) = bodies.get(&symbol.name)
        {
            let expr = lowerer.lower(rule, &symbol.name, diag);
            expansions.insert(symbol.name.clone(), expr);
        }
    }

    let lexical = lowerer.lexical;
    let supertypes = collect_supertypes(grammar, &symbols);

    log::debug!(
        "normalized `{}`: {} variables, {} lexical, {} inlined",
        grammar.name,
        variables.len(),
        lexical.len(),
        expansions.len()
    );

    NormalizedGrammar {
        name: grammar.name.clone(),
        variables,
        lexical,
        externals,
        extras: extra_refs,
        word,
        expansions,
        conflicts: grammar.conflicts.clone(),
        supertypes,
        precedences: grammar.precedences.clone(),
        symbols,
    }
}

fn collect_externals(grammar: &Grammar) -> Vec<ExternalToken> {
    grammar
        .externals
        .iter()
        .filter_map(|rule| match rule {
            Rule::Symbol(name) => Some(ExternalToken {
                name: name.clone(),
                named: true,
            }),
            Rule::Terminal(trellis_core::Terminal::Literal(text)) => Some(ExternalToken {
                name: text.clone(),
                named: false,
            }),
            _ => {
                log::warn!("ignoring unsupported external token {rule:?}");
                None
            }
        })
        .collect()
}

/// Declared supertypes and rules classified as supertypes, with their members.
fn collect_supertypes(grammar: &Grammar, symbols: &SymbolTable) -> IndexMap<String, Vec<String>> {
    let structural = symbols
        .iter()
        .filter(|s| s.kind == SymbolKind::Supertype)
        .map(|s| s.name.as_str());
    let declared = grammar.supertypes.iter().map(String::as_str);

    let mut supertypes = IndexMap::new();
    for name in declared.chain(structural) {
        if supertypes.contains_key(name) {
            continue;
        }
        let Some(symbol) = symbols.get(name) else {
            continue;
        };
        let members = symbol.body.canonicalize().symbols().into_iter().collect();
        supertypes.insert(name.to_string(), members);
    }
    supertypes
}
