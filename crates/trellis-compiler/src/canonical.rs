//! The compiled grammar handed to parse-table generation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use trellis_core::{Grammar, PrecedenceTable, Rule, RuleDef};

use crate::analyze::SymbolKind;
use crate::diagnostics::Diagnostics;
use crate::ir::{Expr, SymbolRef};
use crate::metadata::{self, AliasInfo};
use crate::normalize::{ExternalToken, LexicalVariable, NormalizedGrammar, Variable};
use crate::precedence::DisambiguationTable;
use crate::validate::ConflictRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalGrammar {
    pub name: String,
    /// Always the first variable.
    pub start: String,
    pub variables: Vec<Variable>,
    pub lexical: Vec<LexicalVariable>,
    pub externals: Vec<ExternalToken>,
    pub extras: Vec<SymbolRef>,
    pub word: Option<SymbolRef>,
    pub conflicts: Vec<Vec<String>>,
    pub supertypes: IndexMap<String, Vec<String>>,
    /// Named levels in effect during resolution.
    pub levels: PrecedenceTable,
    pub precedence: Vec<DisambiguationTable>,
    pub aliases: IndexMap<String, AliasInfo>,
    /// Non-blocking diagnostics from every stage. Not serialized.
    #[serde(skip)]
    pub warnings: Diagnostics,
}

impl CanonicalGrammar {
    pub(crate) fn assemble(
        mut grammar: NormalizedGrammar,
        levels: PrecedenceTable,
        disambiguation: Vec<DisambiguationTable>,
        registry: ConflictRegistry,
        warnings: Diagnostics,
    ) -> Self {
        let fields: Vec<_> = grammar
            .variables
            .iter()
            .map(|v| metadata::fields_of(&v.body, &grammar))
            .collect();
        for (variable, fields) in grammar.variables.iter_mut().zip(fields) {
            variable.fields = fields;
        }
        let aliases = metadata::aliases(&grammar);
        let start = grammar
            .start()
            .map(|v| v.name.clone())
            .unwrap_or_default();

        Self {
            name: grammar.name,
            start,
            variables: grammar.variables,
            lexical: grammar.lexical.into_entries(),
            externals: grammar.externals,
            extras: grammar.extras,
            word: grammar.word,
            conflicts: registry.into_sets(),
            supertypes: grammar.supertypes,
            levels,
            precedence: disambiguation,
            aliases,
            warnings,
        }
    }

    pub fn start_variable(&self) -> Option<&Variable> {
        self.variables.first()
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn lexical_named(&self, name: &str) -> Option<&LexicalVariable> {
        self.lexical.iter().find(|l| l.named && l.name == name)
    }

    /// Disambiguation table of a rule, if it needed one.
    pub fn table(&self, rule: &str) -> Option<&DisambiguationTable> {
        self.precedence.iter().find(|t| t.rule == rule)
    }

    pub fn symbol_name(&self, symbol: SymbolRef) -> &str {
        match symbol {
            SymbolRef::Rule(id) => self.variables.get(id.index()).map_or("?", |v| &v.name),
            SymbolRef::Lexical(id) => self.lexical.get(id.index()).map_or("?", |l| &l.name),
            SymbolRef::External(id) => self.externals.get(id.index()).map_or("?", |e| &e.name),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    /// Decode the output of [`to_binary`](Self::to_binary). Warnings come back empty.
    pub fn from_binary(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }

    /// An input grammar that compiles back to this one.
    ///
    /// Token rules come after the variables. Conflict members naming rules
    /// that were inlined away are replaced by the variables they expanded into.
    pub fn to_grammar(&self) -> Grammar {
        let mut grammar = Grammar::new(&self.name);

        let mut emitted = Vec::new();
        for variable in &self.variables {
            // A token start rule is a variable wrapping its own lexical entry.
            let body = match variable.body {
                Expr::Symbol(SymbolRef::Lexical(id)) if variable.kind == SymbolKind::Token => {
                    emitted.push(id.index());
                    self.lexical
                        .get(id.index())
                        .map_or_else(Rule::blank, token_rule)
                }
                _ => self.expr_to_rule(&variable.body),
            };
            grammar.rules.push(RuleDef {
                name: variable.name.clone(),
                body,
                hidden: variable.is_hidden(),
            });
        }
        for (index, entry) in self.lexical.iter().enumerate() {
            if entry.named && !emitted.contains(&index) {
                grammar
                    .rules
                    .push(RuleDef::new(&entry.name, token_rule(entry)));
            }
        }

        grammar.externals = self
            .externals
            .iter()
            .map(|e| {
                if e.named {
                    Rule::sym(&e.name)
                } else {
                    Rule::string(&e.name)
                }
            })
            .collect();
        grammar.extras = self.extras.iter().map(|s| self.symbol_to_rule(*s)).collect();

        for set in &self.conflicts {
            let mut names: Vec<String> = Vec::new();
            for name in set {
                let replacement: Vec<&String> = if self.variable(name).is_some() {
                    vec![name]
                } else {
                    self.variables
                        .iter()
                        .filter(|v| v.inlined.contains(name))
                        .map(|v| &v.name)
                        .collect()
                };
                for name in replacement {
                    if !names.contains(name) {
                        names.push(name.clone());
                    }
                }
            }
            grammar.conflicts.push(names);
        }

        grammar.supertypes = self
            .supertypes
            .keys()
            .filter(|name| self.variable(name).is_some_and(|v| is_symbol_choice(&v.body)))
            .cloned()
            .collect();
        grammar.word = self.word.map(|s| self.symbol_name(s).to_string());
        grammar
    }

    fn symbol_to_rule(&self, symbol: SymbolRef) -> Rule {
        match symbol {
            SymbolRef::Rule(_) => Rule::sym(self.symbol_name(symbol)),
            SymbolRef::Lexical(id) => match self.lexical.get(id.index()) {
                Some(entry) if entry.named => Rule::sym(&entry.name),
                Some(entry) => token_rule(entry),
                None => Rule::blank(),
            },
            SymbolRef::External(id) => match self.externals.get(id.index()) {
                Some(e) if e.named => Rule::sym(&e.name),
                Some(e) => Rule::string(&e.name),
                None => Rule::blank(),
            },
        }
    }

    fn expr_to_rule(&self, expr: &Expr) -> Rule {
        match expr {
            Expr::Symbol(symbol) => self.symbol_to_rule(*symbol),
            Expr::Seq(members) => Rule::Seq(members.iter().map(|m| self.expr_to_rule(m)).collect()),
            Expr::Choice(members) => {
                Rule::Choice(members.iter().map(|m| self.expr_to_rule(m)).collect())
            }
            Expr::Repeat(content) => Rule::repeat(self.expr_to_rule(content)),
            Expr::Prec {
                value,
                assoc,
                content,
            } => Rule::prec_with(value.clone(), *assoc, self.expr_to_rule(content)),
            Expr::Alias {
                content,
                value,
                named,
            } => Rule::alias(self.expr_to_rule(content), value, *named),
            Expr::Field { name, content } => Rule::field(name, self.expr_to_rule(content)),
        }
    }
}

/// Rule that lexes to `entry` again.
fn token_rule(entry: &LexicalVariable) -> Rule {
    if !entry.immediate && matches!(entry.content, Rule::Terminal(_)) {
        return entry.content.clone();
    }
    Rule::Token {
        content: Box::new(entry.content.clone()),
        immediate: entry.immediate,
    }
}

/// Supertypes whose body stopped being a choice of symbols after inlining
/// are not declared again.
fn is_symbol_choice(expr: &Expr) -> bool {
    let Expr::Choice(members) = expr else {
        return false;
    };
    members.iter().all(|m| match m {
        Expr::Symbol(_) => true,
        Expr::Alias { content, .. } => matches!(**content, Expr::Symbol(_)),
        _ => false,
    })
}
