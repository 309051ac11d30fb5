//! Substitution of hidden rules at their use sites.
//!
//! Each hidden rule is expanded once and cached. The rules currently being
//! expanded form a stack; meeting one of them again is an inlining cycle.

use indexmap::{IndexMap, IndexSet};

use trellis_core::Rule;
use trellis_core::grammar::{make_choice, make_seq};

use crate::analyze::SymbolTable;
use crate::analyze::recursion::format_cycle;
use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// A rule body with hidden references replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inlined {
    pub rule: Rule,
    /// Hidden rules expanded into `rule`, directly or transitively.
    pub used: IndexSet<String>,
}

pub struct Inliner<'a> {
    symbols: &'a SymbolTable,
    canonical: IndexMap<String, Rule>,
    expanded: IndexMap<String, Inlined>,
    stack: IndexSet<String>,
    reported: IndexSet<Vec<String>>,
}

impl<'a> Inliner<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        let canonical = symbols
            .iter()
            .map(|s| (s.name.clone(), s.body.canonicalize()))
            .collect();
        Self {
            symbols,
            canonical,
            expanded: IndexMap::new(),
            stack: IndexSet::new(),
            reported: IndexSet::new(),
        }
    }

    /// Canonical body of `name` with hidden references substituted.
    pub fn body(&mut self, name: &str, diag: &mut Diagnostics) -> Inlined {
        if self.symbols.is_inlined(name) {
            return self.expansion(name, diag);
        }
        let Some(body) = self.canonical.get(name).cloned() else {
            return Inlined {
                rule: Rule::blank(),
                used: IndexSet::new(),
            };
        };
        self.inline(&body, diag)
    }

    /// Substitute hidden references in an arbitrary rule.
    pub fn inline(&mut self, rule: &Rule, diag: &mut Diagnostics) -> Inlined {
        let mut used = IndexSet::new();
        let rule = self.substitute(rule, &mut used, diag).canonicalize();
        Inlined { rule, used }
    }

    fn expansion(&mut self, name: &str, diag: &mut Diagnostics) -> Inlined {
        if let Some(done) = self.expanded.get(name) {
            return done.clone();
        }

        if let Some(pos) = self.stack.get_index_of(name) {
            let cycle: Vec<String> = self.stack.iter().skip(pos).cloned().collect();
            self.report_cycle(cycle, diag);
            return Inlined {
                rule: Rule::blank(),
                used: IndexSet::new(),
            };
        }

        let Some(body) = self.canonical.get(name).cloned() else {
            return Inlined {
                rule: Rule::blank(),
                used: IndexSet::new(),
            };
        };

        self.stack.insert(name.to_string());
        let inlined = self.inline(&body, diag);
        self.stack.pop();

        self.expanded.insert(name.to_string(), inlined.clone());
        inlined
    }

    fn report_cycle(&mut self, cycle: Vec<String>, diag: &mut Diagnostics) {
        let mut key = cycle.clone();
        key.sort();
        if !self.reported.insert(key) {
            return;
        }
        diag.report(DiagnosticKind::InliningCycle)
            .message(format_cycle(&cycle))
            .rules(cycle)
            .emit();
    }

    fn substitute(
        &mut self,
        rule: &Rule,
        used: &mut IndexSet<String>,
        diag: &mut Diagnostics,
    ) -> Rule {
        match rule {
            Rule::Symbol(name) if self.symbols.is_inlined(name) => {
                let expansion = self.expansion(name, diag);
                used.insert(name.clone());
                used.extend(expansion.used);
                expansion.rule
            }
            Rule::Terminal(_) | Rule::Symbol(_) => rule.clone(),
            Rule::Seq(members) => {
                let members: Vec<Rule> = members
                    .iter()
                    .map(|m| self.substitute(m, used, diag))
                    .collect();
                make_seq(members)
            }
            Rule::Choice(members) => {
                let members: Vec<Rule> = members
                    .iter()
                    .map(|m| self.substitute(m, used, diag))
                    .collect();
                make_choice(members)
            }
            Rule::Repeat {
                content,
                repetition,
            } => Rule::Repeat {
                content: Box::new(self.substitute(content, used, diag)),
                repetition: *repetition,
            },
            Rule::Optional(content) => {
                Rule::Optional(Box::new(self.substitute(content, used, diag)))
            }
            Rule::Token { content, immediate } => Rule::Token {
                content: Box::new(self.substitute(content, used, diag)),
                immediate: *immediate,
            },
            Rule::Prec {
                value,
                assoc,
                content,
            } => Rule::Prec {
                value: value.clone(),
                assoc: *assoc,
                content: Box::new(self.substitute(content, used, diag)),
            },
            Rule::Alias {
                content,
                value,
                named,
            } => Rule::Alias {
                content: Box::new(self.substitute(content, used, diag)),
                value: value.clone(),
                named: *named,
            },
            Rule::Field { name, content } => Rule::Field {
                name: name.clone(),
                content: Box::new(self.substitute(content, used, diag)),
            },
        }
    }
}
