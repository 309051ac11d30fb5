//! Lowering from name-based rules to index-based expressions.
//!
//! Terminals and `token(...)` subtrees are lifted into the lexical table;
//! symbol names become `SymbolRef`s.

use indexmap::IndexMap;

use trellis_core::{Rule, Terminal};

use super::ExternalToken;
use super::lexical::LexicalTable;
use crate::analyze::{SymbolKind, SymbolTable};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::ir::{self, Expr, ExternalId, LexicalId, RuleId, SymbolRef};

pub struct Lowerer<'a> {
    symbols: &'a SymbolTable,
    /// Inlined canonical bodies, for expanding token content.
    bodies: &'a IndexMap<String, Rule>,
    rule_ids: &'a IndexMap<String, RuleId>,
    external_ids: IndexMap<String, ExternalId>,
    external_literals: IndexMap<String, ExternalId>,
    pub(super) lexical: LexicalTable,
}

impl<'a> Lowerer<'a> {
    pub fn new(
        symbols: &'a SymbolTable,
        bodies: &'a IndexMap<String, Rule>,
        rule_ids: &'a IndexMap<String, RuleId>,
        externals: &[ExternalToken],
    ) -> Self {
        let mut external_ids = IndexMap::new();
        let mut external_literals = IndexMap::new();
        for (i, external) in externals.iter().enumerate() {
            let id = ExternalId::from_index(i);
            if external.named {
                external_ids.insert(external.name.clone(), id);
            } else {
                external_literals.insert(external.name.clone(), id);
            }
        }
        Self {
            symbols,
            bodies,
            rule_ids,
            external_ids,
            external_literals,
            lexical: LexicalTable::new(),
        }
    }

    pub fn lower(&mut self, rule: &Rule, owner: &str, diag: &mut Diagnostics) -> Expr {
        match rule {
            Rule::Terminal(terminal) => {
                if let Terminal::Literal(text) = terminal
                    && let Some(id) = self.external_literals.get(text)
                {
                    return Expr::Symbol(SymbolRef::External(*id));
                }
                let id = self.lexical.intern_anonymous(rule.clone(), false, owner);
                Expr::Symbol(SymbolRef::Lexical(id))
            }
            Rule::Token { content, immediate } => {
                let content = self.token_content(content, owner, &mut Vec::new(), diag);
                let id = self
                    .lexical
                    .intern_anonymous(content.canonicalize(), *immediate, owner);
                Expr::Symbol(SymbolRef::Lexical(id))
            }
            Rule::Symbol(name) => match self.resolve(name, diag) {
                Some(symbol) => Expr::Symbol(symbol),
                None => Expr::blank(),
            },
            Rule::Seq(members) => {
                let members: Vec<Expr> = members
                    .iter()
                    .map(|m| self.lower(m, owner, diag))
                    .collect();
                ir::make_seq(members)
            }
            Rule::Choice(members) => {
                let members: Vec<Expr> = members
                    .iter()
                    .map(|m| self.lower(m, owner, diag))
                    .collect();
                ir::make_choice(members)
            }
            Rule::Repeat {
                content,
                repetition: trellis_core::Repetition::ZeroOrMore,
            } => Expr::Repeat(Box::new(self.lower(content, owner, diag))),
            Rule::Repeat { .. } | Rule::Optional(_) => {
                self.lower(&rule.canonicalize(), owner, diag)
            }
            Rule::Prec {
                value,
                assoc,
                content,
            } => Expr::Prec {
                value: value.clone(),
                assoc: *assoc,
                content: Box::new(self.lower(content, owner, diag)),
            },
            Rule::Alias {
                content,
                value,
                named,
            } => Expr::Alias {
                content: Box::new(self.lower(content, owner, diag)),
                value: value.clone(),
                named: *named,
            },
            Rule::Field { name, content } => Expr::Field {
                name: name.clone(),
                content: Box::new(self.lower(content, owner, diag)),
            },
        }
    }

    /// Reference to a named rule, token rule or external token.
    pub fn resolve(&mut self, name: &str, diag: &mut Diagnostics) -> Option<SymbolRef> {
        if let Some(id) = self.rule_ids.get(name) {
            return Some(SymbolRef::Rule(*id));
        }
        match self.symbols.kind(name) {
            Some(SymbolKind::Token) => Some(SymbolRef::Lexical(self.named_token(name, diag))),
            Some(_) => None,
            None => self.external_ids.get(name).map(|id| SymbolRef::External(*id)),
        }
    }

    /// Lexical entry of a token rule, interned on first use.
    pub fn named_token(&mut self, name: &str, diag: &mut Diagnostics) -> LexicalId {
        if let Some(id) = self.lexical.find_named(name) {
            return id;
        }
        let body = self.bodies.get(name).cloned().unwrap_or_else(Rule::blank);
        let mut stack = vec![name.to_string()];
        let (content, immediate) = self.split_token(&body, name, &mut stack, diag);
        self.lexical
            .intern_named(name, content.canonicalize(), immediate)
    }

    /// Content and `immediate` flag of a token rule body.
    fn split_token(
        &mut self,
        body: &Rule,
        owner: &str,
        stack: &mut Vec<String>,
        diag: &mut Diagnostics,
    ) -> (Rule, bool) {
        match body {
            Rule::Token { content, immediate } => {
                (self.token_content(content, owner, stack, diag), *immediate)
            }
            Rule::Prec {
                value,
                assoc,
                content,
            } => {
                let (inner, immediate) = self.split_token(content, owner, stack, diag);
                let prec = Rule::Prec {
                    value: value.clone(),
                    assoc: *assoc,
                    content: Box::new(inner),
                };
                (prec, immediate)
            }
            other => (self.token_content(other, owner, stack, diag), false),
        }
    }

    /// Expand references inside token content into their lexical bodies.
    fn token_content(
        &mut self,
        rule: &Rule,
        owner: &str,
        stack: &mut Vec<String>,
        diag: &mut Diagnostics,
    ) -> Rule {
        match rule {
            Rule::Terminal(_) => rule.clone(),
            Rule::Symbol(name) => {
                let lexical = matches!(
                    self.symbols.kind(name),
                    Some(SymbolKind::Token | SymbolKind::Lexical)
                );
                if !lexical || stack.contains(name) {
                    let mut builder = diag
                        .report(DiagnosticKind::InvalidTokenContent)
                        .message(name)
                        .rule(owner);
                    if lexical {
                        builder = builder.note(format!("`{name}` refers back to itself"));
                    }
                    builder.emit();
                    return Rule::blank();
                }
                let bodies = self.bodies;
                let Some(body) = bodies.get(name) else {
                    return Rule::blank();
                };
                stack.push(name.clone());
                let expanded = self.token_content(body, owner, stack, diag);
                stack.pop();
                expanded
            }
            Rule::Token { content, .. } | Rule::Alias { content, .. } | Rule::Field { content, .. } => {
                self.token_content(content, owner, stack, diag)
            }
            Rule::Seq(members) => Rule::Seq(
                members
                    .iter()
                    .map(|m| self.token_content(m, owner, stack, diag))
                    .collect(),
            ),
            Rule::Choice(members) => Rule::Choice(
                members
                    .iter()
                    .map(|m| self.token_content(m, owner, stack, diag))
                    .collect(),
            ),
            Rule::Repeat {
                content,
                repetition,
            } => Rule::Repeat {
                content: Box::new(self.token_content(content, owner, stack, diag)),
                repetition: *repetition,
            },
            Rule::Optional(content) => {
                Rule::Optional(Box::new(self.token_content(content, owner, stack, diag)))
            }
            Rule::Prec {
                value,
                assoc,
                content,
            } => Rule::Prec {
                value: value.clone(),
                assoc: *assoc,
                content: Box::new(self.token_content(content, owner, stack, diag)),
            },
        }
    }
}
