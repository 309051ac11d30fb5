//! FIRST sets over the normalized grammar.

use indexmap::IndexSet;

use crate::analyze::nullable::{expr_nullable, nullable_variables, rule_nullable};
use crate::ir::{Expr, SymbolRef};
use crate::normalize::NormalizedGrammar;

/// Terminals (lexical or external) each variable can begin with.
#[derive(Debug, Clone, Default)]
pub struct FirstSets {
    first: Vec<IndexSet<SymbolRef>>,
    nullable: Vec<bool>,
    /// Lexical entries that match the empty string; reported as `EmptyToken`.
    empty_tokens: Vec<bool>,
}

impl FirstSets {
    pub fn compute(grammar: &NormalizedGrammar) -> Self {
        let bodies = grammar.variables.iter().map(|v| &v.body);
        let empty_tokens: Vec<bool> = grammar
            .lexical
            .iter()
            .map(|(_, entry)| rule_nullable(&entry.content, &|_| false))
            .collect();
        let token_nullable = |symbol: SymbolRef| match symbol {
            SymbolRef::Lexical(id) => empty_tokens.get(id.index()).copied().unwrap_or(false),
            _ => false,
        };
        let nullable = nullable_variables(bodies.clone(), &token_nullable);
        let mut sets = Self {
            first: vec![IndexSet::new(); grammar.variables.len()],
            nullable,
            empty_tokens,
        };

        loop {
            let mut changed = false;
            for (index, body) in bodies.clone().enumerate() {
                let found = sets.of_expr(body);
                let set = &mut sets.first[index];
                let before = set.len();
                set.extend(found);
                changed |= set.len() != before;
            }
            if !changed {
                return sets;
            }
        }
    }

    pub fn is_nullable(&self, expr: &Expr) -> bool {
        expr_nullable(expr, &|symbol| self.symbol_nullable(symbol))
    }

    fn symbol_nullable(&self, symbol: SymbolRef) -> bool {
        match symbol {
            SymbolRef::Rule(id) => self.nullable.get(id.index()).copied().unwrap_or(false),
            SymbolRef::Lexical(id) => self.empty_tokens.get(id.index()).copied().unwrap_or(false),
            SymbolRef::External(_) => false,
        }
    }

    pub fn of_expr(&self, expr: &Expr) -> IndexSet<SymbolRef> {
        let mut out = IndexSet::new();
        self.collect(expr, &mut out);
        out
    }

    fn collect(&self, expr: &Expr, out: &mut IndexSet<SymbolRef>) {
        match expr {
            Expr::Symbol(SymbolRef::Rule(id)) => {
                if let Some(set) = self.first.get(id.index()) {
                    out.extend(set.iter().copied());
                }
            }
            Expr::Symbol(terminal) => {
                out.insert(*terminal);
            }
            Expr::Seq(members) => {
                for member in members {
                    self.collect(member, out);
                    if !self.is_nullable(member) {
                        break;
                    }
                }
            }
            Expr::Choice(members) => {
                for member in members {
                    self.collect(member, out);
                }
            }
            Expr::Repeat(content)
            | Expr::Prec { content, .. }
            | Expr::Alias { content, .. }
            | Expr::Field { content, .. } => self.collect(content, out),
        }
    }

    /// FIRST set and nullability of any named rule, hidden ones included.
    pub fn of_name(
        &self,
        grammar: &NormalizedGrammar,
        name: &str,
    ) -> Option<(IndexSet<SymbolRef>, bool)> {
        if let Some(body) = grammar.body_of(name) {
            return Some((self.of_expr(body), self.is_nullable(body)));
        }
        let symbol = grammar.lookup(name)?;
        Some((IndexSet::from([symbol]), false))
    }
}
