//! Index-based rule trees used after symbol resolution.
//!
//! Every `Symbol` names its target by index: a syntactic variable, an entry
//! in the lexical table or an external token. The shapes follow canonical
//! form: no optional, no one-or-more repeat, flattened sequences and choices.

use serde::{Deserialize, Serialize};

use trellis_core::{Assoc, Precedence};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LexicalId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalId(pub u32);

macro_rules! impl_index {
    ($($id:ident),*) => {$(
        impl $id {
            pub fn index(self) -> usize {
                self.0 as usize
            }

            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }
        }
    )*};
}

impl_index!(RuleId, LexicalId, ExternalId);

/// Resolved reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SymbolRef {
    Rule(RuleId),
    Lexical(LexicalId),
    External(ExternalId),
}

impl SymbolRef {
    /// Lexical and external symbols are terminals of the syntactic grammar.
    pub fn is_terminal(self) -> bool {
        !matches!(self, SymbolRef::Rule(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expr {
    Symbol(SymbolRef),
    /// `Seq([])` is the blank expression.
    Seq(Vec<Expr>),
    Choice(Vec<Expr>),
    /// Zero or more.
    Repeat(Box<Expr>),
    /// After precedence resolution every `value` is an integer.
    Prec {
        value: Precedence,
        assoc: Assoc,
        content: Box<Expr>,
    },
    Alias {
        content: Box<Expr>,
        value: String,
        named: bool,
    },
    Field {
        name: String,
        content: Box<Expr>,
    },
}

impl Expr {
    pub fn blank() -> Self {
        Expr::Seq(Vec::new())
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Expr::Seq(members) if members.is_empty())
    }

    pub fn children(&self) -> &[Expr] {
        match self {
            Expr::Symbol(_) => &[],
            Expr::Seq(members) | Expr::Choice(members) => members,
            Expr::Repeat(content)
            | Expr::Prec { content, .. }
            | Expr::Alias { content, .. }
            | Expr::Field { content, .. } => std::slice::from_ref(content.as_ref()),
        }
    }

    /// Top-level alternatives: the members of a choice, or the expression itself.
    pub fn alternatives(&self) -> &[Expr] {
        match self {
            Expr::Choice(members) => members,
            other => std::slice::from_ref(other),
        }
    }

    /// Whether `symbol` occurs anywhere in the expression.
    pub fn references(&self, symbol: SymbolRef) -> bool {
        match self {
            Expr::Symbol(s) => *s == symbol,
            _ => self.children().iter().any(|c| c.references(symbol)),
        }
    }

    /// Visit every symbol in left-to-right order.
    pub fn for_each_symbol(&self, f: &mut impl FnMut(SymbolRef)) {
        match self {
            Expr::Symbol(s) => f(*s),
            _ => {
                for child in self.children() {
                    child.for_each_symbol(f);
                }
            }
        }
    }
}

/// Flattened sequence. A single member is returned unwrapped.
pub fn make_seq(members: impl IntoIterator<Item = Expr>) -> Expr {
    let mut flat = Vec::new();
    for member in members {
        match member {
            Expr::Seq(inner) => flat.extend(inner),
            other => flat.push(other),
        }
    }
    if flat.len() == 1 {
        return flat.remove(0);
    }
    Expr::Seq(flat)
}

/// Flattened choice without duplicate alternatives.
pub fn make_choice(members: impl IntoIterator<Item = Expr>) -> Expr {
    let mut flat: Vec<Expr> = Vec::new();
    for member in members {
        let inner = match member {
            Expr::Choice(inner) => inner,
            other => vec![other],
        };
        for expr in inner {
            if !flat.contains(&expr) {
                flat.push(expr);
            }
        }
    }
    if flat.len() == 1 {
        return flat.remove(0);
    }
    Expr::Choice(flat)
}
