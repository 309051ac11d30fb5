//! Disambiguation tables consumed by parse-table generation.

use serde::{Deserialize, Serialize};

use trellis_core::{Assoc, Precedence};

use crate::ir::{Expr, RuleId};

/// Outcome of a reduce/shift meeting between two alternatives of one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    /// Finish the completed alternative first (left associative, or it binds tighter).
    PreferReduce,
    /// Keep extending the open alternative (right associative, or it binds tighter).
    PreferShift,
    /// Chaining at this level is a parse error.
    NonAssociative,
    /// Deferred to runtime: explore both and keep the higher dynamic score.
    Dynamic,
    /// No annotation decides the pair.
    Unresolved,
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolution::PreferReduce => write!(f, "reduce"),
            Resolution::PreferShift => write!(f, "shift"),
            Resolution::NonAssociative => write!(f, "error"),
            Resolution::Dynamic => write!(f, "dynamic"),
            Resolution::Unresolved => write!(f, "unresolved"),
        }
    }
}

/// Annotation attached to one top-level alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlternativePrecedence {
    /// Static level; absent when the alternative carries no `prec`.
    pub level: Option<i32>,
    /// Associativity of the static level, or `Dynamic` when only a dynamic
    /// annotation is present.
    pub assoc: Assoc,
    pub dynamic: Option<i32>,
}

impl AlternativePrecedence {
    /// Read the `prec` wrappers around an alternative, outermost first.
    pub fn of(alternative: &Expr) -> Self {
        let mut out = Self::default();
        let mut expr = alternative;
        while let Expr::Prec {
            value,
            assoc,
            content,
        } = expr
        {
            let level = match value {
                Precedence::Integer(n) => *n,
                Precedence::Name(_) => 0,
            };
            if *assoc == Assoc::Dynamic {
                out.dynamic.get_or_insert(level);
            } else if out.level.is_none() {
                out.level = Some(level);
                out.assoc = *assoc;
            }
            expr = content;
        }
        if out.level.is_none() && out.dynamic.is_some() {
            out.assoc = Assoc::Dynamic;
        }
        out
    }

    pub fn is_annotated(&self) -> bool {
        self.level.is_some() || self.dynamic.is_some()
    }

    /// Level used for comparison; unannotated alternatives sit at zero.
    pub fn effective_level(&self) -> i32 {
        self.level.unwrap_or(0)
    }
}

/// Decide between a completed alternative and one that could extend it.
pub fn resolve_pair(reduce: &AlternativePrecedence, shift: &AlternativePrecedence) -> Resolution {
    if !reduce.is_annotated() && !shift.is_annotated() {
        return Resolution::Unresolved;
    }

    let (ours, theirs) = (reduce.effective_level(), shift.effective_level());
    if ours > theirs {
        return Resolution::PreferReduce;
    }
    if ours < theirs {
        return Resolution::PreferShift;
    }

    match reduce.assoc {
        Assoc::Left => Resolution::PreferReduce,
        Assoc::Right => Resolution::PreferShift,
        Assoc::Dynamic => Resolution::Dynamic,
        Assoc::None if reduce.level.is_some() => Resolution::NonAssociative,
        Assoc::None => Resolution::Unresolved,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeInfo {
    pub precedence: AlternativePrecedence,
    /// References its own rule anywhere, or a rule deriving it alone.
    pub self_referential: bool,
    /// Can begin with its own rule, or with a rule deriving it alone.
    pub left_open: bool,
    /// Can end with its own rule, or with a rule deriving it alone.
    pub right_open: bool,
}

/// Resolution for alternative `reduce` finishing while alternative `shift`
/// could still extend it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieBreak {
    pub reduce: usize,
    pub shift: usize,
    pub resolution: Resolution,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisambiguationTable {
    pub rule: String,
    pub id: RuleId,
    pub alternatives: Vec<AlternativeInfo>,
    pub tie_breaks: Vec<TieBreak>,
}

impl DisambiguationTable {
    /// Resolution when alternative `reduce` is complete and `shift` could
    /// continue past it. `None` when the pair cannot meet.
    pub fn tie_break(&self, reduce: usize, shift: usize) -> Option<Resolution> {
        self.tie_breaks
            .iter()
            .find(|t| t.reduce == reduce && t.shift == shift)
            .map(|t| t.resolution)
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &TieBreak> {
        self.tie_breaks
            .iter()
            .filter(|t| t.resolution == Resolution::Unresolved)
    }

    /// Alternatives whose ties are settled at runtime.
    pub fn dynamic_alternatives(&self) -> impl Iterator<Item = usize> + '_ {
        self.alternatives
            .iter()
            .enumerate()
            .filter(|(_, a)| a.precedence.dynamic.is_some())
            .map(|(i, _)| i)
    }
}
