//! Grammar types for rule-combinator grammars.
//!
//! This module provides types for representing `grammar.json` files,
//! with support for JSON deserialization and compact binary serialization.

mod binary;
mod canonical;
mod json;
mod types;
mod visit;

#[cfg(test)]
mod json_tests;

pub use canonical::{make_choice, make_seq};
pub use json::GrammarError;
pub use types::{
    Assoc, Grammar, Precedence, PrecedenceEntry, Repetition, Rule, RuleDef, Terminal,
};
pub use visit::{Visitor, walk_rule};
