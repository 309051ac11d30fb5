#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Rule algebra and grammar model.
//!
//! - `grammar`: the input `Grammar`, its `Rule` combinator tree, JSON and
//!   binary loading, canonical form and traversal
//! - `precedence`: named precedence levels
//! - `colors`: terminal palette shared by renderers

pub mod colors;
pub mod grammar;
pub mod precedence;

pub use colors::Colors;
pub use grammar::{
    Assoc, Grammar, GrammarError, Precedence, PrecedenceEntry, Repetition, Rule, RuleDef, Terminal,
};
pub use precedence::{PrecedenceCycle, PrecedenceLevel, PrecedenceTable};
