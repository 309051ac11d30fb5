//! Trellis: grammar compiler core.
//!
//! Turns a rule-combinator grammar into a validated, disambiguated
//! canonical grammar ready for parse-table generation.
//!
//! # Example
//!
//! ```
//! use trellis_compiler::GrammarCompiler;
//! use trellis_core::{Grammar, Rule};
//!
//! let grammar = Grammar::new("arith")
//!     .rule(
//!         "expr",
//!         Rule::choice([
//!             Rule::prec_left(1, Rule::seq([Rule::sym("expr"), Rule::string("+"), Rule::sym("expr")])),
//!             Rule::sym("number"),
//!         ]),
//!     )
//!     .rule("number", Rule::pattern(r"\d+"));
//!
//! let compiled = GrammarCompiler::new(grammar).compile().expect("valid grammar");
//! assert_eq!(compiled.start, "expr");
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod analyze;
pub mod canonical;
pub mod diagnostics;
pub mod dump;
pub mod ir;
pub mod metadata;
pub mod normalize;
pub mod precedence;
pub mod stages;
pub mod validate;

#[cfg(test)]
mod stages_tests;
#[cfg(test)]
mod test_utils;

use trellis_core::Grammar;

pub use canonical::CanonicalGrammar;
pub use diagnostics::{DiagnosticKind, Diagnostics, DiagnosticsPrinter, Severity};
pub use stages::{CompileConfig, GrammarCompiler};

/// Errors from a failed compilation, one per stage.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("symbol resolution failed with {} errors", .0.error_count())]
    Resolve(Diagnostics),

    #[error("normalization failed with {} errors", .0.error_count())]
    Normalize(Diagnostics),

    #[error("precedence resolution failed with {} errors", .0.error_count())]
    Precedence(Diagnostics),

    #[error("validation failed with {} errors", .0.error_count())]
    Validate(Diagnostics),
}

impl Error {
    pub fn diagnostics(&self) -> &Diagnostics {
        match self {
            Error::Resolve(diag)
            | Error::Normalize(diag)
            | Error::Precedence(diag)
            | Error::Validate(diag) => diag,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Compile with the default configuration.
pub fn compile(grammar: Grammar) -> Result<CanonicalGrammar> {
    GrammarCompiler::new(grammar).compile()
}
