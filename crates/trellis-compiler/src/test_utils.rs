//! Test helpers and sample grammars.

use trellis_core::Grammar;

use crate::diagnostics::Diagnostics;
use crate::{CanonicalGrammar, GrammarCompiler};

pub const GO_EXPRESSIONS: &str = include_str!("fixtures/go_expressions.json");
pub const JAVA_EXPRESSIONS: &str = include_str!("fixtures/java_expressions.json");
pub const HASKELL_PATTERNS: &str = include_str!("fixtures/haskell_patterns.json");
pub const CMAKE: &str = include_str!("fixtures/cmake.json");

pub fn fixture(json: &str) -> Grammar {
    Grammar::from_json(json).expect("fixture must parse")
}

pub fn expect_valid(grammar: Grammar) -> CanonicalGrammar {
    match GrammarCompiler::new(grammar).compile() {
        Ok(compiled) => compiled,
        Err(err) => panic!("expected a valid grammar:\n{}", err.diagnostics().render()),
    }
}

pub fn expect_invalid(grammar: Grammar) -> Diagnostics {
    match GrammarCompiler::new(grammar).compile() {
        Ok(compiled) => panic!("expected errors, got:\n{}", compiled.dump()),
        Err(err) => err.diagnostics().clone(),
    }
}
