//! Grammar-level analyses shared by the compilation stages.
//!
//! - `symbol_table`: definitions, reference checks and rule classification
//! - `nullable`: empty-string derivability
//! - `pattern`: regular-expression properties of pattern terminals
//! - `recursion`: reference-graph components and cycles

pub mod nullable;
pub mod pattern;
pub mod recursion;
pub mod symbol_table;

#[cfg(test)]
mod nullable_tests;

pub use symbol_table::{SymbolInfo, SymbolKind, SymbolTable, resolve_symbols};
