pub mod check;
pub mod compile;
pub mod dump;
pub mod grammar_loader;
pub mod run_common;
