use std::path::PathBuf;

use super::run_common::{CommandError, CompileInput, compile_grammar, exit_with};

pub struct CheckArgs {
    pub grammar_path: PathBuf,
    pub start: Option<String>,
    pub strict: bool,
    pub color: bool,
}

pub fn run(args: CheckArgs) {
    if let Err(err) = execute(&args) {
        exit_with(err);
    }
    // Silent on success (like cargo check)
}

pub fn execute(args: &CheckArgs) -> Result<(), CommandError> {
    compile_grammar(&CompileInput {
        grammar_path: &args.grammar_path,
        start: args.start.as_deref(),
        strict: args.strict,
        color: args.color,
    })?;
    Ok(())
}
