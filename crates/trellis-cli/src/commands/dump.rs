use std::path::PathBuf;

use super::run_common::{CommandError, CompileInput, compile_grammar, exit_with};

pub struct DumpArgs {
    pub grammar_path: PathBuf,
    pub start: Option<String>,
    pub color: bool,
}

pub fn run(args: DumpArgs) {
    match execute(&args) {
        Ok(text) => print!("{text}"),
        Err(err) => exit_with(err),
    }
}

pub fn execute(args: &DumpArgs) -> Result<String, CommandError> {
    let compiled = compile_grammar(&CompileInput {
        grammar_path: &args.grammar_path,
        start: args.start.as_deref(),
        strict: false,
        color: args.color,
    })?;
    Ok(compiled.dump_colored(args.color))
}
