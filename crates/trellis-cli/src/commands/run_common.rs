//! Shared logic for compile, check and dump.

use std::path::{Path, PathBuf};

use trellis_compiler::{CanonicalGrammar, Diagnostics, GrammarCompiler};
use trellis_core::GrammarError;

use super::grammar_loader::load_grammar;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse '{}': {source}", path.display())]
    Parse { path: PathBuf, source: GrammarError },

    /// Rendered diagnostics of a grammar that did not compile.
    #[error("{0}")]
    Rejected(String),

    #[error("failed to serialize the compiled grammar: {0}")]
    Serialize(String),

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub struct CompileInput<'a> {
    pub grammar_path: &'a Path,
    pub start: Option<&'a str>,
    pub strict: bool,
    pub color: bool,
}

/// Load and compile, printing warnings to stderr.
///
/// With `strict`, warnings reject the grammar like errors do.
pub fn compile_grammar(input: &CompileInput<'_>) -> Result<CanonicalGrammar, CommandError> {
    let grammar = load_grammar(input.grammar_path)?;
    let label = input.grammar_path.display().to_string();

    let mut compiler = GrammarCompiler::new(grammar);
    if let Some(start) = input.start {
        compiler = compiler.with_start_rule(start);
    }

    let compiled = compiler
        .compile()
        .map_err(|err| CommandError::Rejected(render(err.diagnostics(), &label, input.color)))?;

    if !compiled.warnings.is_empty() {
        let rendered = render(&compiled.warnings, &label, input.color);
        if input.strict {
            return Err(CommandError::Rejected(rendered));
        }
        eprintln!("{rendered}");
    }
    Ok(compiled)
}

fn render(diagnostics: &Diagnostics, label: &str, color: bool) -> String {
    diagnostics.printer().path(label).colored(color).render()
}

/// Report a failed command and exit with status 1.
pub fn exit_with(err: CommandError) -> ! {
    match err {
        CommandError::Rejected(rendered) => eprintln!("{rendered}"),
        other => eprintln!("error: {other}"),
    }
    std::process::exit(1);
}
