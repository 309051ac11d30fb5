use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use super::run_common::{CommandError, CompileInput, compile_grammar, exit_with};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Binary,
}

pub struct CompileArgs {
    pub grammar_path: PathBuf,
    pub out: Option<PathBuf>,
    pub format: OutputFormat,
    pub start: Option<String>,
    pub strict: bool,
    pub color: bool,
}

pub fn run(args: CompileArgs) {
    if let Err(err) = execute(&args) {
        exit_with(err);
    }
}

pub fn execute(args: &CompileArgs) -> Result<(), CommandError> {
    let compiled = compile_grammar(&CompileInput {
        grammar_path: &args.grammar_path,
        start: args.start.as_deref(),
        strict: args.strict,
        color: args.color,
    })?;

    let bytes = match args.format {
        OutputFormat::Json => {
            let mut json = compiled
                .to_json()
                .map_err(|e| CommandError::Serialize(e.to_string()))?;
            json.push('\n');
            json.into_bytes()
        }
        OutputFormat::Binary => compiled
            .to_binary()
            .map_err(|e| CommandError::Serialize(e.to_string()))?,
    };

    match &args.out {
        Some(path) => {
            fs::write(path, &bytes).map_err(|source| CommandError::Write {
                path: path.clone(),
                source,
            })?;
            log::info!("wrote {} bytes to {}", bytes.len(), path.display());
        }
        None => io::stdout()
            .write_all(&bytes)
            .map_err(|source| CommandError::Write {
                path: PathBuf::from("-"),
                source,
            })?,
    }
    Ok(())
}
