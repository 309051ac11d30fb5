use std::fs;
use std::io::{self, Read};
use std::path::Path;

use trellis_core::{Grammar, GrammarError};

use super::run_common::CommandError;

/// Load a grammar from a file or stdin (`-`).
///
/// Files ending in `.bin` hold the postcard encoding; everything else is
/// read as tree-sitter `grammar.json`.
pub fn load_grammar(path: &Path) -> Result<Grammar, CommandError> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| CommandError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        return parse(path, Grammar::from_json(&buf));
    }

    let is_binary = path.extension().is_some_and(|ext| ext == "bin");
    if is_binary {
        let bytes = fs::read(path).map_err(|source| CommandError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        return parse(path, Grammar::from_binary(&bytes));
    }

    let text = fs::read_to_string(path).map_err(|source| CommandError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(path, Grammar::from_json(&text))
}

fn parse(path: &Path, result: Result<Grammar, GrammarError>) -> Result<Grammar, CommandError> {
    let grammar = result.map_err(|source| CommandError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!(
        "loaded `{}` from {}: {} rules",
        grammar.name,
        path.display(),
        grammar.rules.len()
    );
    Ok(grammar)
}
