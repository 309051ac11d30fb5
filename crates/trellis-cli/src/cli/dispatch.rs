//! Dispatch logic: extract params from ArgMatches and convert to command args.

use std::path::PathBuf;

use clap::ArgMatches;

use super::ColorChoice;
use crate::commands::check::CheckArgs;
use crate::commands::compile::{CompileArgs, OutputFormat};
use crate::commands::dump::DumpArgs;

pub struct CompileParams {
    pub grammar_path: PathBuf,
    pub out: Option<PathBuf>,
    pub format: OutputFormat,
    pub start: Option<String>,
    pub strict: bool,
    pub color: ColorChoice,
}

impl CompileParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            grammar_path: grammar_path(m),
            out: m.get_one::<PathBuf>("out").cloned(),
            format: parse_format(m),
            start: m.get_one::<String>("start").cloned(),
            strict: m.get_flag("strict"),
            color: parse_color(m),
        }
    }
}

impl From<CompileParams> for CompileArgs {
    fn from(p: CompileParams) -> Self {
        Self {
            grammar_path: p.grammar_path,
            out: p.out,
            format: p.format,
            start: p.start,
            strict: p.strict,
            color: p.color.should_colorize(),
        }
    }
}

pub struct CheckParams {
    pub grammar_path: PathBuf,
    pub start: Option<String>,
    pub strict: bool,
    pub color: ColorChoice,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            grammar_path: grammar_path(m),
            start: m.get_one::<String>("start").cloned(),
            strict: m.get_flag("strict"),
            color: parse_color(m),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        Self {
            grammar_path: p.grammar_path,
            start: p.start,
            strict: p.strict,
            color: p.color.should_colorize(),
        }
    }
}

pub struct DumpParams {
    pub grammar_path: PathBuf,
    pub start: Option<String>,
    pub color: ColorChoice,
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            grammar_path: grammar_path(m),
            start: m.get_one::<String>("start").cloned(),
            color: parse_color(m),
        }
    }
}

impl From<DumpParams> for DumpArgs {
    fn from(p: DumpParams) -> Self {
        Self {
            grammar_path: p.grammar_path,
            start: p.start,
            color: p.color.should_colorize(),
        }
    }
}

// The positional is required, so clap has already rejected a missing one.
fn grammar_path(m: &ArgMatches) -> PathBuf {
    m.get_one::<PathBuf>("grammar_path")
        .cloned()
        .unwrap_or_default()
}

fn parse_format(m: &ArgMatches) -> OutputFormat {
    match m.get_one::<String>("format").map(|s| s.as_str()) {
        Some("binary") => OutputFormat::Binary,
        _ => OutputFormat::Json,
    }
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}
