//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("trellis")
        .about("Compile tree-sitter style grammars into canonical form")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(verbose_arg())
        .subcommand(compile_command())
        .subcommand(check_command())
        .subcommand(dump_command())
}

/// Compile a grammar and write the canonical form.
pub fn compile_command() -> Command {
    Command::new("compile")
        .about("Compile a grammar and write the canonical form")
        .override_usage(
            "\
  trellis compile <GRAMMAR> [-o <FILE>] [--format json|binary]
  trellis compile <GRAMMAR> --start <RULE>",
        )
        .after_help(
            r#"EXAMPLES:
  trellis compile grammar.json                     # JSON to stdout
  trellis compile grammar.json -o out.json         # JSON to a file
  trellis compile grammar.json --format binary -o out.bin
  trellis compile grammar.json --strict            # fail on warnings"#,
        )
        .arg(grammar_path_arg())
        .arg(out_arg())
        .arg(format_arg())
        .arg(start_arg())
        .arg(strict_arg())
        .arg(color_arg())
}

/// Validate a grammar.
///
/// Silent on success; diagnostics go to stderr.
pub fn check_command() -> Command {
    Command::new("check")
        .about("Validate a grammar")
        .after_help(
            r#"EXAMPLES:
  trellis check grammar.json
  trellis check grammar.json --strict
  cat grammar.json | trellis check -"#,
        )
        .arg(grammar_path_arg())
        .arg(start_arg())
        .arg(strict_arg())
        .arg(color_arg())
}

/// Show the compiled grammar in readable form.
pub fn dump_command() -> Command {
    Command::new("dump")
        .about("Show the compiled grammar")
        .after_help(
            r#"EXAMPLES:
  trellis dump grammar.json
  trellis dump grammar.json --start expression"#,
        )
        .arg(grammar_path_arg())
        .arg(start_arg())
        .arg(color_arg())
}
