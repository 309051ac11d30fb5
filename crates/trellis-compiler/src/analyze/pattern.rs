//! Regular-expression analysis for pattern terminals.

use regex_syntax::ParserBuilder;
use regex_syntax::hir::Hir;

/// Parse a pattern with its flags. Only the `i` flag changes matching.
pub fn parse_pattern(value: &str, flags: Option<&str>) -> Result<Hir, regex_syntax::Error> {
    let case_insensitive = flags.is_some_and(|f| f.contains('i'));
    ParserBuilder::new()
        .case_insensitive(case_insensitive)
        .build()
        .parse(value)
}

/// Whether the pattern can match the empty string.
///
/// Patterns that fail to parse are treated as non-empty; they are reported
/// as invalid during validation.
pub fn pattern_matches_empty(value: &str, flags: Option<&str>) -> bool {
    parse_pattern(value, flags).is_ok_and(|hir| hir.properties().minimum_len() == Some(0))
}
