//! Conflict registry and final grammar validation.
//!
//! Every check runs and reports; the caller decides whether the errors
//! block output.

mod checks;
mod conflicts;
mod first;

#[cfg(test)]
mod validate_tests;

pub use checks::{
    check_ambiguity, check_infinite_repeats, check_reachability, check_tokens,
};
pub use conflicts::{ConflictRegistry, check_shared_prefix};
pub use first::FirstSets;

use crate::diagnostics::Diagnostics;
use crate::normalize::NormalizedGrammar;
use crate::precedence::DisambiguationTable;

pub fn validate(
    grammar: &NormalizedGrammar,
    tables: &[DisambiguationTable],
    start: &str,
    diag: &mut Diagnostics,
) -> ConflictRegistry {
    let registry = ConflictRegistry::from_declared(&grammar.conflicts);
    let first = FirstSets::compute(grammar);

    check_tokens(grammar, diag);
    check_infinite_repeats(grammar, &first, diag);
    check_ambiguity(grammar, tables, &registry, diag);
    check_shared_prefix(&registry, grammar, &first, diag);
    check_reachability(grammar, start, diag);

    log::debug!(
        "validated `{}`: {} conflict sets, {} errors, {} warnings",
        grammar.name,
        registry.sets().len(),
        diag.error_count(),
        diag.warning_count()
    );

    registry
}
