//! Declared conflict sets.

use serde::Serialize;

use super::first::FirstSets;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::normalize::{NormalizedGrammar, Variable};

/// Rule-name sets the grammar author accepts as ambiguous, each sorted
/// and without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConflictRegistry {
    sets: Vec<Vec<String>>,
}

impl ConflictRegistry {
    pub fn from_declared(declared: &[Vec<String>]) -> Self {
        let mut sets: Vec<Vec<String>> = Vec::new();
        for set in declared {
            let mut set = set.clone();
            set.sort();
            set.dedup();
            if !set.is_empty() && !sets.contains(&set) {
                sets.push(set);
            }
        }
        Self { sets }
    }

    pub fn sets(&self) -> &[Vec<String>] {
        &self.sets
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sets.iter().any(|set| set.iter().any(|n| n == name))
    }

    /// Declared directly, or through a hidden rule inlined into it.
    pub fn covers(&self, variable: &Variable) -> bool {
        self.contains(&variable.name) || variable.inlined.iter().any(|n| self.contains(n))
    }

    pub fn into_sets(self) -> Vec<Vec<String>> {
        self.sets
    }
}

/// Warn about sets whose members can never compete for the same input.
pub fn check_shared_prefix(
    registry: &ConflictRegistry,
    grammar: &NormalizedGrammar,
    first: &FirstSets,
    diag: &mut Diagnostics,
) {
    for set in registry.sets() {
        if set.len() < 2 {
            continue;
        }
        let members: Vec<_> = set
            .iter()
            .filter_map(|name| first.of_name(grammar, name))
            .collect();
        if members.len() < set.len() {
            continue;
        }

        let overlaps = members.iter().enumerate().any(|(i, (a, a_nullable))| {
            members[i + 1..].iter().any(|(b, b_nullable)| {
                (*a_nullable && *b_nullable) || a.iter().any(|symbol| b.contains(symbol))
            })
        });
        if !overlaps {
            diag.report(DiagnosticKind::UnnecessaryConflict)
                .message(set.join(", "))
                .rules(set.iter().cloned())
                .emit();
        }
    }
}
