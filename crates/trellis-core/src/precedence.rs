//! Named precedence levels.
//!
//! Operator categories (`additive`, `unary`, ...) map to a numeric level and
//! a default associativity. A table is either written out as configuration
//! data or derived from a grammar's `precedences` orderings.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::grammar::{Assoc, PrecedenceEntry};

/// Numeric level plus associativity for one operator category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecedenceLevel {
    pub level: i32,
    pub assoc: Assoc,
}

impl PrecedenceLevel {
    pub fn new(level: i32, assoc: Assoc) -> Self {
        Self { level, assoc }
    }
}

/// Mapping from operator category to its level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecedenceTable {
    levels: IndexMap<String, PrecedenceLevel>,
}

/// Orderings that contradict each other.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("precedence orderings form a cycle through {}", .names.join(", "))]
pub struct PrecedenceCycle {
    pub names: Vec<String>,
}

impl PrecedenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table from explicit `(name, level, assoc)` data.
    pub fn from_levels<S: Into<String>>(
        levels: impl IntoIterator<Item = (S, i32, Assoc)>,
    ) -> Self {
        Self {
            levels: levels
                .into_iter()
                .map(|(name, level, assoc)| (name.into(), PrecedenceLevel::new(level, assoc)))
                .collect(),
        }
    }

    /// Derive levels from orderings listed highest first.
    ///
    /// All orderings are merged into one total order (Kahn's algorithm, ties
    /// broken by first appearance). With `n` distinct names the highest gets
    /// level `n`, the lowest level `1`. Derived levels carry `Assoc::None`.
    pub fn from_orderings(orderings: &[Vec<PrecedenceEntry>]) -> Result<Self, PrecedenceCycle> {
        let mut names: IndexSet<&str> = IndexSet::new();
        let mut edges: IndexMap<&str, IndexSet<&str>> = IndexMap::new();

        for ordering in orderings {
            for entry in ordering {
                names.insert(entry.name());
            }
            for pair in ordering.windows(2) {
                edges
                    .entry(pair[0].name())
                    .or_default()
                    .insert(pair[1].name());
            }
        }

        let mut in_degree: IndexMap<&str, usize> = names.iter().map(|n| (*n, 0)).collect();
        for targets in edges.values() {
            for target in targets {
                if let Some(degree) = in_degree.get_mut(target) {
                    *degree += 1;
                }
            }
        }

        let total = names.len();
        let mut order = Vec::with_capacity(total);
        let mut ready: Vec<&str> = names
            .iter()
            .copied()
            .filter(|n| in_degree[n] == 0)
            .collect();

        while !ready.is_empty() {
            let name = ready.remove(0);
            order.push(name);
            if let Some(targets) = edges.get(name) {
                for &target in targets {
                    let Some(degree) = in_degree.get_mut(target) else {
                        continue;
                    };
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(target);
                    }
                }
            }
        }

        if order.len() != total {
            let names = in_degree
                .into_iter()
                .filter(|(_, degree)| *degree > 0)
                .map(|(name, _)| name.to_string())
                .collect();
            return Err(PrecedenceCycle { names });
        }

        let levels = order
            .into_iter()
            .enumerate()
            .map(|(rank, name)| {
                let level = (total - rank) as i32;
                (name.to_string(), PrecedenceLevel::new(level, Assoc::None))
            })
            .collect();

        Ok(Self { levels })
    }

    pub fn get(&self, name: &str) -> Option<PrecedenceLevel> {
        self.levels.get(name).copied()
    }

    pub fn insert(&mut self, name: impl Into<String>, level: PrecedenceLevel) {
        self.levels.insert(name.into(), level);
    }

    /// Entries of `other` not already present are appended.
    pub fn merge_missing(&mut self, other: &PrecedenceTable) {
        for (name, level) in &other.levels {
            self.levels.entry(name.clone()).or_insert(*level);
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, PrecedenceLevel)> {
        self.levels.iter().map(|(name, level)| (name.as_str(), *level))
    }
}
