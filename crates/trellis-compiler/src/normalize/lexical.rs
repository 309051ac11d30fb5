//! Lexical table: every terminal the syntactic grammar refers to.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use trellis_core::{Rule, Terminal};

use crate::ir::LexicalId;

/// One lexical unit.
///
/// `content` is canonical and contains no symbol references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexicalVariable {
    pub name: String,
    /// Named entries come from token rules; anonymous ones from inline terminals.
    pub named: bool,
    pub content: Rule,
    /// Must follow the previous token without intervening extras.
    pub immediate: bool,
}

impl LexicalVariable {
    /// Plain literal text, if the content is a single literal.
    pub fn literal(&self) -> Option<&str> {
        match &self.content {
            Rule::Terminal(Terminal::Literal(text)) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LexicalTable {
    entries: Vec<LexicalVariable>,
    anonymous: IndexMap<(Rule, bool), LexicalId>,
    named: IndexMap<String, LexicalId>,
    complex: IndexMap<String, usize>,
}

impl LexicalTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for an inline terminal or `token(...)` subtree.
    ///
    /// Identical content with the same `immediate` flag shares one entry.
    /// Entries that are not a single terminal are named after `owner`.
    pub fn intern_anonymous(&mut self, content: Rule, immediate: bool, owner: &str) -> LexicalId {
        let key = (content, immediate);
        if let Some(id) = self.anonymous.get(&key) {
            return *id;
        }

        let name = match &key.0 {
            Rule::Terminal(Terminal::Literal(text)) => text.clone(),
            Rule::Terminal(Terminal::Pattern { value, .. }) => value.clone(),
            _ => {
                let count = self.complex.entry(owner.to_string()).or_insert(0);
                *count += 1;
                format!("{owner}_token{count}")
            }
        };

        let id = self.push(LexicalVariable {
            name,
            named: false,
            content: key.0.clone(),
            immediate,
        });
        self.anonymous.insert(key, id);
        id
    }

    /// Entry for a token rule, created once per rule name.
    pub fn intern_named(&mut self, name: &str, content: Rule, immediate: bool) -> LexicalId {
        if let Some(id) = self.named.get(name) {
            return *id;
        }
        let id = self.push(LexicalVariable {
            name: name.to_string(),
            named: true,
            content,
            immediate,
        });
        self.named.insert(name.to_string(), id);
        id
    }

    fn push(&mut self, entry: LexicalVariable) -> LexicalId {
        let id = LexicalId::from_index(self.entries.len());
        self.entries.push(entry);
        id
    }

    pub fn find_named(&self, name: &str) -> Option<LexicalId> {
        self.named.get(name).copied()
    }

    pub fn get(&self, id: LexicalId) -> Option<&LexicalVariable> {
        self.entries.get(id.index())
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [LexicalVariable] {
        &mut self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (LexicalId, &LexicalVariable)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (LexicalId::from_index(i), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<LexicalVariable> {
        self.entries
    }
}
