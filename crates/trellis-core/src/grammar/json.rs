//! JSON deserialization for grammar.json files.
//!
//! The rule-combinator DSL serializes to externally-tagged objects with a
//! `type` field. Rule maps are read entry by entry so that a name defined
//! twice survives loading and can be reported by the compiler.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use super::types::{Assoc, Grammar, Precedence, PrecedenceEntry, Repetition, Rule, RuleDef, Terminal};

/// Error during grammar loading.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("binary decode error: {0}")]
    Binary(#[from] postcard::Error),
}

impl Grammar {
    /// Parse grammar from JSON string.
    pub fn from_json(json: &str) -> Result<Self, GrammarError> {
        let raw: RawGrammar = serde_json::from_str(json)?;
        Ok(raw.into())
    }
}

/// Raw grammar structure matching the JSON format.
#[derive(Debug, Deserialize)]
struct RawGrammar {
    name: String,
    rules: RuleEntries,
    #[serde(default)]
    extras: Vec<RawRule>,
    #[serde(default)]
    precedences: Vec<Vec<RawPrecedenceEntry>>,
    #[serde(default)]
    conflicts: Vec<Vec<String>>,
    #[serde(default)]
    externals: Vec<RawRule>,
    #[serde(default, rename = "inline")]
    inline_rules: Vec<String>,
    #[serde(default)]
    supertypes: Vec<String>,
    #[serde(default)]
    word: Option<String>,
    // Other top-level keys (`reserved` word sets among them) are skipped.
}

impl From<RawGrammar> for Grammar {
    fn from(raw: RawGrammar) -> Self {
        Self {
            name: raw.name,
            rules: raw
                .rules
                .0
                .into_iter()
                .map(|(name, rule)| {
                    let hidden = name.starts_with('_');
                    RuleDef {
                        name,
                        body: rule.into(),
                        hidden,
                    }
                })
                .collect(),
            extras: raw.extras.into_iter().map(Into::into).collect(),
            precedences: raw
                .precedences
                .into_iter()
                .map(|v| v.into_iter().map(Into::into).collect())
                .collect(),
            conflicts: raw.conflicts,
            externals: raw.externals.into_iter().map(Into::into).collect(),
            inline: raw.inline_rules,
            supertypes: raw.supertypes,
            word: raw.word,
        }
    }
}

/// Ordered rule entries, duplicates kept.
#[derive(Debug)]
struct RuleEntries(Vec<(String, RawRule)>);

impl<'de> Deserialize<'de> for RuleEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RuleEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of rule names to rules")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, rule)) = map.next_entry::<String, RawRule>()? {
                    entries.push((name, rule));
                }
                Ok(RuleEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Raw rule matching the JSON format.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[allow(clippy::upper_case_acronyms, non_camel_case_types)]
enum RawRule {
    BLANK,
    STRING {
        value: String,
    },
    PATTERN {
        value: String,
        #[serde(default)]
        flags: Option<String>,
    },
    SYMBOL {
        name: String,
    },
    SEQ {
        members: Vec<RawRule>,
    },
    CHOICE {
        members: Vec<RawRule>,
    },
    REPEAT {
        content: Box<RawRule>,
    },
    REPEAT1 {
        content: Box<RawRule>,
    },
    FIELD {
        name: String,
        content: Box<RawRule>,
    },
    ALIAS {
        content: Box<RawRule>,
        value: String,
        named: bool,
    },
    TOKEN {
        content: Box<RawRule>,
    },
    IMMEDIATE_TOKEN {
        content: Box<RawRule>,
    },
    PREC {
        value: RawPrecedence,
        content: Box<RawRule>,
    },
    PREC_LEFT {
        value: RawPrecedence,
        content: Box<RawRule>,
    },
    PREC_RIGHT {
        value: RawPrecedence,
        content: Box<RawRule>,
    },
    PREC_DYNAMIC {
        value: i32,
        content: Box<RawRule>,
    },
    RESERVED {
        #[allow(dead_code)]
        context_name: String,
        content: Box<RawRule>,
    },
}

impl From<RawRule> for Rule {
    fn from(raw: RawRule) -> Self {
        #[allow(clippy::boxed_local)] // Fields are Box<RawRule>, output needs Box<Rule>
        fn conv(content: Box<RawRule>) -> Box<Rule> {
            Box::new(Rule::from(*content))
        }

        fn prec(value: Precedence, assoc: Assoc, content: Box<RawRule>) -> Rule {
            Rule::Prec {
                value,
                assoc,
                content: conv(content),
            }
        }

        match raw {
            RawRule::BLANK => Rule::blank(),
            RawRule::STRING { value } => Rule::Terminal(Terminal::Literal(value)),
            RawRule::PATTERN { value, flags } => Rule::Terminal(Terminal::Pattern { value, flags }),
            RawRule::SYMBOL { name } => Rule::Symbol(name),
            RawRule::SEQ { members } => Rule::Seq(members.into_iter().map(Into::into).collect()),
            RawRule::CHOICE { members } => {
                Rule::Choice(members.into_iter().map(Into::into).collect())
            }
            RawRule::REPEAT { content } => Rule::Repeat {
                content: conv(content),
                repetition: Repetition::ZeroOrMore,
            },
            RawRule::REPEAT1 { content } => Rule::Repeat {
                content: conv(content),
                repetition: Repetition::OneOrMore,
            },
            RawRule::FIELD { name, content } => Rule::Field {
                name,
                content: conv(content),
            },
            RawRule::ALIAS {
                content,
                value,
                named,
            } => Rule::Alias {
                content: conv(content),
                value,
                named,
            },
            RawRule::TOKEN { content } => Rule::Token {
                content: conv(content),
                immediate: false,
            },
            RawRule::IMMEDIATE_TOKEN { content } => Rule::Token {
                content: conv(content),
                immediate: true,
            },
            RawRule::PREC { value, content } => prec(value.into(), Assoc::None, content),
            RawRule::PREC_LEFT { value, content } => prec(value.into(), Assoc::Left, content),
            RawRule::PREC_RIGHT { value, content } => prec(value.into(), Assoc::Right, content),
            RawRule::PREC_DYNAMIC { value, content } => {
                prec(Precedence::Integer(value), Assoc::Dynamic, content)
            }
            RawRule::RESERVED { content, .. } => Rule::from(*content),
        }
    }
}

/// Raw precedence value (can be integer or string).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPrecedence {
    Integer(i32),
    Name(String),
}

impl From<RawPrecedence> for Precedence {
    fn from(raw: RawPrecedence) -> Self {
        match raw {
            RawPrecedence::Integer(n) => Precedence::Integer(n),
            RawPrecedence::Name(s) => Precedence::Name(s),
        }
    }
}

/// Raw precedence entry (STRING or SYMBOL).
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[allow(clippy::upper_case_acronyms)]
enum RawPrecedenceEntry {
    STRING { value: String },
    SYMBOL { name: String },
}

impl From<RawPrecedenceEntry> for PrecedenceEntry {
    fn from(raw: RawPrecedenceEntry) -> Self {
        match raw {
            RawPrecedenceEntry::STRING { value } => PrecedenceEntry::Name(value),
            RawPrecedenceEntry::SYMBOL { name } => PrecedenceEntry::Symbol(name),
        }
    }
}
