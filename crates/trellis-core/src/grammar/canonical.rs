//! Canonical form of rule trees.
//!
//! Canonical rules contain no `Optional`, no one-or-more `Repeat`, no `Seq`
//! nested directly in a `Seq`, no `Choice` nested directly in a `Choice`,
//! no single-member `Seq`/`Choice`, no duplicate alternatives and no
//! `Token` directly inside a `Token`.

use super::types::{Repetition, Rule};

impl Rule {
    /// Rewrite into canonical form. Idempotent.
    pub fn canonicalize(&self) -> Rule {
        match self {
            Rule::Terminal(_) | Rule::Symbol(_) => self.clone(),
            Rule::Seq(members) => make_seq(members.iter().map(Rule::canonicalize)),
            Rule::Choice(members) => make_choice(members.iter().map(Rule::canonicalize)),
            Rule::Optional(content) => make_choice([content.canonicalize(), Rule::blank()]),
            Rule::Repeat {
                content,
                repetition,
            } => {
                let content = content.canonicalize();
                let star = Rule::Repeat {
                    content: Box::new(content.clone()),
                    repetition: Repetition::ZeroOrMore,
                };
                match repetition {
                    Repetition::ZeroOrMore => star,
                    Repetition::OneOrMore => make_seq([content, star]),
                }
            }
            Rule::Token { content, immediate } => match content.canonicalize() {
                Rule::Token {
                    content: inner,
                    immediate: inner_immediate,
                } => Rule::Token {
                    content: inner,
                    immediate: *immediate || inner_immediate,
                },
                content => Rule::Token {
                    content: Box::new(content),
                    immediate: *immediate,
                },
            },
            Rule::Prec {
                value,
                assoc,
                content,
            } => Rule::Prec {
                value: value.clone(),
                assoc: *assoc,
                content: Box::new(content.canonicalize()),
            },
            Rule::Alias {
                content,
                value,
                named,
            } => Rule::Alias {
                content: Box::new(content.canonicalize()),
                value: value.clone(),
                named: *named,
            },
            Rule::Field { name, content } => Rule::Field {
                name: name.clone(),
                content: Box::new(content.canonicalize()),
            },
        }
    }

    /// Structural equality after canonicalization.
    pub fn canonical_eq(&self, other: &Rule) -> bool {
        self.canonicalize() == other.canonicalize()
    }

    /// Whether the rule is already in canonical form.
    pub fn is_canonical(&self) -> bool {
        self.canonicalize() == *self
    }
}

/// Build a flattened sequence from canonical members.
pub fn make_seq(members: impl IntoIterator<Item = Rule>) -> Rule {
    let mut flat = Vec::new();
    for member in members {
        match member {
            Rule::Seq(inner) => flat.extend(inner),
            other => flat.push(other),
        }
    }
    if flat.len() == 1 {
        return flat.remove(0);
    }
    Rule::Seq(flat)
}

/// Build a flattened, deduplicated choice from canonical members.
pub fn make_choice(members: impl IntoIterator<Item = Rule>) -> Rule {
    fn push(flat: &mut Vec<Rule>, rule: Rule) {
        if !flat.contains(&rule) {
            flat.push(rule);
        }
    }

    let mut flat: Vec<Rule> = Vec::new();
    for member in members {
        match member {
            Rule::Choice(inner) => {
                for rule in inner {
                    push(&mut flat, rule);
                }
            }
            other => push(&mut flat, other),
        }
    }
    if flat.len() == 1 {
        return flat.remove(0);
    }
    Rule::Choice(flat)
}
