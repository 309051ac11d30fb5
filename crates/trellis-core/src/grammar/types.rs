//! Grammar type definitions.

use serde::{Deserialize, Serialize};

/// Complete rule-combinator grammar, as authored.
///
/// This is the *input* model: duplicate rule names are representable so the
/// compiler can report them, and nothing has been resolved yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grammar {
    /// Grammar name (e.g., "go", "cmake").
    pub name: String,
    /// Production rules, preserving definition order. The first rule is the start rule.
    pub rules: Vec<RuleDef>,
    /// Trivia allowed between any two tokens (comments, whitespace).
    #[serde(default)]
    pub extras: Vec<Rule>,
    /// Named precedence orderings, highest first.
    #[serde(default)]
    pub precedences: Vec<Vec<PrecedenceEntry>>,
    /// Rule-name sets tolerated as mutually ambiguous.
    #[serde(default)]
    pub conflicts: Vec<Vec<String>>,
    /// Tokens produced by an external scanner.
    #[serde(default)]
    pub externals: Vec<Rule>,
    /// Rules substituted at their use sites.
    #[serde(default)]
    pub inline: Vec<String>,
    /// Pure-alternation umbrella rules.
    #[serde(default)]
    pub supertypes: Vec<String>,
    /// Keyword identifier rule.
    #[serde(default)]
    pub word: Option<String>,
}

/// A named rule definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDef {
    pub name: String,
    pub body: Rule,
    /// Hidden rules never surface as named nodes; they are inlined at every use site.
    pub hidden: bool,
}

impl RuleDef {
    /// Visible rule definition.
    pub fn new(name: impl Into<String>, body: Rule) -> Self {
        Self {
            name: name.into(),
            body,
            hidden: false,
        }
    }

    /// Hidden rule definition.
    pub fn hidden(name: impl Into<String>, body: Rule) -> Self {
        Self {
            name: name.into(),
            body,
            hidden: true,
        }
    }
}

/// Leaf matching literal text or a lexical pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Terminal {
    Literal(String),
    Pattern {
        value: String,
        flags: Option<String>,
    },
}

/// How many times a `Repeat` body must match at least.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Repetition {
    ZeroOrMore,
    OneOrMore,
}

/// Associativity attached to a precedence annotation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Assoc {
    /// Plain `prec(n, ...)`: self-chaining at the same level is not allowed.
    #[default]
    None,
    Left,
    Right,
    /// `prec.dynamic(n, ...)`: tie-break deferred to runtime.
    Dynamic,
}

impl std::fmt::Display for Assoc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Assoc::None => write!(f, "none"),
            Assoc::Left => write!(f, "left"),
            Assoc::Right => write!(f, "right"),
            Assoc::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// Grammar rule variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rule {
    Terminal(Terminal),
    /// Reference to another rule, resolved by the compiler.
    Symbol(String),
    /// Sequence (must match in order). `Seq([])` is the blank rule.
    Seq(Vec<Rule>),
    /// Alternation.
    Choice(Vec<Rule>),
    Repeat {
        content: Box<Rule>,
        repetition: Repetition,
    },
    /// Sugar for `Choice(content, Seq())`.
    Optional(Box<Rule>),
    /// The whole subtree is one lexical unit.
    Token { content: Box<Rule>, immediate: bool },
    Prec {
        value: Precedence,
        assoc: Assoc,
        content: Box<Rule>,
    },
    /// Rename a node without changing its structure.
    Alias {
        content: Box<Rule>,
        value: String,
        named: bool,
    },
    /// Named slot for structural access.
    Field { name: String, content: Box<Rule> },
}

/// Precedence value (numeric or named).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Precedence {
    Integer(i32),
    Name(String),
}

impl std::fmt::Display for Precedence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Precedence::Integer(n) => write!(f, "{n}"),
            Precedence::Name(name) => write!(f, "{name:?}"),
        }
    }
}

/// Entry in a precedence ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrecedenceEntry {
    /// Named precedence level.
    Name(String),
    /// Symbol reference.
    Symbol(String),
}

impl PrecedenceEntry {
    pub fn name(&self) -> &str {
        match self {
            PrecedenceEntry::Name(name) | PrecedenceEntry::Symbol(name) => name,
        }
    }
}

// Constructors mirroring the grammar DSL.
impl Rule {
    pub fn blank() -> Self {
        Rule::Seq(Vec::new())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Rule::Terminal(Terminal::Literal(value.into()))
    }

    pub fn pattern(value: impl Into<String>) -> Self {
        Rule::Terminal(Terminal::Pattern {
            value: value.into(),
            flags: None,
        })
    }

    pub fn sym(name: impl Into<String>) -> Self {
        Rule::Symbol(name.into())
    }

    pub fn seq(members: impl IntoIterator<Item = Rule>) -> Self {
        Rule::Seq(members.into_iter().collect())
    }

    pub fn choice(members: impl IntoIterator<Item = Rule>) -> Self {
        Rule::Choice(members.into_iter().collect())
    }

    pub fn repeat(content: Rule) -> Self {
        Rule::Repeat {
            content: Box::new(content),
            repetition: Repetition::ZeroOrMore,
        }
    }

    pub fn repeat1(content: Rule) -> Self {
        Rule::Repeat {
            content: Box::new(content),
            repetition: Repetition::OneOrMore,
        }
    }

    pub fn optional(content: Rule) -> Self {
        Rule::Optional(Box::new(content))
    }

    pub fn token(content: Rule) -> Self {
        Rule::Token {
            content: Box::new(content),
            immediate: false,
        }
    }

    pub fn immediate_token(content: Rule) -> Self {
        Rule::Token {
            content: Box::new(content),
            immediate: true,
        }
    }

    pub fn prec(value: impl Into<Precedence>, content: Rule) -> Self {
        Self::prec_with(value, Assoc::None, content)
    }

    pub fn prec_left(value: impl Into<Precedence>, content: Rule) -> Self {
        Self::prec_with(value, Assoc::Left, content)
    }

    pub fn prec_right(value: impl Into<Precedence>, content: Rule) -> Self {
        Self::prec_with(value, Assoc::Right, content)
    }

    pub fn prec_dynamic(value: i32, content: Rule) -> Self {
        Self::prec_with(value, Assoc::Dynamic, content)
    }

    pub fn prec_with(value: impl Into<Precedence>, assoc: Assoc, content: Rule) -> Self {
        Rule::Prec {
            value: value.into(),
            assoc,
            content: Box::new(content),
        }
    }

    pub fn alias(content: Rule, value: impl Into<String>, named: bool) -> Self {
        Rule::Alias {
            content: Box::new(content),
            value: value.into(),
            named,
        }
    }

    pub fn field(name: impl Into<String>, content: Rule) -> Self {
        Rule::Field {
            name: name.into(),
            content: Box::new(content),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Rule::Seq(members) if members.is_empty())
    }

    /// Direct children of this rule.
    pub fn children(&self) -> &[Rule] {
        match self {
            Rule::Terminal(_) | Rule::Symbol(_) => &[],
            Rule::Seq(members) | Rule::Choice(members) => members,
            Rule::Repeat { content, .. }
            | Rule::Optional(content)
            | Rule::Token { content, .. }
            | Rule::Prec { content, .. }
            | Rule::Alias { content, .. }
            | Rule::Field { content, .. } => std::slice::from_ref(content.as_ref()),
        }
    }
}

impl From<i32> for Precedence {
    fn from(value: i32) -> Self {
        Precedence::Integer(value)
    }
}

impl From<&str> for Precedence {
    fn from(value: &str) -> Self {
        Precedence::Name(value.to_string())
    }
}

impl Grammar {
    /// Empty grammar with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            extras: Vec::new(),
            precedences: Vec::new(),
            conflicts: Vec::new(),
            externals: Vec::new(),
            inline: Vec::new(),
            supertypes: Vec::new(),
            word: None,
        }
    }

    /// Append a rule, deriving `hidden` from the `_` name prefix.
    pub fn rule(mut self, name: impl Into<String>, body: Rule) -> Self {
        let name = name.into();
        let hidden = name.starts_with('_');
        self.rules.push(RuleDef { name, body, hidden });
        self
    }

    pub fn extra(mut self, rule: Rule) -> Self {
        self.extras.push(rule);
        self
    }

    pub fn conflict<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.conflicts
            .push(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn external(mut self, rule: Rule) -> Self {
        self.externals.push(rule);
        self
    }

    pub fn inline_rule(mut self, name: impl Into<String>) -> Self {
        self.inline.push(name.into());
        self
    }

    pub fn supertype(mut self, name: impl Into<String>) -> Self {
        self.supertypes.push(name.into());
        self
    }

    pub fn word(mut self, name: impl Into<String>) -> Self {
        self.word = Some(name.into());
        self
    }

    pub fn precedence_order<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.precedences.push(
            names
                .into_iter()
                .map(|n| PrecedenceEntry::Name(n.into()))
                .collect(),
        );
        self
    }

    /// The first rule, which the compiler uses as the start rule by default.
    pub fn start_rule(&self) -> Option<&RuleDef> {
        self.rules.first()
    }

    pub fn get(&self, name: &str) -> Option<&RuleDef> {
        self.rules.iter().find(|r| r.name == name)
    }
}
