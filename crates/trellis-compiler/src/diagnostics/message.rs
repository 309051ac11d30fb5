/// Diagnostic kinds, grouped by the stage that reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Symbol resolution
    DuplicateRuleName,
    UnresolvedSymbol,
    CyclicLexicalRule,
    UnitCycle,
    InvalidSupertype,
    InvalidWordRule,
    UnreachableStartRule,

    // Normalization
    InliningCycle,
    InvalidTokenContent,
    InvalidExtra,

    // Precedence resolution
    UnknownPrecedence,
    PrecedenceCycle,

    // Validation
    InvalidPattern,
    EmptyToken,
    InfiniteRepeat,
    UndeclaredAmbiguity,

    // Observations that never block output
    UnreachableRule,
    UnnecessaryConflict,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::UnreachableRule | Self::UnnecessaryConflict => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Stable kebab-case identifier, shown in rendered output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateRuleName => "duplicate-rule-name",
            Self::UnresolvedSymbol => "unresolved-symbol",
            Self::CyclicLexicalRule => "cyclic-lexical-rule",
            Self::UnitCycle => "unit-cycle",
            Self::InvalidSupertype => "invalid-supertype",
            Self::InvalidWordRule => "invalid-word-rule",
            Self::UnreachableStartRule => "unreachable-start-rule",
            Self::InliningCycle => "inlining-cycle",
            Self::InvalidTokenContent => "invalid-token-content",
            Self::InvalidExtra => "invalid-extra",
            Self::UnknownPrecedence => "unknown-precedence",
            Self::PrecedenceCycle => "precedence-cycle",
            Self::InvalidPattern => "invalid-pattern",
            Self::EmptyToken => "empty-token",
            Self::InfiniteRepeat => "infinite-repeat",
            Self::UndeclaredAmbiguity => "undeclared-ambiguity",
            Self::UnreachableRule => "unreachable-rule",
            Self::UnnecessaryConflict => "unnecessary-conflict",
        }
    }

    /// Default hint for this kind, automatically included in diagnostics.
    pub fn default_hint(&self) -> Option<&'static str> {
        match self {
            Self::CyclicLexicalRule | Self::UnitCycle => {
                Some("every cycle must consume at least one terminal")
            }
            Self::InliningCycle => Some("make one rule in the cycle visible"),
            Self::InfiniteRepeat => Some("make the repeated content consume input"),
            Self::UndeclaredAmbiguity => Some(
                "annotate the alternatives with `prec.left`/`prec.right` or list the rule in `conflicts`",
            ),
            _ => None,
        }
    }

    /// Base message for this diagnostic kind, used when no custom message is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::DuplicateRuleName => "duplicate rule name",
            Self::UnresolvedSymbol => "unresolved symbol",
            Self::CyclicLexicalRule => "lexical rules form a cycle that consumes no input",
            Self::UnitCycle => "rules derive themselves without consuming input",
            Self::InvalidSupertype => "supertype must be a choice of symbols",
            Self::InvalidWordRule => "word rule must be a token",
            Self::UnreachableStartRule => "grammar has no start rule",
            Self::InliningCycle => "hidden rules form an inlining cycle",
            Self::InvalidTokenContent => "token content must be lexical",
            Self::InvalidExtra => "extra must be a single symbol or token",
            Self::UnknownPrecedence => "unknown precedence name",
            Self::PrecedenceCycle => "precedence orderings conflict",
            Self::InvalidPattern => "invalid pattern",
            Self::EmptyToken => "token matches the empty string",
            Self::InfiniteRepeat => "repeat body can match the empty string",
            Self::UndeclaredAmbiguity => "undeclared ambiguity",
            Self::UnreachableRule => "unreachable rule",
            Self::UnnecessaryConflict => "conflict set has no shared prefix",
        }
    }

    /// Template for custom messages. Contains `{}` placeholder for caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::DuplicateRuleName => "`{}` is defined more than once".to_string(),
            Self::UnresolvedSymbol => "`{}` is not defined".to_string(),
            Self::InvalidSupertype => "supertype `{}` must be a choice of symbols".to_string(),
            Self::InvalidWordRule => "word rule `{}` must be a token".to_string(),
            Self::UnreachableStartRule => "{}".to_string(),
            Self::InvalidTokenContent => "`{}` cannot be used inside a token".to_string(),
            Self::UnknownPrecedence => "precedence `{}` is not defined".to_string(),
            Self::EmptyToken => "token `{}` matches the empty string".to_string(),
            Self::InfiniteRepeat => "repeat in `{}` can match the empty string".to_string(),
            Self::UndeclaredAmbiguity => {
                "`{}` is ambiguous and not listed in any conflict set".to_string()
            }
            Self::UnreachableRule => "`{}` is not reachable from the start rule".to_string(),
            Self::UnnecessaryConflict => "conflict set [{}] has no shared prefix".to_string(),

            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// Render the final message.
    ///
    /// - `None` → returns `fallback_message()`
    /// - `Some(detail)` → returns `custom_message()` with `{}` replaced by detail
    pub fn message(&self, msg: Option<&str>) -> String {
        match msg {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    pub(crate) message: String,
    /// Rules the diagnostic is about, in report order.
    pub(crate) rules: Vec<String>,
    pub(crate) notes: Vec<String>,
    pub(crate) hints: Vec<String>,
}

impl DiagnosticMessage {
    pub(crate) fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            rules: Vec::new(),
            notes: Vec::new(),
            hints: Vec::new(),
        }
    }

    pub(crate) fn with_default_message(kind: DiagnosticKind) -> Self {
        Self::new(kind, kind.fallback_message())
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl std::fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]: {}", self.severity(), self.kind.code(), self.message)?;
        for note in &self.notes {
            write!(f, " (note: {})", note)?;
        }
        for hint in &self.hints {
            write!(f, " (hint: {})", hint)?;
        }
        Ok(())
    }
}
