mod message;
mod printer;


pub use message::{DiagnosticKind, DiagnosticMessage, Severity};
pub use printer::DiagnosticsPrinter;

/// Diagnostics collected across compilation stages.
///
/// Grammars carry no source positions, so each message names the rules it
/// is about instead of pointing at a span.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    messages: Vec<DiagnosticMessage>,
}

#[must_use = "diagnostic not emitted, call .emit()"]
pub struct DiagnosticBuilder<'a> {
    diagnostics: &'a mut Diagnostics,
    message: DiagnosticMessage,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Create a diagnostic with the given kind.
    ///
    /// Uses the kind's default message. Call `.message()` on the builder to override.
    pub fn report(&mut self, kind: DiagnosticKind) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            diagnostics: self,
            message: DiagnosticMessage::with_default_message(kind),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|d| d.is_error())
    }

    pub fn has_warnings(&self) -> bool {
        self.messages.iter().any(|d| d.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_warning()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticMessage> {
        self.messages.iter()
    }

    /// Kinds of all messages, in report order.
    pub fn kinds(&self) -> Vec<DiagnosticKind> {
        self.messages.iter().map(|m| m.kind).collect()
    }

    pub fn contains(&self, kind: DiagnosticKind) -> bool {
        self.messages.iter().any(|m| m.kind == kind)
    }

    /// Messages of a given kind.
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &DiagnosticMessage> {
        self.messages.iter().filter(move |m| m.kind == kind)
    }

    pub fn render(&self) -> String {
        self.printer().render()
    }

    pub fn render_colored(&self, colored: bool) -> String {
        self.printer().colored(colored).render()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.messages.extend(other.messages);
    }
}

impl<'a> DiagnosticBuilder<'a> {
    /// Provide custom detail for this diagnostic, rendered using the kind's template.
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        let detail = msg.into();
        self.message.message = self.message.kind.message(Some(&detail));
        self
    }

    /// Attach a rule the diagnostic is about.
    pub fn rule(mut self, name: impl Into<String>) -> Self {
        self.message.rules.push(name.into());
        self
    }

    pub fn rules<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.message.rules.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn note(mut self, msg: impl Into<String>) -> Self {
        self.message.notes.push(msg.into());
        self
    }

    pub fn hint(mut self, msg: impl Into<String>) -> Self {
        self.message.hints.push(msg.into());
        self
    }

    pub fn emit(mut self) {
        if let Some(hint) = self.message.kind.default_hint() {
            self.message.hints.insert(0, hint.to_string());
        }
        self.diagnostics.messages.push(self.message);
    }
}
