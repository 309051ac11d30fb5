//! Builder-pattern printer for rendering diagnostics.

use std::fmt::Write;

use trellis_core::Colors;

use super::Diagnostics;
use super::message::{DiagnosticMessage, Severity};

/// Builder for rendering diagnostics with various options.
pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    path: Option<&'s str>,
    colored: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            path: None,
            colored: false,
        }
    }

    /// Grammar file the diagnostics belong to, shown before rule names.
    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.format(&mut out);
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let c = Colors::new(self.colored);
        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                w.write_str("\n\n")?;
            }
            self.format_one(w, diag, c)?;
        }
        Ok(())
    }

    fn format_one(
        &self,
        w: &mut impl Write,
        diag: &DiagnosticMessage,
        c: Colors,
    ) -> std::fmt::Result {
        let label = match diag.severity() {
            Severity::Error => c.red,
            Severity::Warning => c.yellow,
        };
        write!(
            w,
            "{label}{}[{}]{}: {}",
            diag.severity(),
            diag.kind.code(),
            c.reset,
            diag.message
        )?;

        if !diag.rules.is_empty() || self.path.is_some() {
            write!(w, "\n  {}-->{} ", c.dim, c.reset)?;
            if let Some(path) = self.path {
                w.write_str(path)?;
                if !diag.rules.is_empty() {
                    w.write_str(": ")?;
                }
            }
            for (i, rule) in diag.rules.iter().enumerate() {
                if i > 0 {
                    w.write_str(", ")?;
                }
                write!(w, "{}{rule}{}", c.blue, c.reset)?;
            }
        }

        for note in &diag.notes {
            write!(w, "\n  {}= note:{} {note}", c.dim, c.reset)?;
        }
        for hint in &diag.hints {
            write!(w, "\n  {}= help:{} {hint}", c.dim, c.reset)?;
        }
        Ok(())
    }
}

impl Diagnostics {
    pub fn printer(&self) -> DiagnosticsPrinter<'_, '_> {
        DiagnosticsPrinter::new(self)
    }
}
