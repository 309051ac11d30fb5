//! Staged compilation: resolve, normalize, disambiguate, validate.
//!
//! Each stage consumes the previous one. A stage that reports errors ends
//! the pipeline; warnings are carried forward into the compiled grammar.

use trellis_core::{Grammar, PrecedenceTable};

use crate::analyze::{SymbolTable, resolve_symbols};
use crate::canonical::CanonicalGrammar;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::normalize::{NormalizedGrammar, normalize};
use crate::precedence::{self, DisambiguationTable};
use crate::validate::validate;
use crate::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct CompileConfig {
    /// Defaults to the first rule.
    pub start_rule: Option<String>,
    /// Levels for named precedences, taking priority over the grammar's
    /// own `precedences` orderings.
    pub precedence_table: Option<PrecedenceTable>,
}

pub struct GrammarCompiler {
    grammar: Grammar,
    config: CompileConfig,
}

impl GrammarCompiler {
    pub fn new(grammar: Grammar) -> Self {
        Self {
            grammar,
            config: CompileConfig::default(),
        }
    }

    pub fn with_start_rule(mut self, name: impl Into<String>) -> Self {
        self.config.start_rule = Some(name.into());
        self
    }

    pub fn with_precedence_table(mut self, table: PrecedenceTable) -> Self {
        self.config.precedence_table = Some(table);
        self
    }

    pub fn with_config(mut self, config: CompileConfig) -> Self {
        self.config = config;
        self
    }

    pub fn resolve(self) -> Result<Resolved> {
        let mut diag = Diagnostics::new();
        let symbols = resolve_symbols(&self.grammar, &mut diag);
        let start = self.start_rule(&symbols, &mut diag);

        log::debug!(
            "resolved `{}`: {} rules, {} externals",
            self.grammar.name,
            symbols.len(),
            symbols.externals().count()
        );

        if diag.has_errors() {
            return Err(Error::Resolve(diag));
        }
        Ok(Resolved {
            grammar: self.grammar,
            config: self.config,
            symbols,
            start: start.unwrap_or_default(),
            diag,
        })
    }

    pub fn compile(self) -> Result<CanonicalGrammar> {
        self.resolve()?.normalize()?.disambiguate()?.validate()
    }

    fn start_rule(&self, symbols: &SymbolTable, diag: &mut Diagnostics) -> Option<String> {
        let start = match &self.config.start_rule {
            Some(name) if symbols.contains(name) => name.clone(),
            Some(name) => {
                diag.report(DiagnosticKind::UnreachableStartRule)
                    .message(format!("start rule `{name}` is not defined"))
                    .rule(name)
                    .emit();
                return None;
            }
            None => match symbols.first() {
                Some(symbol) => symbol.name.clone(),
                None => {
                    diag.report(DiagnosticKind::UnreachableStartRule)
                        .message("grammar defines no rules")
                        .emit();
                    return None;
                }
            },
        };

        if self.grammar.inline.contains(&start) {
            diag.report(DiagnosticKind::UnreachableStartRule)
                .message(format!("start rule `{start}` is listed in `inline`"))
                .rule(&start)
                .emit();
            return None;
        }
        Some(start)
    }
}

/// Names resolved and classified.
#[derive(Debug)]
pub struct Resolved {
    grammar: Grammar,
    config: CompileConfig,
    symbols: SymbolTable,
    start: String,
    diag: Diagnostics,
}

impl Resolved {
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diag
    }

    pub fn normalize(mut self) -> Result<Normalized> {
        let grammar = normalize(&self.grammar, self.symbols, &self.start, &mut self.diag);
        if self.diag.has_errors() {
            return Err(Error::Normalize(self.diag));
        }
        Ok(Normalized {
            config: self.config,
            grammar,
            start: self.start,
            diag: self.diag,
        })
    }
}

/// Canonical variables and the lexical table.
#[derive(Debug)]
pub struct Normalized {
    config: CompileConfig,
    grammar: NormalizedGrammar,
    start: String,
    diag: Diagnostics,
}

impl Normalized {
    pub fn grammar(&self) -> &NormalizedGrammar {
        &self.grammar
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diag
    }

    pub fn disambiguate(mut self) -> Result<Disambiguated> {
        let levels = precedence::build_table(
            &self.grammar,
            self.config.precedence_table.as_ref(),
            &mut self.diag,
        );
        precedence::resolve_names(&mut self.grammar, &levels, &mut self.diag);
        let tables = precedence::disambiguate(&self.grammar);

        if self.diag.has_errors() {
            return Err(Error::Precedence(self.diag));
        }
        Ok(Disambiguated {
            grammar: self.grammar,
            levels,
            tables,
            start: self.start,
            diag: self.diag,
        })
    }
}

/// Numeric precedences and per-rule disambiguation tables.
#[derive(Debug)]
pub struct Disambiguated {
    grammar: NormalizedGrammar,
    levels: PrecedenceTable,
    tables: Vec<DisambiguationTable>,
    start: String,
    diag: Diagnostics,
}

impl Disambiguated {
    pub fn grammar(&self) -> &NormalizedGrammar {
        &self.grammar
    }

    pub fn tables(&self) -> &[DisambiguationTable] {
        &self.tables
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diag
    }

    pub fn validate(mut self) -> Result<CanonicalGrammar> {
        let registry = validate(&self.grammar, &self.tables, &self.start, &mut self.diag);
        if self.diag.has_errors() {
            return Err(Error::Validate(self.diag));
        }
        Ok(CanonicalGrammar::assemble(
            self.grammar,
            self.levels,
            self.tables,
            registry,
            self.diag,
        ))
    }
}
