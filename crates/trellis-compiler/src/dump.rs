//! Human-readable listing of a compiled grammar.

use std::fmt::Write as _;

use trellis_core::{Assoc, Colors, Repetition, Rule, Terminal};

use crate::canonical::CanonicalGrammar;
use crate::ir::{Expr, SymbolRef};

impl CanonicalGrammar {
    pub fn dump(&self) -> String {
        self.dump_colored(false)
    }

    pub fn dump_colored(&self, colored: bool) -> String {
        let mut out = String::new();
        let _ = DumpPrinter::new(self, Colors::new(colored)).format(&mut out);
        out
    }
}

struct DumpPrinter<'a> {
    grammar: &'a CanonicalGrammar,
    c: Colors,
}

impl<'a> DumpPrinter<'a> {
    fn new(grammar: &'a CanonicalGrammar, c: Colors) -> Self {
        Self { grammar, c }
    }

    fn format(&self, w: &mut String) -> std::fmt::Result {
        let c = self.c;
        let g = self.grammar;
        writeln!(w, "{}grammar{} {}", c.dim, c.reset, g.name)?;

        writeln!(w, "\n{}[variables]{}", c.dim, c.reset)?;
        for variable in &g.variables {
            writeln!(
                w,
                "{}{}{} {}({}){} = {}",
                c.blue,
                variable.name,
                c.reset,
                c.dim,
                variable.kind,
                c.reset,
                self.expr(&variable.body)
            )?;
            for (name, field) in &variable.fields {
                let types: Vec<&str> = field.types.iter().map(|t| t.name.as_str()).collect();
                write!(w, "    {}field{} {}: {}", c.dim, c.reset, name, types.join(" | "))?;
                if field.multiple {
                    write!(w, " {}multiple{}", c.dim, c.reset)?;
                }
                if field.required {
                    write!(w, " {}required{}", c.dim, c.reset)?;
                }
                writeln!(w)?;
            }
        }

        if !g.lexical.is_empty() {
            writeln!(w, "\n{}[lexical]{}", c.dim, c.reset)?;
            for (index, entry) in g.lexical.iter().enumerate() {
                let mode = if entry.immediate { "immediate " } else { "" };
                if entry.named {
                    writeln!(
                        w,
                        "{}{:>3}{} {}{}{} = {}{}",
                        c.dim,
                        index,
                        c.reset,
                        c.blue,
                        entry.name,
                        c.reset,
                        mode,
                        self.rule(&entry.content)
                    )?;
                } else {
                    writeln!(
                        w,
                        "{}{:>3}{} {}{}",
                        c.dim,
                        index,
                        c.reset,
                        mode,
                        self.rule(&entry.content)
                    )?;
                }
            }
        }

        if !g.externals.is_empty() {
            let names: Vec<String> = (0..g.externals.len())
                .map(|i| self.symbol(SymbolRef::External(crate::ir::ExternalId::from_index(i))))
                .collect();
            writeln!(w, "\n{}[externals]{}\n{}", c.dim, c.reset, names.join(", "))?;
        }

        if !g.extras.is_empty() {
            let names: Vec<String> = g.extras.iter().map(|s| self.symbol(*s)).collect();
            writeln!(w, "\n{}[extras]{}\n{}", c.dim, c.reset, names.join(", "))?;
        }

        if let Some(word) = g.word {
            writeln!(w, "\n{}[word]{}\n{}", c.dim, c.reset, self.symbol(word))?;
        }

        if !g.conflicts.is_empty() {
            writeln!(w, "\n{}[conflicts]{}", c.dim, c.reset)?;
            for set in &g.conflicts {
                writeln!(w, "[{}]", set.join(", "))?;
            }
        }

        if !g.supertypes.is_empty() {
            writeln!(w, "\n{}[supertypes]{}", c.dim, c.reset)?;
            for (name, members) in &g.supertypes {
                writeln!(w, "{}{}{} = {}", c.blue, name, c.reset, members.join(" | "))?;
            }
        }

        if !g.precedence.is_empty() {
            writeln!(w, "\n{}[precedence]{}", c.dim, c.reset)?;
            for table in &g.precedence {
                writeln!(w, "{}{}{}", c.blue, table.rule, c.reset)?;
                for (index, alt) in table.alternatives.iter().enumerate() {
                    let p = &alt.precedence;
                    write!(w, "  #{}", index + 1)?;
                    match p.level {
                        Some(level) => write!(w, " level {level} {}", p.assoc)?,
                        None => write!(w, " unannotated")?,
                    }
                    if let Some(dynamic) = p.dynamic {
                        write!(w, " dynamic {dynamic}")?;
                    }
                    if alt.left_open {
                        write!(w, " {}left-open{}", c.dim, c.reset)?;
                    }
                    if alt.right_open {
                        write!(w, " {}right-open{}", c.dim, c.reset)?;
                    }
                    writeln!(w)?;
                }
                for tie in &table.tie_breaks {
                    writeln!(
                        w,
                        "  #{} then #{}: {}",
                        tie.reduce + 1,
                        tie.shift + 1,
                        tie.resolution
                    )?;
                }
            }
        }

        Ok(())
    }

    fn symbol(&self, symbol: SymbolRef) -> String {
        let c = self.c;
        let g = self.grammar;
        match symbol {
            SymbolRef::Lexical(id) => match g.lexical.get(id.index()) {
                Some(entry) if !entry.named => match &entry.content {
                    Rule::Terminal(terminal) if !entry.immediate => self.terminal(terminal),
                    _ => format!("{}{}{}", c.dim, entry.name, c.reset),
                },
                _ => format!("{}{}{}", c.blue, g.symbol_name(symbol), c.reset),
            },
            SymbolRef::External(id) => match g.externals.get(id.index()) {
                Some(e) if !e.named => format!("{}{:?}{}", c.green, e.name, c.reset),
                _ => format!("{}{}{}", c.blue, g.symbol_name(symbol), c.reset),
            },
            SymbolRef::Rule(_) => format!("{}{}{}", c.blue, g.symbol_name(symbol), c.reset),
        }
    }

    fn terminal(&self, terminal: &Terminal) -> String {
        let c = self.c;
        match terminal {
            Terminal::Literal(value) => format!("{}{:?}{}", c.green, value, c.reset),
            Terminal::Pattern { value, flags } => format!(
                "{}/{}/{}{}",
                c.green,
                value,
                flags.as_deref().unwrap_or(""),
                c.reset
            ),
        }
    }

    fn expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Symbol(symbol) => self.symbol(*symbol),
            Expr::Seq(members) if members.is_empty() => "blank".to_string(),
            Expr::Seq(members) => format!("seq({})", self.exprs(members)),
            Expr::Choice(members) => format!("choice({})", self.exprs(members)),
            Expr::Repeat(content) => format!("repeat({})", self.expr(content)),
            Expr::Prec {
                value,
                assoc,
                content,
            } => format!("{}({}, {})", prec_name(*assoc), value, self.expr(content)),
            Expr::Alias {
                content,
                value,
                named,
            } => format!("alias({}, {})", self.expr(content), alias_value(value, *named)),
            Expr::Field { name, content } => format!("field({}, {})", name, self.expr(content)),
        }
    }

    fn exprs(&self, members: &[Expr]) -> String {
        let parts: Vec<String> = members.iter().map(|m| self.expr(m)).collect();
        parts.join(", ")
    }

    fn rule(&self, rule: &Rule) -> String {
        match rule {
            Rule::Terminal(terminal) => self.terminal(terminal),
            Rule::Symbol(name) => format!("{}{}{}", self.c.blue, name, self.c.reset),
            Rule::Seq(members) if members.is_empty() => "blank".to_string(),
            Rule::Seq(members) => format!("seq({})", self.rules(members)),
            Rule::Choice(members) => format!("choice({})", self.rules(members)),
            Rule::Repeat {
                content,
                repetition: Repetition::ZeroOrMore,
            } => format!("repeat({})", self.rule(content)),
            Rule::Repeat { content, .. } => format!("repeat1({})", self.rule(content)),
            Rule::Optional(content) => format!("optional({})", self.rule(content)),
            Rule::Token {
                content,
                immediate: false,
            } => format!("token({})", self.rule(content)),
            Rule::Token { content, .. } => format!("token.immediate({})", self.rule(content)),
            Rule::Prec {
                value,
                assoc,
                content,
            } => format!("{}({}, {})", prec_name(*assoc), value, self.rule(content)),
            Rule::Alias {
                content,
                value,
                named,
            } => format!("alias({}, {})", self.rule(content), alias_value(value, *named)),
            Rule::Field { name, content } => format!("field({}, {})", name, self.rule(content)),
        }
    }

    fn rules(&self, members: &[Rule]) -> String {
        let parts: Vec<String> = members.iter().map(|m| self.rule(m)).collect();
        parts.join(", ")
    }
}

fn prec_name(assoc: Assoc) -> &'static str {
    match assoc {
        Assoc::None => "prec",
        Assoc::Left => "prec.left",
        Assoc::Right => "prec.right",
        Assoc::Dynamic => "prec.dynamic",
    }
}

fn alias_value(value: &str, named: bool) -> String {
    if named {
        value.to_string()
    } else {
        format!("{value:?}")
    }
}
