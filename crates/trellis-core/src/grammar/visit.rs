//! Rule tree visitor.
//!
//! # Usage
//!
//! Implement `Visitor` for your struct. Override `visit_*` methods to add logic.
//! Call `walk_rule` within your override to continue recursion (or omit it to stop).
//!
//! ```
//! use trellis_core::grammar::{Rule, Visitor, walk_rule};
//!
//! struct CountTerminals(usize);
//!
//! impl Visitor for CountTerminals {
//!     fn visit_terminal(&mut self, _: &trellis_core::grammar::Terminal) {
//!         self.0 += 1;
//!     }
//! }
//!
//! let mut counter = CountTerminals(0);
//! counter.visit_rule(&Rule::seq([Rule::string("a"), Rule::pattern("b+")]));
//! assert_eq!(counter.0, 2);
//! ```

use indexmap::IndexSet;

use super::types::{Rule, Terminal};

pub trait Visitor: Sized {
    fn visit_rule(&mut self, rule: &Rule) {
        walk_rule(self, rule);
    }

    fn visit_terminal(&mut self, _terminal: &Terminal) {}

    fn visit_symbol(&mut self, _name: &str) {}
}

pub fn walk_rule<V: Visitor>(visitor: &mut V, rule: &Rule) {
    match rule {
        Rule::Terminal(terminal) => visitor.visit_terminal(terminal),
        Rule::Symbol(name) => visitor.visit_symbol(name),
        _ => {
            for child in rule.children() {
                visitor.visit_rule(child);
            }
        }
    }
}

impl Rule {
    /// All referenced rule names, deduplicated, in first-occurrence order.
    pub fn symbols(&self) -> IndexSet<String> {
        struct Collect(IndexSet<String>);

        impl Visitor for Collect {
            fn visit_symbol(&mut self, name: &str) {
                self.0.insert(name.to_string());
            }
        }

        let mut collect = Collect(IndexSet::new());
        collect.visit_rule(self);
        collect.0
    }

    /// Whether the rule references `name` anywhere.
    pub fn references(&self, name: &str) -> bool {
        self.symbols().contains(name)
    }
}
