use trellis_core::{Assoc, Grammar, Precedence, PrecedenceTable, Rule};

use super::{DisambiguationTable, Resolution};
use crate::diagnostics::DiagnosticKind;
use crate::ir::Expr;
use crate::stages::{Disambiguated, GrammarCompiler};
use crate::test_utils::{GO_EXPRESSIONS, JAVA_EXPRESSIONS, fixture};
use crate::{Error, Result};

fn disambiguated(compiler: GrammarCompiler) -> Result<Disambiguated> {
    compiler.resolve()?.normalize()?.disambiguate()
}

fn tables(grammar: Grammar) -> Vec<DisambiguationTable> {
    disambiguated(GrammarCompiler::new(grammar))
        .unwrap()
        .tables()
        .to_vec()
}

fn binary(op: &str, expr: &str) -> Rule {
    Rule::seq([Rule::sym(expr), Rule::string(op), Rule::sym(expr)])
}

fn arithmetic(alternatives: impl IntoIterator<Item = Rule>) -> Grammar {
    let mut alternatives: Vec<Rule> = alternatives.into_iter().collect();
    alternatives.push(Rule::sym("number"));
    Grammar::new("arith")
        .rule("expr", Rule::choice(alternatives))
        .rule("number", Rule::pattern("[0-9]+"))
}

/// Group `operand (op operand)*` the way a shift-reduce parser driven by
/// the table would. `ops` maps operator text to its alternative.
fn group(table: &DisambiguationTable, ops: &[(&str, usize)], input: &str) -> String {
    let alternative = |text: &str| {
        ops.iter()
            .find(|(op, _)| *op == text)
            .map(|(_, alt)| *alt)
            .unwrap()
    };
    let mut operands: Vec<String> = Vec::new();
    let mut pending: Vec<(String, usize)> = Vec::new();
    let reduce = |operands: &mut Vec<String>, pending: &mut Vec<(String, usize)>| {
        let (op, _) = pending.pop().unwrap();
        let rhs = operands.pop().unwrap();
        let lhs = operands.pop().unwrap();
        operands.push(format!("({lhs} {op} {rhs})"));
    };

    for (i, token) in input.split_whitespace().enumerate() {
        if i % 2 == 0 {
            operands.push(token.to_string());
            continue;
        }
        let shift = alternative(token);
        while let Some((_, reduce_alt)) = pending.last() {
            match table.tie_break(*reduce_alt, shift) {
                Some(Resolution::PreferReduce) => reduce(&mut operands, &mut pending),
                Some(Resolution::PreferShift) => break,
                other => panic!("`{token}` cannot be decided: {other:?}"),
            }
        }
        pending.push((token.to_string(), shift));
    }
    while !pending.is_empty() {
        reduce(&mut operands, &mut pending);
    }
    operands.pop().unwrap()
}

#[test]
fn left_associative_chain_groups_left() {
    let tables = tables(arithmetic([Rule::prec_left(4, binary("+", "expr"))]));

    assert_eq!(tables.len(), 1);
    let table = &tables[0];
    assert_eq!(table.rule, "expr");
    assert_eq!(table.tie_break(0, 0), Some(Resolution::PreferReduce));
    assert_eq!(group(table, &[("+", 0)], "1 + 2 + 3"), "((1 + 2) + 3)");
}

#[test]
fn right_associative_chain_groups_right() {
    let tables = tables(arithmetic([Rule::prec_right(1, binary("^", "expr"))]));

    let table = &tables[0];
    assert_eq!(table.tie_break(0, 0), Some(Resolution::PreferShift));
    assert_eq!(group(table, &[("^", 0)], "1 ^ 2 ^ 3"), "(1 ^ (2 ^ 3))");
}

#[test]
fn higher_level_binds_tighter() {
    let grammar = fixture(GO_EXPRESSIONS);
    let tables = tables(grammar);

    let table = tables
        .iter()
        .find(|t| t.rule == "binary_expression")
        .unwrap();
    let ops = [("*", 0), ("+", 1), ("==", 2), ("&&", 3), ("||", 4)];
    assert_eq!(group(table, &ops, "1 + 2 * 3"), "(1 + (2 * 3))");
    assert_eq!(group(table, &ops, "1 * 2 + 3"), "((1 * 2) + 3)");
    assert_eq!(
        group(table, &ops, "a || b && c == d"),
        "(a || (b && (c == d)))"
    );
    assert_eq!(table.unresolved().count(), 0);
}

#[test]
fn recursion_through_umbrella_rule() {
    let grammar = Grammar::new("arith")
        .rule(
            "expr",
            Rule::choice([Rule::sym("binary"), Rule::sym("number")]),
        )
        .rule(
            "binary",
            Rule::choice([
                Rule::prec_left(1, binary("+", "expr")),
                Rule::prec_left(2, binary("*", "expr")),
            ]),
        )
        .rule("number", Rule::pattern("[0-9]+"));

    let tables = tables(grammar);

    assert_eq!(tables.len(), 1);
    let table = &tables[0];
    assert_eq!(table.rule, "binary");
    assert!(table.alternatives.iter().all(|a| a.left_open && a.right_open));
    assert_eq!(table.tie_breaks.len(), 4);
    let ops = [("+", 0), ("*", 1)];
    assert_eq!(group(table, &ops, "1 + 2 * 3"), "(1 + (2 * 3))");
    assert_eq!(group(table, &ops, "1 * 2 + 3"), "((1 * 2) + 3)");
}

#[test]
fn java_operators_group_through_the_expression_supertype() {
    let tables = tables(fixture(JAVA_EXPRESSIONS));

    let table = tables
        .iter()
        .find(|t| t.rule == "binary_expression")
        .unwrap();
    let ops = [("||", 0), ("&&", 1), ("==", 2), ("<", 4), ("+", 6), ("-", 7), ("*", 8)];
    assert_eq!(group(table, &ops, "1 + 2 * 3"), "(1 + (2 * 3))");
    assert_eq!(group(table, &ops, "a - b + c"), "((a - b) + c)");
    assert_eq!(
        group(table, &ops, "a || b && c == d"),
        "(a || (b && (c == d)))"
    );
    assert_eq!(group(table, &ops, "a < b == c"), "((a < b) == c)");
}

#[test]
fn prefix_operator_against_binary() {
    let tables = tables(arithmetic([
        Rule::prec_left(1, binary("-", "expr")),
        Rule::prec(2, Rule::seq([Rule::string("-"), Rule::sym("expr")])),
    ]));

    let table = &tables[0];
    let unary = &table.alternatives[1];
    assert!(unary.self_referential);
    assert!(!unary.left_open);
    assert!(unary.right_open);
    // `- a - b`: the negation completes before the subtraction extends it.
    assert_eq!(table.tie_break(1, 0), Some(Resolution::PreferReduce));
    assert_eq!(table.tie_break(0, 1), None);
}

#[test]
fn plain_prec_is_non_associative() {
    let tables = tables(arithmetic([Rule::prec(1, binary("==", "expr"))]));

    assert_eq!(tables[0].tie_break(0, 0), Some(Resolution::NonAssociative));
    assert_eq!(tables[0].unresolved().count(), 0);
}

#[test]
fn dynamic_precedence_defers_to_runtime() {
    let tables = tables(arithmetic([Rule::prec_dynamic(
        1,
        Rule::seq([Rule::sym("expr"), Rule::sym("expr")]),
    )]));

    let table = &tables[0];
    assert_eq!(table.tie_break(0, 0), Some(Resolution::Dynamic));
    assert_eq!(table.dynamic_alternatives().collect::<Vec<_>>(), [0]);
    assert_eq!(table.alternatives[0].precedence.dynamic, Some(1));
    assert_eq!(table.alternatives[0].precedence.level, None);
}

#[test]
fn unannotated_recursion_stays_unresolved() {
    let tables = tables(arithmetic([binary("+", "expr")]));

    let unresolved: Vec<_> = tables[0].unresolved().collect();
    assert_eq!(unresolved.len(), 1);
    assert_eq!((unresolved[0].reduce, unresolved[0].shift), (0, 0));
}

#[test]
fn rules_without_recursion_or_annotations_get_no_table() {
    let grammar = Grammar::new("test")
        .rule("program", Rule::repeat(Rule::sym("pair")))
        .rule(
            "pair",
            Rule::seq([Rule::field("key", Rule::sym("name")), Rule::sym("name")]),
        )
        .rule("name", Rule::pattern("[a-z]+"));

    assert!(tables(grammar).is_empty());
}

#[test]
fn named_precedences_follow_orderings() {
    let grammar = arithmetic([
        Rule::prec_left("additive", binary("+", "expr")),
        Rule::prec_left("multiplicative", binary("*", "expr")),
    ])
    .precedence_order(["multiplicative", "additive"]);

    let stage = disambiguated(GrammarCompiler::new(grammar)).unwrap();

    let Expr::Choice(alternatives) = &stage.grammar().variables[0].body else {
        panic!("expected a choice");
    };
    let Expr::Prec { value, .. } = &alternatives[0] else {
        panic!("expected a precedence");
    };
    assert_eq!(*value, Precedence::Integer(1));
    let table = &stage.tables()[0];
    assert_eq!(table.tie_break(0, 1), Some(Resolution::PreferShift));
    assert_eq!(table.tie_break(1, 0), Some(Resolution::PreferReduce));
}

#[test]
fn configured_levels_take_priority() {
    let grammar = arithmetic([
        Rule::prec("additive", binary("+", "expr")),
        Rule::prec_left("multiplicative", binary("*", "expr")),
    ])
    .precedence_order(["multiplicative", "additive"]);
    let configured = PrecedenceTable::from_levels([("additive", 10, Assoc::Left)]);

    let stage =
        disambiguated(GrammarCompiler::new(grammar).with_precedence_table(configured)).unwrap();

    let table = &stage.tables()[0];
    assert_eq!(table.alternatives[0].precedence.level, Some(10));
    // The configured level brings its associativity along.
    assert_eq!(table.alternatives[0].precedence.assoc, Assoc::Left);
    assert_eq!(table.tie_break(0, 0), Some(Resolution::PreferReduce));
    assert_eq!(table.tie_break(0, 1), Some(Resolution::PreferReduce));
}

#[test]
fn unknown_precedence_name() {
    let grammar = arithmetic([Rule::prec_left("missing", binary("+", "expr"))]);

    let Err(Error::Precedence(diag)) = disambiguated(GrammarCompiler::new(grammar)) else {
        panic!("expected a precedence error");
    };

    assert_eq!(diag.kinds(), [DiagnosticKind::UnknownPrecedence]);
    let message = diag.iter().next().unwrap();
    assert_eq!(message.message(), "precedence `missing` is not defined");
    assert_eq!(message.rules(), ["expr"]);
}

#[test]
fn contradicting_orderings() {
    let grammar = arithmetic([Rule::prec_left("a", binary("+", "expr"))])
        .precedence_order(["a", "b"])
        .precedence_order(["b", "a"]);

    let Err(Error::Precedence(diag)) = disambiguated(GrammarCompiler::new(grammar)) else {
        panic!("expected a precedence error");
    };

    assert!(diag.contains(DiagnosticKind::PrecedenceCycle));
    assert_eq!(
        diag.of_kind(DiagnosticKind::PrecedenceCycle)
            .next()
            .unwrap()
            .message(),
        "precedence orderings conflict: a, b"
    );
}
