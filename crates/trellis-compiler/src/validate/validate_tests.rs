use indoc::indoc;
use trellis_core::{Grammar, Rule};

use super::ConflictRegistry;
use crate::diagnostics::DiagnosticKind;
use crate::test_utils::{expect_invalid, expect_valid};

fn arithmetic(add: Rule) -> Grammar {
    Grammar::new("arith")
        .rule("expr", Rule::choice([add, Rule::sym("number")]))
        .rule("number", Rule::pattern("[0-9]+"))
}

fn add() -> Rule {
    Rule::seq([Rule::sym("expr"), Rule::string("+"), Rule::sym("expr")])
}

#[test]
fn repeat_of_blank_never_terminates() {
    let grammar = Grammar::new("test").rule(
        "program",
        Rule::seq([Rule::string("x"), Rule::repeat(Rule::blank())]),
    );

    let diag = expect_invalid(grammar);

    assert_eq!(diag.kinds(), [DiagnosticKind::InfiniteRepeat]);
    insta::assert_snapshot!(diag.render(), @r"
    error[infinite-repeat]: repeat in `program` can match the empty string
      --> program
      = help: make the repeated content consume input
    ");
}

#[test]
fn repeat_through_nullable_rule() {
    let grammar = Grammar::new("test")
        .rule("program", Rule::repeat(Rule::sym("items")))
        .rule("items", Rule::repeat(Rule::sym("item")))
        .rule("item", Rule::string("i"));

    let diag = expect_invalid(grammar);

    assert_eq!(diag.kinds(), [DiagnosticKind::InfiniteRepeat]);
    assert_eq!(diag.iter().next().unwrap().rules(), ["program"]);
}

#[test]
fn nullable_repeat_inside_token() {
    let grammar = Grammar::new("test")
        .rule("program", Rule::seq([Rule::sym("word"), Rule::string(";")]))
        .rule(
            "word",
            Rule::token(Rule::repeat(Rule::optional(Rule::string("a")))),
        );

    let diag = expect_invalid(grammar);

    assert_eq!(
        diag.kinds(),
        [DiagnosticKind::EmptyToken, DiagnosticKind::InfiniteRepeat]
    );
}

#[test]
fn repeat_of_empty_pattern() {
    let grammar = Grammar::new("test").rule(
        "program",
        Rule::seq([Rule::string("x"), Rule::repeat(Rule::pattern("a*"))]),
    );

    let diag = expect_invalid(grammar);

    assert_eq!(
        diag.kinds(),
        [DiagnosticKind::EmptyToken, DiagnosticKind::InfiniteRepeat]
    );
    assert_eq!(diag.iter().nth(1).unwrap().rules(), ["program"]);
}

#[test]
fn repeat_of_empty_named_token() {
    let grammar = Grammar::new("test")
        .rule("program", Rule::repeat(Rule::sym("spaces")))
        .rule("spaces", Rule::token(Rule::optional(Rule::string(" "))));

    let diag = expect_invalid(grammar);

    assert!(diag.contains(DiagnosticKind::EmptyToken));
    assert!(diag.contains(DiagnosticKind::InfiniteRepeat));
}

#[test]
fn repeat_inlined_from_hidden_rule() {
    let grammar = Grammar::new("test")
        .rule("program", Rule::seq([Rule::string("x"), Rule::sym("_items")]))
        .rule("_items", Rule::repeat(Rule::sym("_maybe")))
        .rule("_maybe", Rule::optional(Rule::string("a")));

    let diag = expect_invalid(grammar);

    assert_eq!(diag.kinds(), [DiagnosticKind::InfiniteRepeat]);
    let message = diag.iter().next().unwrap();
    assert_eq!(message.rules(), ["program"]);
    assert_eq!(
        message.notes(),
        ["the repeat comes from inlined rule `_items`"]
    );
}

#[test]
fn unannotated_recursion_must_be_declared() {
    let diag = expect_invalid(arithmetic(add()));

    assert_eq!(diag.kinds(), [DiagnosticKind::UndeclaredAmbiguity]);
    insta::assert_snapshot!(diag.render(), @r"
    error[undeclared-ambiguity]: `expr` is ambiguous and not listed in any conflict set
      --> expr
      = note: alternative #1 can be extended by alternative #1 and neither has precedence
      = help: annotate the alternatives with `prec.left`/`prec.right` or list the rule in `conflicts`
    ");
}

#[test]
fn declared_conflict_tolerates_ambiguity() {
    let compiled = expect_valid(arithmetic(add()).conflict(["expr"]));

    assert_eq!(compiled.conflicts, [["expr"]]);
    assert_eq!(compiled.table("expr").unwrap().unresolved().count(), 1);
    assert!(compiled.warnings.is_empty());
}

#[test]
fn conflict_through_inlined_rule() {
    let grammar = Grammar::new("arith")
        .rule(
            "expr",
            Rule::choice([Rule::sym("_binary"), Rule::sym("number")]),
        )
        .rule(
            "_binary",
            Rule::seq([Rule::sym("expr"), Rule::string("+"), Rule::sym("expr")]),
        )
        .rule("number", Rule::pattern("[0-9]+"))
        .conflict(["_binary"]);

    let compiled = expect_valid(grammar);

    assert_eq!(compiled.variable("expr").unwrap().inlined, ["_binary"]);
}

#[test]
fn recursion_through_umbrella_rule_must_be_declared() {
    let grammar = Grammar::new("arith")
        .rule(
            "expr",
            Rule::choice([Rule::sym("binary"), Rule::sym("number")]),
        )
        .rule("binary", add())
        .rule("number", Rule::pattern("[0-9]+"));

    let diag = expect_invalid(grammar.clone());

    assert_eq!(diag.kinds(), [DiagnosticKind::UndeclaredAmbiguity]);
    assert_eq!(diag.iter().next().unwrap().rules(), ["binary"]);

    let compiled = expect_valid(grammar.conflict(["binary"]));
    assert_eq!(compiled.table("binary").unwrap().unresolved().count(), 1);
}

#[test]
fn annotated_recursion_needs_no_conflict() {
    let compiled = expect_valid(arithmetic(Rule::prec_left(4, add())));

    assert!(compiled.conflicts.is_empty());
    assert_eq!(compiled.table("expr").unwrap().unresolved().count(), 0);
}

#[test]
fn conflict_sets_are_merged() {
    let declared = vec![
        vec!["b".to_string(), "a".to_string()],
        vec!["a".to_string(), "b".to_string()],
        vec!["a".to_string(), "a".to_string(), "b".to_string()],
        vec![],
        vec!["c".to_string()],
    ];

    let registry = ConflictRegistry::from_declared(&declared);

    assert_eq!(registry.sets(), [vec!["a", "b"], vec!["c"]]);
    assert!(registry.contains("c"));
    assert!(!registry.contains("d"));
}

#[test]
fn conflict_without_shared_prefix_warns() {
    let statement = |keyword: &str| Rule::seq([Rule::string(keyword), Rule::string(";")]);
    let grammar = Grammar::new("test")
        .rule(
            "program",
            Rule::repeat(Rule::choice([Rule::sym("break_stmt"), Rule::sym("return_stmt")])),
        )
        .rule("break_stmt", statement("break"))
        .rule("return_stmt", statement("return"))
        .conflict(["return_stmt", "break_stmt"]);

    let compiled = expect_valid(grammar);

    assert_eq!(compiled.conflicts, [["break_stmt", "return_stmt"]]);
    insta::assert_snapshot!(compiled.warnings.render(), @r"
    warning[unnecessary-conflict]: conflict set [break_stmt, return_stmt] has no shared prefix
      --> break_stmt, return_stmt
    ");
}

#[test]
fn conflict_with_shared_prefix_is_quiet() {
    let grammar = Grammar::new("test")
        .rule(
            "program",
            Rule::repeat(Rule::choice([Rule::sym("group"), Rule::sym("tuple")])),
        )
        .rule(
            "group",
            Rule::seq([Rule::string("("), Rule::sym("name"), Rule::string(")")]),
        )
        .rule(
            "tuple",
            Rule::seq([
                Rule::string("("),
                Rule::sym("name"),
                Rule::string(","),
                Rule::string(")"),
            ]),
        )
        .rule("name", Rule::pattern("[a-z]+"))
        .conflict(["group", "tuple"]);

    let compiled = expect_valid(grammar);

    assert!(compiled.warnings.is_empty());
}

#[test]
fn token_matching_empty_string() {
    let grammar = Grammar::new("test")
        .rule("program", Rule::seq([Rule::sym("sign"), Rule::string("1")]))
        .rule("sign", Rule::token(Rule::optional(Rule::string("-"))));

    let diag = expect_invalid(grammar);

    assert_eq!(diag.kinds(), [DiagnosticKind::EmptyToken]);
    assert_eq!(
        diag.iter().next().unwrap().message(),
        "token `sign` matches the empty string"
    );
}

#[test]
fn pattern_matching_empty_string() {
    let grammar = Grammar::new("test")
        .rule("program", Rule::seq([Rule::sym("spaces"), Rule::string("x")]))
        .rule("spaces", Rule::pattern(" *"));

    let diag = expect_invalid(grammar);

    assert_eq!(diag.kinds(), [DiagnosticKind::EmptyToken]);
}

#[test]
fn malformed_pattern() {
    let grammar = Grammar::new("test")
        .rule("program", Rule::repeat(Rule::sym("digit")))
        .rule("digit", Rule::pattern("[0-9"));

    let diag = expect_invalid(grammar);

    assert_eq!(diag.kinds(), [DiagnosticKind::InvalidPattern]);
    let message = diag.iter().next().unwrap();
    assert_eq!(message.message(), "invalid pattern: /[0-9/");
    assert_eq!(message.rules(), ["digit"]);
    assert_eq!(message.notes().len(), 1);
}

#[test]
fn unreachable_rule_is_a_warning() {
    let grammar = Grammar::new("test")
        .rule("program", Rule::repeat(Rule::sym("item")))
        .rule("item", Rule::string("i"))
        .rule("comment", Rule::token(Rule::seq([Rule::string("#"), Rule::pattern(".*")])))
        .rule("orphan", Rule::string("o"))
        .extra(Rule::sym("comment"));

    let compiled = expect_valid(grammar);

    assert_eq!(compiled.warnings.kinds(), [DiagnosticKind::UnreachableRule]);
    let expected = indoc! {"
        warning[unreachable-rule]: `orphan` is not reachable from the start rule
          --> orphan"};
    assert_eq!(compiled.warnings.render(), expected);
}
