use trellis_core::{Grammar, Rule};

use crate::Error;
use crate::analyze::SymbolKind;
use crate::canonical::CanonicalGrammar;
use crate::diagnostics::DiagnosticKind;
use crate::ir::Expr;
use crate::precedence::Resolution;
use crate::stages::GrammarCompiler;
use crate::test_utils::{
    CMAKE, GO_EXPRESSIONS, HASKELL_PATTERNS, JAVA_EXPRESSIONS, expect_valid, fixture,
};

fn arithmetic() -> Grammar {
    Grammar::new("arith")
        .rule(
            "expr",
            Rule::choice([
                Rule::prec_left(
                    1,
                    Rule::seq([
                        Rule::field("left", Rule::sym("expr")),
                        Rule::string("+"),
                        Rule::field("right", Rule::sym("expr")),
                    ]),
                ),
                Rule::sym("number"),
            ]),
        )
        .rule("number", Rule::pattern("[0-9]+"))
}

/// Everything about a variable except the hidden rules it absorbed.
fn shape(grammar: &CanonicalGrammar) -> Vec<(&str, SymbolKind, &Expr)> {
    grammar
        .variables
        .iter()
        .map(|v| (v.name.as_str(), v.kind, &v.body))
        .collect()
}

fn assert_recompiles(json: &str) {
    let first = expect_valid(fixture(json));
    let second = expect_valid(first.to_grammar());

    assert_eq!(shape(&second), shape(&first));
    for (a, b) in first.variables.iter().zip(&second.variables) {
        assert_eq!(a.fields, b.fields, "fields of `{}`", a.name);
    }
    assert_eq!(second.lexical, first.lexical);
    assert_eq!(second.externals, first.externals);
    assert_eq!(second.extras, first.extras);
    assert_eq!(second.word, first.word);
    assert_eq!(second.precedence, first.precedence);
}

#[test]
fn duplicate_rule_name_stops_resolution() {
    let grammar = Grammar::new("test")
        .rule("foo", Rule::string("a"))
        .rule("foo", Rule::string("b"));

    let Err(Error::Resolve(diag)) = GrammarCompiler::new(grammar).compile() else {
        panic!("expected a resolution error");
    };

    assert_eq!(diag.kinds(), [DiagnosticKind::DuplicateRuleName]);
    assert_eq!(
        diag.iter().next().unwrap().message(),
        "`foo` is defined more than once"
    );
}

#[test]
fn self_referencing_hidden_rule() {
    let grammar = Grammar::new("test")
        .rule("program", Rule::string("x"))
        .rule("_helper", Rule::seq([Rule::sym("_helper")]));

    let Err(Error::Resolve(diag)) = GrammarCompiler::new(grammar).compile() else {
        panic!("expected a resolution error");
    };

    assert!(diag.contains(DiagnosticKind::CyclicLexicalRule));
}

#[test]
fn empty_grammar_has_no_start_rule() {
    let Err(Error::Resolve(diag)) = GrammarCompiler::new(Grammar::new("empty")).compile() else {
        panic!("expected a resolution error");
    };

    assert_eq!(diag.kinds(), [DiagnosticKind::UnreachableStartRule]);
    assert_eq!(
        diag.iter().next().unwrap().message(),
        "grammar defines no rules"
    );
}

#[test]
fn configured_start_rule_must_exist() {
    let compiler = GrammarCompiler::new(arithmetic()).with_start_rule("program");

    let Err(Error::Resolve(diag)) = compiler.compile() else {
        panic!("expected a resolution error");
    };

    let message = diag.iter().next().unwrap();
    assert_eq!(message.message(), "start rule `program` is not defined");
    assert_eq!(message.rules(), ["program"]);
}

#[test]
fn start_rule_cannot_be_inlined() {
    let grammar = arithmetic().inline_rule("expr");

    let Err(Error::Resolve(diag)) = GrammarCompiler::new(grammar).compile() else {
        panic!("expected a resolution error");
    };

    assert_eq!(
        diag.iter().next().unwrap().message(),
        "start rule `expr` is listed in `inline`"
    );
}

#[test]
fn configured_start_rule_comes_first() {
    let grammar = Grammar::new("test")
        .rule("statement", Rule::seq([Rule::sym("body"), Rule::string(";")]))
        .rule("body", Rule::repeat1(Rule::string("x")));

    let compiled = GrammarCompiler::new(grammar)
        .with_start_rule("body")
        .compile()
        .unwrap();

    assert_eq!(compiled.start, "body");
    let names: Vec<&str> = compiled.variables.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["body", "statement"]);
    assert_eq!(compiled.warnings.kinds(), [DiagnosticKind::UnreachableRule]);
}

#[test]
fn errors_stop_later_stages() {
    let grammar = Grammar::new("test").rule(
        "program",
        Rule::seq([Rule::sym("missing"), Rule::repeat(Rule::blank())]),
    );

    let Err(Error::Resolve(diag)) = GrammarCompiler::new(grammar).compile() else {
        panic!("expected a resolution error");
    };

    // The empty repeat would fail validation, which never runs.
    assert_eq!(diag.kinds(), [DiagnosticKind::UnresolvedSymbol]);
}

#[test]
fn left_associative_addition() {
    let compiled = expect_valid(arithmetic());

    let table = compiled.table("expr").unwrap();
    assert_eq!(table.tie_break(0, 0), Some(Resolution::PreferReduce));
    assert!(compiled.warnings.is_empty());
}

#[test]
fn fixtures_compile_cleanly() {
    for json in [GO_EXPRESSIONS, JAVA_EXPRESSIONS, HASKELL_PATTERNS, CMAKE] {
        let compiled = expect_valid(fixture(json));
        assert!(
            compiled.warnings.is_empty(),
            "{}",
            compiled.warnings.render()
        );
    }
}

#[test]
fn go_expressions_inline_the_expression_rule() {
    let compiled = expect_valid(fixture(GO_EXPRESSIONS));

    assert_eq!(compiled.start, "source_file");
    assert!(compiled.variable("_expression").is_none());
    assert_eq!(
        compiled.variable("binary_expression").unwrap().inlined,
        ["_expression"]
    );
    let call = compiled.variable("call_expression").unwrap();
    assert!(call.fields["function"].required);
    assert!(!call.fields["function"].multiple);
    assert!(compiled.lexical_named("identifier").is_some());
}

#[test]
fn java_binary_operators_recurse_through_expression() {
    let compiled = expect_valid(fixture(JAVA_EXPRESSIONS));

    assert_eq!(compiled.variable("expression").unwrap().kind, SymbolKind::Supertype);
    assert!(compiled.table("expression").is_none());

    // Alternatives follow the operator list: `+` is #7, `-` is #8, `*` is #9.
    let binary = compiled.table("binary_expression").unwrap();
    assert_eq!(binary.alternatives.len(), 10);
    assert!(binary.alternatives.iter().all(|a| a.left_open && a.right_open));
    assert_eq!(binary.tie_breaks.len(), 100);
    assert_eq!(binary.unresolved().count(), 0);
    assert_eq!(binary.tie_break(6, 8), Some(Resolution::PreferShift));
    assert_eq!(binary.tie_break(8, 6), Some(Resolution::PreferReduce));
    assert_eq!(binary.tie_break(6, 7), Some(Resolution::PreferReduce));

    let unary = compiled.table("unary_expression").unwrap();
    assert!(unary.alternatives.iter().all(|a| !a.left_open && a.right_open));
    assert!(unary.tie_breaks.is_empty());
}

#[test]
fn haskell_patterns_keep_named_levels() {
    let compiled = expect_valid(fixture(HASKELL_PATTERNS));

    assert_eq!(compiled.levels.get("apply").map(|l| l.level), Some(2));
    assert_eq!(compiled.levels.get("infix").map(|l| l.level), Some(1));
    assert_eq!(compiled.conflicts, [["pat_parens", "pat_tuple"]]);
    assert_eq!(compiled.supertypes["literal"], ["integer", "char"]);
    assert_eq!(compiled.variable("literal").unwrap().kind, SymbolKind::Supertype);
}

#[test]
fn cmake_names_complex_anonymous_tokens() {
    let compiled = expect_valid(fixture(CMAKE));

    let token = compiled
        .lexical
        .iter()
        .find(|l| l.name == "quoted_argument_token1")
        .unwrap();
    assert!(!token.named);
    assert!(token.immediate);
}

#[test]
fn recompiling_reproduces_go_expressions() {
    assert_recompiles(GO_EXPRESSIONS);
}

#[test]
fn recompiling_reproduces_java_expressions() {
    assert_recompiles(JAVA_EXPRESSIONS);
}

#[test]
fn recompiling_reproduces_haskell_patterns() {
    assert_recompiles(HASKELL_PATTERNS);
}

#[test]
fn recompiling_reproduces_cmake() {
    assert_recompiles(CMAKE);
}

#[test]
fn optional_is_choice_with_blank() {
    let base = |item: Rule| {
        Grammar::new("test")
            .rule("program", Rule::seq([item, Rule::string(";")]))
            .rule("word", Rule::pattern("[a-z]+"))
    };

    let optional = expect_valid(base(Rule::optional(Rule::sym("word"))));
    let choice = expect_valid(base(Rule::choice([Rule::sym("word"), Rule::blank()])));

    assert_eq!(optional.to_json().unwrap(), choice.to_json().unwrap());
}

#[test]
fn serialized_outputs() {
    let compiled = expect_valid(arithmetic());

    let json = compiled.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["start"], "expr");
    assert_eq!(value["variables"][0]["name"], "expr");
    assert!(value.get("warnings").is_none());

    let binary = compiled.to_binary().unwrap();
    assert_eq!(CanonicalGrammar::from_binary(&binary).unwrap(), compiled);
}

#[test]
fn binary_output_decodes_every_fixture() {
    for json in [GO_EXPRESSIONS, JAVA_EXPRESSIONS, HASKELL_PATTERNS, CMAKE] {
        let compiled = expect_valid(fixture(json));
        let binary = compiled.to_binary().unwrap();

        let decoded = CanonicalGrammar::from_binary(&binary).unwrap();
        assert_eq!(decoded, compiled, "{}", compiled.name);
    }
}

#[test]
fn truncated_binary_output_is_an_error() {
    let binary = expect_valid(arithmetic()).to_binary().unwrap();

    assert!(CanonicalGrammar::from_binary(&binary[..binary.len() - 1]).is_err());
}

#[test]
fn dump_lists_every_section() {
    let compiled = expect_valid(arithmetic());

    insta::assert_snapshot!(compiled.dump(), @r#"
    grammar arith

    [variables]
    expr (nonterminal) = choice(prec.left(1, seq(field(left, expr), "+", field(right, expr))), number)
        field left: expr
        field right: expr

    [lexical]
      0 "+"
      1 number = /[0-9]+/

    [precedence]
    expr
      #1 level 1 left left-open right-open
      #2 unannotated
      #1 then #1: reduce
    "#);
}
