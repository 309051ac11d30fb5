use indoc::indoc;

use super::*;

#[test]
fn parse_minimal_grammar() {
    let json = r#"{
        "name": "test",
        "rules": {
            "source_file": { "type": "SYMBOL", "name": "expression" },
            "expression": { "type": "STRING", "value": "x" }
        }
    }"#;

    let grammar = Grammar::from_json(json).unwrap();
    assert_eq!(grammar.name, "test");
    assert_eq!(grammar.rules.len(), 2);
    assert_eq!(grammar.rules[1].body, Rule::string("x"));
}

#[test]
fn parse_seq_and_choice() {
    let json = indoc! {r#"
    {
        "name": "test",
        "rules": {
            "root": {
                "type": "SEQ",
                "members": [
                    { "type": "STRING", "value": "a" },
                    { "type": "CHOICE", "members": [
                        { "type": "STRING", "value": "b" },
                        { "type": "BLANK" }
                    ]}
                ]
            }
        }
    }
    "#};

    let grammar = Grammar::from_json(json).unwrap();
    assert_eq!(
        grammar.rules[0].body,
        Rule::seq([
            Rule::string("a"),
            Rule::choice([Rule::string("b"), Rule::blank()]),
        ])
    );
}

#[test]
fn parse_field_and_alias() {
    let json = indoc! {r#"
    {
        "name": "test",
        "rules": {
            "func": {
                "type": "FIELD",
                "name": "name",
                "content": {
                    "type": "ALIAS",
                    "content": { "type": "SYMBOL", "name": "identifier" },
                    "value": "function_name",
                    "named": true
                }
            }
        }
    }
    "#};

    let grammar = Grammar::from_json(json).unwrap();
    assert_eq!(
        grammar.rules[0].body,
        Rule::field(
            "name",
            Rule::alias(Rule::sym("identifier"), "function_name", true)
        )
    );
}

#[test]
fn parse_precedence_variants() {
    let json = indoc! {r#"
    {
        "name": "test",
        "rules": {
            "a": { "type": "PREC", "value": 1, "content": { "type": "BLANK" } },
            "b": { "type": "PREC_LEFT", "value": "additive", "content": { "type": "BLANK" } },
            "c": { "type": "PREC_RIGHT", "value": -2, "content": { "type": "BLANK" } },
            "d": { "type": "PREC_DYNAMIC", "value": 3, "content": { "type": "BLANK" } }
        }
    }
    "#};

    let grammar = Grammar::from_json(json).unwrap();
    let bodies: Vec<_> = grammar.rules.iter().map(|r| r.body.clone()).collect();
    assert_eq!(
        bodies,
        [
            Rule::prec(1, Rule::blank()),
            Rule::prec_left("additive", Rule::blank()),
            Rule::prec_right(-2, Rule::blank()),
            Rule::prec_dynamic(3, Rule::blank()),
        ]
    );
}

#[test]
fn parse_tokens_and_repeats() {
    let json = indoc! {r#"
    {
        "name": "test",
        "rules": {
            "number": {
                "type": "TOKEN",
                "content": { "type": "REPEAT1", "content": { "type": "PATTERN", "value": "[0-9]" } }
            },
            "at": {
                "type": "IMMEDIATE_TOKEN",
                "content": { "type": "STRING", "value": "@" }
            },
            "list": { "type": "REPEAT", "content": { "type": "SYMBOL", "name": "number" } }
        }
    }
    "#};

    let grammar = Grammar::from_json(json).unwrap();
    assert_eq!(
        grammar.rules[0].body,
        Rule::token(Rule::repeat1(Rule::pattern("[0-9]")))
    );
    assert_eq!(grammar.rules[1].body, Rule::immediate_token(Rule::string("@")));
    assert_eq!(grammar.rules[2].body, Rule::repeat(Rule::sym("number")));
}

#[test]
fn reserved_content_is_transparent() {
    let json = indoc! {r#"
    {
        "name": "test",
        "rules": {
            "id": {
                "type": "RESERVED",
                "context_name": "properties",
                "content": { "type": "SYMBOL", "name": "identifier" }
            }
        }
    }
    "#};

    let grammar = Grammar::from_json(json).unwrap();
    assert_eq!(grammar.rules[0].body, Rule::sym("identifier"));
}

#[test]
fn top_level_reserved_sets_are_skipped() {
    let json = indoc! {r#"
    {
        "name": "test",
        "reserved": {
            "global": [{ "type": "STRING", "value": "if" }],
            "properties": []
        },
        "rules": {
            "program": { "type": "STRING", "value": "x" }
        }
    }
    "#};

    let grammar = Grammar::from_json(json).unwrap();
    assert_eq!(grammar.rules.len(), 1);
    assert_eq!(grammar.rules[0].body, Rule::string("x"));
}

#[test]
fn preserves_rule_order() {
    let json = r#"{
        "name": "test",
        "rules": {
            "program": { "type": "SYMBOL", "name": "statement" },
            "statement": { "type": "SYMBOL", "name": "expression" },
            "expression": { "type": "STRING", "value": "x" }
        }
    }"#;

    let grammar = Grammar::from_json(json).unwrap();

    // Entry rule should be first (program), not alphabetically sorted
    assert_eq!(grammar.rules[0].name, "program");
    assert_eq!(grammar.rules[1].name, "statement");
    assert_eq!(grammar.rules[2].name, "expression");
    assert_eq!(grammar.start_rule().unwrap().name, "program");
}

#[test]
fn keeps_duplicate_rule_names() {
    let json = r#"{
        "name": "test",
        "rules": {
            "foo": { "type": "STRING", "value": "a" },
            "foo": { "type": "STRING", "value": "b" }
        }
    }"#;

    let grammar = Grammar::from_json(json).unwrap();
    assert_eq!(grammar.rules.len(), 2);
    assert_eq!(grammar.rules[1].body, Rule::string("b"));
}

#[test]
fn hidden_flag_comes_from_prefix() {
    let json = r#"{
        "name": "test",
        "rules": {
            "program": { "type": "SYMBOL", "name": "_item" },
            "_item": { "type": "STRING", "value": "x" }
        }
    }"#;

    let grammar = Grammar::from_json(json).unwrap();
    assert!(!grammar.rules[0].hidden);
    assert!(grammar.rules[1].hidden);
}

#[test]
fn parse_declarations() {
    let json = indoc! {r#"
    {
        "name": "go",
        "word": "identifier",
        "rules": { "source_file": { "type": "BLANK" } },
        "extras": [{ "type": "PATTERN", "value": "\\s" }, { "type": "SYMBOL", "name": "comment" }],
        "conflicts": [["_type", "_expression"]],
        "externals": [{ "type": "SYMBOL", "name": "raw_string" }],
        "inline": ["_simple_type"],
        "supertypes": ["_expression"],
        "precedences": [[{ "type": "STRING", "value": "unary" }, { "type": "SYMBOL", "name": "binary" }]]
    }
    "#};

    let grammar = Grammar::from_json(json).unwrap();
    assert_eq!(grammar.word.as_deref(), Some("identifier"));
    assert_eq!(grammar.extras.len(), 2);
    assert_eq!(grammar.conflicts, [["_type", "_expression"]]);
    assert_eq!(grammar.externals, [Rule::sym("raw_string")]);
    assert_eq!(grammar.inline, ["_simple_type"]);
    assert_eq!(grammar.supertypes, ["_expression"]);
    assert_eq!(
        grammar.precedences,
        [[
            PrecedenceEntry::Name("unary".into()),
            PrecedenceEntry::Symbol("binary".into())
        ]]
    );
}

#[test]
fn unknown_rule_type_is_an_error() {
    let json = r#"{
        "name": "test",
        "rules": { "a": { "type": "LOOKAHEAD", "content": { "type": "BLANK" } } }
    }"#;

    let err = Grammar::from_json(json).unwrap_err();
    assert!(matches!(err, GrammarError::Json(_)));
}
