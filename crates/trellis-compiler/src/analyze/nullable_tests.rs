use indexmap::IndexMap;

use trellis_core::Rule;

use super::nullable::{nullable_rules, rule_nullable};
use super::pattern::pattern_matches_empty;

fn never(_: &str) -> bool {
    false
}

#[test]
fn terminals() {
    assert!(rule_nullable(&Rule::string(""), &never));
    assert!(!rule_nullable(&Rule::string("a"), &never));
    assert!(rule_nullable(&Rule::pattern("a*"), &never));
    assert!(!rule_nullable(&Rule::pattern("[0-9]+"), &never));
}

#[test]
fn combinators() {
    let a = Rule::string("a");
    assert!(rule_nullable(&Rule::blank(), &never));
    assert!(rule_nullable(&Rule::optional(a.clone()), &never));
    assert!(rule_nullable(&Rule::repeat(a.clone()), &never));
    assert!(!rule_nullable(&Rule::repeat1(a.clone()), &never));
    assert!(rule_nullable(&Rule::repeat1(Rule::optional(a.clone())), &never));
    assert!(!rule_nullable(
        &Rule::seq([Rule::optional(a.clone()), a.clone()]),
        &never
    ));
    assert!(rule_nullable(&Rule::choice([a.clone(), Rule::blank()]), &never));
    assert!(!rule_nullable(&Rule::token(a), &never));
}

#[test]
fn patterns_respect_flags() {
    assert!(!pattern_matches_empty("abc", Some("i")));
    assert!(pattern_matches_empty("(abc)?", Some("i")));
    // Unparseable patterns never count as empty.
    assert!(!pattern_matches_empty("(", None));
}

#[test]
fn fixpoint_follows_references() {
    let bodies: IndexMap<String, Rule> = [
        ("list", Rule::seq([Rule::sym("item"), Rule::sym("rest")])),
        ("item", Rule::optional(Rule::string("x"))),
        ("rest", Rule::repeat(Rule::sym("item"))),
        ("left", Rule::seq([Rule::sym("left"), Rule::string("+")])),
    ]
    .into_iter()
    .map(|(n, r)| (n.to_string(), r))
    .collect();

    let nullable = nullable_rules(&bodies);
    assert!(nullable.contains("list"));
    assert!(nullable.contains("item"));
    assert!(nullable.contains("rest"));
    assert!(!nullable.contains("left"));
}
