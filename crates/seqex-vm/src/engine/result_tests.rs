use std::sync::Arc;

use seqex_compiler::{PatternExpr, compile};
use seqex_core::strings::StringEquals;
use seqex_core::{Attribute, AttributeRender, Value};

use super::error::MatchError;
use super::result::{GroupRef, MatchResult, MatchSnapshot, MatchedGroup};
use super::vm::{SearchMode, VM};

type Expr = PatternExpr<&'static str>;

fn lit(s: &str) -> Expr {
    PatternExpr::node(StringEquals::new(Attribute::text(), s))
}

/// `(?who a) (z)?` found at position 1 of `x a b c`.
fn found<'e>(input: &'e [&'static str]) -> MatchResult<'e, &'static str> {
    let expr = PatternExpr::seq([
        PatternExpr::named("who", PatternExpr::value(lit("a"), "A")),
        PatternExpr::optional(PatternExpr::group(lit("z"))),
    ]);
    let nfa = compile(&expr).unwrap();
    let accepted = VM::builder(&nfa, input)
        .build()
        .execute(1, SearchMode::Preferred)
        .unwrap()
        .remove(0);
    MatchResult::new(input, accepted, Arc::new(nfa.bindings().clone()))
}

const INPUT: [&str; 4] = ["x", "a", "b", "c"];

#[test]
fn spans_by_index_and_name() {
    let result = found(&INPUT);

    assert_eq!(result.group_count(), 2);
    assert_eq!(result.span(0).unwrap(), Some(1..2));
    assert_eq!(result.span("who").unwrap(), Some(1..2));
    assert_eq!(result.span(2).unwrap(), None);
    assert_eq!(result.start("who").unwrap(), Some(1));
    assert_eq!(result.end(0).unwrap(), Some(2));
}

#[test]
fn pseudo_groups_cover_outside_the_match() {
    let result = found(&INPUT);

    assert_eq!(result.span(GroupRef::BeforeMatch).unwrap(), Some(0..1));
    assert_eq!(result.span(GroupRef::AfterMatch).unwrap(), Some(2..4));
    assert_eq!(
        result.group(GroupRef::AfterMatch).unwrap().as_deref(),
        Some("b c")
    );
    assert_eq!(result.group_value(GroupRef::BeforeMatch).unwrap(), None);
}

#[test]
fn bad_group_references() {
    let result = found(&INPUT);

    insta::assert_snapshot!(result.span(3).unwrap_err(), @"no group 3: the pattern has 2 groups");
    assert_eq!(
        result.group("nobody").unwrap_err(),
        MatchError::UnknownVariable("nobody".into())
    );
}

#[test]
fn group_text_and_value() {
    let result = found(&INPUT);

    assert_eq!(result.group("who").unwrap().as_deref(), Some("a"));
    assert_eq!(result.group_nodes(0).unwrap(), Some(&["a"][..]));
    assert_eq!(result.group_value("who").unwrap(), Some(&Value::from("A")));
    assert_eq!(result.group(2).unwrap(), None);
    assert_eq!(result.variables().collect::<Vec<_>>(), vec![("who", 1)]);
}

#[test]
fn renderer_overrides_display() {
    let result = found(&INPUT).with_renderer(Some(Arc::new(AttributeRender::new(
        Attribute::<&'static str>::new("upper", |_| Some("A")),
    ))));

    assert_eq!(result.group(0).unwrap().as_deref(), Some("A"));
}

#[test]
fn into_owned_outlives_input() {
    let owned = {
        let input = INPUT.to_vec();
        found(&input).into_owned()
    };

    assert_eq!(owned.elements().len(), 4);
    assert_eq!(owned.group("who").unwrap().as_deref(), Some("a"));
}

#[test]
fn snapshot_roundtrips_through_postcard() {
    let result = found(&INPUT).with_metadata(2.0, 0.5);
    let snapshot = result.snapshot();

    let bytes = snapshot.to_bytes().unwrap();
    let decoded: MatchSnapshot<String> = MatchSnapshot::from_bytes(&bytes).unwrap();
    assert_eq!(decoded.elements, vec!["x", "a", "b", "c"]);
    assert_eq!(decoded.groups, snapshot.groups);

    let restored = MatchResult::from(decoded);
    assert_eq!(restored.span("who").unwrap(), Some(1..2));
    assert_eq!(restored.priority(), 2.0);
    assert_eq!(restored.score(), 0.5);
}

#[test]
fn matched_group_json() {
    let group = MatchedGroup {
        begin: 1,
        end: 3,
        value: Some(Value::Int(7)),
    };

    insta::assert_snapshot!(
        serde_json::to_string(&group).unwrap(),
        @r#"{"begin":1,"end":3,"value":{"Int":7}}"#
    );
}

#[test]
fn node_results_per_group() {
    #[derive(Debug)]
    struct Upper;

    impl seqex_core::ElementPredicate<&'static str> for Upper {
        fn test(&self, _element: &&'static str) -> bool {
            true
        }

        fn test_with_result(&self, element: &&'static str) -> Option<Value> {
            Some(Value::from(element.to_uppercase()))
        }
    }

    let expr = PatternExpr::seq([lit("x"), PatternExpr::group(PatternExpr::node(Upper))]);
    let nfa = compile(&expr).unwrap();
    let input = ["x", "y"];
    let accepted = VM::builder(&nfa, &input)
        .match_with_result(true)
        .build()
        .execute(0, SearchMode::Preferred)
        .unwrap()
        .remove(0);
    let result = MatchResult::new(&input, accepted, Arc::new(nfa.bindings().clone()));

    assert_eq!(result.node_match_result(0), None);
    assert_eq!(result.node_match_result(1), Some(&Value::from("Y")));
    assert_eq!(
        result.group_match_results(1).unwrap(),
        Some(vec![Some(&Value::from("Y"))])
    );
}
