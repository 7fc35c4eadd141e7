use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use seqex_automaton::Nfa;
use seqex_compiler::{PatternExpr, compile};
use seqex_core::strings::{StringEquals, StringSeqInSet};
use seqex_core::{
    AnyElement, Attribute, ElementPredicate, Interval, MultiElementPredicate, Value,
};

use super::error::MatchError;
use super::vm::{Accepted, SearchMode, VM};

type Expr = PatternExpr<&'static str>;

fn lit(s: &str) -> Expr {
    PatternExpr::node(StringEquals::new(Attribute::text(), s))
}

fn any() -> Expr {
    PatternExpr::node(AnyElement)
}

fn nfa(expr: &Expr) -> Nfa<&'static str> {
    compile(expr).unwrap()
}

fn run(expr: &Expr, input: &[&'static str], mode: SearchMode) -> Vec<Accepted> {
    let nfa = nfa(expr);
    VM::builder(&nfa, input).build().execute(0, mode).unwrap()
}

fn spans(expr: &Expr, input: &[&'static str], mode: SearchMode) -> Vec<Range<usize>> {
    run(expr, input, mode).iter().map(Accepted::span).collect()
}

/// Span of the most preferred match.
fn best(expr: &Expr, input: &[&'static str]) -> Option<Range<usize>> {
    run(expr, input, SearchMode::Preferred)
        .first()
        .map(Accepted::span)
}

fn groups(accepted: &Accepted) -> Vec<Option<Range<usize>>> {
    accepted
        .groups
        .iter()
        .map(|g| g.as_ref().map(|g| g.span()))
        .collect()
}

#[test]
fn sequence_with_plus() {
    let expr = PatternExpr::seq([lit("a"), PatternExpr::plus(lit("b")), lit("c")]);

    assert_eq!(best(&expr, &["a", "b", "b", "c"]), Some(0..4));
    assert_eq!(best(&expr, &["a", "c"]), None);
}

#[test]
fn capture_groups() {
    let expr = PatternExpr::seq([PatternExpr::group(lit("a")), PatternExpr::group(lit("b"))]);
    let accepted = run(&expr, &["a", "b"], SearchMode::Preferred);

    assert_eq!(
        groups(&accepted[0]),
        vec![Some(0..2), Some(0..1), Some(1..2)]
    );
}

#[test]
fn greedy_bounded_repeat_takes_most() {
    let expr = PatternExpr::repeat(lit("a"), 2, Some(3), true);

    assert_eq!(best(&expr, &["a", "a", "a", "a"]), Some(0..3));
    assert_eq!(best(&expr, &["a", "b"]), None);
}

#[test]
fn greedy_star_ranks_longer_first() {
    let expr = PatternExpr::star(lit("a"));

    assert_eq!(
        spans(&expr, &["a", "a"], SearchMode::Exhaustive),
        vec![0..2, 0..1, 0..0]
    );
}

#[test]
fn lazy_plus_ranks_shorter_first() {
    let expr = PatternExpr::repeat(lit("a"), 1, None, false);
    let input = ["a", "a", "a"];

    assert_eq!(best(&expr, &input), Some(0..1));
    assert_eq!(
        spans(&expr, &input, SearchMode::Exhaustive),
        vec![0..1, 0..2, 0..3]
    );
}

#[test]
fn earlier_alternative_wins() {
    let expr = PatternExpr::or([lit("a"), PatternExpr::seq([lit("a"), lit("b")])]);

    assert_eq!(best(&expr, &["a", "b"]), Some(0..1));
    assert_eq!(
        spans(&expr, &["a", "b"], SearchMode::Exhaustive),
        vec![0..1, 0..2]
    );
}

#[test]
fn earliest_stops_at_first_accept() {
    let expr = PatternExpr::or([PatternExpr::seq([lit("a"), lit("b")]), lit("a")]);

    assert_eq!(spans(&expr, &["a", "b"], SearchMode::Earliest), vec![0..1]);
    assert_eq!(best(&expr, &["a", "b"]), Some(0..2));
}

#[test]
fn skip_empty_keeps_searching_past_the_start() {
    let expr = PatternExpr::star(lit("a"));
    let nfa = nfa(&expr);
    let input = ["a", "a"];
    let earliest = |skip| {
        VM::builder(&nfa, &input)
            .skip_empty(skip)
            .build()
            .execute(0, SearchMode::Earliest)
            .unwrap()
            .iter()
            .map(Accepted::span)
            .collect::<Vec<_>>()
    };

    assert_eq!(earliest(false), vec![0..0]);
    assert_eq!(earliest(true), vec![0..1]);
}

#[test]
fn backref_replays_group() {
    let expr = PatternExpr::seq([PatternExpr::group(lit("a")), PatternExpr::backref(1)]);

    assert_eq!(best(&expr, &["a", "a"]), Some(0..2));
    assert_eq!(best(&expr, &["a", "b"]), None);
}

#[test]
fn backref_replays_several_elements() {
    let expr = PatternExpr::seq([
        PatternExpr::group(PatternExpr::seq([any(), any()])),
        PatternExpr::backref(1),
    ]);

    assert_eq!(best(&expr, &["x", "y", "x", "y"]), Some(0..4));
    assert_eq!(best(&expr, &["x", "y", "y", "x"]), None);
}

#[test]
fn backref_to_empty_group_passes() {
    let expr = PatternExpr::seq([
        PatternExpr::group(PatternExpr::optional(lit("a"))),
        PatternExpr::backref(1),
        lit("b"),
    ]);

    assert_eq!(best(&expr, &["b"]), Some(0..1));
}

#[test]
fn conjunction_requires_same_span() {
    let expr = PatternExpr::and([
        PatternExpr::seq([lit("a"), any()]),
        PatternExpr::seq([any(), lit("b")]),
    ]);

    assert_eq!(best(&expr, &["a", "b"]), Some(0..2));
    assert_eq!(best(&expr, &["a", "c"]), None);
}

#[test]
fn conjunction_keeps_captures_of_every_conjunct() {
    let expr = PatternExpr::and([
        PatternExpr::group(PatternExpr::seq([lit("a"), lit("b")])),
        PatternExpr::seq([lit("a"), PatternExpr::group(lit("b"))]),
    ]);
    let accepted = run(&expr, &["a", "b"], SearchMode::Preferred);

    assert_eq!(
        groups(&accepted[0]),
        vec![Some(0..2), Some(0..2), Some(1..2)]
    );
}

#[test]
fn multi_node_falls_back_to_shorter_interval() {
    let multi = StringSeqInSet::new(Attribute::<&str>::text(), vec![vec!["b", "c"], vec!["b"]], false);
    let expr = PatternExpr::seq([PatternExpr::multi_node(multi), lit("c"), lit("d")]);

    assert_eq!(best(&expr, &["b", "c", "d"]), Some(0..3));
}

#[derive(Debug)]
struct Pairs;

impl MultiElementPredicate<&'static str> for Pairs {
    fn match_from(&self, elements: &[&'static str], start: usize) -> Vec<Interval> {
        let mut out = vec![Interval::new(start, start)];
        if start + 2 <= elements.len() {
            out.push(Interval::new(start, start + 2).with_value("pair"));
        }
        out
    }
}

#[test]
fn multi_node_interval_value_reaches_group() {
    let expr = PatternExpr::group(PatternExpr::multi_node(Pairs));
    let accepted = run(&expr, &["x", "y", "z"], SearchMode::Preferred);

    let group = accepted[0].groups[1].as_ref().unwrap();
    assert_eq!(group.span(), 0..2);
    assert_eq!(group.value, Some(Value::from("pair")));
}

#[test]
fn value_tag_attaches_to_enclosing_group() {
    let expr = PatternExpr::group(PatternExpr::value(lit("a"), "A"));
    let accepted = run(&expr, &["a"], SearchMode::Preferred);

    assert_eq!(
        accepted[0].groups[1].as_ref().unwrap().value,
        Some(Value::from("A"))
    );
    assert_eq!(accepted[0].groups[0].as_ref().unwrap().value, None);
}

#[test]
fn anchors_use_absolute_positions() {
    let start = PatternExpr::seq([PatternExpr::seq_start(), lit("a")]);
    let end = PatternExpr::seq([lit("a"), PatternExpr::seq_end()]);
    let input = ["a", "a"];

    let start_nfa = nfa(&start);
    let mut vm = VM::builder(&start_nfa, &input).build();
    assert_eq!(vm.execute(0, SearchMode::Preferred).unwrap().len(), 1);
    assert!(vm.execute(1, SearchMode::Preferred).unwrap().is_empty());

    let end_nfa = nfa(&end);
    let mut vm = VM::builder(&end_nfa, &input).build();
    assert!(vm.execute(0, SearchMode::Preferred).unwrap().is_empty());
    assert_eq!(vm.execute(1, SearchMode::Preferred).unwrap()[0].span(), 1..2);
}

#[test]
fn region_end_stops_consumption() {
    let expr = PatternExpr::seq([lit("a"), lit("a")]);
    let nfa = nfa(&expr);
    let input = ["a", "a"];

    let found = VM::builder(&nfa, &input)
        .region_end(1)
        .build()
        .execute(0, SearchMode::Preferred)
        .unwrap();
    assert!(found.is_empty());
}

#[test]
fn exec_fuel_is_enforced() {
    let expr = PatternExpr::seq([lit("a"), lit("b"), lit("c")]);
    let nfa = nfa(&expr);
    let input = ["a", "b", "c"];

    let err = VM::builder(&nfa, &input)
        .exec_fuel(3)
        .build()
        .execute(0, SearchMode::Preferred)
        .unwrap_err();
    assert_eq!(err, MatchError::ExecFuelExhausted(3));
}

#[test]
fn exec_fuel_is_shared_across_searches() {
    let expr = lit("a");
    let nfa = nfa(&expr);
    let input = ["a", "a"];
    let mut vm = VM::builder(&nfa, &input).exec_fuel(100).build();

    vm.execute(0, SearchMode::Preferred).unwrap();
    let after_first = vm.remaining_fuel();
    vm.execute(1, SearchMode::Preferred).unwrap();

    assert!(after_first < 100);
    assert!(vm.remaining_fuel() < after_first);
}

#[test]
fn branch_limit_is_enforced() {
    let expr = PatternExpr::or([lit("a"), lit("b"), lit("c")]);
    let nfa = nfa(&expr);
    let input = ["a"];

    let err = VM::builder(&nfa, &input)
        .branch_limit(2)
        .build()
        .execute(0, SearchMode::Exhaustive)
        .unwrap_err();
    assert_eq!(err, MatchError::BranchLimitExceeded(2));
}

#[test]
fn cancel_flag_aborts() {
    let expr = lit("a");
    let nfa = nfa(&expr);
    let input = ["a"];
    let flag = Arc::new(AtomicBool::new(true));

    let err = VM::builder(&nfa, &input)
        .cancel_flag(flag)
        .build()
        .execute(0, SearchMode::Preferred)
        .unwrap_err();
    assert_eq!(err, MatchError::Cancelled);
}

#[derive(Debug)]
struct Length;

impl ElementPredicate<&'static str> for Length {
    fn test(&self, _element: &&'static str) -> bool {
        true
    }

    fn test_with_result(&self, element: &&'static str) -> Option<Value> {
        Some(Value::Int(element.len() as i64))
    }
}

#[test]
fn match_with_result_records_node_payloads() {
    let expr = PatternExpr::seq([PatternExpr::node(Length), lit("b")]);
    let nfa = nfa(&expr);
    let input = ["abc", "b"];

    let with = VM::builder(&nfa, &input)
        .match_with_result(true)
        .build()
        .execute(0, SearchMode::Preferred)
        .unwrap();
    assert_eq!(with[0].node_results, vec![(0, Value::Int(3))]);

    let without = VM::builder(&nfa, &input)
        .build()
        .execute(0, SearchMode::Preferred)
        .unwrap();
    assert!(without[0].node_results.is_empty());
}
