use indoc::indoc;
use seqex_automaton::{StateKind, dump};
use seqex_core::strings::StringEquals;
use seqex_core::{AnyElement, Attribute, Colors};

use crate::{CompileError, CompileOptions, Compiler, PatternExpr, compile};

type Expr = PatternExpr<&'static str>;

fn lit(s: &str) -> Expr {
    PatternExpr::node(StringEquals::new(Attribute::text(), s))
}

fn shot(expr: Expr) -> String {
    dump(&compile(&expr).unwrap(), Colors::OFF)
}

fn err(expr: Expr) -> CompileError {
    match compile(&expr) {
        Ok(_) => panic!("expected compile error for {expr}"),
        Err(e) => e,
    }
}

#[test]
fn compile_sequence() {
    insta::assert_snapshot!(shot(PatternExpr::seq([lit("a"), lit("b")])), @r#"
    >0  group-start 0 -> 1
     1  node text="a" -> 2
     2  node text="b" -> 3
     3  group-end 0 -> 4
     4  match
    "#);
}

#[test]
fn compile_capture_group() {
    assert_eq!(
        shot(PatternExpr::group(lit("a"))),
        indoc! {r#"
            >0  group-start 0 -> 1
             1  group-start 1 -> 2
             2  node text="a" -> 3
             3  group-end 1 -> 4
             4  group-end 0 -> 5
             5  match
        "#}
    );
}

#[test]
fn compile_star_unrolls_into_self_loop() {
    insta::assert_snapshot!(shot(PatternExpr::star(lit("a"))), @r#"
    >0  group-start 0 -> 1
     1  split -> 2, 3
     2  node text="a" -> 2, 3
     3  group-end 0 -> 4
     4  match
    "#);
}

#[test]
fn compile_lazy_plus_uses_counting_state() {
    let expr = PatternExpr::repeat(PatternExpr::group(lit("a")), 1, None, false);

    insta::assert_snapshot!(shot(expr), @r#"
    >0  group-start 0 -> 4
     1  group-start 1 -> 2
     2  node text="a" -> 3
     3  group-end 1 -> 4
     4  repeat {1,}? body 1 -> 5
     5  group-end 0 -> 6
     6  match
    "#);
}

#[test]
fn compile_conjunction() {
    insta::assert_snapshot!(shot(PatternExpr::and([lit("a"), lit("b")])), @r#"
    >0  group-start 0 -> 1
     1  conj-start -> 2, 4
     2  node text="a" -> 3
     3  conj-end 0 -> 6
     4  node text="b" -> 5
     5  conj-end 1 -> 6
     6  group-end 0 -> 7
     7  match
    "#);
}

#[test]
fn compile_bounded_repeat_unrolls_optional_copies() {
    let nfa = compile(&PatternExpr::repeat(lit("a"), 2, Some(3), true)).unwrap();
    let nodes = nfa
        .states()
        .iter()
        .filter(|s| matches!(s.kind, StateKind::Node(_)))
        .count();

    assert_eq!(nodes, 3);
    assert_eq!(nfa.slots().repeats, 0);
}

#[test]
fn compile_large_bounds_count_instead_of_unrolling() {
    let nfa = compile(&PatternExpr::repeat(lit("a"), 2, Some(8), true)).unwrap();

    assert_eq!(nfa.slots().repeats, 1);
    assert_eq!(nfa.len(), 5);
}

#[test]
fn compile_unroll_limit_is_configurable() {
    let compiler = Compiler::new(CompileOptions::new().unroll_limit(0));
    let nfa = compiler.compile(&PatternExpr::plus(lit("a"))).unwrap();

    assert_eq!(nfa.slots().repeats, 1);
}

#[test]
fn compile_exact_one_is_the_body() {
    let nfa = compile(&PatternExpr::repeat(lit("a"), 1, Some(1), false)).unwrap();

    assert_eq!(nfa.len(), 4);
}

#[test]
fn compile_records_group_names() {
    let expr = PatternExpr::seq([
        PatternExpr::named("$x", lit("a")),
        PatternExpr::group(lit("b")),
        PatternExpr::named("$y", lit("c")),
    ]);
    let nfa = compile(&expr).unwrap();

    assert_eq!(nfa.total_groups(), 3);
    assert_eq!(nfa.bindings().lookup("$y"), Some(3));
    assert_eq!(nfa.bindings().name(2), None);
}

#[test]
fn compile_errors() {
    let unclosed = PatternExpr::group(PatternExpr::seq([lit("a"), PatternExpr::backref(1)]));
    let errors = [
        err(PatternExpr::repeat(lit("a"), 3, Some(2), true)),
        err(PatternExpr::star(PatternExpr::optional(lit("a")))),
        err(PatternExpr::seq([PatternExpr::group(lit("a")), PatternExpr::backref(2)])),
        err(PatternExpr::backref(0)),
        err(unclosed),
        err(PatternExpr::or([])),
        err(PatternExpr::and([])),
    ];
    let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();

    insta::assert_snapshot!(messages.join("\n"), @r"
    invalid repeat bounds {3,2}: max is below min
    unbounded repeat over a pattern that can match empty
    back-reference to group 2, but the pattern has 1 groups
    back-reference to group 0, but the pattern has 0 groups
    back-reference to group 1 before that group closes
    `or` needs at least one operand
    `and` needs at least one operand
    ");
}

#[test]
fn compile_lazy_star_over_nullable_body_is_rejected() {
    let expr = PatternExpr::repeat(PatternExpr::seq([]), 0, None, false);

    assert_eq!(err(expr), CompileError::EmptyLoop);
}

#[test]
fn compile_bounded_repeat_over_nullable_body_is_allowed() {
    assert!(compile(&PatternExpr::repeat(PatternExpr::optional(lit("a")), 0, Some(9), true)).is_ok());
}

#[test]
fn compile_back_reference_needs_group_closed_on_every_path() {
    let group = || PatternExpr::group(lit("a"));
    let unclosed = CompileError::UnclosedBackReference { group: 1 };

    assert_eq!(err(PatternExpr::or([group(), PatternExpr::backref(1)])), unclosed);
    assert_eq!(err(PatternExpr::and([group(), PatternExpr::backref(1)])), unclosed);
    assert_eq!(
        err(PatternExpr::seq([PatternExpr::optional(group()), PatternExpr::backref(1)])),
        unclosed
    );
    assert_eq!(
        err(PatternExpr::seq([
            PatternExpr::or([group(), lit("b")]),
            PatternExpr::backref(1),
        ])),
        unclosed
    );

    let after_join = PatternExpr::seq([
        PatternExpr::and([group(), PatternExpr::node(AnyElement)]),
        PatternExpr::backref(1),
    ]);
    let after_plus = PatternExpr::seq([PatternExpr::plus(group()), PatternExpr::backref(1)]);
    assert!(compile(&after_join).is_ok());
    assert!(compile(&after_plus).is_ok());
}
