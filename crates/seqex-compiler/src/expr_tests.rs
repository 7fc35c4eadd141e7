use seqex_core::strings::{StringEquals, StringSeqInSet};
use seqex_core::{Attribute, Value};

use crate::PatternExpr;

type Expr = PatternExpr<&'static str>;

fn lit(s: &str) -> Expr {
    PatternExpr::node(StringEquals::new(Attribute::text(), s))
}

#[test]
fn group_ids_follow_preorder() {
    // ((a) (?:b) (c)) | (d)
    let expr = PatternExpr::or([
        PatternExpr::group(PatternExpr::seq([
            PatternExpr::group(lit("a")),
            PatternExpr::non_capturing(lit("b")),
            PatternExpr::named("$c", lit("c")),
        ])),
        PatternExpr::named("$d", lit("d")),
    ]);

    assert_eq!(expr.assign_group_ids(1), 5);
    assert_eq!(expr.capture_count(), 4);
    assert_eq!(
        expr.group_names(),
        vec![None, None, Some("$c".to_owned()), Some("$d".to_owned())]
    );
}

#[test]
fn nullability() {
    assert!(!lit("a").is_nullable());
    assert!(PatternExpr::optional(lit("a")).is_nullable());
    assert!(PatternExpr::<&str>::seq([]).is_nullable());
    assert!(PatternExpr::or([lit("a"), PatternExpr::seq_start()]).is_nullable());
    assert!(!PatternExpr::and([lit("a"), PatternExpr::star(lit("b"))]).is_nullable());
    assert!(PatternExpr::<&'static str>::backref(1).is_nullable());
    assert!(!PatternExpr::multi_node(StringSeqInSet::new(Attribute::<&str>::text(), vec![vec!["x"]], false)).is_nullable());
    assert!(PatternExpr::value(PatternExpr::star(lit("a")), 1_i64).is_nullable());
}

#[test]
fn display_renders_pattern_text() {
    let expr = PatternExpr::seq([
        PatternExpr::seq_start(),
        PatternExpr::named("$who", PatternExpr::plus(lit("a"))),
        PatternExpr::or([lit("b"), lit("c")]),
        PatternExpr::repeat(PatternExpr::seq([lit("d"), lit("e")]), 2, Some(3), false),
        PatternExpr::non_capturing(PatternExpr::optional(lit("f"))),
        PatternExpr::backref(1),
        PatternExpr::seq_end(),
    ]);

    insta::assert_snapshot!(
        expr.to_string(),
        @r#"^ (?$who text="a"+) (?:text="b" | text="c") (?:text="d" text="e"){2,3}? (?:text="f"?) \1 $"#
    );
}

#[test]
fn display_edge_cases() {
    assert_eq!(PatternExpr::<&str>::seq([]).to_string(), "(?:)");
    assert_eq!(PatternExpr::repeat(lit("a"), 3, Some(3), true).to_string(), r#"text="a"{3}"#);
    assert_eq!(PatternExpr::repeat(lit("a"), 2, None, true).to_string(), r#"text="a"{2,}"#);
    assert_eq!(PatternExpr::and([lit("a"), lit("b")]).to_string(), r#"text="a" & text="b""#);
    assert_eq!(
        PatternExpr::value(PatternExpr::group(lit("a")), Value::Int(1)).to_string(),
        r#"(text="a")"#
    );
}

#[test]
fn clone_shares_predicates() {
    let expr = PatternExpr::seq([lit("a"), PatternExpr::backref(1)]);
    let copy = expr.clone();

    assert_eq!(copy.to_string(), expr.to_string());
}
