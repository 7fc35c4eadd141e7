use crate::{
    AnyElement, Attribute, AttributeEq, AttributeRender, ElementEq, ElementPredicate, Equal,
    Interval, JoinWithSpace, PredicateFn, Render, Value,
};

#[derive(Debug, PartialEq)]
struct Token {
    word: &'static str,
    tag: &'static str,
}

fn word(t: &Token) -> Option<&str> {
    Some(t.word)
}

fn tag(t: &Token) -> Option<&str> {
    if t.tag.is_empty() { None } else { Some(t.tag) }
}

#[test]
fn default_test_with_result_is_null_payload() {
    let even = PredicateFn::new("even", |n: &i32| n % 2 == 0);

    assert_eq!(even.test_with_result(&4), Some(Value::Null));
    assert_eq!(even.test_with_result(&3), None);
    assert!(even.as_string_literal().is_none());
    assert_eq!(format!("{even:?}"), "even()");
}

#[test]
fn any_element_accepts_everything() {
    assert!(ElementPredicate::<i32>::test(&AnyElement, &0));
    assert!(ElementPredicate::<&str>::test(&AnyElement, &""));
}

#[test]
fn attribute_eq_compares_selected_attributes() {
    let eq = AttributeEq::new(vec![Attribute::new("word", word)]);
    let a = Token { word: "run", tag: "VB" };
    let b = Token { word: "run", tag: "NN" };
    let c = Token { word: "ran", tag: "VB" };

    assert!(eq.equals(&a, &b));
    assert!(!eq.equals(&a, &c));
    assert!(!Equal.equals(&a, &b));
}

#[test]
fn attribute_eq_treats_missing_as_equal() {
    let eq = AttributeEq::new(vec![Attribute::new("tag", tag)]);
    let a = Token { word: "x", tag: "" };
    let b = Token { word: "y", tag: "" };

    assert!(eq.equals(&a, &b));
}

#[test]
fn renderers() {
    let tokens = [
        Token { word: "New", tag: "NNP" },
        Token { word: "York", tag: "" },
    ];
    let by_tag = AttributeRender::new(Attribute::new("tag", tag));

    assert_eq!(by_tag.render(&tokens), "NNP");
    assert_eq!(JoinWithSpace.render(&[1, 2, 3][..]), "1 2 3");
    assert_eq!(Render::<i32>::render(&JoinWithSpace, &[]), "");
}

#[test]
fn interval_length() {
    let iv = Interval::new(2, 5).with_value("x");

    assert_eq!(iv.len(), 3);
    assert!(!iv.is_empty());
    assert_eq!(iv.value, Some(Value::from("x")));
    assert!(Interval::new(3, 3).is_empty());
}
