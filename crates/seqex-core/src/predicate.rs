//! Element-level contracts consumed by compiled patterns.

use std::fmt;
use std::sync::Arc;

use crate::attribute::{Attribute, StringLiteral};
use crate::value::Value;

/// Tests a single element.
pub trait ElementPredicate<T>: fmt::Debug + Send + Sync {
    fn test(&self, element: &T) -> bool;

    /// Like [`test`](Self::test) but may return a payload for the element.
    ///
    /// `None` means no match. `Some(Value::Null)` is a match without payload.
    fn test_with_result(&self, element: &T) -> Option<Value> {
        self.test(element).then_some(Value::Null)
    }

    /// Describes this predicate as a string literal comparison, if it is one.
    fn as_string_literal(&self) -> Option<StringLiteral<'_, T>> {
        None
    }
}

/// A candidate span `[start, end)` produced by a [`MultiElementPredicate`].
#[derive(Clone, Debug, PartialEq)]
pub struct Interval {
    pub start: usize,
    pub end: usize,
    pub value: Option<Value>,
}

impl Interval {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Matches spans of several elements at once.
pub trait MultiElementPredicate<T>: fmt::Debug + Send + Sync {
    /// Every span starting at `start` that this predicate accepts.
    fn match_from(&self, elements: &[T], start: usize) -> Vec<Interval>;

    /// Greedy predicates try longer spans first.
    fn is_greedy(&self) -> bool {
        true
    }
}

/// Element equality used when replaying a back-reference.
pub trait ElementEq<T>: fmt::Debug + Send + Sync {
    fn equals(&self, a: &T, b: &T) -> bool;
}

/// Renders a slice of elements as text.
pub trait Render<T>: Send + Sync {
    fn render(&self, elements: &[T]) -> String;
}

/// Matches any element.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyElement;

impl<T> ElementPredicate<T> for AnyElement {
    fn test(&self, _element: &T) -> bool {
        true
    }
}

/// Adapts a closure into an [`ElementPredicate`].
#[derive(Clone)]
pub struct PredicateFn<T> {
    name: &'static str,
    test: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> PredicateFn<T> {
    pub fn new(name: &'static str, test: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self {
            name,
            test: Arc::new(test),
        }
    }
}

impl<T> fmt::Debug for PredicateFn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}()", self.name)
    }
}

impl<T> ElementPredicate<T> for PredicateFn<T> {
    fn test(&self, element: &T) -> bool {
        (self.test)(element)
    }
}

/// Equality through `PartialEq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Equal;

impl<T: PartialEq> ElementEq<T> for Equal {
    fn equals(&self, a: &T, b: &T) -> bool {
        a == b
    }
}

/// Equality of selected attributes. Elements agree when every attribute reads
/// the same value (including both missing).
pub struct AttributeEq<T> {
    attributes: Vec<Attribute<T>>,
}

impl<T> AttributeEq<T> {
    pub fn new(attributes: Vec<Attribute<T>>) -> Self {
        Self { attributes }
    }
}

impl<T> fmt::Debug for AttributeEq<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.attributes).finish()
    }
}

impl<T> ElementEq<T> for AttributeEq<T> {
    fn equals(&self, a: &T, b: &T) -> bool {
        self.attributes
            .iter()
            .all(|attr| attr.get(a) == attr.get(b))
    }
}

/// Joins element `Display` output with single spaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct JoinWithSpace;

impl<T: fmt::Display> Render<T> for JoinWithSpace {
    fn render(&self, elements: &[T]) -> String {
        let mut out = String::new();
        for (i, element) in elements.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(&element.to_string());
        }
        out
    }
}

/// Joins one attribute of each element with single spaces. Elements missing
/// the attribute are skipped.
pub struct AttributeRender<T> {
    attribute: Attribute<T>,
}

impl<T> AttributeRender<T> {
    pub fn new(attribute: Attribute<T>) -> Self {
        Self { attribute }
    }
}

impl<T> Render<T> for AttributeRender<T> {
    fn render(&self, elements: &[T]) -> String {
        elements
            .iter()
            .filter_map(|e| self.attribute.get(e))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
