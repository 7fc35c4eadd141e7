//! Named string views of elements.

use std::fmt;

/// A named accessor that reads a string attribute off an element.
///
/// Built-in string predicates compare through an attribute, and the
/// optimizer only merges literals that read the same attribute key.
pub struct Attribute<T> {
    key: &'static str,
    get: fn(&T) -> Option<&str>,
}

impl<T> Attribute<T> {
    pub const fn new(key: &'static str, get: fn(&T) -> Option<&str>) -> Self {
        Self { key, get }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Reads the attribute; `None` when the element does not carry it.
    pub fn get<'e>(&self, element: &'e T) -> Option<&'e str> {
        (self.get)(element)
    }
}

fn as_text<T: AsRef<str>>(element: &T) -> Option<&str> {
    Some(element.as_ref())
}

impl<T: AsRef<str>> Attribute<T> {
    /// The element's own text, for elements that are strings.
    pub fn text() -> Self {
        Self::new("text", as_text::<T>)
    }
}

impl<T> Clone for Attribute<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Attribute<T> {}

impl<T> PartialEq for Attribute<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for Attribute<T> {}

impl<T> fmt::Debug for Attribute<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key)
    }
}

/// A predicate's self-description as a plain string comparison.
///
/// Returned by [`ElementPredicate::as_string_literal`](crate::ElementPredicate::as_string_literal)
/// so the optimizer can fold alternations of literals into set lookups.
pub struct StringLiteral<'p, T> {
    pub attribute: Attribute<T>,
    pub target: &'p str,
    pub ignore_case: bool,
}
