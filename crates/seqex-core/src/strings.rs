//! Built-in predicates over string attributes.
//!
//! All comparisons go through an [`Attribute`]. Case-insensitive variants fold
//! both sides with `to_lowercase` once at construction time.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexSet;
use regex_automata::dfa::{Automaton, StartKind, dense};
use regex_automata::{Anchored, Input};

use crate::attribute::{Attribute, StringLiteral};
use crate::error::PredicateError;
use crate::predicate::{ElementPredicate, Interval, MultiElementPredicate};

fn fold(s: &str, ignore_case: bool) -> String {
    if ignore_case {
        s.to_lowercase()
    } else {
        s.to_owned()
    }
}

/// Attribute equals a fixed string.
pub struct StringEquals<T> {
    attribute: Attribute<T>,
    target: String,
    folded: String,
    ignore_case: bool,
}

impl<T> StringEquals<T> {
    pub fn new(attribute: Attribute<T>, target: impl Into<String>) -> Self {
        Self::with_case(attribute, target, false)
    }

    pub fn ignore_case(attribute: Attribute<T>, target: impl Into<String>) -> Self {
        Self::with_case(attribute, target, true)
    }

    fn with_case(attribute: Attribute<T>, target: impl Into<String>, ignore_case: bool) -> Self {
        let target = target.into();
        Self {
            attribute,
            folded: fold(&target, ignore_case),
            target,
            ignore_case,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl<T> fmt::Debug for StringEquals<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}={:?}", self.attribute, self.target)?;
        if self.ignore_case {
            f.write_str("/i")?;
        }
        Ok(())
    }
}

impl<T> ElementPredicate<T> for StringEquals<T> {
    fn test(&self, element: &T) -> bool {
        match self.attribute.get(element) {
            Some(s) if self.ignore_case => s.to_lowercase() == self.folded,
            Some(s) => s == self.target,
            None => false,
        }
    }

    fn as_string_literal(&self) -> Option<StringLiteral<'_, T>> {
        Some(StringLiteral {
            attribute: self.attribute,
            target: &self.target,
            ignore_case: self.ignore_case,
        })
    }
}

/// Attribute is one of a set of strings.
pub struct StringInSet<T> {
    attribute: Attribute<T>,
    values: IndexSet<String>,
    ignore_case: bool,
}

impl<T> StringInSet<T> {
    pub fn new<I, S>(attribute: Attribute<T>, values: I, ignore_case: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            attribute,
            values: values
                .into_iter()
                .map(|s| fold(s.as_ref(), ignore_case))
                .collect(),
            ignore_case,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T> fmt::Debug for StringInSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} in ", self.attribute)?;
        f.debug_set().entries(&self.values).finish()?;
        if self.ignore_case {
            f.write_str("/i")?;
        }
        Ok(())
    }
}

impl<T> ElementPredicate<T> for StringInSet<T> {
    fn test(&self, element: &T) -> bool {
        match self.attribute.get(element) {
            Some(s) if self.ignore_case => self.values.contains(&s.to_lowercase()),
            Some(s) => self.values.contains(s),
            None => false,
        }
    }
}

/// A run of consecutive elements whose attributes spell one of a set of
/// string sequences.
pub struct StringSeqInSet<T> {
    attribute: Attribute<T>,
    by_len: BTreeMap<usize, IndexSet<Vec<String>>>,
    ignore_case: bool,
}

impl<T> StringSeqInSet<T> {
    /// Empty sequences are ignored: they can never form an interval.
    pub fn new<I, S>(attribute: Attribute<T>, sequences: I, ignore_case: bool) -> Self
    where
        I: IntoIterator<Item = Vec<S>>,
        S: AsRef<str>,
    {
        let mut by_len: BTreeMap<usize, IndexSet<Vec<String>>> = BTreeMap::new();
        for seq in sequences {
            if seq.is_empty() {
                continue;
            }
            let folded: Vec<String> = seq.iter().map(|s| fold(s.as_ref(), ignore_case)).collect();
            by_len.entry(folded.len()).or_default().insert(folded);
        }
        Self {
            attribute,
            by_len,
            ignore_case,
        }
    }

    pub fn len(&self) -> usize {
        self.by_len.values().map(IndexSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_len.is_empty()
    }
}

impl<T> fmt::Debug for StringSeqInSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} in ", self.attribute)?;
        f.debug_set()
            .entries(self.by_len.values().flat_map(|seqs| seqs.iter()))
            .finish()?;
        if self.ignore_case {
            f.write_str("/i")?;
        }
        Ok(())
    }
}

impl<T> MultiElementPredicate<T> for StringSeqInSet<T> {
    fn match_from(&self, elements: &[T], start: usize) -> Vec<Interval> {
        let mut intervals = Vec::new();
        for (&len, seqs) in &self.by_len {
            let end = start + len;
            if end > elements.len() {
                break;
            }
            let Some(words) = elements[start..end]
                .iter()
                .map(|e| self.attribute.get(e).map(|s| fold(s, self.ignore_case)))
                .collect::<Option<Vec<_>>>()
            else {
                continue;
            };
            if seqs.contains(&words) {
                intervals.push(Interval::new(start, end));
            }
        }
        intervals
    }
}

/// Attribute fully matches a regular expression.
pub struct StringMatches<T> {
    attribute: Attribute<T>,
    pattern: String,
    dfa: dense::DFA<Vec<u32>>,
}

impl<T> StringMatches<T> {
    pub fn new(attribute: Attribute<T>, pattern: &str) -> Result<Self, PredicateError> {
        Self::build(attribute, pattern, false)
    }

    pub fn ignore_case(attribute: Attribute<T>, pattern: &str) -> Result<Self, PredicateError> {
        Self::build(attribute, pattern, true)
    }

    fn build(
        attribute: Attribute<T>,
        pattern: &str,
        ignore_case: bool,
    ) -> Result<Self, PredicateError> {
        let flags = if ignore_case { "(?i)" } else { "" };
        // Anchored start plus `$` makes every search a full match.
        let full = format!("{flags}(?:{pattern})$");
        let dfa = dense::DFA::builder()
            .configure(
                dense::DFA::config()
                    .start_kind(StartKind::Anchored)
                    .minimize(true),
            )
            .build(&full)
            .map_err(|e| PredicateError::InvalidRegex {
                pattern: pattern.to_owned(),
                source: Box::new(e),
            })?;
        Ok(Self {
            attribute,
            pattern: pattern.to_owned(),
            dfa,
        })
    }
}

impl<T> fmt::Debug for StringMatches<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}=~/{}/", self.attribute, self.pattern)
    }
}

impl<T> ElementPredicate<T> for StringMatches<T> {
    fn test(&self, element: &T) -> bool {
        let Some(text) = self.attribute.get(element) else {
            return false;
        };
        let input = Input::new(text).anchored(Anchored::Yes);
        matches!(self.dfa.try_search_fwd(&input), Ok(Some(_)))
    }
}
