//! Pattern expression tree.
//!
//! Group ids are not stored in the tree. They follow from a depth-first,
//! left-to-right walk: the n-th capturing group met in preorder gets id
//! `start + n`. The compiler and [`PatternExpr::group_names`] both derive ids
//! from that walk, so the tree itself stays immutable and freely shareable.

use std::fmt;
use std::sync::Arc;

use seqex_core::{ElementEq, ElementPredicate, Equal, MultiElementPredicate, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnchorKind {
    /// Absolute position 0.
    Start,
    /// Absolute end of the input.
    End,
}

pub enum PatternExpr<T> {
    Node(Arc<dyn ElementPredicate<T>>),
    MultiNode(Arc<dyn MultiElementPredicate<T>>),
    Sequence(Vec<PatternExpr<T>>),
    Group {
        inner: Box<PatternExpr<T>>,
        capture: bool,
        name: Option<String>,
    },
    Repeat {
        inner: Box<PatternExpr<T>>,
        min: u32,
        max: Option<u32>,
        greedy: bool,
    },
    Or(Vec<PatternExpr<T>>),
    And(Vec<PatternExpr<T>>),
    BackRef {
        group: u32,
        matcher: Arc<dyn ElementEq<T>>,
    },
    ValueTag {
        inner: Box<PatternExpr<T>>,
        value: Value,
    },
    Anchor(AnchorKind),
}

impl<T> PatternExpr<T> {
    pub fn node(predicate: impl ElementPredicate<T> + 'static) -> Self {
        PatternExpr::Node(Arc::new(predicate))
    }

    pub fn multi_node(predicate: impl MultiElementPredicate<T> + 'static) -> Self {
        PatternExpr::MultiNode(Arc::new(predicate))
    }

    pub fn seq(items: impl IntoIterator<Item = Self>) -> Self {
        PatternExpr::Sequence(items.into_iter().collect())
    }

    /// Capturing group.
    pub fn group(inner: Self) -> Self {
        PatternExpr::Group {
            inner: Box::new(inner),
            capture: true,
            name: None,
        }
    }

    /// Capturing group bound to a variable name.
    pub fn named(name: impl Into<String>, inner: Self) -> Self {
        PatternExpr::Group {
            inner: Box::new(inner),
            capture: true,
            name: Some(name.into()),
        }
    }

    pub fn non_capturing(inner: Self) -> Self {
        PatternExpr::Group {
            inner: Box::new(inner),
            capture: false,
            name: None,
        }
    }

    pub fn repeat(inner: Self, min: u32, max: Option<u32>, greedy: bool) -> Self {
        PatternExpr::Repeat {
            inner: Box::new(inner),
            min,
            max,
            greedy,
        }
    }

    pub fn star(inner: Self) -> Self {
        Self::repeat(inner, 0, None, true)
    }

    pub fn plus(inner: Self) -> Self {
        Self::repeat(inner, 1, None, true)
    }

    pub fn optional(inner: Self) -> Self {
        Self::repeat(inner, 0, Some(1), true)
    }

    pub fn or(alternatives: impl IntoIterator<Item = Self>) -> Self {
        PatternExpr::Or(alternatives.into_iter().collect())
    }

    pub fn and(conjuncts: impl IntoIterator<Item = Self>) -> Self {
        PatternExpr::And(conjuncts.into_iter().collect())
    }

    pub fn backref_with(group: u32, matcher: impl ElementEq<T> + 'static) -> Self {
        PatternExpr::BackRef {
            group,
            matcher: Arc::new(matcher),
        }
    }

    pub fn value(inner: Self, value: impl Into<Value>) -> Self {
        PatternExpr::ValueTag {
            inner: Box::new(inner),
            value: value.into(),
        }
    }

    pub fn seq_start() -> Self {
        PatternExpr::Anchor(AnchorKind::Start)
    }

    pub fn seq_end() -> Self {
        PatternExpr::Anchor(AnchorKind::End)
    }

    /// Numbers the capturing groups of this subtree from `start` and returns
    /// the next free id.
    pub fn assign_group_ids(&self, start: u32) -> u32 {
        match self {
            PatternExpr::Node(_)
            | PatternExpr::MultiNode(_)
            | PatternExpr::BackRef { .. }
            | PatternExpr::Anchor(_) => start,
            PatternExpr::Sequence(items) | PatternExpr::Or(items) | PatternExpr::And(items) => items
                .iter()
                .fold(start, |next, item| item.assign_group_ids(next)),
            PatternExpr::Group { inner, capture, .. } => {
                inner.assign_group_ids(if *capture { start + 1 } else { start })
            }
            PatternExpr::Repeat { inner, .. } | PatternExpr::ValueTag { inner, .. } => {
                inner.assign_group_ids(start)
            }
        }
    }

    /// Number of capturing groups in this subtree.
    pub fn capture_count(&self) -> u32 {
        self.assign_group_ids(0)
    }

    /// Variable names of the capturing groups, in group-id order.
    pub fn group_names(&self) -> Vec<Option<String>> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names(&self, names: &mut Vec<Option<String>>) {
        match self {
            PatternExpr::Node(_)
            | PatternExpr::MultiNode(_)
            | PatternExpr::BackRef { .. }
            | PatternExpr::Anchor(_) => {}
            PatternExpr::Sequence(items) | PatternExpr::Or(items) | PatternExpr::And(items) => {
                for item in items {
                    item.collect_names(names);
                }
            }
            PatternExpr::Group {
                inner,
                capture,
                name,
            } => {
                if *capture {
                    names.push(name.clone());
                }
                inner.collect_names(names);
            }
            PatternExpr::Repeat { inner, .. } | PatternExpr::ValueTag { inner, .. } => {
                inner.collect_names(names)
            }
        }
    }

    /// Whether this subtree can match without consuming input.
    ///
    /// Conservative: anchors and back-references count as nullable, and a
    /// conjunction is nullable only when every conjunct is.
    pub fn is_nullable(&self) -> bool {
        match self {
            PatternExpr::Node(_) | PatternExpr::MultiNode(_) => false,
            PatternExpr::BackRef { .. } | PatternExpr::Anchor(_) => true,
            PatternExpr::Sequence(items) | PatternExpr::And(items) => {
                items.iter().all(Self::is_nullable)
            }
            PatternExpr::Or(items) => items.iter().any(Self::is_nullable),
            PatternExpr::Group { inner, .. } | PatternExpr::ValueTag { inner, .. } => {
                inner.is_nullable()
            }
            PatternExpr::Repeat { inner, min, .. } => *min == 0 || inner.is_nullable(),
        }
    }

    fn is_compound(&self) -> bool {
        match self {
            PatternExpr::Sequence(items) => items.len() != 1,
            PatternExpr::Or(_) | PatternExpr::And(_) => true,
            PatternExpr::ValueTag { inner, .. } => inner.is_compound(),
            _ => false,
        }
    }
}

impl<T: PartialEq + 'static> PatternExpr<T> {
    /// Back-reference comparing elements with `PartialEq`.
    pub fn backref(group: u32) -> Self {
        Self::backref_with(group, Equal)
    }
}

impl<T> Clone for PatternExpr<T> {
    fn clone(&self) -> Self {
        match self {
            PatternExpr::Node(p) => PatternExpr::Node(Arc::clone(p)),
            PatternExpr::MultiNode(p) => PatternExpr::MultiNode(Arc::clone(p)),
            PatternExpr::Sequence(items) => PatternExpr::Sequence(items.clone()),
            PatternExpr::Group {
                inner,
                capture,
                name,
            } => PatternExpr::Group {
                inner: inner.clone(),
                capture: *capture,
                name: name.clone(),
            },
            PatternExpr::Repeat {
                inner,
                min,
                max,
                greedy,
            } => PatternExpr::Repeat {
                inner: inner.clone(),
                min: *min,
                max: *max,
                greedy: *greedy,
            },
            PatternExpr::Or(items) => PatternExpr::Or(items.clone()),
            PatternExpr::And(items) => PatternExpr::And(items.clone()),
            PatternExpr::BackRef { group, matcher } => PatternExpr::BackRef {
                group: *group,
                matcher: Arc::clone(matcher),
            },
            PatternExpr::ValueTag { inner, value } => PatternExpr::ValueTag {
                inner: inner.clone(),
                value: value.clone(),
            },
            PatternExpr::Anchor(kind) => PatternExpr::Anchor(*kind),
        }
    }
}

impl<T> fmt::Display for PatternExpr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternExpr::Node(p) => write!(f, "{p:?}"),
            PatternExpr::MultiNode(p) => write!(f, "{p:?}"),
            PatternExpr::Sequence(items) if items.is_empty() => f.write_str("(?:)"),
            PatternExpr::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    if matches!(item, PatternExpr::Or(_) | PatternExpr::And(_)) {
                        write!(f, "(?:{item})")?;
                    } else {
                        write!(f, "{item}")?;
                    }
                }
                Ok(())
            }
            PatternExpr::Group {
                inner,
                capture: false,
                ..
            } => write!(f, "(?:{inner})"),
            PatternExpr::Group {
                inner,
                name: Some(name),
                ..
            } => write!(f, "(?{name} {inner})"),
            PatternExpr::Group { inner, .. } => write!(f, "({inner})"),
            PatternExpr::Repeat {
                inner,
                min,
                max,
                greedy,
            } => {
                if inner.is_compound() {
                    write!(f, "(?:{inner})")?;
                } else {
                    write!(f, "{inner}")?;
                }
                match (min, max) {
                    (0, None) => f.write_str("*")?,
                    (1, None) => f.write_str("+")?,
                    (0, Some(1)) => f.write_str("?")?,
                    (m, Some(n)) if m == n => write!(f, "{{{m}}}")?,
                    (m, None) => write!(f, "{{{m},}}")?,
                    (m, Some(n)) => write!(f, "{{{m},{n}}}")?,
                }
                if !greedy {
                    f.write_str("?")?;
                }
                Ok(())
            }
            PatternExpr::Or(items) => join(f, items, " | "),
            PatternExpr::And(items) => join(f, items, " & "),
            PatternExpr::BackRef { group, .. } => write!(f, "\\{group}"),
            PatternExpr::ValueTag { inner, .. } => write!(f, "{inner}"),
            PatternExpr::Anchor(AnchorKind::Start) => f.write_str("^"),
            PatternExpr::Anchor(AnchorKind::End) => f.write_str("$"),
        }
    }
}

impl<T> fmt::Debug for PatternExpr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PatternExpr({self})")
    }
}

fn join<T>(f: &mut fmt::Formatter<'_>, items: &[PatternExpr<T>], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
