//! NFA states.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use seqex_core::{ElementEq, ElementPredicate, MultiElementPredicate, Value};

/// Index of a state in its [`Nfa`](crate::Nfa) arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub u32);

impl StateId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub enum StateKind<T> {
    /// Epsilon fan-out; successors in preference order.
    Split,
    /// Consumes one element accepted by the predicate.
    Node(Arc<dyn ElementPredicate<T>>),
    /// Consumes a span chosen from the predicate's intervals.
    MultiNode {
        predicate: Arc<dyn MultiElementPredicate<T>>,
        slot: u32,
    },
    /// Counting loop around `body`. The counter in `slot` holds the number of
    /// iterations started; zero on a fresh entry.
    Repeat {
        slot: u32,
        body: StateId,
        min: u32,
        max: Option<u32>,
        greedy: bool,
    },
    /// Replays the span of `group`, one element per step.
    BackRef {
        slot: u32,
        group: u32,
        matcher: Arc<dyn ElementEq<T>>,
    },
    GroupStart(u32),
    GroupEnd(u32),
    /// Stages a payload for the next enclosing group end.
    Value(Value),
    /// Forks into one branch per conjunct.
    ConjStart { slot: u32 },
    /// Arrival of conjunct `child`. `groups[i]` is the group-id range owned
    /// by conjunct `i`.
    ConjEnd {
        slot: u32,
        child: u32,
        groups: Arc<[Range<u32>]>,
    },
    SeqStart,
    SeqEnd,
    Match,
}

impl<T> StateKind<T> {
    pub fn label(&self) -> &'static str {
        match self {
            StateKind::Split => "split",
            StateKind::Node(_) => "node",
            StateKind::MultiNode { .. } => "multi",
            StateKind::Repeat { .. } => "repeat",
            StateKind::BackRef { .. } => "backref",
            StateKind::GroupStart(_) => "group-start",
            StateKind::GroupEnd(_) => "group-end",
            StateKind::Value(_) => "value",
            StateKind::ConjStart { .. } => "conj-start",
            StateKind::ConjEnd { .. } => "conj-end",
            StateKind::SeqStart => "seq-start",
            StateKind::SeqEnd => "seq-end",
            StateKind::Match => "match",
        }
    }

    /// States that advance the input position.
    pub fn is_consuming(&self) -> bool {
        matches!(
            self,
            StateKind::Node(_) | StateKind::MultiNode { .. } | StateKind::BackRef { .. }
        )
    }
}

pub struct State<T> {
    pub kind: StateKind<T>,
    pub next: Vec<StateId>,
}

impl<T> State<T> {
    pub fn new(kind: StateKind<T>) -> Self {
        Self {
            kind,
            next: Vec::new(),
        }
    }
}
