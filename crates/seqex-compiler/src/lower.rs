//! Thompson construction.
//!
//! Every expression lowers to a [`Fragment`]: an entry state plus the set of
//! exit states whose successor lists are still open. Connecting a fragment to
//! the next one appends the next entry to each exit's successors, so a state
//! that already had successors prefers them over the continuation.

use std::ops::Range;
use std::sync::Arc;

use indexmap::IndexSet;
use seqex_automaton::{GroupBindings, Nfa, NfaBuilder, StateId, StateKind};

use crate::error::CompileError;
use crate::expr::{AnchorKind, PatternExpr};

#[derive(Debug, Clone)]
pub(crate) struct Fragment {
    pub start: StateId,
    pub exits: IndexSet<StateId>,
}

pub(crate) struct Lowering<T> {
    builder: NfaBuilder<T>,
    /// Indexed by group id; set when the group closes on every path to the
    /// fragment being lowered.
    closed: Vec<bool>,
    total_groups: u32,
    unroll_limit: u32,
}

impl<T> Lowering<T> {
    pub fn new(total_groups: u32, unroll_limit: u32) -> Self {
        Self {
            builder: NfaBuilder::new(),
            closed: vec![false; total_groups as usize + 1],
            total_groups,
            unroll_limit,
        }
    }

    /// Wraps `expr` in the implicit group 0 and terminates it with a match state.
    pub fn finish(mut self, expr: &PatternExpr<T>) -> Result<Nfa<T>, CompileError> {
        let root = self.builder.push(StateKind::GroupStart(0));
        let body = self.lower(expr, 1)?;
        self.builder.add_next(root, body.start);
        let mut whole = Fragment {
            start: root,
            exits: body.exits,
        };
        self.connect_state(&mut whole, StateKind::GroupEnd(0));
        self.connect_state(&mut whole, StateKind::Match);

        let mut names = vec![None];
        names.extend(expr.group_names());
        Ok(self.builder.finish(root, GroupBindings::new(names)))
    }

    fn single(&mut self, kind: StateKind<T>) -> Fragment {
        let id = self.builder.push(kind);
        Fragment {
            start: id,
            exits: IndexSet::from([id]),
        }
    }

    fn connect(&mut self, frag: &mut Fragment, next: Fragment) {
        for &exit in &frag.exits {
            self.builder.add_next(exit, next.start);
        }
        frag.exits = next.exits;
    }

    fn connect_state(&mut self, frag: &mut Fragment, kind: StateKind<T>) {
        let next = self.single(kind);
        self.connect(frag, next);
    }

    /// Lowers `expr`, whose first capturing group takes id `base`.
    fn lower(&mut self, expr: &PatternExpr<T>, base: u32) -> Result<Fragment, CompileError> {
        match expr {
            PatternExpr::Node(p) => Ok(self.single(StateKind::Node(Arc::clone(p)))),
            PatternExpr::MultiNode(p) => {
                let slot = self.builder.multi_slot();
                Ok(self.single(StateKind::MultiNode {
                    predicate: Arc::clone(p),
                    slot,
                }))
            }
            PatternExpr::Sequence(items) => self.lower_sequence(items, base),
            PatternExpr::Group {
                inner,
                capture: false,
                ..
            } => self.lower(inner, base),
            PatternExpr::Group { inner, .. } => {
                let start = self.builder.push(StateKind::GroupStart(base));
                let body = self.lower(inner, base + 1)?;
                self.builder.add_next(start, body.start);
                let mut frag = Fragment {
                    start,
                    exits: body.exits,
                };
                self.connect_state(&mut frag, StateKind::GroupEnd(base));
                self.closed[base as usize] = true;
                Ok(frag)
            }
            PatternExpr::Repeat {
                inner,
                min,
                max,
                greedy,
            } => {
                let entry = self.closed.clone();
                let frag = self.lower_repeat(inner, *min, *max, *greedy, base)?;
                if *min == 0 {
                    self.closed = entry;
                }
                Ok(frag)
            }
            PatternExpr::Or(alternatives) => self.lower_or(alternatives, base),
            PatternExpr::And(conjuncts) => self.lower_and(conjuncts, base),
            PatternExpr::BackRef { group, matcher } => {
                if *group == 0 || *group > self.total_groups {
                    return Err(CompileError::InvalidBackReference {
                        group: *group,
                        total: self.total_groups,
                    });
                }
                if !self.closed[*group as usize] {
                    return Err(CompileError::UnclosedBackReference { group: *group });
                }
                let slot = self.builder.backref_slot();
                Ok(self.single(StateKind::BackRef {
                    slot,
                    group: *group,
                    matcher: Arc::clone(matcher),
                }))
            }
            PatternExpr::ValueTag { inner, value } => {
                let mut frag = self.lower(inner, base)?;
                self.connect_state(&mut frag, StateKind::Value(value.clone()));
                Ok(frag)
            }
            PatternExpr::Anchor(AnchorKind::Start) => Ok(self.single(StateKind::SeqStart)),
            PatternExpr::Anchor(AnchorKind::End) => Ok(self.single(StateKind::SeqEnd)),
        }
    }

    fn lower_sequence(
        &mut self,
        items: &[PatternExpr<T>],
        base: u32,
    ) -> Result<Fragment, CompileError> {
        let Some((first, rest)) = items.split_first() else {
            return Ok(self.single(StateKind::Split));
        };
        let mut frag = self.lower(first, base)?;
        let mut next_base = first.assign_group_ids(base);
        for item in rest {
            let next = self.lower(item, next_base)?;
            self.connect(&mut frag, next);
            next_base = item.assign_group_ids(next_base);
        }
        Ok(frag)
    }

    fn lower_or(
        &mut self,
        alternatives: &[PatternExpr<T>],
        base: u32,
    ) -> Result<Fragment, CompileError> {
        if alternatives.is_empty() {
            return Err(CompileError::EmptyOperands { operator: "or" });
        }
        let split = self.builder.push(StateKind::Split);
        let entry = self.closed.clone();
        let mut on_every_path = vec![true; entry.len()];
        let mut exits = IndexSet::new();
        let mut next_base = base;
        for alt in alternatives {
            self.closed.clone_from(&entry);
            let frag = self.lower(alt, next_base)?;
            self.builder.add_next(split, frag.start);
            exits.extend(frag.exits);
            next_base = alt.assign_group_ids(next_base);
            for (all, closed) in on_every_path.iter_mut().zip(&self.closed) {
                *all &= *closed;
            }
        }
        self.closed = on_every_path;
        Ok(Fragment {
            start: split,
            exits,
        })
    }

    fn lower_and(
        &mut self,
        conjuncts: &[PatternExpr<T>],
        base: u32,
    ) -> Result<Fragment, CompileError> {
        if conjuncts.is_empty() {
            return Err(CompileError::EmptyOperands { operator: "and" });
        }
        let mut ranges: Vec<Range<u32>> = Vec::with_capacity(conjuncts.len());
        let mut next_base = base;
        for conjunct in conjuncts {
            let end = conjunct.assign_group_ids(next_base);
            ranges.push(next_base..end);
            next_base = end;
        }
        let groups: Arc<[Range<u32>]> = ranges.into();

        let slot = self.builder.conj_slot();
        let start = self.builder.push(StateKind::ConjStart { slot });
        let entry = self.closed.clone();
        let mut after_join = entry.clone();
        let mut exits = IndexSet::new();
        for (child, conjunct) in conjuncts.iter().enumerate() {
            // Conjuncts run side by side; none sees another's groups closed.
            self.closed.clone_from(&entry);
            let mut frag = self.lower(conjunct, groups[child].start)?;
            self.builder.add_next(start, frag.start);
            self.connect_state(
                &mut frag,
                StateKind::ConjEnd {
                    slot,
                    child: child as u32,
                    groups: Arc::clone(&groups),
                },
            );
            exits.extend(frag.exits);
            for (joined, closed) in after_join.iter_mut().zip(&self.closed) {
                *joined |= *closed;
            }
        }
        self.closed = after_join;
        Ok(Fragment { start, exits })
    }

    fn lower_repeat(
        &mut self,
        inner: &PatternExpr<T>,
        min: u32,
        max: Option<u32>,
        greedy: bool,
        base: u32,
    ) -> Result<Fragment, CompileError> {
        if let Some(max) = max.filter(|&m| m < min) {
            return Err(CompileError::InvalidBounds { min, max });
        }
        if max.is_none() && inner.is_nullable() {
            return Err(CompileError::EmptyLoop);
        }
        if min == 1 && max == Some(1) {
            return self.lower(inner, base);
        }

        let limit = self.unroll_limit;
        if greedy && min <= limit && max.is_none_or(|m| m <= limit) {
            return self.unroll(inner, min, max, base);
        }

        let slot = self.builder.repeat_slot();
        let body = self.lower(inner, base)?;
        let repeat = self.builder.push(StateKind::Repeat {
            slot,
            body: body.start,
            min,
            max,
            greedy,
        });
        for &exit in &body.exits {
            self.builder.add_next(exit, repeat);
        }
        Ok(Fragment {
            start: repeat,
            exits: IndexSet::from([repeat]),
        })
    }

    /// Greedy repeat as `min` mandatory copies followed by optional copies or
    /// a self-looping copy. Earlier exits stay open, each preferring another
    /// iteration over leaving.
    fn unroll(
        &mut self,
        inner: &PatternExpr<T>,
        min: u32,
        max: Option<u32>,
        base: u32,
    ) -> Result<Fragment, CompileError> {
        let mut frag = if min == 0 {
            self.single(StateKind::Split)
        } else {
            let mut frag = self.lower(inner, base)?;
            for _ in 1..min {
                let next = self.lower(inner, base)?;
                self.connect(&mut frag, next);
            }
            frag
        };

        match max {
            None => {
                let earlier = frag.exits.clone();
                let body = self.lower(inner, base)?;
                for &exit in &body.exits {
                    self.builder.add_next(exit, body.start);
                }
                self.connect(&mut frag, body);
                frag.exits.extend(earlier);
            }
            Some(max) => {
                for _ in min..max {
                    let earlier = frag.exits.clone();
                    let body = self.lower(inner, base)?;
                    self.connect(&mut frag, body);
                    frag.exits.extend(earlier);
                }
            }
        }
        Ok(frag)
    }
}
