//! Per-branch state.

use std::ops::Range;

use seqex_automaton::{Nfa, StateId};
use seqex_core::Value;

use super::branch::BranchId;
use super::result::MatchedGroup;
use super::vm::Accepted;

/// A multi-node span chosen but not yet fully consumed.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PendingInterval {
    pub end: usize,
    pub value: Option<Value>,
}

/// Everything a branch carries besides its position in the NFA.
///
/// Two branches at the same state with equal `BranchState` behave
/// identically from here on, which is what makes deduplication sound.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BranchState {
    /// Begin of each group currently open, by group id.
    pub open: Vec<Option<usize>>,
    pub groups: Vec<Option<MatchedGroup>>,
    /// Repeat iterations started, by repeat slot.
    pub counters: Vec<u32>,
    pub intervals: Vec<Option<PendingInterval>>,
    /// Offset into the referenced group, by back-reference slot.
    pub replays: Vec<Option<usize>>,
    /// Conjunction record handle, by conjunction slot.
    pub conjs: Vec<Option<u32>>,
    /// Payload waiting for the next group end.
    pub pending_value: Option<Value>,
    pub node_results: Vec<(usize, Value)>,
}

impl BranchState {
    pub fn new<T>(nfa: &Nfa<T>) -> Self {
        let groups = nfa.total_groups() + 1;
        let slots = nfa.slots();
        Self {
            open: vec![None; groups],
            groups: vec![None; groups],
            counters: vec![0; slots.repeats as usize],
            intervals: vec![None; slots.multis as usize],
            replays: vec![None; slots.backrefs as usize],
            conjs: vec![None; slots.conjs as usize],
            pending_value: None,
            node_results: Vec::new(),
        }
    }

    pub fn with_counter(&self, slot: usize, count: u32) -> Self {
        let mut next = self.clone();
        next.counters[slot] = count;
        next
    }

    /// Takes over the groups in `range` (and any node results) from a
    /// sibling conjunct that matched the same span.
    pub fn adopt(&mut self, other: &BranchState, range: Range<u32>) {
        for g in range {
            let g = g as usize;
            self.groups[g] = other.groups[g].clone();
            self.open[g] = other.open[g];
        }
        let before = self.node_results.len();
        for (pos, value) in &other.node_results {
            if !self.node_results.iter().any(|(p, _)| p == pos) {
                self.node_results.push((*pos, value.clone()));
            }
        }
        if self.node_results.len() != before {
            self.node_results.sort_by_key(|(pos, _)| *pos);
        }
    }

    pub fn into_accepted(self) -> Accepted {
        Accepted {
            groups: self.groups,
            node_results: self.node_results,
        }
    }
}

pub(crate) struct Thread {
    pub branch: BranchId,
    pub state: StateId,
    pub aux: BranchState,
}
