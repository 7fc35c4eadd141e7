//! State arena and its builder.

use crate::bindings::GroupBindings;
use crate::state::{State, StateId, StateKind};

/// Number of per-branch slots each slotted state kind needs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlotCounts {
    pub repeats: u32,
    pub multis: u32,
    pub backrefs: u32,
    pub conjs: u32,
}

/// A compiled pattern. Immutable once built; shareable across threads.
pub struct Nfa<T> {
    states: Vec<State<T>>,
    start: StateId,
    bindings: GroupBindings,
    slots: SlotCounts,
}

impl<T> Nfa<T> {
    pub fn start(&self) -> StateId {
        self.start
    }

    #[inline]
    pub fn state(&self, id: StateId) -> &State<T> {
        &self.states[id.index()]
    }

    pub fn states(&self) -> &[State<T>] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn bindings(&self) -> &GroupBindings {
        &self.bindings
    }

    /// Capture groups, not counting the implicit group 0.
    pub fn total_groups(&self) -> usize {
        self.bindings.len().saturating_sub(1)
    }

    pub fn slots(&self) -> SlotCounts {
        self.slots
    }
}

/// Append-only builder. States are wired by pushing successors; nothing is
/// ever removed, so ids handed out stay valid.
pub struct NfaBuilder<T> {
    states: Vec<State<T>>,
    slots: SlotCounts,
}

impl<T> Default for NfaBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> NfaBuilder<T> {
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            slots: SlotCounts::default(),
        }
    }

    pub fn push(&mut self, kind: StateKind<T>) -> StateId {
        let id = StateId(self.states.len() as u32);
        self.states.push(State::new(kind));
        id
    }

    pub fn add_next(&mut self, from: StateId, to: StateId) {
        self.states[from.index()].next.push(to);
    }

    pub fn state(&self, id: StateId) -> &State<T> {
        &self.states[id.index()]
    }

    pub fn repeat_slot(&mut self) -> u32 {
        bump(&mut self.slots.repeats)
    }

    pub fn multi_slot(&mut self) -> u32 {
        bump(&mut self.slots.multis)
    }

    pub fn backref_slot(&mut self) -> u32 {
        bump(&mut self.slots.backrefs)
    }

    pub fn conj_slot(&mut self) -> u32 {
        bump(&mut self.slots.conjs)
    }

    pub fn finish(self, start: StateId, bindings: GroupBindings) -> Nfa<T> {
        Nfa {
            states: self.states,
            start,
            bindings,
            slots: self.slots,
        }
    }
}

fn bump(counter: &mut u32) -> u32 {
    let slot = *counter;
    *counter += 1;
    slot
}
