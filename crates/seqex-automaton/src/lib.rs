#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Compiled form of a sequence pattern.
//!
//! An [`Nfa`] is an arena of [`State`]s addressed by [`StateId`]. Successor
//! lists are ordered: the first successor is the preferred branch. Per-branch
//! bookkeeping (repeat counters, in-flight intervals, back-reference offsets,
//! conjunction records) lives in slots numbered per state kind, so the
//! simulator can size its branch state once per pattern.

mod bindings;
mod dump;
mod nfa;
mod state;


pub use bindings::GroupBindings;
pub use dump::dump;
pub use nfa::{Nfa, NfaBuilder, SlotCounts};
pub use state::{State, StateId, StateKind};
