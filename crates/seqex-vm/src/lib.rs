//! Runtime for compiled seqex patterns.
//!
//! This crate provides the branch simulator that runs an NFA over a slice of
//! elements, and the match results it produces.

pub mod engine;

pub use engine::{
    Accepted, BranchArena, BranchId, FuelLimits, GroupRef, MatchError, MatchResult, MatchSnapshot,
    MatchedGroup, NoopTracer, PrintTracer, SearchMode, SnapshotError, Tracer, VM, VMBuilder,
    Verbosity,
};
