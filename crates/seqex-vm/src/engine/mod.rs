//! Branch simulation over element sequences.
//!
//! The VM advances every live branch in lock step, one input position at a
//! time. Between positions it expands epsilon states in priority order,
//! drops duplicate branches and enforces the fuel limits.

mod branch;
mod conj;
mod error;
mod result;
mod thread;
mod trace;
mod vm;

#[cfg(test)]
mod engine_tests;
#[cfg(test)]
mod result_tests;

pub use branch::{BranchArena, BranchId};
pub use error::{MatchError, SnapshotError};
pub use result::{GroupRef, MatchResult, MatchSnapshot, MatchedGroup};
pub use trace::{NoopTracer, PrintTracer, Tracer, Verbosity};
pub use vm::{Accepted, FuelLimits, SearchMode, VM, VMBuilder};
