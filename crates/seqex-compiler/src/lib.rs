#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Compiler from pattern expressions to NFAs.
//!
//! # Module Organization
//!
//! - `expr`: the [`PatternExpr`] tree, its constructors and structural queries
//! - `optimize`: folds large alternations of string literals into set lookups
//! - `transform`: rebuilds a tree over another element type
//! - `lower`: Thompson construction over [`seqex_automaton::NfaBuilder`]
//! - `compiler`: options and the compile entry point

mod compiler;
mod error;
mod expr;
mod lower;
mod optimize;
mod transform;

#[cfg(test)]
mod compile_tests;
#[cfg(test)]
mod expr_tests;

pub use compiler::{CompileOptions, Compiler, compile};
pub use error::CompileError;
pub use expr::{AnchorKind, PatternExpr};
pub use optimize::OPTIMIZE_MIN_ALTERNATIVES;
pub use transform::PatternTransformer;
