//! seqex: regular expressions over sequences of typed elements.
//!
//! Patterns are built as [`PatternExpr`] trees whose leaves are element
//! predicates, compiled once into a [`SequencePattern`], then run over any
//! number of element slices through a [`SequenceMatcher`].
//!
//! # Example
//!
//! ```
//! use seqex_lib::strings::StringEquals;
//! use seqex_lib::{Attribute, PatternExpr, SequencePattern};
//!
//! let word = |w: &str| PatternExpr::node(StringEquals::new(Attribute::text(), w));
//! let expr = PatternExpr::seq([word("a"), PatternExpr::plus(word("b")), word("c")]);
//! let pattern = SequencePattern::compile(expr)?;
//!
//! let tokens = ["x", "a", "b", "b", "c"];
//! let found = pattern.matcher(&tokens).find()?.expect("a match");
//! assert_eq!(found.span(0)?, Some(1..5));
//! # Ok::<(), seqex_lib::Error>(())
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod matcher;
mod pattern;


pub use matcher::{FindType, MatchPolicy, Replacement, SequenceMatcher};
pub use pattern::SequencePattern;

pub use seqex_automaton::{GroupBindings, Nfa, StateId};
pub use seqex_compiler::{
    AnchorKind, CompileError, CompileOptions, PatternExpr, PatternTransformer,
};
pub use seqex_core::{
    AnyElement, Attribute, AttributeEq, AttributeRender, Colors, ElementEq, ElementPredicate,
    Equal, Interval, JoinWithSpace, MultiElementPredicate, PredicateError, PredicateFn, Render,
    Value, strings,
};
pub use seqex_vm::{
    FuelLimits, GroupRef, MatchError, MatchResult, MatchSnapshot, MatchedGroup, NoopTracer,
    PrintTracer, SnapshotError, Tracer, Verbosity,
};

/// Errors from compiling or running a pattern.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Match(#[from] MatchError),
}

/// Result type for combined compile-and-match operations.
pub type Result<T> = std::result::Result<T, Error>;
