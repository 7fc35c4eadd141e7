#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Shared building blocks for seqex sequence patterns.
//!
//! A pattern never inspects elements itself. Everything it knows about an
//! element goes through one of the contracts defined here:
//! - [`ElementPredicate`]: does a single element match?
//! - [`MultiElementPredicate`]: which spans starting here match?
//! - [`ElementEq`]: are two elements equal (for back-references)?
//! - [`Render`]: how does a slice of elements read as text?
//!
//! The built-in string predicates in [`strings`] cover the common case of
//! elements that expose named string attributes.

mod attribute;
mod colors;
mod error;
mod predicate;
pub mod strings;
mod value;

#[cfg(test)]
mod predicate_tests;

pub use attribute::{Attribute, StringLiteral};
pub use colors::Colors;
pub use error::PredicateError;
pub use predicate::{
    AnyElement, AttributeEq, AttributeRender, ElementEq, ElementPredicate, Equal, Interval,
    JoinWithSpace, MultiElementPredicate, PredicateFn, Render,
};
pub use value::Value;
