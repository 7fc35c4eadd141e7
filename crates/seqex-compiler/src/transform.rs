//! Rebuilding a pattern over another element type.

use std::sync::Arc;

use seqex_core::{ElementEq, ElementPredicate, MultiElementPredicate};

use crate::error::CompileError;
use crate::expr::PatternExpr;

/// Maps the element-facing leaves of a pattern from `T` to `U`.
///
/// Structure, bounds, names and values are copied unchanged.
pub trait PatternTransformer<T, U> {
    fn node(
        &self,
        predicate: &Arc<dyn ElementPredicate<T>>,
    ) -> Result<Arc<dyn ElementPredicate<U>>, CompileError>;

    fn multi_node(
        &self,
        predicate: &Arc<dyn MultiElementPredicate<T>>,
    ) -> Result<Arc<dyn MultiElementPredicate<U>>, CompileError>;

    /// Back-references need an equality over `U`; none is derivable by default.
    fn equality(
        &self,
        _matcher: &Arc<dyn ElementEq<T>>,
    ) -> Result<Arc<dyn ElementEq<U>>, CompileError> {
        Err(CompileError::UnsupportedTransform {
            node: "back-reference",
        })
    }
}

impl<T> PatternExpr<T> {
    pub fn transform<U>(
        &self,
        transformer: &impl PatternTransformer<T, U>,
    ) -> Result<PatternExpr<U>, CompileError> {
        let all = |items: &[PatternExpr<T>]| -> Result<Vec<PatternExpr<U>>, CompileError> {
            items.iter().map(|item| item.transform(transformer)).collect()
        };
        Ok(match self {
            PatternExpr::Node(p) => PatternExpr::Node(transformer.node(p)?),
            PatternExpr::MultiNode(p) => PatternExpr::MultiNode(transformer.multi_node(p)?),
            PatternExpr::Sequence(items) => PatternExpr::Sequence(all(items)?),
            PatternExpr::Or(items) => PatternExpr::Or(all(items)?),
            PatternExpr::And(items) => PatternExpr::And(all(items)?),
            PatternExpr::Group {
                inner,
                capture,
                name,
            } => PatternExpr::Group {
                inner: Box::new(inner.transform(transformer)?),
                capture: *capture,
                name: name.clone(),
            },
            PatternExpr::Repeat {
                inner,
                min,
                max,
                greedy,
            } => PatternExpr::Repeat {
                inner: Box::new(inner.transform(transformer)?),
                min: *min,
                max: *max,
                greedy: *greedy,
            },
            PatternExpr::BackRef { group, matcher } => PatternExpr::BackRef {
                group: *group,
                matcher: transformer.equality(matcher)?,
            },
            PatternExpr::ValueTag { inner, value } => PatternExpr::ValueTag {
                inner: Box::new(inner.transform(transformer)?),
                value: value.clone(),
            },
            PatternExpr::Anchor(kind) => PatternExpr::Anchor(*kind),
        })
    }
}
