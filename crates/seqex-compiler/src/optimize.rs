//! Alternation folding.
//!
//! A wide alternation of string literals costs one branch per alternative at
//! every position. When enough alternatives compare the same attribute the
//! same way, they are replaced by a single set lookup: one-element literals by
//! [`StringInSet`], literal sequences by a [`StringSeqInSet`] multi-node.
//! Alternatives containing groups are never folded, so group ids survive.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use seqex_core::Attribute;
use seqex_core::strings::{StringInSet, StringSeqInSet};

use crate::expr::PatternExpr;

/// Smallest alternation, and smallest literal bucket, worth folding.
pub const OPTIMIZE_MIN_ALTERNATIVES: usize = 5;

type BucketKey = (&'static str, bool);

struct Bucket<T, V> {
    attribute: Attribute<T>,
    members: Vec<usize>,
    values: IndexSet<V>,
}

impl<T, V: std::hash::Hash + Eq> Bucket<T, V> {
    fn new(attribute: Attribute<T>) -> Self {
        Self {
            attribute,
            members: Vec::new(),
            values: IndexSet::new(),
        }
    }
}

impl<T: 'static> PatternExpr<T> {
    /// Returns an equivalent tree with large literal alternations folded.
    pub fn optimize(self) -> Self {
        match self {
            PatternExpr::Or(alternatives) => optimize_or(alternatives),
            PatternExpr::Sequence(items) => {
                PatternExpr::Sequence(items.into_iter().map(Self::optimize).collect())
            }
            PatternExpr::And(items) => {
                PatternExpr::And(items.into_iter().map(Self::optimize).collect())
            }
            PatternExpr::Group {
                inner,
                capture,
                name,
            } => PatternExpr::Group {
                inner: Box::new(inner.optimize()),
                capture,
                name,
            },
            PatternExpr::Repeat {
                inner,
                min,
                max,
                greedy,
            } => PatternExpr::Repeat {
                inner: Box::new(inner.optimize()),
                min,
                max,
                greedy,
            },
            PatternExpr::ValueTag { inner, value } => PatternExpr::ValueTag {
                inner: Box::new(inner.optimize()),
                value,
            },
            leaf => leaf,
        }
    }

    fn literal(&self) -> Option<(Attribute<T>, bool, String)> {
        let PatternExpr::Node(p) = self else {
            return None;
        };
        let lit = p.as_string_literal()?;
        Some((lit.attribute, lit.ignore_case, lit.target.to_owned()))
    }

    fn literal_sequence(&self) -> Option<(Attribute<T>, bool, Vec<String>)> {
        let PatternExpr::Sequence(items) = self else {
            return None;
        };
        let mut words = Vec::with_capacity(items.len());
        let mut key: Option<(Attribute<T>, bool)> = None;
        for item in items {
            let (attribute, ignore_case, word) = item.literal()?;
            match key {
                None => key = Some((attribute, ignore_case)),
                Some((a, ic)) if a == attribute && ic == ignore_case => {}
                Some(_) => return None,
            }
            words.push(word);
        }
        let (attribute, ignore_case) = key?;
        Some((attribute, ignore_case, words))
    }
}

fn optimize_or<T: 'static>(alternatives: Vec<PatternExpr<T>>) -> PatternExpr<T> {
    let alternatives: Vec<_> = alternatives
        .into_iter()
        .map(PatternExpr::optimize)
        .collect();
    if alternatives.len() < OPTIMIZE_MIN_ALTERNATIVES {
        return PatternExpr::Or(alternatives);
    }

    let mut singles: IndexMap<BucketKey, Bucket<T, String>> = IndexMap::new();
    let mut sequences: IndexMap<BucketKey, Bucket<T, Vec<String>>> = IndexMap::new();
    for (i, alt) in alternatives.iter().enumerate() {
        if let Some((attribute, ignore_case, word)) = alt.literal() {
            let bucket = singles
                .entry((attribute.key(), ignore_case))
                .or_insert_with(|| Bucket::new(attribute));
            bucket.members.push(i);
            bucket.values.insert(word);
        } else if let Some((attribute, ignore_case, words)) = alt.literal_sequence() {
            let bucket = sequences
                .entry((attribute.key(), ignore_case))
                .or_insert_with(|| Bucket::new(attribute));
            bucket.members.push(i);
            bucket.values.insert(words);
        }
    }

    let mut folded = vec![false; alternatives.len()];
    let mut result = Vec::new();
    for ((_, ignore_case), bucket) in singles {
        if bucket.values.len() < OPTIMIZE_MIN_ALTERNATIVES {
            continue;
        }
        for i in bucket.members {
            folded[i] = true;
        }
        let set = StringInSet::new(bucket.attribute, bucket.values, ignore_case);
        result.push(PatternExpr::Node(Arc::new(set)));
    }
    for ((_, ignore_case), bucket) in sequences {
        if bucket.values.len() < OPTIMIZE_MIN_ALTERNATIVES {
            continue;
        }
        for i in bucket.members {
            folded[i] = true;
        }
        let set = StringSeqInSet::new(bucket.attribute, bucket.values, ignore_case);
        result.push(PatternExpr::MultiNode(Arc::new(set)));
    }

    if result.is_empty() {
        return PatternExpr::Or(alternatives);
    }
    result.extend(
        alternatives
            .into_iter()
            .zip(folded)
            .filter_map(|(alt, gone)| (!gone).then_some(alt)),
    );
    PatternExpr::Or(result)
}
