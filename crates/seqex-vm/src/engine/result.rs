//! Match results and group extraction.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use seqex_automaton::GroupBindings;
use seqex_core::{JoinWithSpace, Render, Value};

use super::error::{MatchError, SnapshotError};
use super::vm::Accepted;

/// A closed group: the half-open span `[begin, end)` plus its payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchedGroup {
    pub begin: usize,
    pub end: usize,
    pub value: Option<Value>,
}

impl MatchedGroup {
    pub fn span(&self) -> Range<usize> {
        self.begin..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }
}

/// Addresses a group of a [`MatchResult`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupRef<'a> {
    Index(usize),
    /// Variable name bound with a named group.
    Name(&'a str),
    /// Everything before the match.
    BeforeMatch,
    /// Everything after the match.
    AfterMatch,
}

impl From<usize> for GroupRef<'_> {
    fn from(index: usize) -> Self {
        GroupRef::Index(index)
    }
}

impl<'a> From<&'a str> for GroupRef<'a> {
    fn from(name: &'a str) -> Self {
        GroupRef::Name(name)
    }
}

enum Elements<'e, T> {
    Borrowed(&'e [T]),
    Shared(Arc<[T]>),
}

impl<T> Elements<'_, T> {
    fn as_slice(&self) -> &[T] {
        match self {
            Elements::Borrowed(s) => s,
            Elements::Shared(s) => s.as_ref(),
        }
    }
}

/// One match of a pattern over an element sequence.
///
/// Borrows the matched sequence; [`into_owned`](Self::into_owned) detaches it.
pub struct MatchResult<'e, T> {
    elements: Elements<'e, T>,
    groups: Vec<Option<MatchedGroup>>,
    bindings: Arc<GroupBindings>,
    node_results: BTreeMap<usize, Value>,
    priority: f64,
    score: f64,
    renderer: Option<Arc<dyn Render<T>>>,
}

impl<'e, T> MatchResult<'e, T> {
    pub fn new(elements: &'e [T], accepted: Accepted, bindings: Arc<GroupBindings>) -> Self {
        Self {
            elements: Elements::Borrowed(elements),
            groups: accepted.groups,
            bindings,
            node_results: accepted.node_results.into_iter().collect(),
            priority: 0.0,
            score: 0.0,
            renderer: None,
        }
    }

    /// Attaches the pattern's priority and weight.
    pub fn with_metadata(mut self, priority: f64, score: f64) -> Self {
        self.priority = priority;
        self.score = score;
        self
    }

    pub fn with_renderer(mut self, renderer: Option<Arc<dyn Render<T>>>) -> Self {
        self.renderer = renderer;
        self
    }

    /// The whole input sequence.
    pub fn elements(&self) -> &[T] {
        self.elements.as_slice()
    }

    /// Capture groups, not counting group 0.
    pub fn group_count(&self) -> usize {
        self.groups.len().saturating_sub(1)
    }

    pub fn bindings(&self) -> &GroupBindings {
        &self.bindings
    }

    pub fn priority(&self) -> f64 {
        self.priority
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    fn whole(&self) -> Range<usize> {
        self.groups
            .first()
            .and_then(|g| g.as_ref())
            .map_or(0..0, MatchedGroup::span)
    }

    fn resolve(&self, group: GroupRef<'_>) -> Result<Option<&MatchedGroup>, MatchError> {
        let index = match group {
            GroupRef::Index(i) => i,
            GroupRef::Name(name) => self
                .bindings
                .lookup(name)
                .ok_or_else(|| MatchError::UnknownVariable(name.to_owned()))?,
            GroupRef::BeforeMatch | GroupRef::AfterMatch => return Ok(None),
        };
        match self.groups.get(index) {
            Some(g) => Ok(g.as_ref()),
            None => Err(MatchError::InvalidGroup {
                group: index,
                count: self.group_count(),
            }),
        }
    }

    /// Span of a group; `None` if the group did not participate.
    pub fn span<'g>(&self, group: impl Into<GroupRef<'g>>) -> Result<Option<Range<usize>>, MatchError> {
        let group = group.into();
        let whole = self.whole();
        match group {
            GroupRef::BeforeMatch => Ok(Some(0..whole.start)),
            GroupRef::AfterMatch => Ok(Some(whole.end..self.elements().len())),
            _ => Ok(self.resolve(group)?.map(MatchedGroup::span)),
        }
    }

    pub fn start<'g>(&self, group: impl Into<GroupRef<'g>>) -> Result<Option<usize>, MatchError> {
        Ok(self.span(group)?.map(|s| s.start))
    }

    pub fn end<'g>(&self, group: impl Into<GroupRef<'g>>) -> Result<Option<usize>, MatchError> {
        Ok(self.span(group)?.map(|s| s.end))
    }

    /// The elements a group covers.
    pub fn group_nodes<'g>(&self, group: impl Into<GroupRef<'g>>) -> Result<Option<&[T]>, MatchError> {
        Ok(self.span(group)?.map(|s| &self.elements()[s]))
    }

    /// Payload attached to a group by a value tag or a multi-node interval.
    pub fn group_value<'g>(
        &self,
        group: impl Into<GroupRef<'g>>,
    ) -> Result<Option<&Value>, MatchError> {
        Ok(self.resolve(group.into())?.and_then(|g| g.value.as_ref()))
    }

    /// Group text through an explicit renderer.
    pub fn group_with<'g>(
        &self,
        group: impl Into<GroupRef<'g>>,
        renderer: &dyn Render<T>,
    ) -> Result<Option<String>, MatchError> {
        Ok(self.group_nodes(group)?.map(|nodes| renderer.render(nodes)))
    }

    /// Per-element result recorded for input position `index`.
    pub fn node_match_result(&self, index: usize) -> Option<&Value> {
        self.node_results.get(&index)
    }

    /// Per-element results across a group, one entry per covered element.
    pub fn group_match_results<'g>(
        &self,
        group: impl Into<GroupRef<'g>>,
    ) -> Result<Option<Vec<Option<&Value>>>, MatchError> {
        Ok(self
            .span(group)?
            .map(|span| span.map(|i| self.node_results.get(&i)).collect()))
    }

    /// Variable names with the groups they are bound to.
    pub fn variables(&self) -> impl Iterator<Item = (&str, usize)> {
        self.bindings.iter().map(|(id, name)| (name, id))
    }
}

impl<T: fmt::Display> MatchResult<'_, T> {
    /// Group text through the attached renderer, or space-joined `Display`.
    pub fn group<'g>(&self, group: impl Into<GroupRef<'g>>) -> Result<Option<String>, MatchError> {
        match &self.renderer {
            Some(renderer) => self.group_with(group, renderer.as_ref()),
            None => self.group_with(group, &JoinWithSpace),
        }
    }
}

impl<T: Clone> MatchResult<'_, T> {
    /// Copies the input so the result no longer borrows it.
    pub fn into_owned(self) -> MatchResult<'static, T> {
        let elements = match self.elements {
            Elements::Borrowed(s) => Elements::Shared(Arc::from(s)),
            Elements::Shared(s) => Elements::Shared(s),
        };
        MatchResult {
            elements,
            groups: self.groups,
            bindings: self.bindings,
            node_results: self.node_results,
            priority: self.priority,
            score: self.score,
            renderer: self.renderer,
        }
    }

    pub fn snapshot(&self) -> MatchSnapshot<T> {
        MatchSnapshot {
            elements: self.elements().to_vec(),
            groups: self.groups.clone(),
            bindings: (*self.bindings).clone(),
            node_results: self
                .node_results
                .iter()
                .map(|(i, v)| (*i, v.clone()))
                .collect(),
            priority: self.priority,
            score: self.score,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for MatchResult<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchResult")
            .field("span", &self.whole())
            .field("groups", &self.groups)
            .field("node_results", &self.node_results)
            .finish_non_exhaustive()
    }
}

/// Self-contained, serializable copy of a [`MatchResult`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot<T> {
    pub elements: Vec<T>,
    pub groups: Vec<Option<MatchedGroup>>,
    pub bindings: GroupBindings,
    pub node_results: Vec<(usize, Value)>,
    pub priority: f64,
    pub score: f64,
}

impl<T: Serialize> MatchSnapshot<T> {
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(postcard::to_allocvec(self)?)
    }
}

impl<T: DeserializeOwned> MatchSnapshot<T> {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Ok(postcard::from_bytes(bytes)?)
    }
}

impl<T> From<MatchSnapshot<T>> for MatchResult<'static, T> {
    fn from(snapshot: MatchSnapshot<T>) -> Self {
        MatchResult {
            elements: Elements::Shared(snapshot.elements.into()),
            groups: snapshot.groups,
            bindings: Arc::new(snapshot.bindings),
            node_results: snapshot.node_results.into_iter().collect(),
            priority: snapshot.priority,
            score: snapshot.score,
            renderer: None,
        }
    }
}
