//! Searching element slices with a compiled pattern.

use std::collections::{HashSet, VecDeque};
use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use seqex_core::Render;
use seqex_vm::{
    Accepted, FuelLimits, MatchError, MatchResult, NoopTracer, SearchMode, Tracer, VM,
};

use crate::pattern::SequencePattern;

/// Which match to report when several start at the same position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    /// The first match to complete; cheapest.
    Earliest,
    /// The match the pattern's greedy/lazy operators prefer.
    #[default]
    Preferred,
    /// The match reaching furthest; ties go to the preferred one.
    Longest,
}

/// How [`SequenceMatcher::find`] walks the input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FindType {
    /// Each search resumes where the previous match ended.
    #[default]
    NonOverlapping,
    /// Every distinct match at every start position, in start order.
    All,
}

/// One piece of the replacement spliced in for each match.
#[derive(Clone, Debug, PartialEq)]
pub enum Replacement<T> {
    Elements(Vec<T>),
    /// Elements captured by a group of the match.
    Group(usize),
    /// Elements captured by a named group of the match.
    Named(String),
}

/// Stateful search over one element slice.
///
/// Settings are chained by value; each one restarts the search. Fuel limits
/// apply per call to [`find`](Self::find) and friends, across all the start
/// positions that call tries.
pub struct SequenceMatcher<'p, 'e, T> {
    pattern: &'p SequencePattern<T>,
    elements: &'e [T],
    region: Range<usize>,
    policy: MatchPolicy,
    find_type: FindType,
    include_empty: bool,
    match_with_result: bool,
    limits: FuelLimits,
    cancel: Option<Arc<AtomicBool>>,
    renderer: Option<Arc<dyn Render<T>>>,
    /// Next start position to try; `None` once the input is exhausted.
    cursor: Option<usize>,
    pending: VecDeque<Accepted>,
}

impl<'p, 'e, T> SequenceMatcher<'p, 'e, T> {
    pub fn new(pattern: &'p SequencePattern<T>, elements: &'e [T]) -> Self {
        Self {
            pattern,
            elements,
            region: 0..elements.len(),
            policy: MatchPolicy::default(),
            find_type: FindType::default(),
            include_empty: false,
            match_with_result: false,
            limits: FuelLimits::default(),
            cancel: None,
            renderer: None,
            cursor: Some(0),
            pending: VecDeque::new(),
        }
    }

    pub fn policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self.reset();
        self
    }

    pub fn find_type(mut self, find_type: FindType) -> Self {
        self.find_type = find_type;
        self.reset();
        self
    }

    /// Report zero-length matches instead of skipping them.
    pub fn include_empty_matches(mut self, enabled: bool) -> Self {
        self.include_empty = enabled;
        self.reset();
        self
    }

    pub fn match_with_result(mut self, enabled: bool) -> Self {
        self.match_with_result = enabled;
        self.reset();
        self
    }

    pub fn limits(mut self, limits: FuelLimits) -> Self {
        self.limits = limits;
        self.reset();
        self
    }

    /// Searches fail with [`MatchError::Cancelled`] once `flag` is set.
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self.reset();
        self
    }

    /// Renderer used by [`MatchResult::group`] on results of this matcher.
    pub fn renderer(mut self, renderer: impl Render<T> + 'static) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    /// Restricts matching to `elements[start..end]`. Anchors still refer to
    /// the whole slice.
    pub fn region(mut self, start: usize, end: usize) -> Result<Self, MatchError> {
        let len = self.elements.len();
        if start > end || end > len {
            return Err(MatchError::InvalidRegion { start, end, len });
        }
        self.region = start..end;
        self.reset();
        Ok(self)
    }

    pub fn get_region(&self) -> Range<usize> {
        self.region.clone()
    }

    /// Rewinds to the start of the region.
    pub fn reset(&mut self) {
        self.cursor = Some(self.region.start);
        self.pending.clear();
    }

    /// Next match, or `None` once the region is exhausted.
    pub fn find(&mut self) -> Result<Option<MatchResult<'e, T>>, MatchError> {
        self.find_with(&mut NoopTracer)
    }

    /// Restarts the search at `start` and returns the first match from there.
    pub fn find_at(&mut self, start: usize) -> Result<Option<MatchResult<'e, T>>, MatchError> {
        if start < self.region.start || start > self.region.end {
            return Err(MatchError::InvalidRegion {
                start,
                end: self.region.end,
                len: self.elements.len(),
            });
        }
        self.pending.clear();
        self.cursor = Some(start);
        self.find()
    }

    pub fn find_with<Tr: Tracer>(
        &mut self,
        tracer: &mut Tr,
    ) -> Result<Option<MatchResult<'e, T>>, MatchError> {
        let found = match self.find_type {
            FindType::NonOverlapping => self.next_non_overlapping(tracer)?,
            FindType::All => self.next_any(tracer)?,
        };
        Ok(found.map(|accepted| self.result(accepted)))
    }

    /// Every remaining match.
    pub fn find_all(&mut self) -> Result<Vec<MatchResult<'e, T>>, MatchError> {
        let mut all = Vec::new();
        while let Some(found) = self.find()? {
            all.push(found);
        }
        Ok(all)
    }

    /// Match that starts at the region start and ends at the region end.
    ///
    /// The most preferred such match wins, whatever the policy.
    pub fn matches(&mut self) -> Result<Option<MatchResult<'e, T>>, MatchError> {
        let Range { start, end } = self.region;
        let mut vm = self.vm(false);
        let accepted = vm.execute(start, SearchMode::Exhaustive)?;
        Ok(accepted
            .into_iter()
            .find(|a| a.span().end == end)
            .map(|a| self.result(a)))
    }

    fn vm(&self, skip_empty: bool) -> VM<'p, 'e, T> {
        let pattern = self.pattern;
        let mut builder = VM::builder(pattern.nfa(), self.elements)
            .region_end(self.region.end)
            .skip_empty(skip_empty)
            .match_with_result(self.match_with_result)
            .limits(self.limits);
        if let Some(flag) = &self.cancel {
            builder = builder.cancel_flag(Arc::clone(flag));
        }
        builder.build()
    }

    fn result(&self, accepted: Accepted) -> MatchResult<'e, T> {
        let pattern = self.pattern;
        MatchResult::new(
            self.elements,
            accepted,
            Arc::clone(pattern.shared_bindings()),
        )
        .with_metadata(pattern.priority(), pattern.weight())
        .with_renderer(self.renderer.clone())
    }

    fn keep(&self, accepted: &Accepted) -> bool {
        self.include_empty || !accepted.span().is_empty()
    }

    /// Picks the reported match among everything accepted at one start.
    fn choose(&self, accepted: Vec<Accepted>) -> Option<Accepted> {
        let mut candidates = accepted.into_iter().filter(|a| self.keep(a));
        match self.policy {
            MatchPolicy::Earliest | MatchPolicy::Preferred => candidates.next(),
            MatchPolicy::Longest => candidates.fold(None, |best: Option<Accepted>, a| match best {
                Some(b) if b.span().end >= a.span().end => Some(b),
                _ => Some(a),
            }),
        }
    }

    fn mode(&self) -> SearchMode {
        match self.policy {
            MatchPolicy::Earliest => SearchMode::Earliest,
            MatchPolicy::Preferred => SearchMode::Preferred,
            MatchPolicy::Longest => SearchMode::Exhaustive,
        }
    }

    fn next_non_overlapping<Tr: Tracer>(
        &mut self,
        tracer: &mut Tr,
    ) -> Result<Option<Accepted>, MatchError> {
        let Some(from) = self.cursor else {
            return Ok(None);
        };
        let mode = self.mode();
        let mut vm = self.vm(!self.include_empty);
        for start in from..=self.region.end {
            let accepted = vm.execute_with(start, mode, tracer)?;
            if let Some(found) = self.choose(accepted) {
                let span = found.span();
                // An empty match must not be found again at the same place.
                let next = if span.is_empty() { span.end + 1 } else { span.end };
                self.cursor = (next <= self.region.end).then_some(next);
                return Ok(Some(found));
            }
        }
        self.cursor = None;
        Ok(None)
    }

    fn next_any<Tr: Tracer>(&mut self, tracer: &mut Tr) -> Result<Option<Accepted>, MatchError> {
        if let Some(found) = self.pending.pop_front() {
            return Ok(Some(found));
        }
        let Some(from) = self.cursor else {
            return Ok(None);
        };
        let mut vm = self.vm(!self.include_empty);
        for start in from..=self.region.end {
            let accepted = vm.execute_with(start, SearchMode::Exhaustive, tracer)?;
            let mut seen = HashSet::new();
            for found in accepted {
                if !self.keep(&found) {
                    continue;
                }
                let signature: Vec<Option<Range<usize>>> = found
                    .groups
                    .iter()
                    .map(|g| g.as_ref().map(|g| g.span()))
                    .collect();
                if seen.insert(signature) {
                    self.pending.push_back(found);
                }
            }
            if !self.pending.is_empty() {
                self.cursor = (start < self.region.end).then_some(start + 1);
                return Ok(self.pending.pop_front());
            }
        }
        self.cursor = None;
        Ok(None)
    }
}

impl<T: Clone> SequenceMatcher<'_, '_, T> {
    /// Copy of the input with the first match replaced.
    pub fn replace_first(&mut self, replacement: &[Replacement<T>]) -> Result<Vec<T>, MatchError> {
        self.replace(replacement, Some(1))
    }

    /// Copy of the input with every non-overlapping match replaced.
    pub fn replace_all(&mut self, replacement: &[Replacement<T>]) -> Result<Vec<T>, MatchError> {
        self.replace(replacement, None)
    }

    fn replace(
        &mut self,
        replacement: &[Replacement<T>],
        limit: Option<usize>,
    ) -> Result<Vec<T>, MatchError> {
        self.reset();
        let elements = self.elements;
        let mut out = Vec::with_capacity(elements.len());
        let mut copied = 0;
        let mut count = 0;
        while limit.is_none_or(|l| count < l) {
            let Some(accepted) = self.next_non_overlapping(&mut NoopTracer)? else {
                break;
            };
            let found = self.result(accepted);
            let span = found.span(0)?.unwrap_or_default();
            out.extend_from_slice(&elements[copied..span.start]);
            for piece in replacement {
                let nodes = match piece {
                    Replacement::Elements(items) => Some(items.as_slice()),
                    Replacement::Group(g) => found.group_nodes(*g)?,
                    Replacement::Named(name) => found.group_nodes(name.as_str())?,
                };
                out.extend_from_slice(nodes.unwrap_or_default());
            }
            copied = span.end;
            count += 1;
        }
        out.extend_from_slice(&elements[copied..]);
        self.reset();
        Ok(out)
    }
}
