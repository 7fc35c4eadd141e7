//! Lock-step branch simulator.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{self, AtomicBool};

use seqex_automaton::{Nfa, StateId, StateKind};
use seqex_core::Value;

use super::branch::{BranchArena, BranchId};
use super::conj::ConjTable;
use super::error::MatchError;
use super::result::MatchedGroup;
use super::thread::{BranchState, PendingInterval, Thread};
use super::trace::{NoopTracer, Tracer};

/// Runtime limits for one search.
#[derive(Clone, Copy, Debug)]
pub struct FuelLimits {
    /// Maximum state visits (default: 1,000,000).
    pub(crate) exec_fuel: u32,
    /// Maximum live branches at one position (default: 10,000).
    pub(crate) branch_limit: usize,
}

impl Default for FuelLimits {
    fn default() -> Self {
        Self {
            exec_fuel: 1_000_000,
            branch_limit: 10_000,
        }
    }
}

impl FuelLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exec_fuel(mut self, fuel: u32) -> Self {
        self.exec_fuel = fuel;
        self
    }

    pub fn branch_limit(mut self, limit: usize) -> Self {
        self.branch_limit = limit;
        self
    }

    pub fn get_exec_fuel(&self) -> u32 {
        self.exec_fuel
    }

    pub fn get_branch_limit(&self) -> usize {
        self.branch_limit
    }
}

/// When a search may stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchMode {
    /// At the first position where any branch accepts.
    Earliest,
    /// Once no live branch outranks the best accepted one.
    Preferred,
    /// Only when every branch has died or accepted.
    Exhaustive,
}

/// An accepted branch: its captures and per-element results.
#[derive(Clone, Debug, PartialEq)]
pub struct Accepted {
    pub groups: Vec<Option<MatchedGroup>>,
    pub node_results: Vec<(usize, Value)>,
}

impl Accepted {
    /// Span of group 0.
    pub fn span(&self) -> Range<usize> {
        self.groups
            .first()
            .and_then(|g| g.as_ref())
            .map_or(0..0, MatchedGroup::span)
    }
}

/// Simulator over one element slice. Reusable across start positions; fuel
/// is shared by every `execute` call on the same VM.
pub struct VM<'n, 'e, T> {
    nfa: &'n Nfa<T>,
    elements: &'e [T],
    /// Consumption stops here (region end).
    end: usize,
    match_with_result: bool,
    skip_empty: bool,
    cancel: Option<Arc<AtomicBool>>,
    exec_fuel: u32,
    limits: FuelLimits,
    branches: BranchArena,
    conjs: ConjTable,
}

/// Builder for VM instances.
pub struct VMBuilder<'n, 'e, T> {
    nfa: &'n Nfa<T>,
    elements: &'e [T],
    end: usize,
    match_with_result: bool,
    skip_empty: bool,
    cancel: Option<Arc<AtomicBool>>,
    limits: FuelLimits,
}

impl<'n, 'e, T> VMBuilder<'n, 'e, T> {
    pub fn new(nfa: &'n Nfa<T>, elements: &'e [T]) -> Self {
        Self {
            nfa,
            elements,
            end: elements.len(),
            match_with_result: false,
            skip_empty: false,
            cancel: None,
            limits: FuelLimits::default(),
        }
    }

    /// Positions at or past `end` are never consumed. Clamped to the input.
    pub fn region_end(mut self, end: usize) -> Self {
        self.end = end.min(self.elements.len());
        self
    }

    /// Record `test_with_result` payloads per position.
    pub fn match_with_result(mut self, enabled: bool) -> Self {
        self.match_with_result = enabled;
        self
    }

    /// Branches accepting at their start position are dropped, so they
    /// neither end an earliest search nor prune a preferred one.
    pub fn skip_empty(mut self, enabled: bool) -> Self {
        self.skip_empty = enabled;
        self
    }

    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn limits(mut self, limits: FuelLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn exec_fuel(mut self, fuel: u32) -> Self {
        self.limits = self.limits.exec_fuel(fuel);
        self
    }

    pub fn branch_limit(mut self, limit: usize) -> Self {
        self.limits = self.limits.branch_limit(limit);
        self
    }

    pub fn build(self) -> VM<'n, 'e, T> {
        VM {
            nfa: self.nfa,
            elements: self.elements,
            end: self.end,
            match_with_result: self.match_with_result,
            skip_empty: self.skip_empty,
            cancel: self.cancel,
            exec_fuel: self.limits.get_exec_fuel(),
            limits: self.limits,
            branches: BranchArena::new(),
            conjs: ConjTable::default(),
        }
    }
}

impl<'n, 'e, T> VM<'n, 'e, T> {
    pub fn builder(nfa: &'n Nfa<T>, elements: &'e [T]) -> VMBuilder<'n, 'e, T> {
        VMBuilder::new(nfa, elements)
    }

    /// Fuel left for further searches on this VM.
    pub fn remaining_fuel(&self) -> u32 {
        self.exec_fuel
    }

    pub fn execute(&mut self, start: usize, mode: SearchMode) -> Result<Vec<Accepted>, MatchError> {
        self.execute_with(start, mode, &mut NoopTracer)
    }

    /// Runs every branch from `start` and returns the accepted ones, most
    /// preferred first.
    pub fn execute_with<Tr: Tracer>(
        &mut self,
        start: usize,
        mode: SearchMode,
        tracer: &mut Tr,
    ) -> Result<Vec<Accepted>, MatchError> {
        self.branches.clear();
        self.conjs.clear();
        let root = self.branches.root();
        let mut frontier = vec![Thread {
            branch: root,
            state: self.nfa.start(),
            aux: BranchState::new(self.nfa),
        }];
        let mut accepted: Vec<(BranchId, BranchState)> = Vec::new();
        let mut pos = start;

        loop {
            self.check_cancelled()?;
            tracer.trace_position(pos);

            let mut ready = self.close(frontier, start, pos, &mut accepted, tracer)?;
            self.prioritize(&mut ready, tracer);
            if ready.len() > self.limits.branch_limit {
                return Err(MatchError::BranchLimitExceeded(self.limits.branch_limit));
            }

            match mode {
                SearchMode::Earliest if !accepted.is_empty() => break,
                SearchMode::Preferred => {
                    if let Some(best) = self.best(&accepted) {
                        let before = ready.len();
                        ready.retain(|t| self.branches.compare(t.branch, best) == Ordering::Less);
                        tracer.trace_prune(before - ready.len());
                    }
                }
                _ => {}
            }

            if ready.is_empty() || pos >= self.end {
                break;
            }
            frontier = self.consume(ready, pos, tracer)?;
            pos += 1;
        }

        accepted.sort_by(|a, b| self.branches.compare(a.0, b.0));
        Ok(accepted
            .into_iter()
            .map(|(_, aux)| aux.into_accepted())
            .collect())
    }

    fn check_cancelled(&self) -> Result<(), MatchError> {
        let cancelled = self
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(atomic::Ordering::Relaxed));
        if cancelled {
            return Err(MatchError::Cancelled);
        }
        Ok(())
    }

    fn burn_fuel(&mut self) -> Result<(), MatchError> {
        if self.exec_fuel == 0 {
            return Err(MatchError::ExecFuelExhausted(self.limits.exec_fuel));
        }
        self.exec_fuel -= 1;
        Ok(())
    }

    fn best(&self, accepted: &[(BranchId, BranchState)]) -> Option<BranchId> {
        accepted
            .iter()
            .map(|(branch, _)| *branch)
            .min_by(|a, b| self.branches.compare(*a, *b))
    }

    /// Expands epsilon states depth-first in priority order. Returns the
    /// branches parked on consuming states; accepting branches go to
    /// `accepted`.
    fn close<Tr: Tracer>(
        &mut self,
        frontier: Vec<Thread>,
        start: usize,
        pos: usize,
        accepted: &mut Vec<(BranchId, BranchState)>,
        tracer: &mut Tr,
    ) -> Result<Vec<Thread>, MatchError> {
        let nfa = self.nfa;
        let mut ready = Vec::new();
        let mut stack: Vec<Thread> = frontier.into_iter().rev().collect();

        while let Some(mut thread) = stack.pop() {
            self.burn_fuel()?;
            let state = nfa.state(thread.state);
            tracer.trace_visit(thread.branch, thread.state, state.kind.label());

            match &state.kind {
                StateKind::Node(_) | StateKind::MultiNode { .. } => ready.push(thread),
                StateKind::BackRef { slot, group, .. } => {
                    let g = *group as usize;
                    if thread.aux.replays[*slot as usize].is_some() {
                        ready.push(thread);
                        continue;
                    }
                    if thread.aux.open[g].is_some() {
                        continue;
                    }
                    match thread.aux.groups[g].as_ref().map(MatchedGroup::is_empty) {
                        None => {}
                        Some(true) => self.fork(thread, &state.next, &mut stack, tracer),
                        Some(false) => ready.push(thread),
                    }
                }
                StateKind::Match if self.skip_empty && pos == start => {}
                StateKind::Match => {
                    tracer.trace_accept(thread.branch, pos);
                    accepted.push((thread.branch, thread.aux));
                }
                StateKind::Split => self.fork(thread, &state.next, &mut stack, tracer),
                StateKind::GroupStart(g) => {
                    // A re-entered group restarts; the newest begin wins.
                    thread.aux.open[*g as usize] = Some(pos);
                    self.fork(thread, &state.next, &mut stack, tracer);
                }
                StateKind::GroupEnd(g) => {
                    let g = *g as usize;
                    if let Some(begin) = thread.aux.open[g].take() {
                        let value = thread.aux.pending_value.take();
                        thread.aux.groups[g] = Some(MatchedGroup {
                            begin,
                            end: pos,
                            value,
                        });
                    }
                    self.fork(thread, &state.next, &mut stack, tracer);
                }
                StateKind::Value(value) => {
                    thread.aux.pending_value = Some(value.clone());
                    self.fork(thread, &state.next, &mut stack, tracer);
                }
                StateKind::SeqStart => {
                    if pos == 0 {
                        self.fork(thread, &state.next, &mut stack, tracer);
                    }
                }
                StateKind::SeqEnd => {
                    if pos == self.elements.len() {
                        self.fork(thread, &state.next, &mut stack, tracer);
                    }
                }
                StateKind::Repeat {
                    slot,
                    body,
                    min,
                    max,
                    greedy,
                } => {
                    let slot = *slot as usize;
                    let count = thread.aux.counters[slot];
                    let can_loop = max.is_none_or(|m| count < m);
                    let mut options = Vec::with_capacity(state.next.len() + 1);
                    if can_loop && *greedy {
                        options.push((*body, thread.aux.with_counter(slot, count + 1)));
                    }
                    if count >= *min {
                        for &next in &state.next {
                            options.push((next, thread.aux.with_counter(slot, 0)));
                        }
                    }
                    if can_loop && !*greedy {
                        options.push((*body, thread.aux.with_counter(slot, count + 1)));
                    }
                    self.fork_each(thread.branch, options, &mut stack, tracer);
                }
                StateKind::ConjStart { slot } => {
                    let record = self.conjs.open(state.next.len());
                    thread.aux.conjs[*slot as usize] = Some(record);
                    self.fork(thread, &state.next, &mut stack, tracer);
                }
                StateKind::ConjEnd {
                    slot,
                    child,
                    groups,
                } => {
                    let slot = *slot as usize;
                    let Some(record) = thread.aux.conjs[slot] else {
                        continue;
                    };
                    let child = *child as usize;
                    self.conjs.arrive(record, child, pos, &thread.aux);
                    if let Some(mut merged) = self.conjs.join(record, child, pos, &thread.aux, groups)
                    {
                        merged.conjs[slot] = None;
                        thread.aux = merged;
                        self.fork(thread, &state.next, &mut stack, tracer);
                    }
                }
            }
        }
        Ok(ready)
    }

    /// Pushes one child per target onto the depth-first stack so that the
    /// first target is expanded next.
    fn fork<Tr: Tracer>(
        &mut self,
        thread: Thread,
        targets: &[StateId],
        stack: &mut Vec<Thread>,
        tracer: &mut Tr,
    ) {
        let n = targets.len();
        if n == 0 {
            return;
        }
        if n > 1 {
            tracer.trace_split(thread.branch, n);
        }
        let Thread { branch, aux, .. } = thread;
        let children: Vec<BranchId> = (0..n).map(|i| self.branches.child(branch, i, n)).collect();
        for i in (1..n).rev() {
            stack.push(Thread {
                branch: children[i],
                state: targets[i],
                aux: aux.clone(),
            });
        }
        stack.push(Thread {
            branch: children[0],
            state: targets[0],
            aux,
        });
    }

    fn fork_each<Tr: Tracer>(
        &mut self,
        branch: BranchId,
        options: Vec<(StateId, BranchState)>,
        stack: &mut Vec<Thread>,
        tracer: &mut Tr,
    ) {
        let n = options.len();
        if n > 1 {
            tracer.trace_split(branch, n);
        }
        let children: Vec<BranchId> = (0..n).map(|i| self.branches.child(branch, i, n)).collect();
        for ((state, aux), child) in options.into_iter().zip(children).rev() {
            stack.push(Thread {
                branch: child,
                state,
                aux,
            });
        }
    }

    /// Successors of a branch that just consumed, in preference order.
    fn spread(&mut self, thread: Thread, targets: &[StateId], next: &mut Vec<Thread>) {
        let n = targets.len();
        let Thread { branch, aux, .. } = thread;
        for (i, &state) in targets.iter().enumerate() {
            next.push(Thread {
                branch: self.branches.child(branch, i, n),
                state,
                aux: aux.clone(),
            });
        }
    }

    /// Orders branches by preference and drops every branch whose state and
    /// branch state equal those of a better one.
    fn prioritize<Tr: Tracer>(&self, ready: &mut Vec<Thread>, tracer: &mut Tr) {
        ready.sort_by(|a, b| self.branches.compare(a.branch, b.branch));
        let before = ready.len();
        let mut kept: Vec<Thread> = Vec::with_capacity(before);
        let mut by_state: HashMap<StateId, Vec<usize>> = HashMap::new();
        for thread in ready.drain(..) {
            let seen = by_state.entry(thread.state).or_default();
            if seen.iter().any(|&i| kept[i].aux == thread.aux) {
                continue;
            }
            seen.push(kept.len());
            kept.push(thread);
        }
        *ready = kept;
        tracer.trace_dedup(before - ready.len());
    }

    /// Tests element `pos` for every ready branch.
    fn consume<Tr: Tracer>(
        &mut self,
        ready: Vec<Thread>,
        pos: usize,
        tracer: &mut Tr,
    ) -> Result<Vec<Thread>, MatchError> {
        let nfa = self.nfa;
        let elements = self.elements;
        let element = &elements[pos];
        let mut next = Vec::new();

        for mut thread in ready {
            self.burn_fuel()?;
            let state = nfa.state(thread.state);
            match &state.kind {
                StateKind::Node(predicate) => {
                    let matched = if self.match_with_result {
                        match predicate.test_with_result(element) {
                            None => false,
                            Some(Value::Null) => true,
                            Some(value) => {
                                thread.aux.node_results.push((pos, value));
                                true
                            }
                        }
                    } else {
                        predicate.test(element)
                    };
                    tracer.trace_consume(thread.branch, thread.state, pos, matched);
                    if matched {
                        thread.aux.pending_value = None;
                        self.spread(thread, &state.next, &mut next);
                    }
                }
                StateKind::MultiNode { predicate, slot } => {
                    let slot = *slot as usize;
                    if thread.aux.intervals[slot].is_some() {
                        tracer.trace_consume(thread.branch, thread.state, pos, true);
                        self.advance_interval(thread, slot, pos, &state.next, &mut next);
                        continue;
                    }
                    let mut intervals = predicate.match_from(elements, pos);
                    // Empty and misplaced spans are discarded.
                    intervals.retain(|iv| iv.start == pos && iv.end > pos && iv.end <= self.end);
                    if predicate.is_greedy() {
                        intervals.sort_by(|a, b| b.end.cmp(&a.end));
                    } else {
                        intervals.sort_by_key(|iv| iv.end);
                    }
                    tracer.trace_consume(thread.branch, thread.state, pos, !intervals.is_empty());

                    let n = intervals.len();
                    if n > 1 {
                        tracer.trace_split(thread.branch, n);
                    }
                    for (i, interval) in intervals.into_iter().enumerate() {
                        let mut aux = thread.aux.clone();
                        aux.intervals[slot] = Some(PendingInterval {
                            end: interval.end,
                            value: interval.value,
                        });
                        let child = Thread {
                            branch: self.branches.child(thread.branch, i, n),
                            state: thread.state,
                            aux,
                        };
                        self.advance_interval(child, slot, pos, &state.next, &mut next);
                    }
                }
                StateKind::BackRef {
                    slot,
                    group,
                    matcher,
                } => {
                    let slot = *slot as usize;
                    let Some(span) = thread.aux.groups[*group as usize]
                        .as_ref()
                        .map(MatchedGroup::span)
                    else {
                        continue;
                    };
                    let offset = thread.aux.replays[slot].unwrap_or(0);
                    let matched = matcher.equals(element, &elements[span.start + offset]);
                    tracer.trace_consume(thread.branch, thread.state, pos, matched);
                    if !matched {
                        continue;
                    }
                    thread.aux.pending_value = None;
                    if span.start + offset + 1 == span.end {
                        thread.aux.replays[slot] = None;
                        self.spread(thread, &state.next, &mut next);
                    } else {
                        thread.aux.replays[slot] = Some(offset + 1);
                        next.push(thread);
                    }
                }
                _ => unreachable!("non-consuming state scheduled for consumption"),
            }
        }
        Ok(next)
    }

    /// One element of a chosen interval is consumed; leave the multi-node
    /// once the interval's last element is behind us.
    fn advance_interval(
        &mut self,
        mut thread: Thread,
        slot: usize,
        pos: usize,
        targets: &[StateId],
        next: &mut Vec<Thread>,
    ) {
        let done = thread.aux.intervals[slot]
            .as_ref()
            .is_some_and(|iv| iv.end == pos + 1);
        if done {
            let interval = thread.aux.intervals[slot].take();
            thread.aux.pending_value = interval.and_then(|iv| iv.value);
            self.spread(thread, targets, next);
        } else {
            thread.aux.pending_value = None;
            next.push(thread);
        }
    }
}
