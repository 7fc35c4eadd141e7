//! Tracing infrastructure for debugging VM execution.
//!
//! The VM is generic over its tracer. With [`NoopTracer`] every hook is an
//! empty `#[inline(always)]` function and the calls compile away; the VM
//! keeps no tracing state of its own.

use seqex_automaton::StateId;
use seqex_core::Colors;

use super::branch::BranchId;

/// Verbosity level for trace output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Positions, consume attempts and accepts.
    #[default]
    Default,
    /// Adds splits, dedup and prune counts.
    Verbose,
    /// Adds every epsilon state visit.
    VeryVerbose,
}

/// Hooks called by the VM at fixed points:
/// - `trace_position` - before expanding branches at an input position
/// - `trace_visit` - for each state a branch passes through
/// - `trace_consume` - after a consuming state tests the current element
/// - `trace_split` - when a branch forks into several children
/// - `trace_accept` - when a branch reaches the match state
/// - `trace_dedup` - after duplicate branches are dropped
/// - `trace_prune` - after branches that cannot beat the best match are dropped
pub trait Tracer {
    fn trace_position(&mut self, pos: usize);

    fn trace_visit(&mut self, branch: BranchId, state: StateId, label: &'static str);

    fn trace_consume(&mut self, branch: BranchId, state: StateId, pos: usize, matched: bool);

    fn trace_split(&mut self, branch: BranchId, count: usize);

    fn trace_accept(&mut self, branch: BranchId, end: usize);

    fn trace_dedup(&mut self, dropped: usize);

    fn trace_prune(&mut self, dropped: usize);
}

/// No-op tracer that gets optimized away completely.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline(always)]
    fn trace_position(&mut self, _pos: usize) {}

    #[inline(always)]
    fn trace_visit(&mut self, _branch: BranchId, _state: StateId, _label: &'static str) {}

    #[inline(always)]
    fn trace_consume(&mut self, _branch: BranchId, _state: StateId, _pos: usize, _matched: bool) {
    }

    #[inline(always)]
    fn trace_split(&mut self, _branch: BranchId, _count: usize) {}

    #[inline(always)]
    fn trace_accept(&mut self, _branch: BranchId, _end: usize) {}

    #[inline(always)]
    fn trace_dedup(&mut self, _dropped: usize) {}

    #[inline(always)]
    fn trace_prune(&mut self, _dropped: usize) {}
}

/// Tracer that collects human-readable lines.
pub struct PrintTracer {
    verbosity: Verbosity,
    colors: Colors,
    lines: Vec<String>,
}

impl PrintTracer {
    pub fn new(verbosity: Verbosity, colors: Colors) -> Self {
        Self {
            verbosity,
            colors,
            lines: Vec::new(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn print(&self) {
        for line in &self.lines {
            println!("{line}");
        }
    }

    fn verbose(&self) -> bool {
        self.verbosity != Verbosity::Default
    }
}

impl Tracer for PrintTracer {
    fn trace_position(&mut self, pos: usize) {
        let c = self.colors;
        self.lines.push(format!("{}@{pos}{}", c.blue, c.reset));
    }

    fn trace_visit(&mut self, branch: BranchId, state: StateId, label: &'static str) {
        if self.verbosity != Verbosity::VeryVerbose {
            return;
        }
        let c = self.colors;
        self.lines
            .push(format!("  {branch} #{state} {}{label}{}", c.dim, c.reset));
    }

    fn trace_consume(&mut self, branch: BranchId, state: StateId, _pos: usize, matched: bool) {
        let c = self.colors;
        let outcome = if matched {
            format!("{}ok{}", c.green, c.reset)
        } else {
            format!("{}no{}", c.dim, c.reset)
        };
        self.lines
            .push(format!("  {branch} #{state} consume {outcome}"));
    }

    fn trace_split(&mut self, branch: BranchId, count: usize) {
        if self.verbose() {
            self.lines.push(format!("  {branch} split {count}"));
        }
    }

    fn trace_accept(&mut self, branch: BranchId, end: usize) {
        let c = self.colors;
        self.lines
            .push(format!("  {branch} {}accept{} {end}", c.green, c.reset));
    }

    fn trace_dedup(&mut self, dropped: usize) {
        if self.verbose() && dropped > 0 {
            self.lines.push(format!("  dedup {dropped}"));
        }
    }

    fn trace_prune(&mut self, dropped: usize) {
        if self.verbose() && dropped > 0 {
            self.lines.push(format!("  prune {dropped}"));
        }
    }
}
