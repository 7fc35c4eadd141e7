//! Compile entry point.

use seqex_automaton::Nfa;

use crate::error::CompileError;
use crate::expr::PatternExpr;
use crate::lower::Lowering;

/// Compilation settings.
#[derive(Clone, Copy, Debug)]
pub struct CompileOptions {
    /// Fold large literal alternations (default: true).
    pub(crate) optimize: bool,
    /// Greedy repeats with both bounds at most this are unrolled (default: 5).
    pub(crate) unroll_limit: u32,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            optimize: true,
            unroll_limit: 5,
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn optimize(mut self, enabled: bool) -> Self {
        self.optimize = enabled;
        self
    }

    pub fn unroll_limit(mut self, limit: u32) -> Self {
        self.unroll_limit = limit;
        self
    }

    pub fn get_optimize(&self) -> bool {
        self.optimize
    }

    pub fn get_unroll_limit(&self) -> u32 {
        self.unroll_limit
    }
}

/// Turns pattern expressions into NFAs.
#[derive(Clone, Copy, Debug, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }

    pub fn compile<T: 'static>(&self, expr: &PatternExpr<T>) -> Result<Nfa<T>, CompileError> {
        let total = expr.capture_count();
        let lowering = Lowering::new(total, self.options.unroll_limit);
        if self.options.optimize {
            lowering.finish(&expr.clone().optimize())
        } else {
            lowering.finish(expr)
        }
    }
}

/// Compiles with default options.
pub fn compile<T: 'static>(expr: &PatternExpr<T>) -> Result<Nfa<T>, CompileError> {
    Compiler::default().compile(expr)
}
