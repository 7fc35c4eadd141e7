//! Compiled patterns.

use std::fmt;
use std::sync::Arc;

use seqex_automaton::{GroupBindings, Nfa, dump};
use seqex_compiler::{CompileError, CompileOptions, Compiler, PatternExpr, PatternTransformer};
use seqex_core::Colors;

use crate::matcher::SequenceMatcher;

/// A pattern compiled to an NFA, plus caller metadata.
///
/// Immutable once built; share it across threads and hand out any number of
/// matchers from it.
pub struct SequencePattern<T> {
    expr: PatternExpr<T>,
    nfa: Arc<Nfa<T>>,
    bindings: Arc<GroupBindings>,
    text: String,
    priority: f64,
    weight: f64,
    options: CompileOptions,
}

impl<T: 'static> SequencePattern<T> {
    pub fn compile(expr: PatternExpr<T>) -> Result<Self, CompileError> {
        Self::compile_with(expr, CompileOptions::default())
    }

    pub fn compile_with(expr: PatternExpr<T>, options: CompileOptions) -> Result<Self, CompileError> {
        let nfa = Compiler::new(options).compile(&expr)?;
        let bindings = Arc::new(nfa.bindings().clone());
        let text = expr.to_string();
        Ok(Self {
            expr,
            nfa: Arc::new(nfa),
            bindings,
            text,
            priority: 0.0,
            weight: 0.0,
            options,
        })
    }

    /// Recompiles the pattern over another element type. Text, priority and
    /// weight carry over.
    pub fn transform<U: 'static>(
        &self,
        transformer: &impl PatternTransformer<T, U>,
    ) -> Result<SequencePattern<U>, CompileError> {
        let expr = self.expr.transform(transformer)?;
        Ok(SequencePattern::compile_with(expr, self.options)?
            .with_text(self.text.clone())
            .with_priority(self.priority)
            .with_weight(self.weight))
    }
}

impl<T> SequencePattern<T> {
    /// Replaces the text reported by [`pattern_text`](Self::pattern_text).
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn matcher<'e>(&self, elements: &'e [T]) -> SequenceMatcher<'_, 'e, T> {
        SequenceMatcher::new(self, elements)
    }

    pub fn expr(&self) -> &PatternExpr<T> {
        &self.expr
    }

    pub fn nfa(&self) -> &Nfa<T> {
        &self.nfa
    }

    pub(crate) fn shared_bindings(&self) -> &Arc<GroupBindings> {
        &self.bindings
    }

    pub fn bindings(&self) -> &GroupBindings {
        &self.bindings
    }

    /// Capture groups, not counting the whole match.
    pub fn total_groups(&self) -> usize {
        self.nfa.total_groups()
    }

    /// Source text of the pattern; the rendered expression unless set.
    pub fn pattern_text(&self) -> &str {
        &self.text
    }

    pub fn priority(&self) -> f64 {
        self.priority
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }

    pub fn dump(&self, colors: Colors) -> String {
        dump(&self.nfa, colors)
    }
}

impl<T> Clone for SequencePattern<T> {
    fn clone(&self) -> Self {
        Self {
            expr: self.expr.clone(),
            nfa: Arc::clone(&self.nfa),
            bindings: Arc::clone(&self.bindings),
            text: self.text.clone(),
            priority: self.priority,
            weight: self.weight,
            options: self.options,
        }
    }
}

impl<T> fmt::Debug for SequencePattern<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequencePattern")
            .field("text", &self.text)
            .field("groups", &self.total_groups())
            .field("priority", &self.priority)
            .field("weight", &self.weight)
            .finish_non_exhaustive()
    }
}
