//! Errors reported while compiling a pattern.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("invalid repeat bounds {{{min},{max}}}: max is below min")]
    InvalidBounds { min: u32, max: u32 },

    #[error("`{operator}` needs at least one operand")]
    EmptyOperands { operator: &'static str },

    /// Unbounded repeat whose body can match without consuming.
    #[error("unbounded repeat over a pattern that can match empty")]
    EmptyLoop,

    #[error("back-reference to group {group}, but the pattern has {total} groups")]
    InvalidBackReference { group: u32, total: u32 },

    #[error("back-reference to group {group} before that group closes")]
    UnclosedBackReference { group: u32 },

    #[error("cannot transform {node}")]
    UnsupportedTransform { node: &'static str },
}
