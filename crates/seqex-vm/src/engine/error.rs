//! Errors that can occur while matching or reading results.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// Too many state visits in one search.
    #[error("match execution limit of {0} steps exceeded")]
    ExecFuelExhausted(u32),

    /// Too many live branches at one position.
    #[error("more than {0} live branches")]
    BranchLimitExceeded(usize),

    #[error("match cancelled")]
    Cancelled,

    #[error("no group {group}: the pattern has {count} groups")]
    InvalidGroup { group: usize, count: usize },

    #[error("no group is bound to variable `{0}`")]
    UnknownVariable(String),

    #[error("invalid region {start}..{end} over {len} elements")]
    InvalidRegion { start: usize, end: usize, len: usize },
}

/// Errors from the binary snapshot codec.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot codec failed: {0}")]
    Codec(#[from] postcard::Error),
}
