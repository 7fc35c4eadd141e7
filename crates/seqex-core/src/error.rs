//! Errors raised while building element predicates.

#[derive(Debug, thiserror::Error)]
pub enum PredicateError {
    /// The regex could not be compiled to a DFA.
    #[error("invalid regex `{pattern}`: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: Box<regex_automata::dfa::dense::BuildError>,
    },
}
