//! Group id to variable name table.

use serde::{Deserialize, Serialize};

/// Variable names bound to capture groups, indexed by group id.
///
/// Index 0 is the implicit whole-match group and is never named.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupBindings {
    names: Vec<Option<String>>,
}

impl GroupBindings {
    pub fn new(names: Vec<Option<String>>) -> Self {
        Self { names }
    }

    /// Number of groups, including group 0.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, group: usize) -> Option<&str> {
        self.names.get(group)?.as_deref()
    }

    /// First group bound to `name`.
    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n.as_deref() == Some(name))
    }

    /// Named groups in id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names
            .iter()
            .enumerate()
            .filter_map(|(id, n)| Some((id, n.as_deref()?)))
    }
}
