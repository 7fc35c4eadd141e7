//! Branch identity arena.
//!
//! Implements the cactus stack pattern: every split appends one node per
//! child pointing at the parent, and nodes are never removed during a
//! search. A branch's identity is its root-to-leaf path of child indices;
//! comparing paths lexicographically ranks branches by preference, with an
//! ancestor ranking before its descendants.

use std::cmp::Ordering;
use std::fmt;

/// Handle to a node in a [`BranchArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BranchId(u32);

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

#[derive(Clone, Copy, Debug)]
struct BranchNode {
    parent: Option<u32>,
    /// Position among the parent's children.
    index: u32,
}

/// Append-only arena of branch ids.
#[derive(Debug, Default)]
pub struct BranchArena {
    nodes: Vec<BranchNode>,
}

impl BranchArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every node. Ids handed out before are invalid afterwards.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&mut self) -> BranchId {
        self.push(None, 0)
    }

    /// Id of child `index` out of `siblings`. A sole child keeps its parent's id.
    pub fn child(&mut self, parent: BranchId, index: usize, siblings: usize) -> BranchId {
        if siblings <= 1 {
            return parent;
        }
        self.push(Some(parent.0), index as u32)
    }

    fn push(&mut self, parent: Option<u32>, index: u32) -> BranchId {
        let id = self.nodes.len() as u32;
        self.nodes.push(BranchNode { parent, index });
        BranchId(id)
    }

    /// Child indices from the root down to `id`, root excluded.
    pub fn path(&self, id: BranchId) -> Vec<u32> {
        let mut path = Vec::new();
        let mut cursor = Some(id.0);
        while let Some(i) = cursor {
            let node = self.nodes[i as usize];
            if node.parent.is_some() {
                path.push(node.index);
            }
            cursor = node.parent;
        }
        path.reverse();
        path
    }

    /// `Less` means `a` is preferred over `b`.
    pub fn compare(&self, a: BranchId, b: BranchId) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        self.path(a).cmp(&self.path(b))
    }
}
