//! Domain entities: node identifiers, tree nodes and view state

use std::collections::BTreeSet;
use std::fmt;
use std::num::ParseIntError;
use std::rc::Rc;
use std::str::FromStr;

use crate::domain::catalog::{KindClass, NodeKind};

/// Identifier of a tree node.
///
/// Allocated once by the catalog when a kind is instantiated, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Accepts both `12` and `#12`, the latter being how ids are printed.
impl FromStr for NodeId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(Self)
    }
}

/// Child indices leading from the root sequence down to a node.
pub type NodePath = Vec<usize>;

/// Where a moved node lands relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveMode {
    /// Immediately before the target, under the target's parent.
    Sibling,
    /// Appended as the target's last child.
    Child,
}

impl fmt::Display for MoveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveMode::Sibling => write!(f, "sibling"),
            MoveMode::Child => write!(f, "child"),
        }
    }
}

/// A node of the behavior tree.
///
/// Children are owned; the parent link is a plain id so no node is ever
/// reachable from two places.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    id: NodeId,
    kind: Rc<NodeKind>,
    pub(crate) children: Vec<TreeNode>,
    pub(crate) parent: Option<NodeId>,
}

impl TreeNode {
    /// Detached node without children. Only the catalog and document
    /// loading create nodes, so ids stay unique.
    pub(crate) fn new(id: NodeId, kind: Rc<NodeKind>) -> Self {
        Self {
            id,
            kind,
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &Rc<NodeKind> {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.kind.name
    }

    pub fn class(&self) -> KindClass {
        self.kind.class
    }

    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// True if `id` is this node or any node below it.
    pub fn contains(&self, id: NodeId) -> bool {
        self.id == id || self.children.iter().any(|c| c.contains(id))
    }

    /// Ids of this node and all its descendants, pre-order.
    pub fn subtree_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            ids.push(node.id);
            for child in node.children.iter().rev() {
                stack.push(child);
            }
        }
        ids
    }

    /// Attach `child` as last child, fixing up its parent link.
    pub(crate) fn push_child(&mut self, mut child: TreeNode) {
        child.parent = Some(self.id);
        self.children.push(child);
    }
}

/// Node ids whose children are shown. View state only, never part of the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedSet(BTreeSet<NodeId>);

impl ExpandedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.0.contains(&id)
    }

    /// Returns true if the id was not expanded before.
    pub fn expand(&mut self, id: NodeId) -> bool {
        self.0.insert(id)
    }

    /// Returns true if the id was expanded before.
    pub fn collapse(&mut self, id: NodeId) -> bool {
        self.0.remove(&id)
    }

    /// Flip the flag and return the new state.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        if self.0.remove(&id) {
            false
        } else {
            self.0.insert(id);
            true
        }
    }

    pub fn retain(&mut self, keep: impl FnMut(&NodeId) -> bool) {
        self.0.retain(keep);
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<NodeId> for ExpandedSet {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
