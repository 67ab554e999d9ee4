//! Tree store: the forest of behavior tree nodes and its structural edits.
//!
//! Every edit works on owned child sequences. Targets are looked up by id
//! from the top; paths are only used right after they were computed.

use std::collections::HashSet;

use tracing::{debug, error, instrument};

use crate::domain::catalog::KindClass;
use crate::domain::entities::{MoveMode, NodeId, NodePath, TreeNode};
use crate::domain::error::{EditError, InvariantViolation, Locator};

/// Result of [`Forest::find_by_id`].
#[derive(Debug, Clone)]
pub struct Located<'a> {
    pub node: &'a TreeNode,
    /// Child indices from the root sequence to `node`.
    pub path: NodePath,
    /// `None` for a top-level root.
    pub parent: Option<&'a TreeNode>,
}

impl Located<'_> {
    /// Index of the node within its parent's children (or the root sequence).
    pub fn index(&self) -> usize {
        self.path.last().copied().unwrap_or(0)
    }
}

/// Ordered top-level nodes with their subtrees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Forest {
    roots: Vec<TreeNode>,
}

/// Where a node sat before a move, for putting it back.
#[derive(Debug)]
struct MovePlan {
    path: NodePath,
    parent: Option<NodeId>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from already linked subtrees. Used by document loading.
    pub(crate) fn from_roots(mut roots: Vec<TreeNode>) -> Self {
        for root in &mut roots {
            root.parent = None;
        }
        Self { roots }
    }

    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of nodes in the whole forest.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Number of rows: 0 for an empty forest, 1 for roots only.
    pub fn depth(&self) -> usize {
        self.iter().map(|(depth, _)| depth + 1).max().unwrap_or(0)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.iter().map(|(_, node)| node).find(|node| node.id() == id)
    }

    pub fn max_id(&self) -> Option<NodeId> {
        self.iter().map(|(_, node)| node.id()).max()
    }

    /// Depth-first pre-order traversal yielding `(depth, node)`.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            stack: self.roots.iter().rev().map(|root| (0, root)).collect(),
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn find_by_id(&self, id: NodeId) -> Option<Located<'_>> {
        let mut path = Vec::new();
        locate(&self.roots, id, None, &mut path)
    }

    /// Append `node` to the root sequence. Roots have no capacity limit.
    #[instrument(level = "debug", skip(self, node), fields(id = %node.id()))]
    pub fn insert_as_root(&mut self, mut node: TreeNode) -> NodeId {
        self.debug_assert_absent(&node);
        node.parent = None;
        let id = node.id();
        self.roots.push(node);
        id
    }

    /// Detach the subtree at `path` and hand it back.
    ///
    /// A path that no longer resolves is reported as `NotFound` and leaves the
    /// forest untouched.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_by_path(&mut self, path: &[usize]) -> Result<TreeNode, EditError> {
        let stale = || EditError::NotFound(Locator::Path(path.to_vec()));
        let (&last, ancestors) = path.split_last().ok_or_else(stale)?;

        let mut siblings = &mut self.roots;
        for &index in ancestors {
            siblings = &mut siblings.get_mut(index).ok_or_else(stale)?.children;
        }
        if last >= siblings.len() {
            debug!("stale path, nothing removed");
            return Err(stale());
        }

        let mut node = siblings.remove(last);
        node.parent = None;
        Ok(node)
    }

    /// Insert `node` immediately before `target`, next to it.
    pub fn insert_as_sibling(&mut self, node: TreeNode, target: NodeId) -> Result<(), EditError> {
        self.debug_assert_absent(&node);
        self.try_insert_as_sibling(node, target)
            .map_err(|(_, err)| err)
    }

    /// Append `node` as the last child of `target`.
    pub fn insert_as_child(&mut self, node: TreeNode, target: NodeId) -> Result<(), EditError> {
        self.debug_assert_absent(&node);
        self.try_insert_as_child(node, target).map_err(|(_, err)| err)
    }

    /// Inserted subtrees must carry ids the forest does not hold yet.
    fn debug_assert_absent(&self, node: &TreeNode) {
        debug_assert!(
            node.subtree_ids().into_iter().all(|id| !self.contains(id)),
            "{} is already in the forest",
            node.id()
        );
    }

    /// Re-parent `source` relative to `target`.
    ///
    /// Either every precondition holds and the move happens, or the forest
    /// stays exactly as it was.
    #[instrument(level = "debug", skip(self))]
    pub fn move_node(
        &mut self,
        source: NodeId,
        target: NodeId,
        mode: MoveMode,
    ) -> Result<(), EditError> {
        let plan = self.plan_move(source, target, mode)?;

        // removal first: the planned path is only valid on the unmodified forest
        let node = self.remove_by_path(&plan.path)?;
        let inserted = match mode {
            MoveMode::Sibling => self.try_insert_as_sibling(node, target),
            MoveMode::Child => self.try_insert_as_child(node, target),
        };
        if let Err((node, err)) = inserted {
            error!(%source, %target, "insert failed after planning, restoring: {}", err);
            self.reattach(plan.parent, plan.path.last().copied().unwrap_or(0), node);
            return Err(err);
        }

        debug_assert_eq!(self.check_invariants(), Ok(()));
        Ok(())
    }

    /// Verify the structural invariants of the whole forest.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut seen = HashSet::new();
        for root in &self.roots {
            if let Some(parent) = root.parent() {
                return Err(InvariantViolation::RootWithParent {
                    id: root.id(),
                    parent,
                });
            }
            check_subtree(root, &mut seen)?;
        }
        Ok(())
    }

    fn plan_move(
        &self,
        source: NodeId,
        target: NodeId,
        mode: MoveMode,
    ) -> Result<MovePlan, EditError> {
        let src = self
            .find_by_id(source)
            .ok_or_else(|| EditError::missing(source))?;
        let tgt = self
            .find_by_id(target)
            .ok_or_else(|| EditError::missing(target))?;

        if source == target {
            return Err(EditError::SelfTarget(source));
        }
        if src.node.contains(target) {
            return Err(EditError::CycleRejected {
                node: source,
                target,
            });
        }

        let src_parent = src.parent.map(TreeNode::id);
        let host = match mode {
            MoveMode::Child => Some(tgt.node),
            MoveMode::Sibling => tgt.parent,
        };
        if let Some(host) = host {
            // the source may already live under the host and leave it first
            let staying = host.children().len() - usize::from(src_parent == Some(host.id()));
            check_accepts(host, staying + 1)?;
        }

        Ok(MovePlan {
            path: src.path,
            parent: src_parent,
        })
    }

    fn try_insert_as_sibling(
        &mut self,
        mut node: TreeNode,
        target: NodeId,
    ) -> Result<(), (TreeNode, EditError)> {
        let (parent, index) = match self.find_by_id(target) {
            None => return Err((node, EditError::missing(target))),
            Some(found) => match found.parent {
                None => (None, found.index()),
                Some(parent) => {
                    if let Err(err) = check_accepts(parent, parent.children().len() + 1) {
                        return Err((node, err));
                    }
                    (Some(parent.id()), found.index())
                }
            },
        };

        match parent {
            None => {
                let Some(index) = self.roots.iter().position(|root| root.id() == target) else {
                    return Err((node, EditError::missing(target)));
                };
                node.parent = None;
                self.roots.insert(index, node);
            }
            Some(parent_id) => {
                let Some(parent) = self.node_mut(parent_id) else {
                    return Err((node, EditError::missing(parent_id)));
                };
                node.parent = Some(parent_id);
                parent.children.insert(index, node);
            }
        }
        Ok(())
    }

    fn try_insert_as_child(
        &mut self,
        node: TreeNode,
        target: NodeId,
    ) -> Result<(), (TreeNode, EditError)> {
        let Some(host) = self.node_mut(target) else {
            return Err((node, EditError::missing(target)));
        };
        if let Err(err) = check_accepts(host, host.children().len() + 1) {
            return Err((node, err));
        }
        host.push_child(node);
        Ok(())
    }

    fn reattach(&mut self, parent: Option<NodeId>, index: usize, mut node: TreeNode) {
        node.parent = parent;
        let siblings = match parent {
            None => Some(&mut self.roots),
            Some(id) => self.node_mut(id).map(|p| &mut p.children),
        };
        match siblings {
            Some(siblings) => {
                let at = index.min(siblings.len());
                siblings.insert(at, node);
            }
            None => error!(id = %node.id(), "lost parent while restoring node"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        find_mut(&mut self.roots, id)
    }
}

/// Pre-order iterator over `(depth, node)` pairs.
#[derive(Debug)]
pub struct Iter<'a> {
    stack: Vec<(usize, &'a TreeNode)>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (usize, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        // reversed so children come out left to right
        for child in node.children().iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, node))
    }
}

fn locate<'a>(
    nodes: &'a [TreeNode],
    id: NodeId,
    parent: Option<&'a TreeNode>,
    path: &mut NodePath,
) -> Option<Located<'a>> {
    for (index, node) in nodes.iter().enumerate() {
        path.push(index);
        if node.id() == id {
            return Some(Located {
                node,
                path: path.clone(),
                parent,
            });
        }
        if let Some(found) = locate(node.children(), id, Some(node), path) {
            return Some(found);
        }
        path.pop();
    }
    None
}

fn find_mut(nodes: &mut [TreeNode], id: NodeId) -> Option<&mut TreeNode> {
    nodes.iter_mut().find_map(|node| {
        if node.id() == id {
            Some(node)
        } else {
            find_mut(&mut node.children, id)
        }
    })
}

/// Can `host` hold `resulting` children?
fn check_accepts(host: &TreeNode, resulting: usize) -> Result<(), EditError> {
    if host.class() == KindClass::Leaf {
        return Err(EditError::InvalidTarget(host.id()));
    }
    let capacity = host.kind().max_children;
    if !capacity.admits(resulting) {
        return Err(EditError::CapacityExceeded {
            id: host.id(),
            max: capacity.max().unwrap_or(usize::MAX),
        });
    }
    Ok(())
}

fn check_subtree(node: &TreeNode, seen: &mut HashSet<NodeId>) -> Result<(), InvariantViolation> {
    if !seen.insert(node.id()) {
        return Err(InvariantViolation::DuplicateId(node.id()));
    }
    let capacity = node.kind().max_children;
    if !capacity.admits(node.children().len()) {
        return Err(InvariantViolation::OverCapacity {
            id: node.id(),
            count: node.children().len(),
            max: capacity.max().unwrap_or(usize::MAX),
        });
    }
    for child in node.children() {
        if child.parent() != Some(node.id()) {
            return Err(InvariantViolation::ParentMismatch {
                id: child.id(),
                owner: node.id(),
                parent: child.parent(),
            });
        }
        check_subtree(child, seen)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Catalog;

    fn node(catalog: &mut Catalog, kind: &str) -> TreeNode {
        catalog.instantiate_named(kind).unwrap()
    }

    #[test]
    fn given_nested_node_when_locating_then_reports_path_and_parent() {
        let mut catalog = Catalog::new();
        let mut forest = Forest::new();
        let first = forest.insert_as_root(node(&mut catalog, "SequenceNode"));
        let seq = forest.insert_as_root(node(&mut catalog, "SequenceNode"));
        let inv = node(&mut catalog, "InvertNode");
        let inv_id = inv.id();
        forest.insert_as_child(inv, seq).unwrap();

        let found = forest.find_by_id(inv_id).unwrap();
        assert_eq!(found.path, vec![1, 0]);
        assert_eq!(found.parent.map(TreeNode::id), Some(seq));
        assert_eq!(found.index(), 0);

        let root = forest.find_by_id(first).unwrap();
        assert_eq!(root.path, vec![0]);
        assert!(root.parent.is_none());
    }

    #[test]
    fn given_empty_path_when_removing_then_not_found() {
        let mut forest = Forest::new();
        assert!(matches!(
            forest.remove_by_path(&[]),
            Err(EditError::NotFound(Locator::Path(_)))
        ));
    }

    #[test]
    fn given_forest_when_iterating_then_visits_pre_order_with_depth() {
        let mut catalog = Catalog::new();
        let mut forest = Forest::new();
        let seq = forest.insert_as_root(node(&mut catalog, "SequenceNode"));
        let a = node(&mut catalog, "RetryNode");
        let a_id = a.id();
        forest.insert_as_child(a, seq).unwrap();
        let b = node(&mut catalog, "ParallelNode");
        let b_id = b.id();
        forest.insert_as_child(b, seq).unwrap();

        let visited: Vec<(usize, NodeId)> = forest.iter().map(|(d, n)| (d, n.id())).collect();
        assert_eq!(visited, vec![(0, seq), (1, a_id), (1, b_id)]);
        assert_eq!(forest.depth(), 2);
        assert_eq!(forest.len(), 3);
    }
}
