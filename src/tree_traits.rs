//! Text rendering of trees via `termtree`.

use termtree::Tree;
use tracing::instrument;

use crate::domain::{ExpandedSet, Forest, TreeNode};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

/// Label shown for a node, e.g. `SequenceNode #3 (control)`.
pub fn node_label(node: &TreeNode) -> String {
    format!("{} {} ({})", node.name(), node.id(), node.class())
}

impl TreeNodeConvert for TreeNode {
    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children().iter().map(|c| c.to_tree_string()).collect();
        Tree::new(node_label(self)).with_leaves(leaves)
    }
}

/// Roots of a forest become the leaves of a single `forest` tree.
impl TreeNodeConvert for Forest {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        if self.is_empty() {
            return Tree::new("Empty forest".to_string());
        }
        let leaves: Vec<_> = self.roots().iter().map(|r| r.to_tree_string()).collect();
        Tree::new("forest".to_string()).with_leaves(leaves)
    }
}

/// Render only what an expanded set makes visible; collapsed composites get a `[+]` mark.
pub fn visible_tree(node: &TreeNode, expanded: &ExpandedSet) -> Tree<String> {
    if node.has_children() && !expanded.contains(node.id()) {
        return Tree::new(format!("{} [+]", node_label(node)));
    }
    let leaves: Vec<_> = node
        .children()
        .iter()
        .map(|c| visible_tree(c, expanded))
        .collect();
    Tree::new(node_label(node)).with_leaves(leaves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Catalog;

    #[test]
    fn given_sequence_with_leaf_when_rendering_then_nested_labels() {
        let mut catalog = Catalog::new();
        catalog
            .register(vec![crate::domain::KindRecord::leaf("MoveTo", "")])
            .unwrap();
        let mut forest = Forest::new();
        let seq = forest.insert_as_root(catalog.instantiate_named("SequenceNode").unwrap());
        forest
            .insert_as_child(catalog.instantiate_named("MoveTo").unwrap(), seq)
            .unwrap();

        let rendered = forest.roots()[0].to_tree_string().to_string();

        assert!(rendered.starts_with("SequenceNode #1 (control)"));
        assert!(rendered.contains("MoveTo #2 (leaf)"));
    }

    #[test]
    fn given_collapsed_node_when_rendering_visible_then_children_hidden() {
        let mut catalog = Catalog::new();
        let mut forest = Forest::new();
        let inv = forest.insert_as_root(catalog.instantiate_named("InvertNode").unwrap());
        forest
            .insert_as_child(catalog.instantiate_named("SequenceNode").unwrap(), inv)
            .unwrap();

        let rendered = visible_tree(&forest.roots()[0], &ExpandedSet::new()).to_string();

        assert!(rendered.contains("[+]"));
        assert!(!rendered.contains("SequenceNode"));
    }

    #[test]
    fn given_forest_when_rendering_then_roots_hang_off_forest_label() {
        let mut catalog = Catalog::new();
        let mut forest = Forest::new();
        assert_eq!(forest.to_tree_string().to_string().trim(), "Empty forest");

        forest.insert_as_root(catalog.instantiate_named("RetryNode").unwrap());
        forest.insert_as_root(catalog.instantiate_named("ParallelNode").unwrap());

        let rendered = forest.to_tree_string().to_string();
        assert!(rendered.starts_with("forest"));
        assert!(rendered.contains("RetryNode #1 (decorator)"));
        assert!(rendered.contains("ParallelNode #2 (control)"));
    }
}
