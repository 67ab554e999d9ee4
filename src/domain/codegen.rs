//! Code generation: serializes the forest into nested template syntax.
//!
//! ```text
//! SequenceNode<InvertNode<MoveTo>, SelectorNode<void>>
//! ```

use itertools::Itertools;

use crate::domain::catalog::KindClass;
use crate::domain::entities::TreeNode;
use crate::domain::forest::Forest;

/// Placeholder emitted for a composite node without children.
pub const VOID: &str = "void";

/// One line per root, in forest order.
pub fn generate(forest: &Forest) -> String {
    forest.roots().iter().map(generate_node).join("\n")
}

pub fn generate_node(node: &TreeNode) -> String {
    match node.class() {
        KindClass::Leaf => node.name().to_string(),
        KindClass::Decorator => {
            let child = node
                .children()
                .first()
                .map(generate_node)
                .unwrap_or_else(|| VOID.to_string());
            format!("{}<{}>", node.name(), child)
        }
        KindClass::Control => {
            let children = if node.has_children() {
                node.children().iter().map(generate_node).join(", ")
            } else {
                VOID.to_string()
            };
            format!("{}<{}>", node.name(), children)
        }
    }
}
