//! Persisted form of an editing session.
//!
//! ```toml
//! next_id = 4
//!
//! [[kinds]]
//! name = "MoveTo"
//! description = "Custom leaf node with Tick function"
//!
//! [[roots]]
//! id = 1
//! kind = "SequenceNode"
//!
//! [[roots.children]]
//! id = 3
//! kind = "MoveTo"
//!
//! [view]
//! expanded = [1]
//! ```
//!
//! The tree and the view state are separate sections; the tree never depends
//! on what is expanded.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::application::editor::Editor;
use crate::domain::{
    Catalog, CatalogError, Forest, InvariantViolation, KindRecord, LayoutMetrics, NodeId,
    TreeNode,
};

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("parse document: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize document: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("{0}")]
    Catalog(#[from] CatalogError),

    #[error("node {id} refers to unknown kind '{kind}'")]
    UnknownKind { id: NodeId, kind: String },

    #[error("node id 0 is reserved")]
    ZeroId,

    #[error("invalid tree: {0}")]
    Invalid(#[from] InvariantViolation),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub next_id: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kinds: Vec<KindRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roots: Vec<NodeDoc>,
    #[serde(default)]
    pub view: ViewDoc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDoc {
    pub id: u64,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDoc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDoc {
    #[serde(default)]
    pub expanded: Vec<u64>,
}

impl Document {
    /// Snapshot an editor: custom kinds, forest, allocator and view state.
    pub fn capture(editor: &Editor) -> Self {
        Self {
            next_id: editor.catalog().next_id(),
            kinds: editor
                .catalog()
                .custom_kinds()
                .iter()
                .map(|kind| KindRecord::from(kind.as_ref()))
                .collect(),
            roots: editor.forest().roots().iter().map(NodeDoc::from).collect(),
            view: ViewDoc {
                expanded: editor.expanded().iter().map(NodeId::get).collect(),
            },
        }
    }

    /// Rebuild an editor, validating kinds, ids and capacities.
    ///
    /// Expanded ids that no longer exist are dropped.
    #[instrument(level = "debug", skip_all)]
    pub fn restore(self, metrics: LayoutMetrics) -> Result<Editor, DocumentError> {
        let mut catalog = Catalog::new();
        catalog.register(self.kinds)?;

        let roots = self
            .roots
            .iter()
            .map(|root| root.build(&catalog))
            .collect::<Result<Vec<_>, _>>()?;
        let forest = Forest::from_roots(roots);
        forest.check_invariants()?;

        let highest = forest.max_id().map_or(0, NodeId::get);
        catalog.reserve_through(highest.max(self.next_id.saturating_sub(1)));

        let expanded = self
            .view
            .expanded
            .into_iter()
            .map(NodeId::new)
            .filter(|id| forest.contains(*id))
            .collect();

        Ok(Editor::from_parts(catalog, forest, expanded, metrics))
    }

    pub fn from_toml(content: &str) -> Result<Self, DocumentError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, DocumentError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl NodeDoc {
    fn build(&self, catalog: &Catalog) -> Result<TreeNode, DocumentError> {
        if self.id == 0 {
            return Err(DocumentError::ZeroId);
        }
        let id = NodeId::new(self.id);
        let kind = catalog
            .get(&self.kind)
            .ok_or_else(|| DocumentError::UnknownKind {
                id,
                kind: self.kind.clone(),
            })?;

        let mut node = TreeNode::new(id, kind);
        for child in &self.children {
            node.push_child(child.build(catalog)?);
        }
        Ok(node)
    }
}

impl From<&TreeNode> for NodeDoc {
    fn from(node: &TreeNode) -> Self {
        Self {
            id: node.id().get(),
            kind: node.name().to_string(),
            children: node.children().iter().map(NodeDoc::from).collect(),
        }
    }
}
