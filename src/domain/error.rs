//! Domain-level errors (no external dependencies)

use std::fmt;

use thiserror::Error;

use crate::domain::entities::{NodeId, NodePath};

/// What a structural operation was looking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Id(NodeId),
    Path(NodePath),
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(id) => write!(f, "{}", id),
            Locator::Path(path) => write!(f, "path {:?}", path),
        }
    }
}

/// Rejected structural edits.
///
/// These are expected user gestures (dragging onto a full decorator, onto a
/// descendant, ...). A rejected edit never changes the forest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("node not found: {0}")]
    NotFound(Locator),

    #[error("{id} already holds its maximum of {max} children")]
    CapacityExceeded { id: NodeId, max: usize },

    #[error("cannot move {node} below its own descendant {target}")]
    CycleRejected { node: NodeId, target: NodeId },

    #[error("{0} is a leaf and cannot take children")]
    InvalidTarget(NodeId),

    #[error("cannot move {0} relative to itself")]
    SelfTarget(NodeId),
}

impl EditError {
    pub(crate) fn missing(id: NodeId) -> Self {
        Self::NotFound(Locator::Id(id))
    }
}

/// Catalog registration and lookup failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown node kind: {0}")]
    UnknownKind(String),

    #[error("malformed kind record '{name}': {reason}")]
    MalformedRecord { name: String, reason: String },
}

/// Broken forest invariant. Indicates a bug in the engine, never a user error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("node id {0} occurs more than once")]
    DuplicateId(NodeId),

    #[error("root {id} claims parent {parent}")]
    RootWithParent { id: NodeId, parent: NodeId },

    #[error("{id} is owned by {owner} but points to {parent:?}")]
    ParentMismatch {
        id: NodeId,
        owner: NodeId,
        parent: Option<NodeId>,
    },

    #[error("{id} holds {count} children, kind allows {max}")]
    OverCapacity { id: NodeId, count: usize, max: usize },
}
