//! Domain layer: the tree-editing engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod catalog;
pub mod codegen;
pub mod entities;
pub mod error;
pub mod forest;
pub mod layout;

pub use catalog::{Capacity, Catalog, KindClass, KindRecord, NodeKind};
pub use entities::{ExpandedSet, MoveMode, NodeId, NodePath, TreeNode};
pub use error::{CatalogError, EditError, InvariantViolation, Locator};
pub use forest::{Forest, Located};
pub use layout::{Connector, Layout, LayoutMetrics, PlacedNode, Rect};
