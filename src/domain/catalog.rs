//! Node catalog: the registry of node kinds.
//!
//! Holds the built-in decorator and control kinds plus any leaf kinds
//! registered from outside (for example by the source scanner). The catalog
//! also allocates node ids, so every instantiated node gets a fresh one.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::entities::{NodeId, TreeNode};
use crate::domain::error::CatalogError;

/// Structural class of a node kind. Decides the generated code form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindClass {
    Leaf,
    Decorator,
    Control,
}

impl fmt::Display for KindClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KindClass::Leaf => f.pad("leaf"),
            KindClass::Decorator => f.pad("decorator"),
            KindClass::Control => f.pad("control"),
        }
    }
}

/// Maximum number of children a kind accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capacity {
    Zero,
    One,
    Unbounded,
}

impl Capacity {
    pub fn max(self) -> Option<usize> {
        match self {
            Capacity::Zero => Some(0),
            Capacity::One => Some(1),
            Capacity::Unbounded => None,
        }
    }

    /// True if a node of this capacity may hold `count` children.
    pub fn admits(self, count: usize) -> bool {
        self.max().map_or(true, |max| count <= max)
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max() {
            Some(max) => write!(f, "{}", max),
            None => write!(f, "unbounded"),
        }
    }
}

/// Template for tree nodes. Shared by all instances via `Rc`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeKind {
    pub class: KindClass,
    pub name: String,
    pub description: String,
    pub max_children: Capacity,
}

impl NodeKind {
    pub fn leaf(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            class: KindClass::Leaf,
            name: name.into(),
            description: description.into(),
            max_children: Capacity::Zero,
        }
    }

    pub fn decorator(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            class: KindClass::Decorator,
            name: name.into(),
            description: description.into(),
            max_children: Capacity::One,
        }
    }

    pub fn control(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            class: KindClass::Control,
            name: name.into(),
            description: description.into(),
            max_children: Capacity::Unbounded,
        }
    }
}

/// Normalized kind record as delivered by kind discovery.
///
/// Only leaf records (`max_children = 0`) are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub max_children: u32,
}

impl KindRecord {
    pub fn leaf(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            max_children: 0,
        }
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let malformed = |reason: &str| CatalogError::MalformedRecord {
            name: self.name.clone(),
            reason: reason.to_string(),
        };
        let mut chars = self.name.chars();
        match chars.next() {
            None => return Err(malformed("empty name")),
            Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
                return Err(malformed("name must start with a letter or underscore"))
            }
            _ => {}
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(malformed("name is not an identifier"));
        }
        if self.max_children != 0 {
            return Err(malformed("discovered kinds must be leaves"));
        }
        Ok(())
    }
}

impl From<&NodeKind> for KindRecord {
    fn from(kind: &NodeKind) -> Self {
        Self {
            name: kind.name.clone(),
            description: kind.description.clone(),
            max_children: kind.max_children.max().unwrap_or(0) as u32,
        }
    }
}

/// Registry of kinds plus the node id allocator.
#[derive(Debug, Clone)]
pub struct Catalog {
    kinds: Vec<Rc<NodeKind>>,
    builtin_count: usize,
    next_id: u64,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Catalog holding the built-in decorator and control kinds.
    pub fn new() -> Self {
        let kinds: Vec<Rc<NodeKind>> = builtin_kinds().into_iter().map(Rc::new).collect();
        Self {
            builtin_count: kinds.len(),
            kinds,
            next_id: 1,
        }
    }

    pub fn list_kinds(&self) -> &[Rc<NodeKind>] {
        &self.kinds
    }

    /// Kinds added through [`Catalog::register`].
    pub fn custom_kinds(&self) -> &[Rc<NodeKind>] {
        &self.kinds[self.builtin_count..]
    }

    pub fn get(&self, name: &str) -> Option<Rc<NodeKind>> {
        self.kinds.iter().find(|k| k.name == name).cloned()
    }

    /// Append discovered leaf kinds.
    ///
    /// The batch is validated as a whole: one malformed record rejects the
    /// batch and leaves the catalog untouched. Names already known are
    /// skipped. Returns the number of kinds added.
    #[instrument(level = "debug", skip(self, records))]
    pub fn register(
        &mut self,
        records: impl IntoIterator<Item = KindRecord>,
    ) -> Result<usize, CatalogError> {
        let records: Vec<KindRecord> = records.into_iter().collect();
        for record in &records {
            record.validate()?;
        }

        let mut added = 0;
        for record in records {
            if self.get(&record.name).is_some() {
                debug!("kind already registered: {}", record.name);
                continue;
            }
            self.kinds
                .push(Rc::new(NodeKind::leaf(record.name, record.description)));
            added += 1;
        }
        debug!("registered {} kinds", added);
        Ok(added)
    }

    /// Fresh detached node of `kind` with a new id and no children.
    #[instrument(level = "trace", skip(self, kind), fields(kind = %kind.name))]
    pub fn instantiate(&mut self, kind: &Rc<NodeKind>) -> TreeNode {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        TreeNode::new(id, Rc::clone(kind))
    }

    pub fn instantiate_named(&mut self, name: &str) -> Result<TreeNode, CatalogError> {
        let kind = self
            .get(name)
            .ok_or_else(|| CatalogError::UnknownKind(name.to_string()))?;
        Ok(self.instantiate(&kind))
    }

    /// Id the next instantiation will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Make sure ids up to and including `id` are never handed out again.
    pub fn reserve_through(&mut self, id: u64) {
        self.next_id = self.next_id.max(id + 1);
    }
}

fn builtin_kinds() -> Vec<NodeKind> {
    vec![
        NodeKind::decorator("InvertNode", "Inverts the result of its child node"),
        NodeKind::decorator("RepeatNode", "Repeats child node until it fails"),
        NodeKind::decorator("RetryNode", "Retries child node until it succeeds"),
        NodeKind::control("SelectorNode", "Runs children until one succeeds"),
        NodeKind::control("SequenceNode", "Runs children until one fails"),
        NodeKind::control("ParallelNode", "Runs all children simultaneously"),
    ]
}
