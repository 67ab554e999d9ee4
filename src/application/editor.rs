//! Editor session: the single writer of a forest.
//!
//! Owns the catalog, the forest, the expanded set and the drag gesture, and
//! serves the derived views (layout and generated code). Views are memoized
//! against version counters and are always identical to a full recomputation.

use tracing::{debug, instrument};

use crate::application::drag::{CandidateMove, DragGesture};
use crate::application::ApplicationResult;
use crate::domain::layout::{self, Layout, LayoutMetrics};
use crate::domain::{
    codegen, Catalog, CatalogError, EditError, ExpandedSet, Forest, KindClass, KindRecord,
    Locator, MoveMode, NodeId, TreeNode,
};

/// What a drop did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Moved(CandidateMove),
    /// The move was attempted and refused; the forest is unchanged.
    Rejected(CandidateMove, EditError),
    /// No drag or no candidate; nothing was attempted.
    Ignored,
}

#[derive(Debug, Default)]
struct Views {
    layout: Option<((u64, u64), Layout)>,
    code: Option<(u64, String)>,
}

#[derive(Debug)]
pub struct Editor {
    catalog: Catalog,
    forest: Forest,
    expanded: ExpandedSet,
    drag: DragGesture,
    metrics: LayoutMetrics,
    structure_version: u64,
    expansion_version: u64,
    views: Views,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(LayoutMetrics::default())
    }
}

impl Editor {
    pub fn new(metrics: LayoutMetrics) -> Self {
        Self::from_parts(Catalog::new(), Forest::new(), ExpandedSet::new(), metrics)
    }

    pub(crate) fn from_parts(
        catalog: Catalog,
        forest: Forest,
        expanded: ExpandedSet,
        metrics: LayoutMetrics,
    ) -> Self {
        Self {
            catalog,
            forest,
            expanded,
            drag: DragGesture::default(),
            metrics,
            structure_version: 0,
            expansion_version: 0,
            views: Views::default(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn expanded(&self) -> &ExpandedSet {
        &self.expanded
    }

    pub fn metrics(&self) -> &LayoutMetrics {
        &self.metrics
    }

    pub fn set_metrics(&mut self, metrics: LayoutMetrics) {
        self.metrics = metrics;
        self.expansion_version += 1;
    }

    pub fn register_kinds(
        &mut self,
        records: impl IntoIterator<Item = KindRecord>,
    ) -> Result<usize, CatalogError> {
        self.catalog.register(records)
    }

    /// Instantiate `kind` as a new root. Composite nodes start expanded.
    #[instrument(level = "debug", skip(self))]
    pub fn add_node(&mut self, kind: &str) -> Result<NodeId, CatalogError> {
        let node = self.catalog.instantiate_named(kind)?;
        let expandable = node.class() != KindClass::Leaf;
        let id = self.forest.insert_as_root(node);
        if expandable {
            self.expanded.expand(id);
        }
        self.touch_structure();
        Ok(id)
    }

    /// Instantiate `kind` and place it relative to `target`.
    #[instrument(level = "debug", skip(self))]
    pub fn add_node_at(
        &mut self,
        kind: &str,
        target: NodeId,
        mode: MoveMode,
    ) -> ApplicationResult<NodeId> {
        let node = self.catalog.instantiate_named(kind)?;
        let id = node.id();
        let expandable = node.class() != KindClass::Leaf;
        match mode {
            MoveMode::Sibling => self.forest.insert_as_sibling(node, target)?,
            MoveMode::Child => {
                self.forest.insert_as_child(node, target)?;
                self.expanded.expand(target);
            }
        }
        if expandable {
            self.expanded.expand(id);
        }
        self.touch_structure();
        Ok(id)
    }

    /// Remove a node and its whole subtree.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_node(&mut self, id: NodeId) -> Result<TreeNode, EditError> {
        let path = self
            .forest
            .find_by_id(id)
            .map(|found| found.path)
            .ok_or(EditError::NotFound(Locator::Id(id)))?;
        self.remove_by_path(&path)
    }

    pub fn remove_by_path(&mut self, path: &[usize]) -> Result<TreeNode, EditError> {
        let removed = self.forest.remove_by_path(path)?;
        let gone = removed.subtree_ids();
        self.expanded.retain(|id| !gone.contains(id));
        self.touch_structure();
        self.expansion_version += 1;
        debug!("removed {} nodes", gone.len());
        Ok(removed)
    }

    /// Re-parent `source`. A child move expands the target.
    #[instrument(level = "debug", skip(self))]
    pub fn move_node(
        &mut self,
        source: NodeId,
        target: NodeId,
        mode: MoveMode,
    ) -> Result<(), EditError> {
        self.forest.move_node(source, target, mode)?;
        if mode == MoveMode::Child {
            self.expanded.expand(target);
        }
        self.touch_structure();
        Ok(())
    }

    /// Flip the expanded flag of an existing node; `None` for unknown ids.
    pub fn toggle_expand(&mut self, id: NodeId) -> Option<bool> {
        if !self.forest.contains(id) {
            return None;
        }
        self.expansion_version += 1;
        Some(self.expanded.toggle(id))
    }

    /// Returns true if the flag changed.
    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) -> bool {
        if !self.forest.contains(id) {
            return false;
        }
        let changed = if expanded {
            self.expanded.expand(id)
        } else {
            self.expanded.collapse(id)
        };
        if changed {
            self.expansion_version += 1;
        }
        changed
    }

    /// Begin dragging an existing node.
    pub fn drag_start(&mut self, source: NodeId) -> bool {
        if !self.forest.contains(source) {
            return false;
        }
        self.drag.start(source);
        true
    }

    /// Hover a drop zone. Leaves offer no child zone.
    pub fn drag_over_zone(&mut self, target: NodeId, zone: MoveMode) -> bool {
        let zone_exists = match (self.forest.get(target), zone) {
            (None, _) => false,
            (Some(_), MoveMode::Sibling) => true,
            (Some(node), MoveMode::Child) => node.class() != KindClass::Leaf,
        };
        self.drag.hover(target, zone, zone_exists)
    }

    pub fn drag_leave_zone(&mut self) {
        self.drag.leave();
    }

    /// Drop on `zone` of `target`. Refused moves are expected gestures and
    /// leave the forest untouched.
    #[instrument(level = "debug", skip(self))]
    pub fn drop(&mut self, target: NodeId, zone: MoveMode) -> DropOutcome {
        let Some(candidate) = self.drag.finish(target, zone) else {
            return DropOutcome::Ignored;
        };
        match self.move_node(candidate.source, candidate.target, candidate.mode) {
            Ok(()) => DropOutcome::Moved(candidate),
            Err(err) => {
                debug!("drop rejected: {}", err);
                DropOutcome::Rejected(candidate, err)
            }
        }
    }

    pub fn drag_cancel(&mut self) {
        self.drag.cancel();
    }

    pub fn drag(&self) -> &DragGesture {
        &self.drag
    }

    /// Current layout, recomputed only after a structural or expansion change.
    pub fn layout(&mut self) -> &Layout {
        let key = (self.structure_version, self.expansion_version);
        let fresh = match self.views.layout.take() {
            Some((cached, layout)) if cached == key => layout,
            _ => self.compute_layout(),
        };
        &self.views.layout.insert((key, fresh)).1
    }

    pub fn compute_layout(&self) -> Layout {
        layout::compute(&self.forest, &self.expanded, &self.metrics)
    }

    /// Current generated code, recomputed only after a structural change.
    pub fn code(&mut self) -> &str {
        let key = self.structure_version;
        let fresh = match self.views.code.take() {
            Some((cached, code)) if cached == key => code,
            _ => codegen::generate(&self.forest),
        };
        &self.views.code.insert((key, fresh)).1
    }

    fn touch_structure(&mut self) {
        self.structure_version += 1;
    }
}
