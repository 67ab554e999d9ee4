//! Layout engine: places every visible node on the canvas.
//!
//! Subtree widths are computed bottom-up; each node is centered over the
//! horizontal band its visible subtree occupies. Rows align strictly by depth.
//! The result depends only on the forest, the expanded set and the metrics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::entities::{ExpandedSet, NodeId, TreeNode};
use crate::domain::forest::Forest;

/// Fixed geometry used by the layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutMetrics {
    pub node_width: f64,
    pub node_height: f64,
    /// Vertical distance between two rows.
    pub level_height: f64,
    /// Gap between neighbouring subtrees.
    pub horizontal_spacing: f64,
    /// Extra room below the deepest row.
    pub padding: f64,
}

impl LayoutMetrics {
    /// Sizes must be positive and gaps non-negative, all finite.
    pub fn validate(&self) -> Result<(), String> {
        let sizes = [
            ("node_width", self.node_width),
            ("node_height", self.node_height),
            ("level_height", self.level_height),
        ];
        let gaps = [
            ("horizontal_spacing", self.horizontal_spacing),
            ("padding", self.padding),
        ];
        for (name, value) in sizes {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("layout.{name} must be a positive number, got {value}"));
            }
        }
        for (name, value) in gaps {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("layout.{name} must not be negative, got {value}"));
            }
        }
        Ok(())
    }
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            node_width: 250.0,
            node_height: 60.0,
            level_height: 100.0,
            horizontal_spacing: 20.0,
            padding: 80.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn top_center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y)
    }

    pub fn bottom_center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height)
    }
}

/// A visible node as handed to presentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedNode {
    pub rect: Rect,
    pub expanded: bool,
    /// Presentation shows the expand toggle only when this is set.
    pub has_children: bool,
}

/// Line from a parent's bottom-center to a child's top-center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connector {
    pub parent: NodeId,
    pub child: NodeId,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub nodes: BTreeMap<NodeId, PlacedNode>,
    pub connectors: Vec<Connector>,
    pub total_width: f64,
    pub total_height: f64,
}

impl Layout {
    pub fn get(&self, id: NodeId) -> Option<&PlacedNode> {
        self.nodes.get(&id)
    }

    pub fn rect(&self, id: NodeId) -> Option<Rect> {
        self.nodes.get(&id).map(|placed| placed.rect)
    }

    pub fn is_visible(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }
}

/// Lay out the whole forest.
#[instrument(level = "debug", skip_all, fields(roots = forest.roots().len()))]
pub fn compute(forest: &Forest, expanded: &ExpandedSet, metrics: &LayoutMetrics) -> Layout {
    let mut pass = Pass {
        expanded,
        metrics,
        layout: Layout::default(),
        max_depth: 0,
    };

    // Every root band, the last one included, is followed by one gap.
    let mut offset = 0.0;
    for root in forest.roots() {
        offset += pass.place(root, 0, offset) + metrics.horizontal_spacing;
    }

    let mut layout = pass.layout;
    if !forest.is_empty() {
        layout.total_width = offset;
        layout.total_height =
            pass.max_depth as f64 * metrics.level_height + metrics.node_height + metrics.padding;
    }
    layout
}

struct Pass<'a> {
    expanded: &'a ExpandedSet,
    metrics: &'a LayoutMetrics,
    layout: Layout,
    max_depth: usize,
}

impl Pass<'_> {
    /// Place `node` and its visible subtree starting at `offset`; returns the
    /// subtree width.
    fn place(&mut self, node: &TreeNode, depth: usize, offset: f64) -> f64 {
        let m = self.metrics;
        let expanded = self.expanded.contains(node.id());
        let open = expanded && node.has_children();

        let mut width = m.node_width;
        if open {
            let mut cursor = offset;
            for (i, child) in node.children().iter().enumerate() {
                if i > 0 {
                    cursor += m.horizontal_spacing;
                }
                cursor += self.place(child, depth + 1, cursor);
            }
            width = width.max(cursor - offset);
        }

        let rect = Rect {
            x: offset + (width - m.node_width) / 2.0,
            y: depth as f64 * m.level_height,
            width: m.node_width,
            height: m.node_height,
        };
        self.max_depth = self.max_depth.max(depth);
        self.layout.nodes.insert(
            node.id(),
            PlacedNode {
                rect,
                expanded,
                has_children: node.has_children(),
            },
        );

        if open {
            let (x1, y1) = rect.bottom_center();
            for child in node.children() {
                if let Some(child_rect) = self.layout.rect(child.id()) {
                    let (x2, y2) = child_rect.top_center();
                    self.layout.connectors.push(Connector {
                        parent: node.id(),
                        child: child.id(),
                        x1,
                        y1,
                        x2,
                        y2,
                    });
                }
            }
        }
        width
    }
}
