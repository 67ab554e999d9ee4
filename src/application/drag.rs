//! Drag-and-drop gesture state.
//!
//! A gesture records the dragged node and, while the pointer hovers a drop
//! zone, a candidate move. Nothing touches the forest until a drop.

use crate::domain::{MoveMode, NodeId};

/// A move the user is hovering over but has not committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateMove {
    pub source: NodeId,
    pub target: NodeId,
    pub mode: MoveMode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragGesture {
    dragged: Option<NodeId>,
    candidate: Option<CandidateMove>,
}

impl DragGesture {
    pub fn start(&mut self, source: NodeId) {
        self.dragged = Some(source);
        self.candidate = None;
    }

    /// Hover over `zone` of `target`. Ignored without an active drag, over the
    /// dragged node itself, or over a zone the target does not offer.
    pub fn hover(&mut self, target: NodeId, zone: MoveMode, zone_exists: bool) -> bool {
        match self.dragged {
            Some(source) if source != target && zone_exists => {
                self.candidate = Some(CandidateMove {
                    source,
                    target,
                    mode: zone,
                });
                true
            }
            _ => false,
        }
    }

    pub fn leave(&mut self) {
        self.candidate = None;
    }

    /// End the gesture with a drop on `zone` of `target`.
    ///
    /// Yields the move to attempt only if a drag was active and a candidate
    /// was held. The gesture is reset either way.
    pub fn finish(&mut self, target: NodeId, zone: MoveMode) -> Option<CandidateMove> {
        let dragged = self.dragged.take();
        let candidate = self.candidate.take();
        match (dragged, candidate) {
            (Some(source), Some(_)) if source != target => Some(CandidateMove {
                source,
                target,
                mode: zone,
            }),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    pub fn dragged(&self) -> Option<NodeId> {
        self.dragged
    }

    pub fn candidate(&self) -> Option<CandidateMove> {
        self.candidate
    }

    pub fn is_active(&self) -> bool {
        self.dragged.is_some()
    }
}
