//! Application layer: editing session, persistence and services
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod document;
pub mod drag;
pub mod editor;
pub mod error;
pub mod error_ext;
pub mod services;

pub use document::{Document, DocumentError};
pub use drag::{CandidateMove, DragGesture};
pub use editor::{DropOutcome, Editor};
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
