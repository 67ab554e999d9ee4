//! Application services
//!
//! Concrete services that move documents and kind records between the
//! filesystem and an editing session. Services depend on the `FileSystem`
//! boundary trait but are themselves concrete structs.

mod project;
mod scan;

pub use project::{KindFile, ProjectService};
pub use scan::{ScanReport, ScanService, TICK_DESCRIPTION};
