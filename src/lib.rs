//! btbuilder: a behavior-tree editing engine.
//!
//! A forest of behavior-tree nodes is edited through structural operations
//! that keep it acyclic and within per-kind child limits. Derived views
//! (canvas layout and generated code) are recomputed from the forest.
//!
//! Layers, innermost first:
//! - [`domain`]: catalog, forest, layout, code generation (no I/O)
//! - [`application`]: editor session, drag gesture, documents, services
//! - [`infrastructure`]: filesystem boundary and service wiring
//! - [`cli`]: the `btb` command line

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
