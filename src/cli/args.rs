//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};

use crate::domain::{MoveMode, NodeId};

/// Behavior-tree builder: compose trees from node kinds, lay them out, generate code
#[derive(Parser, Debug)]
#[command(name = "btb")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (repeat for more: -d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Tree document
    #[arg(
        short,
        long,
        global = true,
        env = "BTB_FILE",
        default_value = "tree.btb.toml",
        value_hint = ValueHint::FilePath
    )]
    pub file: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty document
    New {
        /// Overwrite an existing document
        #[arg(long)]
        force: bool,
    },

    /// List available node kinds
    Kinds,

    /// Discover leaf kinds in C++ sources and register them
    Scan {
        /// Source files or directories
        #[arg(required = true, value_hint = ValueHint::AnyPath)]
        paths: Vec<PathBuf>,
        /// Only report what would be registered
        #[arg(long)]
        dry_run: bool,
    },

    /// Register kinds from a `[[kinds]]` TOML file
    Import {
        #[arg(value_hint = ValueHint::FilePath)]
        kind_file: PathBuf,
    },

    /// Add a node (new root unless --at is given)
    Add {
        /// Kind name
        kind: String,
        /// Place relative to this node
        #[arg(long)]
        at: Option<NodeId>,
        /// Placement relative to --at
        #[arg(long, value_enum, default_value_t = ModeArg::Child, requires = "at")]
        mode: ModeArg,
    },

    /// Move a node with its subtree
    Move {
        source: NodeId,
        target: NodeId,
        #[arg(long, value_enum, default_value_t = ModeArg::Sibling)]
        mode: ModeArg,
    },

    /// Remove a node with its subtree
    Remove { id: NodeId },

    /// Expand or collapse a node
    Toggle { id: NodeId },

    /// Print generated code
    Code,

    /// Print node rectangles, connectors and canvas bounds
    Layout,

    /// Show the forest as a tree
    Tree {
        /// Include children of collapsed nodes
        #[arg(long)]
        all: bool,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Sibling,
    Child,
}

impl From<ModeArg> for MoveMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Sibling => MoveMode::Sibling,
            ModeArg::Child => MoveMode::Child,
        }
    }
}
