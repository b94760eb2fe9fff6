//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::application::services::Format;
use crate::domain::{CollaboratorId, LevelId, SectorId};

/// Org-chart engine: supervisor eligibility, hierarchy integrity and chart layout
#[derive(Parser, Debug)]
#[command(name = "orgchart")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output on stderr (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory holding .orgchart.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    /// Use this config file instead of the layered lookup
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute node positions and connectors
    Layout {
        /// Snapshot file (.json or .toml); defaults to `data_file` from config
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// Expand these collaborators (in addition to the snapshot's expanded ids)
        #[arg(short, long, value_delimiter = ',')]
        expand: Vec<CollaboratorId>,
        /// Expand every ancestor of these collaborators so they are drawn
        #[arg(short, long, value_delimiter = ',')]
        reveal: Vec<CollaboratorId>,
        /// Expand every collaborator that has subordinates
        #[arg(long, conflicts_with = "depth")]
        expand_all: bool,
        /// Expand the top N tiers
        #[arg(long)]
        depth: Option<usize>,
        /// Output format (json, toml)
        #[arg(short, long)]
        format: Option<Format>,
        /// Write to file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// List legal superiors for a collaborator
    Eligible {
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// Collaborator being edited (0 = new collaborator)
        #[arg(short, long)]
        node: CollaboratorId,
        /// Sector chosen in the form (default: current sector)
        #[arg(long)]
        sector: Option<SectorId>,
        /// Level chosen in the form (default: current level)
        #[arg(long)]
        level: Option<LevelId>,
        /// Output format (json, toml); plain list when omitted
        #[arg(short, long)]
        format: Option<Format>,
    },

    /// Report broken hierarchy links
    Check {
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Show the supervision forest as a tree
    Tree {
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// Prefix names with their ids
        #[arg(long)]
        ids: bool,
    },

    /// List everyone below a collaborator
    Descendants {
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        #[arg(short, long)]
        node: CollaboratorId,
    },

    /// Find collaborators by name or role, ignoring case and accents
    Search {
        /// Text to look for
        query: String,
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
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
    /// Print a commented config template
    Template,
    /// Show config paths
    Path,
}
