//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Browse, view and download the schemas of an inspection service
#[derive(Parser, Debug)]
#[command(name = "schema-inspector")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output on stderr (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Inspection service URL (overrides config)
    #[arg(short, long, global = true, value_hint = ValueHint::Url)]
    pub server: Option<String>,

    /// Directory for persisted UI state (overrides config)
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the schema tree
    Tree,

    /// List schema names, sorted
    List,

    /// Select a schema and view it in the current format
    Select {
        /// Schema name
        schema: String,
    },

    /// Expand or collapse a tree node
    Toggle {
        /// Node id (e.g. "schemas")
        node: String,
    },

    /// Show or change the display format
    Format {
        /// New format (name or position in the format list)
        format: Option<String>,
    },

    /// View a schema (default: the active one)
    View {
        /// Schema name
        schema: Option<String>,
    },

    /// Download one schema in the current format
    Download {
        /// Schema name
        schema: String,
    },

    /// Download all schemas as one archive
    DownloadAll,

    /// Pick schemas interactively (fzf)
    Browse,

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
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
