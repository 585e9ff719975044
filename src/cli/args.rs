//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// rotest-board - live dashboard for rotest resources
///
/// Mirrors the rotest push feed into a local cache and shows resources,
/// their users and lock state on the terminal.
#[derive(Parser, Debug)]
#[command(name = "rotest-board")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "ROTEST_BOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Push feed host (overrides feed.host)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Push feed port (overrides feed.port)
    #[arg(long, global = true)]
    pub port: Option<u16>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Live dashboard, redrawn on every update
    Watch(WatchArgs),

    /// Print the board once the initial cache has arrived
    Snapshot(SnapshotArgs),

    /// Lock a resource
    Lock(LockArgs),

    /// Release a resource
    Release(ReleaseArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the watch command
#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Entity type to show (defaults to view.type_name)
    #[arg(short, long)]
    pub r#type: Option<String>,

    /// Show every cached type
    #[arg(long, conflicts_with = "type")]
    pub all_types: bool,
}

/// Arguments for the snapshot command
#[derive(Parser, Debug)]
pub struct SnapshotArgs {
    /// Seconds to wait for the initial cache
    #[arg(long, default_value = "10")]
    pub timeout_secs: u64,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,

    /// Entity type to print (defaults to view.type_name; json prints all)
    #[arg(short, long)]
    pub r#type: Option<String>,
}

/// Arguments for the lock command
#[derive(Parser, Debug)]
pub struct LockArgs {
    /// Resource name
    pub name: String,
}

/// Arguments for the release command
#[derive(Parser, Debug)]
pub struct ReleaseArgs {
    /// Resource name
    pub name: String,

    /// Release ownership
    #[arg(long)]
    pub owner: bool,

    /// Release the reservation
    #[arg(long)]
    pub reserved: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl ReleaseArgs {
    /// `(owner, reserved)`; neither flag means both
    pub fn targets(&self) -> (bool, bool) {
        if !self.owner && !self.reserved {
            (true, true)
        } else {
            (self.owner, self.reserved)
        }
    }
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., feed.host)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format for snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Cards, as drawn by watch
    Table,
    /// Raw cache and display list
    Json,
    /// One tab-separated line per record
    Plain,
}
