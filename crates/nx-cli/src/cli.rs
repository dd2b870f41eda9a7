use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "nx", version, about = "Reconcile a Docker Compose fleet with its service catalog")]
pub struct Cli {
    /// Repository root holding the services directory and root manifest
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Write a debug log to .nexus-debug.log
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show rolled-up container status for one service or the whole fleet
    Status {
        service: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Per-container breakdown with inspect details (single service only)
        #[arg(long, requires = "service")]
        detail: bool,
    },
    /// List services in the catalog, optionally fuzzy-filtered by name
    List {
        filter: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Compare the root manifest with the services directory
    #[command(group(
        ArgGroup::new("mode")
            .required(true)
            .args(["check", "sync", "remove_orphans"])
    ))]
    Sync {
        /// Report drift and exit non-zero if any is found
        #[arg(long)]
        check: bool,
        /// Add manifest entries for services missing from it
        #[arg(long)]
        sync: bool,
        /// Delete manifest entries whose service directory is gone
        #[arg(long)]
        remove_orphans: bool,
        /// Skip the confirmation prompt for destructive edits
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Validate compose configuration for one service or the whole fleet
    Validate {
        service: Option<String>,
        /// Maximum validations in flight (defaults to the config's `jobs`)
        #[arg(long, short = 'j')]
        jobs: Option<usize>,
    },
    /// Create and start service containers
    Up(LifecycleArgs),
    /// Stop and remove service containers
    Down(LifecycleArgs),
    /// Pull service images
    Pull(LifecycleArgs),
    /// Restart service containers
    Restart(LifecycleArgs),
}

#[derive(Debug, Clone, Args)]
pub struct LifecycleArgs {
    /// Services to act on; every service in the catalog when omitted
    pub services: Vec<String>,
    /// Maximum operations in flight (defaults to the config's `jobs`)
    #[arg(long, short = 'j')]
    pub jobs: Option<usize>,
    /// Skip the confirmation prompt when taking down the whole fleet
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Check,
    Sync,
    RemoveOrphans,
}

impl SyncMode {
    pub fn from_flags(check: bool, sync: bool, remove_orphans: bool) -> Option<Self> {
        match (check, sync, remove_orphans) {
            (true, false, false) => Some(Self::Check),
            (false, true, false) => Some(Self::Sync),
            (false, false, true) => Some(Self::RemoveOrphans),
            _ => None,
        }
    }
}
