//! Scenario harness command line.
//!
//! - `patch` edits a fixture file with a line-directive patch
//! - `snapshot` is the after-scenario hook
//! - `restore` resets the workspace to the state before a scenario
//! - `tag` prints the snapshot tag of a scenario

pub mod patch_cmd;
pub mod restore_cmd;
pub mod snapshot_cmd;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use harness_snapshot::{ScenarioRef, SnapshotConfig};
use tracing::debug;

use crate::patch_cmd::PatchArgs;
use crate::restore_cmd::RestoreArgs;
use crate::snapshot_cmd::SnapshotArgs;

/// Fixture patching and per-scenario workspace snapshots.
#[derive(Debug, Parser)]
#[command(name = "scenario-harness")]
#[command(version)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Workspace root, overrides the configuration
    #[arg(short, long, global = true)]
    pub workspace: Option<PathBuf>,

    /// Log level
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply a line-directive patch to a file
    Patch(PatchArgs),

    /// Snapshot the managed directories after a scenario
    Snapshot(SnapshotArgs),

    /// Restore the managed directories to the state before a scenario
    Restore(RestoreArgs),

    /// Print the snapshot tag of a scenario
    Tag {
        /// Feature name
        feature: String,
        /// Scenario name
        scenario: String,
    },
}

impl Cli {
    /// Resolve the snapshot configuration.
    ///
    /// A configuration file replaces the environment; `--workspace` wins over
    /// both.
    pub fn snapshot_config(&self) -> Result<SnapshotConfig> {
        let mut config = match &self.config {
            Some(path) => SnapshotConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => SnapshotConfig::from_env()
                .context("Failed to load config from environment")?,
        };
        if let Some(root) = &self.workspace {
            config.workspace_root = root.clone();
        }
        Ok(config)
    }
}

/// Run the parsed command.
pub fn run(cli: Cli) -> Result<()> {
    debug!(command = ?cli.command, "dispatching");
    match &cli.command {
        Commands::Patch(args) => patch_cmd::run(args),
        Commands::Snapshot(args) => snapshot_cmd::run(args, cli.snapshot_config()?),
        Commands::Restore(args) => restore_cmd::run(args, cli.snapshot_config()?),
        Commands::Tag { feature, scenario } => {
            println!("{}", ScenarioRef::new(feature, scenario).tag());
            Ok(())
        }
    }
}
