//! `restore` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use harness_snapshot::{
    AlwaysConfirm, Confirmation, PromptConfirmation, SnapshotConfig, SnapshotManager,
    find_scenario,
};

#[derive(Debug, Args)]
pub struct RestoreArgs {
    /// Feature file declaring the scenario
    pub feature_file: PathBuf,

    /// Regular expression selecting the scenario; defaults to the first one
    pub pattern: Option<String>,

    /// Skip confirmation prompts
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Print what would be done without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: &RestoreArgs, config: SnapshotConfig) -> Result<()> {
    let scenario = find_scenario(&args.feature_file, args.pattern.as_deref())?;
    let manager = SnapshotManager::with_git(config)?;

    if args.dry_run {
        let plan = manager.plan_restore(&scenario)?;
        println!("restoring to the start of {scenario}");
        for action in &plan.actions {
            println!("  {action}");
        }
        return Ok(());
    }

    let mut confirm: Box<dyn Confirmation> = if args.yes {
        Box::new(AlwaysConfirm)
    } else {
        Box::new(PromptConfirmation::stdio())
    };

    let report = manager
        .restore(&scenario, confirm.as_mut())
        .with_context(|| format!("Failed to restore to the start of {scenario}"))?;
    println!(
        "restored {} director{} to the start of {scenario}",
        report.applied.len(),
        if report.applied.len() == 1 { "y" } else { "ies" }
    );
    Ok(())
}
