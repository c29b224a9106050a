//! `snapshot` command, run by the test driver after every scenario.

use anyhow::{Context, Result};
use clap::Args;
use harness_snapshot::{ScenarioOutcome, ScenarioRef, SnapshotConfig, SnapshotManager};

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Feature name
    #[arg(long)]
    pub feature: String,

    /// Scenario name
    #[arg(long)]
    pub scenario: String,

    /// The scenario failed
    #[arg(long)]
    pub failed: bool,
}

pub fn run(args: &SnapshotArgs, config: SnapshotConfig) -> Result<()> {
    let scenario = ScenarioRef::new(&args.feature, &args.scenario);
    let manager = SnapshotManager::with_git(config)?;

    let report = manager
        .after_scenario(&scenario, ScenarioOutcome::from_passed(!args.failed))
        .with_context(|| format!("Failed to snapshot {scenario}"))?;

    match report {
        Some(report) => {
            for repo in &report.repos {
                println!("{} {} {}", report.tag, repo.commit, repo.path.display());
            }
        }
        None => println!("{scenario} failed, no snapshot taken"),
    }
    Ok(())
}
