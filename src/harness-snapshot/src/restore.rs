//! Restoring managed directories to the state before a scenario.

use crate::confirm::{Confirmation, RestoreAction};
use crate::scenario::ScenarioRef;
use crate::snapshot::SnapshotManager;
use crate::tag::{RestoreTarget, SnapshotTag, TagTimeline};
use crate::vcs::VersionControl;
use crate::{Result, SnapshotError, SnapshotStep};
use std::path::Path;
use tracing::{info, warn};

/// What a restore will do, computed before touching anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestorePlan {
    /// Tag of the scenario being restored to its start.
    pub target: SnapshotTag,
    /// One action per existing managed directory, in configuration order.
    pub actions: Vec<RestoreAction>,
}

impl RestorePlan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Actions that were carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    pub target: SnapshotTag,
    pub applied: Vec<RestoreAction>,
}

impl<V: VersionControl> SnapshotManager<V> {
    /// Sorted snapshot tags of one managed directory.
    pub fn timeline(&self, path: &Path) -> Result<TagTimeline> {
        if !self.vcs().is_repository(path) {
            return Err(SnapshotError::NotARepository {
                path: path.to_path_buf(),
            });
        }
        let tags = self
            .vcs()
            .list_tags(path)
            .map_err(|e| SnapshotError::step(path, SnapshotStep::ListTags, e))?;
        Ok(TagTimeline::new(tags))
    }

    /// Work out, for every managed directory, how to get back to the state
    /// right before `scenario` ran.
    pub fn plan_restore(&self, scenario: &ScenarioRef) -> Result<RestorePlan> {
        let target = scenario.tag();
        let mut actions = Vec::new();

        for path in self.managed_repos() {
            let action = match self.timeline(&path)?.restore_target(target.as_str()) {
                RestoreTarget::ResetTo(tag) => RestoreAction::Reset { path, tag },
                RestoreTarget::Remove => RestoreAction::Remove { path },
            };
            actions.push(action);
        }

        Ok(RestorePlan { target, actions })
    }

    /// Restore every managed directory, asking `confirm` before each change.
    ///
    /// The first failure aborts the restore; directories handled before it
    /// stay restored.
    pub fn restore(
        &self,
        scenario: &ScenarioRef,
        confirm: &mut dyn Confirmation,
    ) -> Result<RestoreReport> {
        let plan = self.plan_restore(scenario)?;
        if plan.is_empty() {
            info!(tag = %plan.target, "no managed directory exists, nothing to restore");
        }

        let mut applied = Vec::with_capacity(plan.actions.len());
        for action in plan.actions {
            confirm.confirm(&action)?;
            self.apply(&action)?;
            applied.push(action);
        }

        Ok(RestoreReport {
            target: plan.target,
            applied,
        })
    }

    fn apply(&self, action: &RestoreAction) -> Result<()> {
        match action {
            RestoreAction::Reset { path, tag } => {
                self.vcs()
                    .reset_hard(path, tag)
                    .map_err(|e| SnapshotError::step(path, SnapshotStep::Reset, e))?;
                self.vcs()
                    .clean_untracked(path)
                    .map_err(|e| SnapshotError::step(path, SnapshotStep::Clean, e))?;
                info!("Restored {} to {tag}", path.display());
            }
            RestoreAction::Remove { path } => {
                std::fs::remove_dir_all(path).map_err(|source| SnapshotError::Remove {
                    path: path.clone(),
                    source,
                })?;
                warn!("Deleted {}, it had no earlier snapshot", path.display());
            }
        }
        Ok(())
    }
}
