//! Snapshot creation after each scenario.

use crate::config::SnapshotConfig;
use crate::scenario::{ScenarioOutcome, ScenarioRef};
use crate::tag::SnapshotTag;
use crate::vcs::{GitVcs, VersionControl};
use crate::{Result, SnapshotError, SnapshotStep};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A managed directory committed and tagged by a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedRepo {
    pub path: PathBuf,
    /// Commit the tag now points at.
    pub commit: String,
    /// Whether the repository was created by this snapshot.
    pub initialized: bool,
}

/// Result of snapshotting one scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotReport {
    pub tag: SnapshotTag,
    pub repos: Vec<TaggedRepo>,
}

/// Snapshots and restores the managed directories of a test workspace.
pub struct SnapshotManager<V = GitVcs> {
    config: SnapshotConfig,
    vcs: V,
}

impl SnapshotManager<GitVcs> {
    /// Manager using the git command line.
    pub fn with_git(config: SnapshotConfig) -> Result<Self> {
        let vcs = GitVcs::from_config(&config);
        Self::new(config, vcs)
    }
}

impl<V: VersionControl> SnapshotManager<V> {
    pub fn new(config: SnapshotConfig, vcs: V) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, vcs })
    }

    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    pub fn vcs(&self) -> &V {
        &self.vcs
    }

    /// Managed directories that exist right now.
    pub fn managed_repos(&self) -> Vec<PathBuf> {
        self.config.existing_repos()
    }

    /// Commit and tag the state of every existing managed directory.
    ///
    /// Stops at the first failing directory.
    pub fn snapshot(&self, scenario: &ScenarioRef) -> Result<SnapshotReport> {
        let tag = scenario.tag();
        let mut repos = Vec::new();

        for path in self.managed_repos() {
            repos.push(self.snapshot_repo(&path, &tag)?);
        }

        if repos.is_empty() {
            debug!(%tag, "no managed directory exists, nothing to snapshot");
        }

        Ok(SnapshotReport { tag, repos })
    }

    /// Hook run after every scenario.
    ///
    /// Failed scenarios are only snapshotted when `snapshot_failed` is set.
    pub fn after_scenario(
        &self,
        scenario: &ScenarioRef,
        outcome: ScenarioOutcome,
    ) -> Result<Option<SnapshotReport>> {
        if !outcome.is_passed() && !self.config.snapshot_failed {
            debug!(%scenario, "scenario failed, skipping snapshot");
            return Ok(None);
        }
        self.snapshot(scenario).map(Some)
    }

    fn snapshot_repo(&self, path: &Path, tag: &SnapshotTag) -> Result<TaggedRepo> {
        let initialized = !self.vcs.is_repository(path);
        if initialized {
            self.vcs
                .init(path)
                .map_err(|e| SnapshotError::step(path, SnapshotStep::Init, e))?;
            info!("Initialized snapshot repository: {}", path.display());
        }

        self.vcs
            .add_all(path)
            .map_err(|e| SnapshotError::step(path, SnapshotStep::Stage, e))?;
        self.vcs
            .commit(path, tag.as_str(), true)
            .map_err(|e| SnapshotError::step(path, SnapshotStep::Commit, e))?;
        self.vcs
            .tag_force(path, tag.as_str())
            .map_err(|e| SnapshotError::step(path, SnapshotStep::Tag, e))?;
        let commit = self
            .vcs
            .head(path)
            .map_err(|e| SnapshotError::step(path, SnapshotStep::Tag, e))?;

        info!("Created snapshot: {} as {tag} ({commit})", path.display());
        Ok(TaggedRepo {
            path: path.to_path_buf(),
            commit,
            initialized,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use harness_utils_git::GitError;
    use std::cell::RefCell;
    use std::collections::{BTreeMap, HashSet};
    use tempfile::TempDir;

    /// In-memory [`VersionControl`] recording every call.
    #[derive(Default)]
    pub(crate) struct FakeVcs {
        pub calls: RefCell<Vec<String>>,
        pub repos: RefCell<HashSet<PathBuf>>,
        pub tags: RefCell<BTreeMap<PathBuf, Vec<String>>>,
        pub fail_on: Option<&'static str>,
    }

    impl FakeVcs {
        fn record(&self, op: &str, path: &Path) -> std::result::Result<(), GitError> {
            let name = path.file_name().unwrap().to_string_lossy();
            self.calls.borrow_mut().push(format!("{op} {name}"));
            if self.fail_on == Some(op) {
                return Err(GitError::Failed {
                    command: format!("git {op}"),
                    status: "exit status: 1".to_string(),
                    stderr: "boom".to_string(),
                });
            }
            Ok(())
        }

        pub(crate) fn with_tags(self, path: &Path, tags: &[&str]) -> Self {
            self.repos.borrow_mut().insert(path.to_path_buf());
            self.tags
                .borrow_mut()
                .insert(path.to_path_buf(), tags.iter().map(|t| t.to_string()).collect());
            self
        }
    }

    impl VersionControl for FakeVcs {
        fn is_repository(&self, path: &Path) -> bool {
            self.repos.borrow().contains(path)
        }

        fn init(&self, path: &Path) -> std::result::Result<(), GitError> {
            self.record("init", path)?;
            self.repos.borrow_mut().insert(path.to_path_buf());
            Ok(())
        }

        fn add_all(&self, path: &Path) -> std::result::Result<(), GitError> {
            self.record("add", path)
        }

        fn commit(
            &self,
            path: &Path,
            message: &str,
            allow_empty: bool,
        ) -> std::result::Result<(), GitError> {
            assert!(allow_empty);
            self.record(&format!("commit {message}"), path)
        }

        fn tag_force(&self, path: &Path, name: &str) -> std::result::Result<(), GitError> {
            self.record("tag", path)?;
            let mut tags = self.tags.borrow_mut();
            let list = tags.entry(path.to_path_buf()).or_default();
            if !list.iter().any(|t| t == name) {
                list.push(name.to_string());
            }
            Ok(())
        }

        fn list_tags(&self, path: &Path) -> std::result::Result<Vec<String>, GitError> {
            self.record("list-tags", path)?;
            Ok(self.tags.borrow().get(path).cloned().unwrap_or_default())
        }

        fn reset_hard(&self, path: &Path, reference: &str) -> std::result::Result<(), GitError> {
            self.record(&format!("reset {reference}"), path)
        }

        fn clean_untracked(&self, path: &Path) -> std::result::Result<(), GitError> {
            self.record("clean", path)
        }

        fn head(&self, _path: &Path) -> std::result::Result<String, GitError> {
            Ok("0".repeat(40))
        }
    }

    fn workspace(dirs: &[&str]) -> (TempDir, SnapshotConfig) {
        let temp = TempDir::new().unwrap();
        for dir in dirs {
            std::fs::create_dir_all(temp.path().join(dir)).unwrap();
        }
        let config = SnapshotConfig::new()
            .workspace_root(temp.path())
            .managed_dirs(["dev/first", "dev/second", "dev/third"]);
        (temp, config)
    }

    #[test]
    fn test_snapshot_only_existing_dirs_in_order() {
        let (_temp, config) = workspace(&["dev/third", "dev/first"]);
        let manager = SnapshotManager::new(config, FakeVcs::default()).unwrap();

        let report = manager
            .snapshot(&ScenarioRef::new("Feature", "Scenario 1"))
            .unwrap();

        assert_eq!(report.tag.as_str(), "Feature-Scenario_1");
        assert_eq!(report.repos.len(), 2);
        assert!(report.repos.iter().all(|r| r.initialized));
        assert_eq!(
            *manager.vcs().calls.borrow(),
            vec![
                "init first",
                "add first",
                "commit Feature-Scenario_1 first",
                "tag first",
                "init third",
                "add third",
                "commit Feature-Scenario_1 third",
                "tag third",
            ]
        );
    }

    #[test]
    fn test_second_snapshot_reuses_repository() {
        let (_temp, config) = workspace(&["dev/first"]);
        let manager = SnapshotManager::new(config, FakeVcs::default()).unwrap();
        let scenario = ScenarioRef::new("F", "S");

        manager.snapshot(&scenario).unwrap();
        let report = manager.snapshot(&scenario).unwrap();

        assert!(!report.repos[0].initialized);
        let inits = manager
            .vcs()
            .calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with("init"))
            .count();
        assert_eq!(inits, 1);
    }

    #[test]
    fn test_failure_aborts_remaining_dirs() {
        let (_temp, config) = workspace(&["dev/first", "dev/second"]);
        let vcs = FakeVcs {
            fail_on: Some("add"),
            ..Default::default()
        };
        let manager = SnapshotManager::new(config, vcs).unwrap();

        let err = manager.snapshot(&ScenarioRef::new("F", "S")).unwrap_err();
        match err {
            SnapshotError::Step { path, step, .. } => {
                assert!(path.ends_with("dev/first"));
                assert_eq!(step, SnapshotStep::Stage);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(*manager.vcs().calls.borrow(), vec!["init first", "add first"]);
    }

    #[test]
    fn test_after_scenario_skips_failures() {
        let (_temp, config) = workspace(&["dev/first"]);
        let manager = SnapshotManager::new(config, FakeVcs::default()).unwrap();
        let scenario = ScenarioRef::new("F", "S");

        assert!(
            manager
                .after_scenario(&scenario, ScenarioOutcome::Failed)
                .unwrap()
                .is_none()
        );
        assert!(manager.vcs().calls.borrow().is_empty());

        assert!(
            manager
                .after_scenario(&scenario, ScenarioOutcome::Passed)
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn test_after_scenario_can_snapshot_failures() {
        let (_temp, config) = workspace(&["dev/first"]);
        let manager =
            SnapshotManager::new(config.snapshot_failed(true), FakeVcs::default()).unwrap();

        let report = manager
            .after_scenario(&ScenarioRef::new("F", "S"), ScenarioOutcome::Failed)
            .unwrap();
        assert!(report.is_some());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = SnapshotConfig::new().managed_dirs(["../escape"]);
        assert!(SnapshotManager::new(config, FakeVcs::default()).is_err());
    }
}
