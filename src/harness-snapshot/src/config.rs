//! Snapshot configuration.
//!
//! Built once when the test run starts and read-only afterwards. The list of
//! managed directories lives here rather than in any process-wide state.

use crate::{Result, SnapshotError};
use harness_utils_git::{DEFAULT_GIT_TIMEOUT_SECS, GIT_TIMEOUT_ENV};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

/// Directories snapshotted when the configuration does not name any.
pub const DEFAULT_MANAGED_DIRS: &[&str] = &[
    "dev/.autoproj",
    "dev/autoproj",
    "dev/bundles/syskit_basics",
];

/// Environment variable overriding the workspace root.
pub const WORKSPACE_ENV: &str = "HARNESS_WORKSPACE";

/// Environment variable enabling snapshots of failed scenarios.
pub const SNAPSHOT_FAILED_ENV: &str = "HARNESS_SNAPSHOT_FAILED";

/// Author and committer of snapshot commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitIdentity {
    pub name: String,
    pub email: String,
}

impl Default for CommitIdentity {
    fn default() -> Self {
        Self {
            name: "scenario-harness".to_string(),
            email: "harness@localhost".to_string(),
        }
    }
}

/// Configuration for scenario snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Root of the test workspace; managed directories are relative to it.
    #[serde(default = "default_workspace_root")]
    pub workspace_root: PathBuf,

    /// Directories snapshotted after each scenario, in order.
    #[serde(default = "default_managed_dirs")]
    pub managed_dirs: Vec<PathBuf>,

    /// Timeout for a single git invocation.
    #[serde(default = "default_git_timeout_secs")]
    pub git_timeout_secs: u64,

    /// Whether failed scenarios are snapshotted too.
    #[serde(default)]
    pub snapshot_failed: bool,

    /// Identity recorded on snapshot commits.
    #[serde(default)]
    pub identity: CommitIdentity,
}

fn default_workspace_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_managed_dirs() -> Vec<PathBuf> {
    DEFAULT_MANAGED_DIRS.iter().map(PathBuf::from).collect()
}

fn default_git_timeout_secs() -> u64 {
    DEFAULT_GIT_TIMEOUT_SECS
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            workspace_root: default_workspace_root(),
            managed_dirs: default_managed_dirs(),
            git_timeout_secs: DEFAULT_GIT_TIMEOUT_SECS,
            snapshot_failed: false,
            identity: CommitIdentity::default(),
        }
    }
}

impl SnapshotConfig {
    /// Create a new config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| SnapshotError::Config(format!("{}: {e}", path.display())))
    }

    /// Parse a TOML configuration.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| SnapshotError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables on top of the defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Override fields from environment-style lookups.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(root) = lookup(WORKSPACE_ENV) {
            self.workspace_root = PathBuf::from(root);
        }

        if let Some(secs) = lookup(GIT_TIMEOUT_ENV) {
            self.git_timeout_secs = secs.trim().parse().map_err(|_| {
                SnapshotError::Config(format!("{GIT_TIMEOUT_ENV} must be a number, got {secs:?}"))
            })?;
        }

        if let Some(flag) = lookup(SNAPSHOT_FAILED_ENV) {
            self.snapshot_failed = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        Ok(())
    }

    /// Check that every managed directory stays inside the workspace.
    pub fn validate(&self) -> Result<()> {
        for dir in &self.managed_dirs {
            if dir.as_os_str().is_empty() {
                return Err(SnapshotError::Config(
                    "managed directory paths cannot be empty".to_string(),
                ));
            }
            let escapes = dir
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
            if escapes {
                return Err(SnapshotError::Config(format!(
                    "managed directory {} must be relative to the workspace root",
                    dir.display()
                )));
            }
        }
        Ok(())
    }

    /// Get the git timeout duration.
    pub fn git_timeout(&self) -> Duration {
        Duration::from_secs(self.git_timeout_secs)
    }

    /// Full paths of all managed directories, existing or not.
    pub fn managed_paths(&self) -> Vec<PathBuf> {
        self.managed_dirs
            .iter()
            .map(|dir| self.workspace_root.join(dir))
            .collect()
    }

    /// Full paths of the managed directories that currently exist.
    pub fn existing_repos(&self) -> Vec<PathBuf> {
        self.managed_paths()
            .into_iter()
            .filter(|path| path.is_dir())
            .collect()
    }

    /// Builder: set the workspace root.
    pub fn workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = root.into();
        self
    }

    /// Builder: replace the managed directories.
    pub fn managed_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.managed_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: snapshot failed scenarios too.
    pub fn snapshot_failed(mut self, enabled: bool) -> Self {
        self.snapshot_failed = enabled;
        self
    }

    /// Builder: set the git timeout.
    pub fn git_timeout_duration(mut self, timeout: Duration) -> Self {
        self.git_timeout_secs = timeout.as_secs();
        self
    }
}
