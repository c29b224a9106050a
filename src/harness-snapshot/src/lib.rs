//! Scenario state snapshots for the harness.
//!
//! After every scenario the managed directories of the test workspace are
//! committed into their own git repositories and tagged with a name derived
//! from the feature and scenario. An operator can later reset those
//! directories to the state they had right before a given scenario.
//!
//! Tags are ordered alphabetically, not chronologically: "the state before a
//! scenario" is the tag sorting immediately before the scenario's own tag.
//! Renaming a scenario can therefore change which state a restore returns to.

pub mod config;
pub mod confirm;
pub mod restore;
pub mod scenario;
pub mod snapshot;
pub mod tag;
pub mod vcs;

pub use config::{CommitIdentity, SnapshotConfig};
pub use confirm::{AlwaysConfirm, Confirmation, PromptConfirmation, RestoreAction};
pub use restore::{RestorePlan, RestoreReport};
pub use scenario::{Feature, FeatureFile, ScenarioOutcome, ScenarioRef, find_scenario};
pub use snapshot::{SnapshotManager, SnapshotReport, TaggedRepo};
pub use tag::{RestoreTarget, SnapshotTag, TagTimeline};
pub use vcs::{GitVcs, VersionControl};

use std::fmt;
use std::path::PathBuf;

use harness_utils_git::GitError;
use thiserror::Error;

/// A version-control step of snapshot or restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotStep {
    Init,
    Stage,
    Commit,
    Tag,
    ListTags,
    Reset,
    Clean,
}

impl fmt::Display for SnapshotStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "creating the git repository",
            Self::Stage => "staging the current state",
            Self::Commit => "committing the current state",
            Self::Tag => "tagging the snapshot",
            Self::ListTags => "listing tags",
            Self::Reset => "resetting to the snapshot",
            Self::Clean => "removing untracked files",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed {step} in {}: {source}", path.display())]
    Step {
        path: PathBuf,
        step: SnapshotStep,
        #[source]
        source: GitError,
    },
    #[error("{} is not a git repository, it was never snapshotted", path.display())]
    NotARepository { path: PathBuf },
    #[error("Failed to remove {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("{pattern} matches more than one scenario in {}: {}", file.display(), candidates.join(", "))]
    Ambiguous {
        pattern: String,
        file: PathBuf,
        candidates: Vec<String>,
    },
    #[error("No scenario matching {pattern} in {}", file.display())]
    ScenarioNotFound { pattern: String, file: PathBuf },
    #[error("No scenario defined in {}", file.display())]
    NoScenarios { file: PathBuf },
    #[error("Invalid scenario pattern {pattern}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Confirmation failed: {0}")]
    ConfirmationFailed(String),
}

impl SnapshotError {
    pub(crate) fn step(path: impl Into<PathBuf>, step: SnapshotStep, source: GitError) -> Self {
        Self::Step {
            path: path.into(),
            step,
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SnapshotError>;
