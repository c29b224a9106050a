//! Version-control operations used by snapshot and restore.

use crate::config::SnapshotConfig;
use harness_utils_git::{Git, GitError};
use std::path::Path;

/// Operations on a managed directory's repository.
///
/// Each call either succeeds or reports why git failed; callers treat any
/// failure as fatal for the directory.
pub trait VersionControl {
    /// Whether `path` holds its own repository metadata.
    fn is_repository(&self, path: &Path) -> bool {
        path.join(".git").exists()
    }

    fn init(&self, path: &Path) -> Result<(), GitError>;

    fn add_all(&self, path: &Path) -> Result<(), GitError>;

    fn commit(&self, path: &Path, message: &str, allow_empty: bool) -> Result<(), GitError>;

    /// Create or move a tag to HEAD.
    fn tag_force(&self, path: &Path, name: &str) -> Result<(), GitError>;

    fn list_tags(&self, path: &Path) -> Result<Vec<String>, GitError>;

    fn reset_hard(&self, path: &Path, reference: &str) -> Result<(), GitError>;

    /// Remove untracked and ignored files.
    fn clean_untracked(&self, path: &Path) -> Result<(), GitError>;

    /// Commit currently checked out.
    fn head(&self, path: &Path) -> Result<String, GitError>;
}

/// [`VersionControl`] backed by the `git` command line.
#[derive(Debug, Clone)]
pub struct GitVcs {
    git: Git,
}

impl GitVcs {
    pub fn new(git: Git) -> Self {
        Self { git }
    }

    /// Git configured with the snapshot identity and timeout.
    pub fn from_config(config: &SnapshotConfig) -> Self {
        let git = Git::new()
            .with_timeout(config.git_timeout())
            .with_config("user.name", &config.identity.name)
            .with_config("user.email", &config.identity.email)
            .with_config("commit.gpgsign", "false")
            .with_config("tag.gpgsign", "false");
        Self::new(git)
    }

    pub fn git(&self) -> &Git {
        &self.git
    }
}

impl VersionControl for GitVcs {
    fn init(&self, path: &Path) -> Result<(), GitError> {
        self.git.run(path, &["init"]).map(drop)
    }

    fn add_all(&self, path: &Path) -> Result<(), GitError> {
        self.git.run(path, &["add", "."]).map(drop)
    }

    fn commit(&self, path: &Path, message: &str, allow_empty: bool) -> Result<(), GitError> {
        let mut args = vec!["commit"];
        if allow_empty {
            args.push("--allow-empty");
        }
        args.extend(["-m", message]);
        self.git.run(path, &args).map(drop)
    }

    fn tag_force(&self, path: &Path, name: &str) -> Result<(), GitError> {
        self.git.run(path, &["tag", "-f", name]).map(drop)
    }

    fn list_tags(&self, path: &Path) -> Result<Vec<String>, GitError> {
        let stdout = self.git.run_stdout(path, &["tag", "--list"])?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    fn reset_hard(&self, path: &Path, reference: &str) -> Result<(), GitError> {
        self.git.run(path, &["reset", "--hard", reference]).map(drop)
    }

    fn clean_untracked(&self, path: &Path) -> Result<(), GitError> {
        self.git.run(path, &["clean", "-fdx"]).map(drop)
    }

    fn head(&self, path: &Path) -> Result<String, GitError> {
        self.git.commit_hash(path)
    }
}
