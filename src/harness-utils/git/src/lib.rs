//! Git utilities for the scenario harness.
//!
//! Every call is a blocking `git` subprocess bounded by a timeout. A call only
//! returns `Ok` when git exited successfully.

use std::io::{self, Read};
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

/// Default timeout for git operations in seconds
pub const DEFAULT_GIT_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding [`DEFAULT_GIT_TIMEOUT_SECS`].
pub const GIT_TIMEOUT_ENV: &str = "HARNESS_GIT_TIMEOUT_SECS";

/// Variables that would redirect git away from the directory it runs in.
const REPO_LOCATION_VARS: &[&str] = &["GIT_DIR", "GIT_WORK_TREE", "GIT_INDEX_FILE"];

/// Errors from running git.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` timed out after {timeout_secs}s")]
    Timeout { command: String, timeout_secs: u64 },
    #[error("`{command}` failed ({status}): {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

pub type Result<T> = std::result::Result<T, GitError>;

/// Get the configured git timeout duration
pub fn default_timeout() -> Duration {
    std::env::var(GIT_TIMEOUT_ENV)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(DEFAULT_GIT_TIMEOUT_SECS))
}

/// Read a child pipe to the end on its own thread.
///
/// Both pipes must be drained while waiting, or git blocks once it has
/// written more than the pipe buffer.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn collect(handle: JoinHandle<io::Result<Vec<u8>>>, command: &str) -> Result<Vec<u8>> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("pipe reader panicked")))
        .map_err(|source| GitError::Spawn {
            command: command.to_string(),
            source,
        })
}

/// Execute a command with timeout (synchronous version)
fn run_with_timeout(mut command: Command, command_line: &str, timeout: Duration) -> Result<Output> {
    let spawn_error = |source: io::Error| GitError::Spawn {
        command: command_line.to_string(),
        source,
    };

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(spawn_error)?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let start = Instant::now();

    let status = loop {
        match child.try_wait().map_err(spawn_error)? {
            Some(status) => break status,
            None if start.elapsed() > timeout => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(GitError::Timeout {
                    command: command_line.to_string(),
                    timeout_secs: timeout.as_secs(),
                });
            }
            None => std::thread::sleep(Duration::from_millis(20)),
        }
    };

    Ok(Output {
        status,
        stdout: collect(stdout, command_line)?,
        stderr: collect(stderr, command_line)?,
    })
}

/// A configured git invoker.
///
/// `config` entries are passed as `-c key=value` ahead of every subcommand, so
/// repositories created by the harness never depend on the user's global git
/// configuration for identity or signing.
#[derive(Debug, Clone)]
pub struct Git {
    timeout: Duration,
    config: Vec<(String, String)>,
}

impl Default for Git {
    fn default() -> Self {
        Self::new()
    }
}

impl Git {
    pub fn new() -> Self {
        Self {
            timeout: default_timeout(),
            config: Vec::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.push((key.into(), value.into()));
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `git <args>` in `cwd`, failing unless git exits successfully.
    pub fn run(&self, cwd: &Path, args: &[&str]) -> Result<Output> {
        let command_line = format!("git {}", args.join(" "));
        let mut cmd = Command::new("git");
        for (key, value) in &self.config {
            cmd.arg("-c").arg(format!("{key}={value}"));
        }
        for var in REPO_LOCATION_VARS {
            cmd.env_remove(var);
        }
        cmd.args(args).current_dir(cwd);

        debug!(cwd = %cwd.display(), command = %command_line, "running git");
        let output = run_with_timeout(cmd, &command_line, self.timeout)?;

        if output.status.success() {
            Ok(output)
        } else {
            Err(GitError::Failed {
                command: command_line,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    /// Run `git <args>` and return its trimmed stdout.
    pub fn run_stdout(&self, cwd: &Path, args: &[&str]) -> Result<String> {
        let output = self.run(cwd, args)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Get the current commit hash.
    pub fn commit_hash(&self, cwd: &Path) -> Result<String> {
        self.run_stdout(cwd, &["rev-parse", "HEAD"])
    }

    /// Resolve a tag to the commit it points at.
    pub fn tag_target(&self, cwd: &Path, tag: &str) -> Result<String> {
        let rev = format!("refs/tags/{tag}^{{commit}}");
        self.run_stdout(cwd, &["rev-parse", "--verify", &rev])
    }
}
