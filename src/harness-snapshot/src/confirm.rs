//! Operator confirmation before destructive restores.

use crate::{Result, SnapshotError};
use std::fmt;
use std::io::{BufRead, StdinLock, Stdout, Write};
use std::path::{Path, PathBuf};

/// A destructive change restore is about to make to one managed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreAction {
    /// Hard-reset the directory to `tag` and remove untracked files.
    Reset { path: PathBuf, tag: String },
    /// Delete the directory; it has no earlier snapshot.
    Remove { path: PathBuf },
}

impl RestoreAction {
    pub fn path(&self) -> &Path {
        match self {
            Self::Reset { path, .. } | Self::Remove { path } => path,
        }
    }
}

impl fmt::Display for RestoreAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reset { path, tag } => write!(f, "resetting {} to {tag}", path.display()),
            Self::Remove { path } => {
                write!(f, "no earlier snapshot in {}, deleting it", path.display())
            }
        }
    }
}

/// Gate run before every [`RestoreAction`].
///
/// Returning `Ok` allows the action. There is no "decline" answer: an
/// operator who does not want the restore terminates the process.
pub trait Confirmation {
    fn confirm(&mut self, action: &RestoreAction) -> Result<()>;
}

/// Confirms everything without asking.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirmation for AlwaysConfirm {
    fn confirm(&mut self, _action: &RestoreAction) -> Result<()> {
        Ok(())
    }
}

/// Prints the action and blocks until a line is entered.
pub struct PromptConfirmation<R, W> {
    input: R,
    output: W,
}

impl PromptConfirmation<StdinLock<'static>, Stdout> {
    /// Prompt on the process's terminal.
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> PromptConfirmation<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Confirmation for PromptConfirmation<R, W> {
    fn confirm(&mut self, action: &RestoreAction) -> Result<()> {
        writeln!(self.output, "{action}")?;
        writeln!(self.output, "press ENTER to confirm")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(SnapshotError::ConfirmationFailed(format!(
                "input closed before confirming: {action}"
            )));
        }
        Ok(())
    }
}
