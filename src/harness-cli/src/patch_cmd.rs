//! `patch` command.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use harness_patch::{LineMatch, PatchOptions, modify_file};

#[derive(Debug, Args)]
pub struct PatchArgs {
    /// File to patch in place
    pub file: PathBuf,

    /// File holding the patch; read from stdin when omitted
    #[arg(long, short = 'p')]
    pub patch: Option<PathBuf>,

    /// Compare lines exactly instead of ignoring surrounding whitespace
    #[arg(long)]
    pub exact: bool,

    /// Print the resulting diff without writing the file
    #[arg(long)]
    pub dry_run: bool,
}

impl PatchArgs {
    fn options(&self) -> PatchOptions {
        let line_match = if self.exact {
            LineMatch::Exact
        } else {
            LineMatch::Trimmed
        };
        PatchOptions {
            line_match,
            dry_run: self.dry_run,
        }
    }

    fn read_patch(&self) -> Result<String> {
        match &self.patch {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read patch {}", path.display())),
            None => {
                let mut patch = String::new();
                std::io::stdin()
                    .read_to_string(&mut patch)
                    .context("Failed to read patch from stdin")?;
                Ok(patch)
            }
        }
    }
}

pub fn run(args: &PatchArgs) -> Result<()> {
    let patch = args.read_patch()?;
    let outcome = modify_file(&args.file, &patch, &args.options())
        .with_context(|| format!("Failed to patch {}", args.file.display()))?;

    if args.dry_run {
        print!("{}", outcome.diff(&args.file.display().to_string()));
    } else {
        println!("{}: {}", args.file.display(), outcome.summary());
    }
    Ok(())
}
