//! Harness Patch - line-directive patching of fixture files.
//!
//! Test scenarios describe edits to fixture files with a small line-oriented
//! language instead of a full diff format:
//! - `+line` inserts a line at the cursor
//! - `-line` deletes the next matching line
//! - `...` between two deletions drops everything they enclose
//! - any other line is context: everything up to its next match is kept
//!
//! Targets are searched strictly forward from the cursor and compared after
//! trimming surrounding whitespace ([`LineMatch::Trimmed`]). A target that
//! cannot be found fails the whole patch.
//!
//! # Example
//!
//! ```
//! use harness_patch::apply;
//!
//! let original = "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n";
//! let patch = "[package]\n-version = \"0.1.0\"\n+version = \"0.2.0\"";
//!
//! let patched = apply(original, patch).unwrap();
//! assert_eq!(patched, "[package]\nname = \"demo\"\nversion = \"0.2.0\"\n");
//! ```

mod applier;
mod directive;
mod error;
mod matcher;
mod parser;

pub use applier::{AppliedLines, PatchOptions, PatchOutcome, apply_directives, apply_to_text};
pub use directive::{DirectiveKind, PatchDirective, PatchLine, TextBuffer};
pub use error::{PatchError, PatchResult};
pub use matcher::LineMatch;
pub use parser::{ELLIPSIS, parse_directives};

use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Apply a patch to `original` and return the patched text.
///
/// This is the main entry point for in-memory patching. It uses the default
/// [`PatchOptions`].
pub fn apply(original: &str, patch: &str) -> PatchResult<String> {
    Ok(apply_with_options(original, patch, &PatchOptions::default())?.content)
}

/// Apply a patch with custom options, keeping both versions for reporting.
pub fn apply_with_options(
    original: &str,
    patch: &str,
    options: &PatchOptions,
) -> PatchResult<PatchOutcome> {
    let directives = parse_directives(patch)?;
    apply_to_text(original, &directives, options)
}

/// Patch the file at `path` in place.
///
/// The file is read, patched in memory and overwritten. Nothing is written
/// when the patch fails or when `options.dry_run` is set.
pub fn modify_file(path: &Path, patch: &str, options: &PatchOptions) -> PatchResult<PatchOutcome> {
    let original = fs::read_to_string(path).map_err(|e| PatchError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let outcome = apply_with_options(&original, patch, options)?;

    if options.dry_run {
        debug!(path = %path.display(), "dry run: {}", outcome.summary());
        return Ok(outcome);
    }

    fs::write(path, &outcome.content).map_err(|e| PatchError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;

    info!(path = %path.display(), "patched: {}", outcome.summary());
    Ok(outcome)
}
