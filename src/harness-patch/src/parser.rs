//! Patch text parsing.
//!
//! Each patch line is classified by its first character:
//!
//! ```text
//! +line   insert `line` at the cursor
//! -line   delete the next line matching `line`
//! ...     drop everything between the surrounding deletions
//! line    keep everything up to and including the next line matching `line`
//! ```

use crate::directive::{PatchDirective, PatchLine};
use crate::error::{PatchError, PatchResult};

/// The ellipsis marker, compared after trimming.
pub const ELLIPSIS: &str = "...";

/// Parse a patch into numbered directives.
///
/// Empty lines at the end of the patch are ignored. Fails when an ellipsis is not placed between two deletions.
pub fn parse_directives(patch: &str) -> PatchResult<Vec<PatchLine>> {
    // trailing empty lines are dropped, not read as blank context lines
    let lines: Vec<&str> = patch.lines().collect();
    let len = lines.iter().rposition(|l| !l.is_empty()).map_or(0, |i| i + 1);

    let directives: Vec<PatchLine> = lines[..len]
        .iter()
        .enumerate()
        .map(|(i, line)| PatchLine::new(i + 1, classify(line)))
        .collect();

    validate_ellipses(&directives)?;
    Ok(directives)
}

/// Classify a single patch line.
fn classify(line: &str) -> PatchDirective {
    if let Some(content) = line.strip_prefix('+') {
        PatchDirective::Insert(content.to_string())
    } else if let Some(content) = line.strip_prefix('-') {
        PatchDirective::Delete(content.to_string())
    } else if line.trim() == ELLIPSIS {
        PatchDirective::Ellipsis
    } else {
        PatchDirective::Keep(line.to_string())
    }
}

/// Check that every ellipsis sits directly between two deletions.
pub fn validate_ellipses(directives: &[PatchLine]) -> PatchResult<()> {
    for (i, line) in directives.iter().enumerate() {
        if !line.directive.is_ellipsis() {
            continue;
        }

        match i.checked_sub(1).map(|prev| &directives[prev].directive) {
            Some(prev) if prev.is_delete() => {}
            Some(prev) => {
                return Err(PatchError::misplaced_ellipsis(
                    line.number,
                    format!("previous directive is {}", prev.kind()),
                ));
            }
            None => {
                return Err(PatchError::misplaced_ellipsis(
                    line.number,
                    "at the start of the patch",
                ));
            }
        }

        match directives.get(i + 1).map(|next| &next.directive) {
            Some(next) if next.is_delete() => {}
            Some(next) => {
                return Err(PatchError::misplaced_ellipsis(
                    line.number,
                    format!("next directive is {}", next.kind()),
                ));
            }
            None => {
                return Err(PatchError::misplaced_ellipsis(
                    line.number,
                    "at the end of the patch",
                ));
            }
        }
    }

    Ok(())
}
