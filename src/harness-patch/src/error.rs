//! Error types for patch operations.

use std::path::PathBuf;
use thiserror::Error;

use crate::directive::DirectiveKind;

/// Result type for patch operations.
pub type PatchResult<T> = Result<T, PatchError>;

/// Errors that can occur while parsing or applying a patch.
#[derive(Debug, Error)]
pub enum PatchError {
    /// A deletion or context target has no forward match.
    #[error(
        "cannot find {line:?} ({kind} on patch line {patch_line}, searched from file line {from_line})"
    )]
    LineNotFound {
        line: String,
        kind: DirectiveKind,
        patch_line: usize,
        /// 1-indexed buffer line the scan started from.
        from_line: usize,
    },

    /// An ellipsis outside a deletion-to-deletion span.
    #[error("ellipsis on patch line {line_number} can only be used between two - lines: {reason}")]
    MisplacedEllipsis { line_number: usize, reason: String },

    /// Failed to read file.
    #[error("Failed to read file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write file.
    #[error("Failed to write file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PatchError {
    /// Create a line-not-found error.
    pub fn line_not_found(
        line: impl Into<String>,
        kind: DirectiveKind,
        patch_line: usize,
        from_line: usize,
    ) -> Self {
        Self::LineNotFound {
            line: line.into(),
            kind,
            patch_line,
            from_line,
        }
    }

    /// Create a misplaced-ellipsis error.
    pub fn misplaced_ellipsis(line_number: usize, reason: impl Into<String>) -> Self {
        Self::MisplacedEllipsis {
            line_number,
            reason: reason.into(),
        }
    }

    /// The patch line that could not be located, if that is why the patch failed.
    pub fn unmatched_line(&self) -> Option<&str> {
        match self {
            Self::LineNotFound { line, .. } => Some(line),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PatchError::line_not_found("zzz", DirectiveKind::Delete, 3, 7);
        let msg = err.to_string();
        assert!(msg.contains("\"zzz\""));
        assert!(msg.contains("deletion"));
        assert!(msg.contains("patch line 3"));
        assert!(msg.contains("file line 7"));

        let err = PatchError::misplaced_ellipsis(2, "next directive is insertion");
        assert!(err.to_string().contains("between two - lines"));
        assert!(err.to_string().contains("next directive is insertion"));
    }

    #[test]
    fn test_unmatched_line() {
        let err = PatchError::line_not_found("needle", DirectiveKind::Keep, 1, 1);
        assert_eq!(err.unmatched_line(), Some("needle"));

        let err = PatchError::misplaced_ellipsis(1, "at the start of the patch");
        assert_eq!(err.unmatched_line(), None);
    }
}
