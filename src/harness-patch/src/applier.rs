//! Patch application logic.

use crate::directive::{PatchDirective, PatchLine, TextBuffer};
use crate::error::{PatchError, PatchResult};
use crate::matcher::LineMatch;
use crate::parser::validate_ellipses;
use similar::TextDiff;

/// Options for patch application.
#[derive(Debug, Clone, Default)]
pub struct PatchOptions {
    /// How directive targets are compared with file lines.
    pub line_match: LineMatch,
    /// If true, don't actually modify files.
    pub dry_run: bool,
}

impl PatchOptions {
    /// Create options for dry-run mode.
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Default::default()
        }
    }

    /// Set the line matching discipline.
    pub fn with_line_match(mut self, line_match: LineMatch) -> Self {
        self.line_match = line_match;
        self
    }
}

/// Result of applying a patch to a buffer.
#[derive(Debug, Clone)]
pub struct PatchOutcome {
    /// Content before patching.
    pub original: String,
    /// Content after patching.
    pub content: String,
    /// Number of `+` lines emitted.
    pub lines_inserted: usize,
    /// Number of `-` lines consumed.
    pub lines_deleted: usize,
    /// Number of lines dropped by ellipses.
    pub lines_dropped: usize,
}

impl PatchOutcome {
    /// Check if the patch left the content as it was.
    pub fn is_unchanged(&self) -> bool {
        self.original == self.content
    }

    /// Get a summary string.
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} line(s) inserted, {} line(s) deleted",
            self.lines_inserted, self.lines_deleted
        );

        if self.lines_dropped > 0 {
            summary.push_str(&format!(", {} line(s) elided", self.lines_dropped));
        }

        summary
    }

    /// Unified diff from the original to the patched content.
    pub fn diff(&self, label: &str) -> String {
        TextDiff::from_lines(&self.original, &self.content)
            .unified_diff()
            .context_radius(3)
            .header(&format!("a/{label}"), &format!("b/{label}"))
            .to_string()
    }
}

/// Apply parsed directives to a buffer and return the resulting lines.
pub fn apply_directives(
    buffer: &TextBuffer,
    directives: &[PatchLine],
    line_match: LineMatch,
) -> PatchResult<AppliedLines> {
    validate_ellipses(directives)?;

    let lines = buffer.lines();
    let mut applied = AppliedLines::default();
    let mut cursor = 0;
    let mut in_ellipsis = false;

    for PatchLine { number, directive } in directives {
        match directive {
            PatchDirective::Insert(text) => {
                applied.lines.push(text.clone());
                applied.inserted += 1;
            }
            PatchDirective::Delete(target) => {
                let found = locate(lines, cursor, *number, directive, target, line_match)?;
                if in_ellipsis {
                    applied.dropped += found - cursor;
                } else {
                    applied.lines.extend_from_slice(&lines[cursor..found]);
                }
                cursor = found + 1;
                in_ellipsis = false;
                applied.deleted += 1;
            }
            PatchDirective::Ellipsis => {
                in_ellipsis = true;
            }
            PatchDirective::Keep(target) => {
                let found = locate(lines, cursor, *number, directive, target, line_match)?;
                applied.lines.extend_from_slice(&lines[cursor..=found]);
                cursor = found + 1;
            }
        }
    }

    applied.lines.extend_from_slice(&lines[cursor..]);
    Ok(applied)
}

/// Lines produced by [`apply_directives`] with per-directive counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedLines {
    pub lines: Vec<String>,
    pub inserted: usize,
    pub deleted: usize,
    pub dropped: usize,
}

/// Forward search for a directive target.
fn locate(
    lines: &[String],
    cursor: usize,
    patch_line: usize,
    directive: &PatchDirective,
    target: &str,
    line_match: LineMatch,
) -> PatchResult<usize> {
    line_match
        .find_forward(lines, cursor, target)
        .ok_or_else(|| PatchError::line_not_found(target, directive.kind(), patch_line, cursor + 1))
}

/// Apply a buffer-level patch and keep both versions for reporting.
pub fn apply_to_text(
    original: &str,
    directives: &[PatchLine],
    options: &PatchOptions,
) -> PatchResult<PatchOutcome> {
    let buffer = TextBuffer::parse(original);
    let applied = apply_directives(&buffer, directives, options.line_match)?;

    Ok(PatchOutcome {
        original: original.to_string(),
        content: buffer.render(&applied.lines),
        lines_inserted: applied.inserted,
        lines_deleted: applied.deleted,
        lines_dropped: applied.dropped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_directives;
    use pretty_assertions::assert_eq;

    fn patch_lines(original: &[&str], patch: &str) -> PatchResult<Vec<String>> {
        patch_lines_with(original, patch, LineMatch::Trimmed)
    }

    fn patch_lines_with(
        original: &[&str],
        patch: &str,
        line_match: LineMatch,
    ) -> PatchResult<Vec<String>> {
        let buffer = TextBuffer::parse(&original.join("\n"));
        let directives = parse_directives(patch)?;
        Ok(apply_directives(&buffer, &directives, line_match)?.lines)
    }

    #[test]
    fn test_context_only_patch_is_noop() {
        let original = ["fn main() {", "    body();", "}"];
        let result = patch_lines(&original, "fn main() {\n    body();\n}").unwrap();
        assert_eq!(result, original);
    }

    #[test]
    fn test_delete_consumes_first_match_only() {
        let result = patch_lines(&["a", "b", "a", "c"], "-a").unwrap();
        assert_eq!(result, ["b", "a", "c"]);
    }

    #[test]
    fn test_ellipsis_drops_spanned_range() {
        let buffer = TextBuffer::parse("1\n2\n3\n4\n5");
        let directives = parse_directives("-1\n...\n-5").unwrap();
        let applied = apply_directives(&buffer, &directives, LineMatch::Trimmed).unwrap();

        assert!(applied.lines.is_empty());
        assert_eq!(applied.deleted, 2);
        assert_eq!(applied.dropped, 3);
    }

    #[test]
    fn test_ellipsis_keeps_lines_outside_span() {
        let result = patch_lines(&["0", "1", "2", "3", "4", "5", "6"], "-1\n...\n-5").unwrap();
        assert_eq!(result, ["0", "6"]);
    }

    #[test]
    fn test_insert_into_empty_buffer() {
        let result = patch_lines(&[], "+hello").unwrap();
        assert_eq!(result, ["hello"]);
    }

    #[test]
    fn test_unmatched_delete_fails() {
        let err = patch_lines(&["a", "b"], "-zzz").unwrap_err();
        assert_eq!(err.unmatched_line(), Some("zzz"));
    }

    #[test]
    fn test_context_never_matches_backward() {
        // "a" is consumed by the first context line; the second must look forward.
        let err = patch_lines(&["a", "b"], "a\nb\na").unwrap_err();
        match err {
            PatchError::LineNotFound {
                patch_line,
                from_line,
                ..
            } => {
                assert_eq!(patch_line, 3);
                assert_eq!(from_line, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_insert_after_context_lands_at_cursor() {
        let result = patch_lines(&["one", "two", "three"], "one\n+one and a half").unwrap();
        assert_eq!(result, ["one", "one and a half", "two", "three"]);
    }

    #[test]
    fn test_replace_line() {
        let original = ["[deps]", "  foo = 1", "  bar = 2"];
        let result = patch_lines(&original, "[deps]\n-foo = 1\n+  foo = 3").unwrap();
        assert_eq!(result, ["[deps]", "  foo = 3", "  bar = 2"]);
    }

    #[test]
    fn test_delete_copies_skipped_lines() {
        let result = patch_lines(&["a", "b", "c", "d"], "-c").unwrap();
        assert_eq!(result, ["a", "b", "d"]);
    }

    #[test]
    fn test_trimmed_matching_tolerates_indentation() {
        let result = patch_lines(&["    indented", "next"], "-indented").unwrap();
        assert_eq!(result, ["next"]);
    }

    #[test]
    fn test_exact_matching_rejects_indentation() {
        let err = patch_lines_with(&["    indented"], "-indented", LineMatch::Exact).unwrap_err();
        assert!(matches!(err, PatchError::LineNotFound { .. }));

        let result = patch_lines_with(&["    indented"], "-    indented", LineMatch::Exact).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_hand_built_directives_are_validated() {
        let buffer = TextBuffer::parse("a\nb");
        let directives = vec![
            PatchLine::new(1, PatchDirective::Keep("a".to_string())),
            PatchLine::new(2, PatchDirective::Ellipsis),
        ];
        let err = apply_directives(&buffer, &directives, LineMatch::Trimmed).unwrap_err();
        assert!(matches!(err, PatchError::MisplacedEllipsis { .. }));
    }

    #[test]
    fn test_apply_to_text_preserves_separator() {
        let directives = parse_directives("-b\n+B").unwrap();
        let outcome =
            apply_to_text("a\r\nb\r\nc\r\n", &directives, &PatchOptions::default()).unwrap();

        assert_eq!(outcome.content, "a\r\nB\r\nc\r\n");
        assert_eq!(outcome.lines_inserted, 1);
        assert_eq!(outcome.lines_deleted, 1);
        assert!(!outcome.is_unchanged());
    }

    #[test]
    fn test_outcome_summary_and_diff() {
        let directives = parse_directives("-1\n...\n-4\n+x").unwrap();
        let outcome = apply_to_text("1\n2\n3\n4\n5\n", &directives, &PatchOptions::default())
            .unwrap();

        assert_eq!(outcome.content, "x\n5\n");
        assert_eq!(
            outcome.summary(),
            "1 line(s) inserted, 2 line(s) deleted, 2 line(s) elided"
        );

        let diff = outcome.diff("fixture.txt");
        assert!(diff.contains("--- a/fixture.txt"));
        assert!(diff.contains("+++ b/fixture.txt"));
        assert!(diff.contains("-2"));
        assert!(diff.contains("+x"));
    }
}
