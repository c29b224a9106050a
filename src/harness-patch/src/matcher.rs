//! Line matching for patch directives.
//!
//! Matching is always a forward scan: a target is searched from the cursor to
//! the end of the buffer and the first hit wins. Lines before the cursor are
//! never considered.

/// How a directive target is compared with a buffer line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineMatch {
    /// Equal after trimming surrounding whitespace on both sides.
    #[default]
    Trimmed,
    /// Byte-for-byte equal.
    Exact,
}

impl LineMatch {
    /// Check if `actual` satisfies `target`.
    pub fn matches(self, target: &str, actual: &str) -> bool {
        match self {
            Self::Trimmed => target.trim() == actual.trim(),
            Self::Exact => target == actual,
        }
    }

    /// Find the first line at or after `from` that matches `target`.
    pub fn find_forward(self, lines: &[String], from: usize, target: &str) -> Option<usize> {
        lines
            .get(from..)?
            .iter()
            .position(|line| self.matches(target, line))
            .map(|offset| from + offset)
    }
}
