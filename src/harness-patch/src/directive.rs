//! Patch directive and text buffer data structures.

use std::fmt;

/// One edit instruction of a patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchDirective {
    /// Emit a new line at the cursor.
    Insert(String),
    /// Find the next matching line and remove it.
    Delete(String),
    /// Find the next matching line and copy everything up to it.
    Keep(String),
    /// Drop every line between the surrounding deletions.
    Ellipsis,
}

impl PatchDirective {
    /// Get the kind of this directive.
    pub fn kind(&self) -> DirectiveKind {
        match self {
            Self::Insert(_) => DirectiveKind::Insert,
            Self::Delete(_) => DirectiveKind::Delete,
            Self::Keep(_) => DirectiveKind::Keep,
            Self::Ellipsis => DirectiveKind::Ellipsis,
        }
    }

    /// Get the line this directive has to locate in the buffer.
    pub fn match_content(&self) -> Option<&str> {
        match self {
            Self::Delete(s) | Self::Keep(s) => Some(s),
            Self::Insert(_) | Self::Ellipsis => None,
        }
    }

    /// Check if this is a deletion.
    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete(_))
    }

    /// Check if this is an ellipsis.
    pub fn is_ellipsis(&self) -> bool {
        matches!(self, Self::Ellipsis)
    }
}

/// Directive discriminant, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Insert,
    Delete,
    Keep,
    Ellipsis,
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Insert => "insertion",
            Self::Delete => "deletion",
            Self::Keep => "context line",
            Self::Ellipsis => "ellipsis",
        };
        f.write_str(name)
    }
}

/// A directive together with its 1-indexed line in the patch text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchLine {
    pub number: usize,
    pub directive: PatchDirective,
}

impl PatchLine {
    pub fn new(number: usize, directive: PatchDirective) -> Self {
        Self { number, directive }
    }
}

/// File content split into lines.
///
/// Remembers the separator and whether the text ended with one, so that
/// rejoining an untouched buffer reproduces the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    lines: Vec<String>,
    separator: &'static str,
    trailing_separator: bool,
}

impl TextBuffer {
    /// Split `text` into lines.
    pub fn parse(text: &str) -> Self {
        let separator = if text.contains("\r\n") { "\r\n" } else { "\n" };

        if text.is_empty() {
            return Self {
                lines: Vec::new(),
                separator,
                trailing_separator: false,
            };
        }

        let (body, trailing_separator) = match text.strip_suffix(separator) {
            Some(body) => (body, true),
            None => (text, false),
        };

        Self {
            lines: body.split(separator).map(String::from).collect(),
            separator,
            trailing_separator,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn separator(&self) -> &'static str {
        self.separator
    }

    /// Join `lines` the way this buffer was joined.
    pub fn render(&self, lines: &[String]) -> String {
        let mut content = lines.join(self.separator);
        if self.trailing_separator && !lines.is_empty() {
            content.push_str(self.separator);
        }
        content
    }
}
