//! Source positions.

use std::fmt;

use serde::Serialize;

/// A span inside a source document.
///
/// `line` and `column` are 1-based, `offset` is the 0-based byte offset from
/// the start of the enclosing file and `size` is the byte length of the span.
/// Columns count characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    /// Name of the file (or pseudo-file) the span belongs to.
    pub filename: String,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
    /// 0-based byte offset.
    pub offset: usize,
    /// Byte length of the span.
    pub size: usize,
}

impl Location {
    /// Create a new location.
    #[must_use]
    pub fn new(filename: impl Into<String>, line: usize, column: usize, offset: usize, size: usize) -> Self {
        Self {
            filename: filename.into(),
            line,
            column,
            offset,
            size,
        }
    }

    /// The same starting point with a different size.
    #[must_use]
    pub fn with_size(&self, size: usize) -> Self {
        Self {
            size,
            ..self.clone()
        }
    }

    /// Byte offset one past the end of the span.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.offset + self.size
    }

    /// Grow this span so that it ends where `other` ends.
    pub fn extend_to(&mut self, other: &Self) {
        if other.end() > self.end() {
            self.size = other.end() - self.offset;
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}
