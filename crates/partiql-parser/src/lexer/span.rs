//! Source location tracking for tokens and errors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Represents a span in the source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the length of the span in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if the span is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A byte offset together with its 1-based line and column.
///
/// `line` and `column` are 0 when the offset lies past the end of the
/// input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Maps `offset` in `input` to a line and column.
    ///
    /// Columns count bytes, so a multi-byte character advances the
    /// column by its encoded length.
    #[must_use]
    pub fn resolve(input: &[u8], offset: usize) -> Self {
        if offset > input.len() {
            return Self {
                offset,
                line: 0,
                column: 0,
            };
        }
        let before = &input[..offset];
        let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |nl| nl + 1);
        Self {
            offset,
            line,
            column: offset - line_start + 1,
        }
    }

    /// Whether line and column are meaningful.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        self.line > 0 && self.column > 0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(f, "position {}", self.offset)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_len() {
        let span = Span::new(5, 10);
        assert_eq!(span.len(), 5);
        assert!(!span.is_empty());
        assert!(Span::new(5, 5).is_empty());
    }

    #[test]
    fn test_location_first_line() {
        let loc = Location::resolve(b"SELECT x", 7);
        assert_eq!((loc.line, loc.column), (1, 8));
        assert_eq!(loc.to_string(), "1:8");
    }

    #[test]
    fn test_location_after_newlines() {
        let input = b"SELECT\n  x\nFROM t";
        let loc = Location::resolve(input, 9);
        assert_eq!((loc.line, loc.column), (2, 3));

        // start of the third line
        let loc = Location::resolve(input, 11);
        assert_eq!((loc.line, loc.column), (3, 1));
    }

    #[test]
    fn test_location_at_end_and_beyond() {
        let input = b"ab";
        assert_eq!(Location::resolve(input, 2).column, 3);

        let past = Location::resolve(input, 3);
        assert!(!past.is_known());
        assert_eq!(past.to_string(), "position 3");
    }
}
