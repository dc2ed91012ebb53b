//! Parser error types.

use thiserror::Error;

use crate::lexer::{Location, Token};

/// Which stage rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The text could not be split into tokens.
    Lexical,
    /// The token sequence does not form a query.
    Syntax,
    /// The query is well formed but rejected while building the tree.
    Semantic,
}

/// A parse error.
///
/// Only the first fault of a parse is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("at {location}: {message}")]
pub struct ParseError {
    kind: ErrorKind,
    location: Location,
    length: usize,
    message: String,
}

impl ParseError {
    /// Creates a new error at `offset` in `input`.
    #[must_use]
    pub fn new(
        kind: ErrorKind,
        input: &[u8],
        offset: usize,
        length: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            location: Location::resolve(input, offset),
            length,
            message: message.into(),
        }
    }

    /// Creates a lexical error.
    #[must_use]
    pub fn lexical(input: &[u8], offset: usize, length: usize, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Lexical, input, offset, length, message)
    }

    /// Creates a semantic error anchored at the start of a production.
    #[must_use]
    pub fn semantic(input: &[u8], offset: usize, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Semantic, input, offset, 0, message)
    }

    /// Creates an "unexpected token" error.
    #[must_use]
    pub fn unexpected(input: &[u8], found: &Token, expected: &str) -> Self {
        Self::new(
            ErrorKind::Syntax,
            input,
            found.span.start,
            found.span.len(),
            format!("unexpected {}, expecting {expected}", found.kind.describe()),
        )
    }

    /// Returns the stage that failed.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the offending position.
    #[must_use]
    pub const fn location(&self) -> Location {
        self.location
    }

    /// Byte offset into the input.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.location.offset
    }

    /// 1-based line, or 0 if unknown.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.location.line
    }

    /// 1-based byte column, or 0 if unknown.
    #[must_use]
    pub const fn column(&self) -> usize {
        self.location.column
    }

    /// Length of the offending text in bytes, or 0 if unknown.
    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }

    /// The message without position information.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
