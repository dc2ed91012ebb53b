//! Query parser.
//!
//! A hand-written recursive descent parser with precedence climbing for
//! expressions. [`parse`] is the entry point; it borrows scratch state
//! from the process-wide [`pool`] so that repeated parses do not
//! reallocate.

mod builders;
pub mod clock;
mod error;
mod parser;
pub mod pool;
mod pratt;

pub use error::{ErrorKind, ParseError};
pub use parser::Parser;
pub use pool::{ParserPool, ParserState};

use tracing::debug;

use crate::ast::Query;

/// Parses a complete query.
///
/// # Errors
///
/// Returns the first lexical, syntax or semantic error found.
pub fn parse(input: &[u8]) -> Result<Query, ParseError> {
    parse_with(pool::global(), input)
}

/// Parses a complete query held in a string.
///
/// # Errors
///
/// See [`parse`].
pub fn parse_str(input: &str) -> Result<Query, ParseError> {
    parse(input.as_bytes())
}

/// Parses a complete query using scratch state from `pool`.
///
/// # Errors
///
/// See [`parse`].
pub fn parse_with(pool: &ParserPool, input: &[u8]) -> Result<Query, ParseError> {
    let mut state = pool.acquire();
    let mut parser = Parser::new(input, &mut state);
    let result = parser.parse_query();
    let tokens = parser.tokens();
    pool.release(state);

    match &result {
        Ok(_) => debug!(len = input.len(), tokens, "parsed query"),
        Err(err) => debug!(len = input.len(), tokens, error = %err, "query rejected"),
    }
    result
}
