//! Query lexer.
//!
//! This module provides a hand-written, context-sensitive lexer that
//! produces a stream of tokens. Whether a word is a keyword depends on
//! what precedes it: the word after `AS` or `.` is always an identifier.

mod keywords;
mod number;
mod span;
mod token;
mod tokenizer;

pub use keywords::{entries, is_keyword, lookup, lookup_by_code, word_code, Terminal};
pub use span::{Location, Span};
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::Lexer;
