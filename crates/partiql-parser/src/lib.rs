//! # partiql-parser
//!
//! A parser for a PartiQL dialect of SQL over semi-structured data.
//!
//! This crate provides:
//! - A hand-written, context-sensitive lexer
//! - A recursive descent parser with precedence climbing for expressions
//! - A typed AST with a canonical text form and a compact binary form
//!
//! ## Parsing
//!
//! ```rust
//! use partiql_parser::{parse_str, Expr};
//!
//! let query = parse_str("SELECT a.b, COUNT(*) FROM t AS a WHERE a.x < 3 GROUP BY a.b")
//!     .unwrap();
//! assert!(matches!(query.body, Expr::Select(_)));
//! ```
//!
//! ## Canonical text
//!
//! Rendering a parsed query produces text that parses back to an
//! equivalent tree:
//!
//! ```rust
//! use partiql_parser::parse_str;
//!
//! let query = parse_str("select x from t where x between 1 and 2").unwrap();
//! let text = query.to_string();
//! assert_eq!(text, "SELECT x FROM t WHERE x >= 1 AND x <= 2");
//! assert!(parse_str(&text).unwrap().equivalent(&query));
//! ```
//!
//! ## Errors
//!
//! Only the first error of a parse is reported, with its line and column:
//!
//! ```rust
//! use partiql_parser::parse_str;
//!
//! let err = parse_str("SELECT x FROM t WHERE").unwrap_err();
//! assert_eq!(err.to_string(), "at 1:22: unexpected end of input, expecting expression");
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::{Expr, Query, Select};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{parse, parse_str, ErrorKind, ParseError, Parser};
