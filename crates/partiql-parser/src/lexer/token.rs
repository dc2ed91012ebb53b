//! Token types for the lexer.

use chrono::{DateTime, Utc};

use super::Span;
use crate::ast::{AggregateOp, Rational};

/// Reserved words.
///
/// Aggregate names are not listed here; they lex as
/// [`TokenKind::Aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    All,
    And,
    As,
    Asc,
    At,
    Between,
    Both,
    By,
    Case,
    Cast,
    Coalesce,
    Concat,
    Cross,
    DateAdd,
    DateDiff,
    DateTrunc,
    Desc,
    Distinct,
    Else,
    End,
    Escape,
    Exists,
    Explain,
    Extract,
    False,
    Filter,
    First,
    From,
    Group,
    Having,
    Ilike,
    In,
    Inner,
    Into,
    Is,
    Join,
    Last,
    Leading,
    Left,
    Like,
    Limit,
    Missing,
    Not,
    Null,
    Nullif,
    Nulls,
    Offset,
    On,
    Or,
    Order,
    Over,
    Partition,
    Right,
    Select,
    Similar,
    Then,
    To,
    Trailing,
    Trim,
    True,
    Union,
    Unpivot,
    Utcnow,
    Value,
    When,
    Where,
    With,
}

impl Keyword {
    /// Every keyword, in declaration order.
    pub const ALL: [Self; 67] = [
        Self::All,
        Self::And,
        Self::As,
        Self::Asc,
        Self::At,
        Self::Between,
        Self::Both,
        Self::By,
        Self::Case,
        Self::Cast,
        Self::Coalesce,
        Self::Concat,
        Self::Cross,
        Self::DateAdd,
        Self::DateDiff,
        Self::DateTrunc,
        Self::Desc,
        Self::Distinct,
        Self::Else,
        Self::End,
        Self::Escape,
        Self::Exists,
        Self::Explain,
        Self::Extract,
        Self::False,
        Self::Filter,
        Self::First,
        Self::From,
        Self::Group,
        Self::Having,
        Self::Ilike,
        Self::In,
        Self::Inner,
        Self::Into,
        Self::Is,
        Self::Join,
        Self::Last,
        Self::Leading,
        Self::Left,
        Self::Like,
        Self::Limit,
        Self::Missing,
        Self::Not,
        Self::Null,
        Self::Nullif,
        Self::Nulls,
        Self::Offset,
        Self::On,
        Self::Or,
        Self::Order,
        Self::Over,
        Self::Partition,
        Self::Right,
        Self::Select,
        Self::Similar,
        Self::Then,
        Self::To,
        Self::Trailing,
        Self::Trim,
        Self::True,
        Self::Union,
        Self::Unpivot,
        Self::Utcnow,
        Self::Value,
        Self::When,
        Self::Where,
        Self::With,
    ];

    /// Returns the keyword as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::And => "AND",
            Self::As => "AS",
            Self::Asc => "ASC",
            Self::At => "AT",
            Self::Between => "BETWEEN",
            Self::Both => "BOTH",
            Self::By => "BY",
            Self::Case => "CASE",
            Self::Cast => "CAST",
            Self::Coalesce => "COALESCE",
            Self::Concat => "CONCAT",
            Self::Cross => "CROSS",
            Self::DateAdd => "DATE_ADD",
            Self::DateDiff => "DATE_DIFF",
            Self::DateTrunc => "DATE_TRUNC",
            Self::Desc => "DESC",
            Self::Distinct => "DISTINCT",
            Self::Else => "ELSE",
            Self::End => "END",
            Self::Escape => "ESCAPE",
            Self::Exists => "EXISTS",
            Self::Explain => "EXPLAIN",
            Self::Extract => "EXTRACT",
            Self::False => "FALSE",
            Self::Filter => "FILTER",
            Self::First => "FIRST",
            Self::From => "FROM",
            Self::Group => "GROUP",
            Self::Having => "HAVING",
            Self::Ilike => "ILIKE",
            Self::In => "IN",
            Self::Inner => "INNER",
            Self::Into => "INTO",
            Self::Is => "IS",
            Self::Join => "JOIN",
            Self::Last => "LAST",
            Self::Leading => "LEADING",
            Self::Left => "LEFT",
            Self::Like => "LIKE",
            Self::Limit => "LIMIT",
            Self::Missing => "MISSING",
            Self::Not => "NOT",
            Self::Null => "NULL",
            Self::Nullif => "NULLIF",
            Self::Nulls => "NULLS",
            Self::Offset => "OFFSET",
            Self::On => "ON",
            Self::Or => "OR",
            Self::Order => "ORDER",
            Self::Over => "OVER",
            Self::Partition => "PARTITION",
            Self::Right => "RIGHT",
            Self::Select => "SELECT",
            Self::Similar => "SIMILAR",
            Self::Then => "THEN",
            Self::To => "TO",
            Self::Trailing => "TRAILING",
            Self::Trim => "TRIM",
            Self::True => "TRUE",
            Self::Union => "UNION",
            Self::Unpivot => "UNPIVOT",
            Self::Utcnow => "UTCNOW",
            Self::Value => "VALUE",
            Self::When => "WHEN",
            Self::Where => "WHERE",
            Self::With => "WITH",
        }
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// Integer literal (e.g., 42, 0xff, -7)
    Integer(i64),
    /// Float literal (e.g., 3.14, 5e4)
    Float(f64),
    /// Exact fraction that fits neither of the above.
    Rational(Rational),
    /// String literal, unescaped (e.g., 'hello')
    String(String),
    /// Backtick timestamp (e.g., `2020-01-01T00:00:00Z`)
    Timestamp(DateTime<Utc>),

    // Identifiers and keywords
    /// Bare or double-quoted identifier
    Identifier(String),
    /// Reserved word
    Keyword(Keyword),
    /// Aggregate function name
    Aggregate(AggregateOp),

    // Operators
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// =
    Eq,
    /// != or <>
    NotEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// ||
    Concat,
    /// ++
    Append,
    /// &
    BitAnd,
    /// |
    BitOr,
    /// ^
    Caret,
    /// ~
    Tilde,
    /// ~*
    RegexMatchCi,
    /// <<
    ShiftLeft,
    /// >>
    ShiftRightArith,
    /// >>>
    ShiftRightLogical,

    // Delimiters
    /// (
    LeftParen,
    /// )
    RightParen,
    /// [
    LeftBracket,
    /// ]
    RightBracket,
    /// {
    LeftBrace,
    /// }
    RightBrace,
    /// ,
    Comma,
    /// .
    Dot,
    /// :
    Colon,

    // Special
    /// End of input
    Eof,
    /// Lexical error; the error itself is held by the lexer
    Error,
}

impl TokenKind {
    /// Returns the name used for this token in syntax errors.
    #[must_use]
    pub fn describe(&self) -> String {
        let name = match self {
            Self::Integer(_) | Self::Float(_) | Self::Rational(_) => "NUMBER",
            Self::String(_) => "STRING",
            Self::Timestamp(_) => "ION",
            Self::Identifier(_) => "ID",
            Self::Keyword(kw) => kw.as_str(),
            Self::Aggregate(_) => "AGGREGATE",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Star => "'*'",
            Self::Slash => "'/'",
            Self::Percent => "'%'",
            Self::Eq => "'='",
            Self::NotEq => "'<>'",
            Self::Lt => "'<'",
            Self::LtEq => "'<='",
            Self::Gt => "'>'",
            Self::GtEq => "'>='",
            Self::Concat => "'||'",
            Self::Append => "'++'",
            Self::BitAnd => "'&'",
            Self::BitOr => "'|'",
            Self::Caret => "'^'",
            Self::Tilde => "'~'",
            Self::RegexMatchCi => "'~*'",
            Self::ShiftLeft => "'<<'",
            Self::ShiftRightArith => "'>>'",
            Self::ShiftRightLogical => "'>>>'",
            Self::LeftParen => "'('",
            Self::RightParen => "')'",
            Self::LeftBracket => "'['",
            Self::RightBracket => "']'",
            Self::LeftBrace => "'{'",
            Self::RightBrace => "'}'",
            Self::Comma => "','",
            Self::Dot => "'.'",
            Self::Colon => "':'",
            Self::Eof => "end of input",
            Self::Error => "ERROR",
        };
        String::from(name)
    }
}

/// A token with its span in the source code.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The location in the source code.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns true if this is a numeric literal.
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Integer(_) | TokenKind::Float(_) | TokenKind::Rational(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_as_str() {
        assert_eq!(Keyword::Select.as_str(), "SELECT");
        assert_eq!(Keyword::DateTrunc.as_str(), "DATE_TRUNC");
        assert_eq!(Keyword::Utcnow.as_str(), "UTCNOW");
    }

    #[test]
    fn test_keyword_list_is_complete() {
        let mut names: Vec<_> = Keyword::ALL.iter().map(Keyword::as_str).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Keyword::ALL.len());
    }

    #[test]
    fn test_describe() {
        assert_eq!(TokenKind::Identifier(String::from("x")).describe(), "ID");
        assert_eq!(TokenKind::Aggregate(AggregateOp::Count).describe(), "AGGREGATE");
        assert_eq!(TokenKind::Keyword(Keyword::From).describe(), "FROM");
        assert_eq!(TokenKind::Comma.describe(), "','");
    }

    #[test]
    fn test_token_predicates() {
        let minus_four = Token::new(TokenKind::Integer(-4), Span::new(0, 2));
        let plus = Token::new(TokenKind::Plus, Span::new(2, 3));
        assert!(minus_four.is_number());
        assert!(!plus.is_number());
        assert!(!plus.is_eof());
        assert!(Token::new(TokenKind::Eof, Span::new(3, 3)).is_eof());
    }
}
