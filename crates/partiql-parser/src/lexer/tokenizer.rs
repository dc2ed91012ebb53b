//! Query tokenizer implementation.

use chrono::{DateTime, NaiveDate, SubsecRound, TimeZone, Utc};

use super::keywords::{self, Terminal};
use super::number::{self, NumberError};
use super::{Keyword, Span, Token, TokenKind};
use crate::parser::ParseError;

/// Whether the next word may be looked up as a keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WordMode {
    Keywords,
    /// Set after `AS`, after `.`, and inside a word run such as `a.b`
    /// or `col+`; cleared by whitespace and most operators.
    IdentifiersOnly,
}

/// A lexer that tokenizes query text.
///
/// The lexer stops at the first error: it is latched, and every later
/// call to [`Lexer::next_token`] returns [`TokenKind::Error`].
pub struct Lexer<'a> {
    /// The input source text.
    input: &'a [u8],
    /// The current byte position.
    pos: usize,
    words: WordMode,
    /// Whether the last token produced was a number, so that `5-4`
    /// lexes as a subtraction.
    after_number: bool,
    error: Option<ParseError>,
}

const fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\n' | b'\t' | b'\r' | 0x0c | 0x0b)
}

const fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'@'
}

/// Bytes that end a word without joining it to what follows.
const fn is_separator(b: u8) -> bool {
    is_space(b) || matches!(b, b'(' | b')' | b',' | b'=' | b'<' | b'>' | b'!' | b'~')
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            words: WordMode::Keywords,
            after_number: false,
            error: None,
        }
    }

    /// Returns the input being tokenized.
    #[must_use]
    pub const fn input(&self) -> &'a [u8] {
        self.input
    }

    /// Returns the latched error, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// Removes and returns the latched error.
    pub fn take_error(&mut self) -> Option<ParseError> {
        self.error.take()
    }

    fn peek_at(&self, offset: usize) -> u8 {
        self.input.get(self.pos + offset).copied().unwrap_or(0)
    }

    /// Latches an error unless one is already set.
    fn fail(&mut self, offset: usize, length: usize, message: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(ParseError::lexical(self.input, offset, length, message));
        }
    }

    fn fail_token(&mut self, start: usize, length: usize, message: impl Into<String>) -> Token {
        self.fail(start, length, message);
        Token::new(TokenKind::Error, Span::new(start, start + length))
    }

    /// Creates a token spanning from `start` to the current position.
    const fn make_token(&self, kind: TokenKind, start: usize) -> Token {
        Token::new(kind, Span::new(start, self.pos))
    }

    fn skip_line(&mut self) {
        self.pos = self.input[self.pos..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(self.input.len(), |nl| self.pos + nl + 1);
    }

    /// Skips a possibly nested `/* ... */` comment starting at the
    /// current position. Returns false if it is unterminated.
    fn skip_block_comment(&mut self) -> bool {
        let input = self.input;
        let mut open = vec![self.pos];
        self.pos += 2;
        while let Some(&innermost) = open.last() {
            let rest = &input[self.pos..];
            let Some(p) = rest.iter().position(|&b| b == b'/' || b == b'*') else {
                self.pos = innermost;
                self.fail(innermost, 2, "unterminated comment");
                return false;
            };
            self.pos += p;
            match (rest[p], rest.get(p + 1)) {
                (b'*', Some(b'/')) => {
                    open.pop();
                    self.pos += 2;
                }
                (b'/', Some(b'*')) => {
                    open.push(self.pos);
                    self.pos += 2;
                }
                _ => self.pos += 1,
            }
        }
        true
    }

    /// Skips whitespace and comments.
    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&b) = self.input.get(self.pos) {
            match b {
                b if is_space(b) => {
                    self.words = WordMode::Keywords;
                    self.pos += 1;
                }
                b'#' => self.skip_line(),
                b'-' if self.peek_at(1) == b'-' => self.skip_line(),
                b'/' if self.peek_at(1) == b'*' => {
                    if !self.skip_block_comment() {
                        return;
                    }
                }
                b'*' if self.peek_at(1) == b'/' => {
                    self.fail(
                        self.pos,
                        2,
                        "unexpected \"/\" or end of multi-line comment",
                    );
                    return;
                }
                _ => return,
            }
        }
    }

    /// Scans a number-like run; validity is decided by the number parser.
    fn scan_number(&mut self, start: usize) -> Token {
        let input = self.input;
        let mut float = input[start] == b'.';
        let mut prev = input[start];
        self.pos = start + 1;
        while let Some(&b) = input.get(self.pos) {
            let continues = match b {
                b if is_space(b) => false,
                b'(' | b')' | b'[' | b']' | b'{' | b'}' | b'*' | b'/' | b'%' | b'&' | b'!'
                | b'^' | b'~' | b'|' | b',' => false,
                // only the sign of an exponent
                b'+' | b'-' => {
                    let sign = matches!(prev, b'e' | b'E');
                    float |= sign;
                    sign
                }
                b'.' => {
                    float = true;
                    true
                }
                _ => true,
            };
            if !continues {
                break;
            }
            prev = b;
            self.pos += 1;
        }

        let length = self.pos - start;
        let raw = &input[start..self.pos];
        let Ok(text) = std::str::from_utf8(raw) else {
            let text = String::from_utf8_lossy(raw).into_owned();
            return self.fail_token(start, length, format!("invalid number literal {text:?}"));
        };
        match number::parse_number(text, float) {
            Ok(kind) => self.make_token(kind, start),
            Err(NumberError::Invalid) => {
                self.fail_token(start, length, format!("invalid number literal {text:?}"))
            }
            Err(NumberError::OutOfRange) => self.fail_token(
                start,
                length,
                format!("text string {text:?} produces a number out-of-range"),
            ),
        }
    }

    /// Scans an identifier or keyword.
    fn scan_word(&mut self, start: usize) -> Token {
        let input = self.input;
        self.pos = start + 1;
        while input.get(self.pos).is_some_and(|&b| is_ident_char(b)) {
            self.pos += 1;
        }
        let word_end = match input.get(self.pos) {
            Some(&b) => is_separator(b),
            None => true,
        };
        let word = &input[start..self.pos];

        if self.words == WordMode::Keywords && word_end {
            match keywords::lookup(word) {
                Some(Terminal::Aggregate(op)) => {
                    return self.make_token(TokenKind::Aggregate(op), start);
                }
                Some(Terminal::Keyword(kw)) => {
                    let token = self.make_token(TokenKind::Keyword(kw), start);
                    if kw == Keyword::As {
                        // the alias that follows is always an identifier
                        self.skip_whitespace_and_comments();
                        self.words = WordMode::IdentifiersOnly;
                    }
                    return token;
                }
                None => {}
            }
        }
        if !word_end {
            self.words = WordMode::IdentifiersOnly;
        }
        let name = String::from_utf8_lossy(word).into_owned();
        self.make_token(TokenKind::Identifier(name), start)
    }

    /// Scans a `'string'` or `"identifier"` body. On success the
    /// position is past the closing quote.
    fn scan_quoted(&mut self, start: usize, quote: u8, unterminated: &str) -> Option<String> {
        let input = self.input;
        let body_start = start + 1;
        let mut escaped = false;
        let mut i = body_start;
        loop {
            match input.get(i) {
                None => {
                    self.fail(start, input.len() - start, unterminated);
                    return None;
                }
                Some(b'\\') => {
                    escaped = true;
                    i += 2;
                }
                Some(&b) if b == quote => break,
                Some(_) => i += 1,
            }
        }
        self.pos = i + 1;

        let body = &input[body_start..i];
        let text = if escaped {
            unescape(body)
        } else {
            std::str::from_utf8(body)
                .map(str::to_owned)
                .map_err(|_| "invalid UTF-8 sequence")
        };
        match text {
            Ok(text) => Some(text),
            Err(message) => {
                self.fail(start, self.pos - start, message);
                None
            }
        }
    }

    fn scan_string(&mut self, start: usize) -> Token {
        match self.scan_quoted(start, b'\'', "unterminated string literal") {
            Some(text) => self.make_token(TokenKind::String(text), start),
            None => Token::new(TokenKind::Error, Span::new(start, self.pos)),
        }
    }

    fn scan_quoted_identifier(&mut self, start: usize) -> Token {
        match self.scan_quoted(start, b'"', "unterminated quoted identifier") {
            Some(text) => self.make_token(TokenKind::Identifier(text), start),
            None => Token::new(TokenKind::Error, Span::new(start, self.pos)),
        }
    }

    /// Scans a backtick literal. Only timestamps are supported.
    fn scan_timestamp(&mut self, start: usize) -> Token {
        let input = self.input;
        let rest = &input[start + 1..];
        let Some(end) = rest.iter().position(|&b| b == b'`') else {
            return self.fail_token(
                start,
                rest.len(),
                "unterminated ion datum literal, missing '`'",
            );
        };
        match parse_timestamp(&rest[..end]) {
            Some(ts) => {
                self.pos = start + end + 2;
                self.make_token(TokenKind::Timestamp(ts), start)
            }
            None => {
                let literal = String::from_utf8_lossy(&input[start..start + end + 2]);
                let message = format!("couldn't parse ion literal {literal}");
                self.fail_token(start, end + 2, message)
            }
        }
    }

    fn scan_operator(&mut self, start: usize, b: u8) -> Token {
        let (kind, width) = match b {
            b'=' => (TokenKind::Eq, 1),
            b'!' if self.peek_at(1) == b'=' => (TokenKind::NotEq, 2),
            b'!' => (TokenKind::Keyword(Keyword::Not), 1),
            b'<' => match self.peek_at(1) {
                b'<' => (TokenKind::ShiftLeft, 2),
                b'=' => (TokenKind::LtEq, 2),
                b'>' => (TokenKind::NotEq, 2),
                _ => (TokenKind::Lt, 1),
            },
            b'>' => match (self.peek_at(1), self.peek_at(2)) {
                (b'>', b'>') => (TokenKind::ShiftRightLogical, 3),
                (b'>', _) => (TokenKind::ShiftRightArith, 2),
                (b'=', _) => (TokenKind::GtEq, 2),
                _ => (TokenKind::Gt, 1),
            },
            b'.' => {
                // `t.select` is a path
                self.words = WordMode::IdentifiersOnly;
                (TokenKind::Dot, 1)
            }
            b'|' if self.peek_at(1) == b'|' => (TokenKind::Concat, 2),
            b'+' if self.peek_at(1) == b'+' => (TokenKind::Append, 2),
            b'~' => match (self.peek_at(1), self.peek_at(2)) {
                (b'*', _) => (TokenKind::RegexMatchCi, 2),
                (b'~', b'*') => (TokenKind::Keyword(Keyword::Ilike), 3),
                (b'~', _) => (TokenKind::Keyword(Keyword::Like), 2),
                _ => (TokenKind::Tilde, 1),
            },
            _ => {
                let kind = match b {
                    b'|' => TokenKind::BitOr,
                    b'+' => TokenKind::Plus,
                    b',' => TokenKind::Comma,
                    b'*' => TokenKind::Star,
                    b'-' => TokenKind::Minus,
                    b'/' => TokenKind::Slash,
                    b'%' => TokenKind::Percent,
                    b':' => TokenKind::Colon,
                    b'&' => TokenKind::BitAnd,
                    b'^' => TokenKind::Caret,
                    b'[' => TokenKind::LeftBracket,
                    b']' => TokenKind::RightBracket,
                    b'(' => TokenKind::LeftParen,
                    b')' => TokenKind::RightParen,
                    b'{' => TokenKind::LeftBrace,
                    b'}' => TokenKind::RightBrace,
                    _ => return self.unexpected_character(start),
                };
                self.words = WordMode::Keywords;
                (kind, 1)
            }
        };
        self.pos = start + width;
        self.make_token(kind, start)
    }

    fn unexpected_character(&mut self, start: usize) -> Token {
        let end = (start + 4).min(self.input.len());
        let c = String::from_utf8_lossy(&self.input[start..end])
            .chars()
            .next()
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        self.fail_token(start, 1, format!("unexpected character {c:?}"))
    }

    fn scan(&mut self) -> Token {
        if self.error.is_none() {
            self.skip_whitespace_and_comments();
        }
        if self.error.is_some() {
            return Token::new(TokenKind::Error, Span::new(self.pos, self.pos));
        }

        let start = self.pos;
        let Some(&b) = self.input.get(start) else {
            return self.make_token(TokenKind::Eof, start);
        };
        let next = self.peek_at(1);

        if b.is_ascii_digit() || (b == b'.' && next.is_ascii_digit()) {
            return self.scan_number(start);
        }
        if b == b'-' && next.is_ascii_digit() {
            if self.after_number {
                self.words = WordMode::Keywords;
                self.pos += 1;
                return self.make_token(TokenKind::Minus, start);
            }
            return self.scan_number(start);
        }
        match b {
            b'\'' => self.scan_string(start),
            b'"' => self.scan_quoted_identifier(start),
            b'`' => self.scan_timestamp(start),
            b if is_ident_char(b) => self.scan_word(start),
            b => self.scan_operator(start, b),
        }
    }

    /// Scans the next token.
    pub fn next_token(&mut self) -> Token {
        let token = self.scan();
        self.after_number = token.is_number();
        token
    }

    /// Tokenizes the entire input, up to and including the EOF token.
    ///
    /// # Errors
    ///
    /// Returns the first lexical error.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            match token.kind {
                TokenKind::Error => {
                    let input = self.input;
                    return Err(self.take_error().unwrap_or_else(|| {
                        ParseError::lexical(input, token.span.start, 0, "invalid token")
                    }));
                }
                TokenKind::Eof => {
                    tokens.push(token);
                    return Ok(tokens);
                }
                _ => tokens.push(token),
            }
        }
    }
}

fn hex_digits(iter: &mut impl Iterator<Item = u8>, count: usize) -> Result<u32, &'static str> {
    let mut value = 0;
    for _ in 0..count {
        let digit = iter
            .next()
            .and_then(|b| char::from(b).to_digit(16))
            .ok_or("invalid escape sequence")?;
        value = value * 16 + digit;
    }
    Ok(value)
}

fn push_char(out: &mut Vec<u8>, code: u32) -> Result<(), &'static str> {
    let c = char::from_u32(code).ok_or("invalid escape sequence")?;
    let mut buf = [0; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
    Ok(())
}

/// Decodes backslash escapes in a quoted body.
fn unescape(body: &[u8]) -> Result<String, &'static str> {
    let mut out = Vec::with_capacity(body.len());
    let mut iter = body.iter().copied();
    while let Some(b) = iter.next() {
        if b != b'\\' {
            out.push(b);
            continue;
        }
        match iter.next().ok_or("invalid escape sequence")? {
            e @ (b'\\' | b'\'' | b'"' | b'/') => out.push(e),
            b'0' => out.push(0),
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'v' => out.push(0x0b),
            b'x' => {
                let byte = hex_digits(&mut iter, 2)?;
                out.push(u8::try_from(byte).map_err(|_| "invalid escape sequence")?);
            }
            b'u' => push_char(&mut out, hex_digits(&mut iter, 4)?)?,
            b'U' => push_char(&mut out, hex_digits(&mut iter, 8)?)?,
            _ => return Err("invalid escape sequence"),
        }
    }
    String::from_utf8(out).map_err(|_| "invalid UTF-8 sequence")
}

/// Parses an RFC 3339 timestamp or a bare `YYYY-MM-DD` date, truncated
/// to microseconds.
fn parse_timestamp(body: &[u8]) -> Option<DateTime<Utc>> {
    let text = std::str::from_utf8(body).ok()?;
    let ts = match DateTime::parse_from_rfc3339(text) {
        Ok(ts) => ts.with_timezone(&Utc),
        Err(_) => {
            let day = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
            Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0)?)
        }
    };
    Some(ts.trunc_subsecs(6))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AggregateOp;

    fn tokenize(input: &str) -> Vec<Token> {
        Lexer::new(input.as_bytes()).tokenize().unwrap()
    }

    fn token_kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).into_iter().map(|t| t.kind).collect()
    }

    fn lex_error(input: &str) -> ParseError {
        Lexer::new(input.as_bytes()).tokenize().unwrap_err()
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Identifier(String::from(name))
    }

    #[test]
    fn test_empty_input() {
        let tokens = tokenize("");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_eof());
    }

    #[test]
    fn test_whitespace_only() {
        assert_eq!(token_kinds("  \n\t\r\x0b\x0c "), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_line_comments() {
        assert_eq!(
            token_kinds("SELECT -- comment\nx # another\nFROM"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                ident("x"),
                TokenKind::Keyword(Keyword::From),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_nested_block_comments() {
        assert_eq!(
            token_kinds("SELECT /* a /* b */ c */ x"),
            vec![TokenKind::Keyword(Keyword::Select), ident("x"), TokenKind::Eof]
        );
    }

    #[test]
    fn test_unterminated_comment_points_at_innermost_open() {
        let err = lex_error("SELECT /* a /* b ");
        assert_eq!(err.message(), "unterminated comment");
        assert_eq!(err.offset(), 12);
        assert_eq!(err.length(), 2);
    }

    #[test]
    fn test_stray_comment_close() {
        let err = lex_error("SELECT */ x");
        assert_eq!(err.message(), "unexpected \"/\" or end of multi-line comment");
        assert_eq!(err.offset(), 7);
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(
            token_kinds("select FROM wHeRe"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Keyword(Keyword::From),
                TokenKind::Keyword(Keyword::Where),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_aggregates() {
        assert_eq!(
            token_kinds("count Every"),
            vec![
                TokenKind::Aggregate(AggregateOp::Count),
                TokenKind::Aggregate(AggregateOp::BoolAnd),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_word_after_as_is_identifier() {
        assert_eq!(
            token_kinds("x AS join"),
            vec![
                ident("x"),
                TokenKind::Keyword(Keyword::As),
                ident("join"),
                TokenKind::Eof,
            ]
        );
        // whitespace and comments between AS and the alias are skipped
        assert_eq!(
            token_kinds("AS /* c */ select")[1],
            ident("select")
        );
    }

    #[test]
    fn test_word_after_dot_is_identifier() {
        assert_eq!(
            token_kinds("t.select"),
            vec![ident("t"), TokenKind::Dot, ident("select"), TokenKind::Eof]
        );
    }

    #[test]
    fn test_word_is_not_split() {
        assert_eq!(token_kinds("outerx"), vec![ident("outerx"), TokenKind::Eof]);
        assert_eq!(token_kinds("selected"), vec![ident("selected"), TokenKind::Eof]);
    }

    #[test]
    fn test_aggregate_after_operator() {
        assert_eq!(
            token_kinds("col+COUNT(x)"),
            vec![
                ident("col"),
                TokenKind::Plus,
                TokenKind::Aggregate(AggregateOp::Count),
                TokenKind::LeftParen,
                ident("x"),
                TokenKind::RightParen,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            token_kinds("col~COUNT")[2],
            TokenKind::Aggregate(AggregateOp::Count)
        );
    }

    #[test]
    fn test_identifier_characters() {
        assert_eq!(
            token_kinds("@timestamp _x a1_b"),
            vec![ident("@timestamp"), ident("_x"), ident("a1_b"), TokenKind::Eof]
        );
    }

    #[test]
    fn test_quoted_identifiers() {
        assert_eq!(
            token_kinds(r#""column name" "a\"b""#),
            vec![ident("column name"), ident("a\"b"), TokenKind::Eof]
        );
    }

    #[test]
    fn test_integers() {
        assert_eq!(
            token_kinds("42 0 0xcafe 0b11"),
            vec![
                TokenKind::Integer(42),
                TokenKind::Integer(0),
                TokenKind::Integer(51966),
                TokenKind::Integer(3),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_floats() {
        assert_eq!(
            token_kinds("-4e-2 3.25 .5 1e+19"),
            vec![
                TokenKind::Float(-0.04),
                TokenKind::Float(3.25),
                TokenKind::Float(0.5),
                TokenKind::Float(1e19),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_minus_after_number_is_an_operator() {
        assert_eq!(
            token_kinds("5-4"),
            vec![
                TokenKind::Integer(5),
                TokenKind::Minus,
                TokenKind::Integer(4),
                TokenKind::Eof,
            ]
        );
        // after anything else it is a sign
        assert_eq!(
            token_kinds("x-1"),
            vec![ident("x"), TokenKind::Integer(-1), TokenKind::Eof]
        );
    }

    #[test]
    fn test_number_stops_at_operators() {
        assert_eq!(
            token_kinds("[1,2]"),
            vec![
                TokenKind::LeftBracket,
                TokenKind::Integer(1),
                TokenKind::Comma,
                TokenKind::Integer(2),
                TokenKind::RightBracket,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_invalid_numbers() {
        let err = lex_error("SELECT 1abc");
        assert_eq!(err.message(), "invalid number literal \"1abc\"");
        assert_eq!((err.offset(), err.length()), (7, 4));

        let err = lex_error("SELECT 1e400");
        assert_eq!(
            err.message(),
            "text string \"1e400\" produces a number out-of-range"
        );

        // a second dot is not a path
        assert!(lex_error("SELECT 3.4.x").message().contains("invalid number"));
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            token_kinds(r"'hello' 'it\'s' 'a\nb' '␈' '\x41'"),
            vec![
                TokenKind::String(String::from("hello")),
                TokenKind::String(String::from("it's")),
                TokenKind::String(String::from("a\nb")),
                TokenKind::String(String::from("\u{2408}")),
                TokenKind::String(String::from("A")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_errors() {
        assert_eq!(lex_error("'abc").message(), "unterminated string literal");
        assert_eq!(lex_error("\"abc").message(), "unterminated quoted identifier");
        assert_eq!(lex_error(r"'\q'").message(), "invalid escape sequence");
        assert_eq!(lex_error(r"'\u12'").message(), "invalid escape sequence");
    }

    #[test]
    fn test_timestamps() {
        let tokens = token_kinds("`2021-01-02T03:04:05.123456789+01:00` `2021-01-02`");
        let TokenKind::Timestamp(ts) = &tokens[0] else {
            panic!("expected a timestamp, got {:?}", tokens[0]);
        };
        assert_eq!(ts.to_rfc3339(), "2021-01-02T02:04:05.123456+00:00");
        let TokenKind::Timestamp(day) = &tokens[1] else {
            panic!("expected a timestamp, got {:?}", tokens[1]);
        };
        assert_eq!(day.to_rfc3339(), "2021-01-02T00:00:00+00:00");
    }

    #[test]
    fn test_timestamp_errors() {
        let err = lex_error("x = `2021-01");
        assert_eq!(err.message(), "unterminated ion datum literal, missing '`'");
        assert_eq!((err.offset(), err.length()), (4, 7));

        let err = lex_error("x = `{a: 1}`");
        assert_eq!(err.message(), "couldn't parse ion literal `{a: 1}`");
        assert_eq!(err.length(), 8);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            token_kinds("= != <> ! < <= << > >= >> >>> || ++ | + ~ ~* ~~ ~~* & ^ % / :"),
            vec![
                TokenKind::Eq,
                TokenKind::NotEq,
                TokenKind::NotEq,
                TokenKind::Keyword(Keyword::Not),
                TokenKind::Lt,
                TokenKind::LtEq,
                TokenKind::ShiftLeft,
                TokenKind::Gt,
                TokenKind::GtEq,
                TokenKind::ShiftRightArith,
                TokenKind::ShiftRightLogical,
                TokenKind::Concat,
                TokenKind::Append,
                TokenKind::BitOr,
                TokenKind::Plus,
                TokenKind::Tilde,
                TokenKind::RegexMatchCi,
                TokenKind::Keyword(Keyword::Like),
                TokenKind::Keyword(Keyword::Ilike),
                TokenKind::BitAnd,
                TokenKind::Caret,
                TokenKind::Percent,
                TokenKind::Slash,
                TokenKind::Colon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unexpected_character() {
        let err = lex_error("SELECT $");
        assert_eq!(err.message(), "unexpected character '$'");
        assert_eq!((err.offset(), err.length()), (7, 1));
    }

    #[test]
    fn test_error_is_latched() {
        let mut lexer = Lexer::new(b"x $ y");
        assert_eq!(lexer.next_token().kind, ident("x"));
        assert_eq!(lexer.next_token().kind, TokenKind::Error);
        assert_eq!(lexer.next_token().kind, TokenKind::Error);
        assert_eq!(lexer.error().map(ParseError::offset), Some(2));
    }

    #[test]
    fn test_span_tracking() {
        let tokens = tokenize("SELECT id");
        assert_eq!(tokens[0].span, Span::new(0, 6));
        assert_eq!(tokens[1].span, Span::new(7, 9));
    }

    #[test]
    fn test_invalid_utf8_does_not_panic() {
        let mut lexer = Lexer::new(b"'\xff\xfe' \xc3");
        assert!(lexer.tokenize().is_err());
    }
}
