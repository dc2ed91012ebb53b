//! Recursive descent parser with precedence climbing for expressions.

use super::builders::{self, AggregateArgs, DateFn, TrimKind};
use super::pool::ParserState;
use super::pratt::{infix_operator, prefix_operator, Infix, Prefix};
use super::ParseError;
use crate::ast::{
    AggregateOp, Binding, CaseLimb, Cte, DateFunc, Distinct, ExplainFormat, Expr, FromClause,
    IsKey, Join, JoinKind, Literal, MatchOp, NullOrdering, OrderBy, OrderDirection, Precedence,
    Query, Select, StructField, UnaryOp, Union, UnionKind, Unpivot, Window,
};
use crate::lexer::{Keyword, Lexer, Token, TokenKind};

/// Deepest expression nesting accepted.
const MAX_NESTING: usize = 64;

/// Tallest tree accepted. Unlike [`MAX_NESTING`] this also counts every
/// link of a left-deep chain (`a + b + ...`, `a.b.c`, joins, unions),
/// since dropping and rendering a tree recurse once per level.
const MAX_HEIGHT: usize = 400;

/// Query parser.
///
/// Holds the lexer and one token of lookahead. Per-parse scratch data
/// (CTEs, the INTO target, the memoized clock) lives in a borrowed
/// [`ParserState`].
pub struct Parser<'a, 's> {
    lexer: Lexer<'a>,
    current: Token,
    state: &'s mut ParserState,
    depth: usize,
    height: usize,
    tokens: usize,
}

impl<'a, 's> Parser<'a, 's> {
    /// Creates a parser over `input` using `state` for scratch data.
    pub fn new(input: &'a [u8], state: &'s mut ParserState) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            state,
            depth: 0,
            height: 0,
            tokens: 1,
        }
    }

    /// Number of tokens read so far.
    #[must_use]
    pub const fn tokens(&self) -> usize {
        self.tokens
    }

    fn input(&self) -> &'a [u8] {
        self.lexer.input()
    }

    /// Moves to the next token and returns the previous one.
    fn advance(&mut self) -> Token {
        self.tokens += 1;
        let next = self.lexer.next_token();
        std::mem::replace(&mut self.current, next)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.current.kind == kind
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current.kind == TokenKind::Keyword(keyword)
    }

    /// Whether the current token is the plain word `word`, for words
    /// that are only special in one place (`OUTER`, `FULL`).
    fn check_word(&self, word: &str) -> bool {
        matches!(&self.current.kind, TokenKind::Identifier(id) if id.eq_ignore_ascii_case(word))
    }

    fn consume(&mut self, kind: &TokenKind) -> bool {
        let found = self.check(kind);
        if found {
            self.advance();
        }
        found
    }

    fn consume_keyword(&mut self, keyword: Keyword) -> bool {
        let found = self.check_keyword(keyword);
        if found {
            self.advance();
        }
        found
    }

    /// Error for the current token. A lexical error, if one is latched,
    /// takes its place.
    fn error(&mut self, expected: &str) -> ParseError {
        if self.current.kind == TokenKind::Error {
            if let Some(err) = self.lexer.take_error() {
                return err;
            }
        }
        ParseError::unexpected(self.input(), &self.current, expected)
    }

    fn semantic(&self, start: usize, message: impl Into<String>) -> ParseError {
        ParseError::semantic(self.input(), start, message)
    }

    fn too_deep(&self) -> ParseError {
        self.semantic(self.current.span.start, "expression nested too deeply")
    }

    /// Accounts for `levels` more tree levels above the node being built.
    /// Callers that grow in a loop restore `height` once the chain ends.
    fn grow(&mut self, levels: usize) -> Result<(), ParseError> {
        self.height = self.height.saturating_add(levels);
        if self.height > MAX_HEIGHT {
            return Err(self.too_deep());
        }
        Ok(())
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(&kind.describe()))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), ParseError> {
        if self.consume_keyword(keyword) {
            Ok(())
        } else {
            Err(self.error(keyword.as_str()))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let TokenKind::Identifier(name) = &mut self.current.kind {
            let name = std::mem::take(name);
            self.advance();
            return Ok(name);
        }
        Err(self.error("ID"))
    }

    fn expect_string(&mut self) -> Result<String, ParseError> {
        if let TokenKind::String(value) = &mut self.current.kind {
            let value = std::mem::take(value);
            self.advance();
            return Ok(value);
        }
        Err(self.error("STRING"))
    }

    // ===================================================================
    // Query level
    // ===================================================================

    /// Parses a complete query and requires the input to end after it.
    pub fn parse_query(&mut self) -> Result<Query, ParseError> {
        let explain = self.parse_explain()?;
        if self.consume_keyword(Keyword::With) {
            self.parse_ctes()?;
        }
        let body = self.parse_select_body(true)?;
        if !self.current.is_eof() {
            return Err(self.error("end of input"));
        }
        Ok(Query {
            explain,
            with: std::mem::take(&mut self.state.with),
            into: self.state.into.take(),
            body,
        })
    }

    fn parse_explain(&mut self) -> Result<ExplainFormat, ParseError> {
        if !self.consume_keyword(Keyword::Explain) {
            return Ok(ExplainFormat::None);
        }
        if !self.consume_keyword(Keyword::As) {
            return Ok(ExplainFormat::Default);
        }
        let start = self.current.span.start;
        let name = self.expect_identifier()?;
        builders::explain_format(&name).map_err(|m| self.semantic(start, m))
    }

    fn parse_ctes(&mut self) -> Result<(), ParseError> {
        loop {
            let name = self.expect_identifier()?;
            self.expect_keyword(Keyword::As)?;
            self.expect(&TokenKind::LeftParen)?;
            let select = self.parse_select(false)?;
            self.expect(&TokenKind::RightParen)?;
            self.state.with.push(Cte { name, select });
            if !self.consume(&TokenKind::Comma) {
                return Ok(());
            }
        }
    }

    /// Parses `SELECT ... [UNION [ALL] SELECT ...]*` into a left-deep
    /// union tree.
    fn parse_select_body(&mut self, outermost: bool) -> Result<Expr, ParseError> {
        let base = self.height;
        let body = self.parse_unions(outermost);
        self.height = base;
        body
    }

    fn parse_unions(&mut self, outermost: bool) -> Result<Expr, ParseError> {
        let mut body = Expr::Select(Box::new(self.parse_select(outermost)?));
        while self.consume_keyword(Keyword::Union) {
            self.grow(1)?;
            let kind = if self.consume_keyword(Keyword::All) {
                UnionKind::All
            } else {
                UnionKind::Distinct
            };
            let right = Expr::Select(Box::new(self.parse_select(false)?));
            body = Expr::Union(Box::new(Union {
                kind,
                left: body,
                right,
            }));
        }
        Ok(body)
    }

    // ===================================================================
    // SELECT
    // ===================================================================

    /// Parses one SELECT block. `allow_into` is set only for the first
    /// SELECT of the query.
    fn parse_select(&mut self, allow_into: bool) -> Result<Select, ParseError> {
        self.expect_keyword(Keyword::Select)?;
        let distinct = self.parse_distinct()?;
        let columns = if self.consume(&TokenKind::Star) {
            vec![Binding::new(Expr::Star)]
        } else {
            self.parse_bindings()?
        };

        if allow_into && self.consume_keyword(Keyword::Into) {
            let target = self.parse_expr(Precedence::Postfix)?;
            self.state.into = Some(target);
        }

        let from = if self.consume_keyword(Keyword::From) {
            Some(self.parse_from()?)
        } else {
            None
        };

        let where_clause = if self.consume_keyword(Keyword::Where) {
            Some(self.parse_expr(Precedence::Lowest)?)
        } else {
            None
        };

        let group_by = if self.consume_keyword(Keyword::Group) {
            self.expect_keyword(Keyword::By)?;
            self.parse_bindings()?
        } else {
            vec![]
        };

        let having = if self.consume_keyword(Keyword::Having) {
            Some(self.parse_expr(Precedence::Lowest)?)
        } else {
            None
        };

        let order_by = if self.consume_keyword(Keyword::Order) {
            self.expect_keyword(Keyword::By)?;
            self.parse_order_by()?
        } else {
            vec![]
        };

        let limit = if self.consume_keyword(Keyword::Limit) {
            Some(self.parse_count("LIMIT")?)
        } else {
            None
        };

        let offset = if self.consume_keyword(Keyword::Offset) {
            Some(self.parse_count("OFFSET")?)
        } else {
            None
        };

        Ok(Select {
            distinct,
            columns,
            from,
            where_clause,
            group_by,
            having,
            order_by,
            limit,
            offset,
        })
    }

    fn parse_distinct(&mut self) -> Result<Distinct, ParseError> {
        let capture = if !self.consume_keyword(Keyword::Distinct) {
            None
        } else if self.consume_keyword(Keyword::On) {
            self.expect(&TokenKind::LeftParen)?;
            let exprs = self.parse_expr_list()?;
            self.expect(&TokenKind::RightParen)?;
            Some(exprs)
        } else {
            Some(vec![])
        };
        Ok(builders::distinct(capture))
    }

    /// Parses `expr [AS name], ...`.
    fn parse_bindings(&mut self) -> Result<Vec<Binding>, ParseError> {
        let mut bindings = vec![];
        loop {
            let expr = self.parse_expr(Precedence::Lowest)?;
            let alias = self.parse_alias()?;
            bindings.push(Binding { expr, alias });
            if !self.consume(&TokenKind::Comma) {
                return Ok(bindings);
            }
        }
    }

    fn parse_alias(&mut self) -> Result<Option<String>, ParseError> {
        if self.consume_keyword(Keyword::As) {
            Ok(Some(self.expect_identifier()?))
        } else {
            Ok(None)
        }
    }

    /// Parses a LIMIT or OFFSET count.
    fn parse_count(&mut self, clause: &str) -> Result<i64, ParseError> {
        match self.current.kind {
            TokenKind::Integer(n) if n < 0 => Err(self.semantic(
                self.current.span.start,
                format!("{clause} must be non-negative"),
            )),
            TokenKind::Integer(n) => {
                self.advance();
                Ok(n)
            }
            _ => Err(self.error("NUMBER")),
        }
    }

    fn parse_order_by(&mut self) -> Result<Vec<OrderBy>, ParseError> {
        let mut items = vec![];
        loop {
            let column = self.parse_expr(Precedence::Lowest)?;
            let direction = if self.consume_keyword(Keyword::Desc) {
                OrderDirection::Desc
            } else {
                self.consume_keyword(Keyword::Asc);
                OrderDirection::Asc
            };
            let nulls = if !self.consume_keyword(Keyword::Nulls) {
                NullOrdering::First
            } else if self.consume_keyword(Keyword::First) {
                NullOrdering::First
            } else if self.consume_keyword(Keyword::Last) {
                NullOrdering::Last
            } else {
                return Err(self.error("FIRST or LAST"));
            };
            items.push(OrderBy {
                column,
                direction,
                nulls,
            });
            if !self.consume(&TokenKind::Comma) {
                return Ok(items);
            }
        }
    }

    // ===================================================================
    // FROM
    // ===================================================================

    fn parse_from(&mut self) -> Result<FromClause, ParseError> {
        let base = self.height;
        let from = self.parse_joins();
        self.height = base;
        from
    }

    fn parse_joins(&mut self) -> Result<FromClause, ParseError> {
        let mut from = FromClause::Table(self.parse_from_item()?);
        while let Some(kind) = self.parse_join_kind()? {
            self.grow(1)?;
            let right = self.parse_from_item()?;
            let on = if kind == JoinKind::Cross {
                None
            } else {
                self.expect_keyword(Keyword::On)?;
                Some(self.parse_expr(Precedence::Lowest)?)
            };
            from = FromClause::Join(Box::new(Join {
                kind,
                left: from,
                right,
                on,
            }));
        }
        Ok(from)
    }

    /// Consumes a join operator, if one follows.
    fn parse_join_kind(&mut self) -> Result<Option<JoinKind>, ParseError> {
        let kind = if self.consume(&TokenKind::Comma) {
            return Ok(Some(JoinKind::Cross));
        } else if self.consume_keyword(Keyword::Join) {
            return Ok(Some(JoinKind::Inner));
        } else if self.consume_keyword(Keyword::Cross) {
            JoinKind::Cross
        } else if self.consume_keyword(Keyword::Inner) {
            JoinKind::Inner
        } else if self.consume_keyword(Keyword::Left) {
            JoinKind::Left
        } else if self.consume_keyword(Keyword::Right) {
            JoinKind::Right
        } else if self.check_word("FULL") {
            self.advance();
            JoinKind::Full
        } else {
            return Ok(None);
        };
        if matches!(kind, JoinKind::Left | JoinKind::Right | JoinKind::Full)
            && self.check_word("OUTER")
        {
            self.advance();
        }
        self.expect_keyword(Keyword::Join)?;
        Ok(Some(kind))
    }

    fn parse_from_item(&mut self) -> Result<Binding, ParseError> {
        if self.check_keyword(Keyword::Unpivot) {
            return Ok(Binding::new(self.parse_unpivot()?));
        }
        let expr = self.parse_expr(Precedence::Concat)?;
        let alias = self.parse_alias()?;
        Ok(Binding { expr, alias })
    }

    fn parse_unpivot(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword(Keyword::Unpivot)?;
        let source = self.parse_expr(Precedence::Concat)?;
        let mut unpivot = Unpivot {
            source,
            as_alias: None,
            at_alias: None,
        };
        loop {
            let start = self.current.span.start;
            if self.consume_keyword(Keyword::As) {
                let name = self.expect_identifier()?;
                if unpivot.as_alias.replace(name).is_some() {
                    return Err(self.semantic(start, "UNPIVOT: duplicate AS"));
                }
            } else if self.consume_keyword(Keyword::At) {
                let name = self.expect_identifier()?;
                if unpivot.at_alias.replace(name).is_some() {
                    return Err(self.semantic(start, "UNPIVOT: duplicate AT"));
                }
            } else {
                return Ok(Expr::Unpivot(Box::new(unpivot)));
            }
        }
    }

    // ===================================================================
    // Expressions
    // ===================================================================

    fn parse_expr_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![self.parse_expr(Precedence::Lowest)?];
        while self.consume(&TokenKind::Comma) {
            exprs.push(self.parse_expr(Precedence::Lowest)?);
        }
        Ok(exprs)
    }

    /// Parses an expression whose operators all bind at least as tightly
    /// as `min`.
    fn parse_expr(&mut self, min: Precedence) -> Result<Expr, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(self.too_deep());
        }
        let base = self.height;
        self.depth += 1;
        let result = self
            .grow(1)
            .and_then(|()| self.parse_prefix())
            .and_then(|lhs| self.parse_infix_chain(lhs, min));
        self.depth -= 1;
        self.height = base;
        result
    }

    fn parse_infix_chain(&mut self, mut lhs: Expr, min: Precedence) -> Result<Expr, ParseError> {
        loop {
            // `x-1` lexes as `x` followed by the literal `-1`
            if let Some(magnitude) = self.split_negative_literal() {
                if Precedence::Additive < min {
                    break;
                }
                self.grow(1)?;
                self.advance();
                let rhs =
                    self.parse_infix_chain(Expr::Literal(magnitude), Precedence::Additive.next())?;
                lhs = builders::subtract(lhs, rhs);
                continue;
            }

            let Some((op, prec)) = infix_operator(&self.current.kind) else {
                break;
            };
            if prec < min {
                break;
            }
            self.grow(1)?;
            lhs = self.parse_infix(lhs, op, prec)?;
        }
        Ok(lhs)
    }

    fn split_negative_literal(&self) -> Option<Literal> {
        if !self.current.is_number() || self.input().get(self.current.span.start) != Some(&b'-') {
            return None;
        }
        builders::magnitude(&self.current.kind)
    }

    /// Applies the infix operator at the current token to `lhs`.
    fn parse_infix(&mut self, lhs: Expr, op: Infix, prec: Precedence) -> Result<Expr, ParseError> {
        self.advance();
        match op {
            Infix::Logical(op) => {
                let rhs = self.parse_expr(prec.next())?;
                Ok(Expr::Logical {
                    op,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                })
            }
            Infix::Compare(op) => {
                let rhs = self.parse_expr(Precedence::Predicate)?;
                Ok(lhs.compare(op, rhs))
            }
            Infix::Arith(op) => {
                let rhs = self.parse_expr(prec.next())?;
                Ok(lhs.arith(op, rhs))
            }
            Infix::Concat => {
                let rhs = self.parse_expr(prec.next())?;
                Ok(builders::concat(lhs, rhs))
            }
            Infix::Append => {
                let mut parts = vec![lhs, self.parse_expr(prec.next())?];
                while self.consume(&TokenKind::Append) {
                    parts.push(self.parse_expr(prec.next())?);
                }
                Ok(Expr::Appended(parts))
            }
            Infix::Match(op) => {
                if op == MatchOp::SimilarTo {
                    self.expect_keyword(Keyword::To)?;
                }
                let pattern = self.expect_string()?;
                let escape = if self.consume_keyword(Keyword::Escape) {
                    Some(self.expect_string()?)
                } else {
                    None
                };
                Ok(Expr::Match {
                    op,
                    expr: Box::new(lhs),
                    pattern,
                    escape,
                })
            }
            Infix::Is => self.parse_is(lhs),
            Infix::In => self.parse_in(lhs),
            Infix::Between => {
                let low = self.parse_expr(Precedence::Predicate.next())?;
                self.expect_keyword(Keyword::And)?;
                let high = self.parse_expr(Precedence::Predicate.next())?;
                Ok(builders::between(lhs, low, high))
            }
            Infix::Not => match infix_operator(&self.current.kind) {
                Some((inner @ (Infix::Match(_) | Infix::In | Infix::Between), _)) => {
                    Ok(self.parse_infix(lhs, inner, prec)?.not())
                }
                _ => Err(self.error("IN, BETWEEN, LIKE, ILIKE or SIMILAR")),
            },
        }
    }

    fn parse_is(&mut self, lhs: Expr) -> Result<Expr, ParseError> {
        let negated = self.consume_keyword(Keyword::Not);
        let key = match self.current.kind {
            TokenKind::Keyword(Keyword::Null) => IsKey::Null,
            TokenKind::Keyword(Keyword::Missing) => IsKey::Missing,
            TokenKind::Keyword(Keyword::True) => IsKey::True,
            TokenKind::Keyword(Keyword::False) => IsKey::False,
            _ => return Err(self.error("NULL, MISSING, TRUE or FALSE")),
        };
        self.advance();
        Ok(lhs.is(if negated { key.negate() } else { key }))
    }

    fn parse_in(&mut self, lhs: Expr) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        if self.check_keyword(Keyword::Select) {
            let select = self.parse_select(false)?;
            self.expect(&TokenKind::RightParen)?;
            return Ok(Expr::InSubquery {
                expr: Box::new(lhs),
                select: Box::new(select),
            });
        }
        let values = self.parse_expr_list()?;
        self.expect(&TokenKind::RightParen)?;
        self.grow(builders::membership_chain_len(&values))?;
        Ok(builders::membership(lhs, values))
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        if let Some((op, prec)) = prefix_operator(&self.current.kind) {
            self.advance();
            let operand = self.parse_expr(prec)?;
            return Ok(match op {
                Prefix::Not => operand.not(),
                Prefix::Neg => Expr::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                },
                Prefix::BitNot => Expr::Unary {
                    op: UnaryOp::BitNot,
                    operand: Box::new(operand),
                },
            });
        }
        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    /// Parses `.field`, `[index]` and `['field']` suffixes.
    fn parse_postfix(&mut self, mut expr: Expr) -> Result<Expr, ParseError> {
        loop {
            if matches!(self.current.kind, TokenKind::Dot | TokenKind::LeftBracket) {
                self.grow(1)?;
            }
            if self.consume(&TokenKind::Dot) {
                let field = self.expect_identifier()?;
                expr = expr.dot(field);
            } else if self.consume(&TokenKind::LeftBracket) {
                let start = self.current.span.start;
                if let TokenKind::String(key) = &mut self.current.kind {
                    let key = std::mem::take(key);
                    self.advance();
                    expr = expr.dot(key);
                } else if let Some(lit) = builders::number_literal(&self.current.kind) {
                    let offset = builders::to_index(&lit).map_err(|m| self.semantic(start, m))?;
                    self.advance();
                    expr = expr.index(offset);
                } else {
                    return Err(self.error("NUMBER or STRING"));
                }
                self.expect(&TokenKind::RightBracket)?;
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        let literal = match &mut self.current.kind {
            TokenKind::String(s) => Some(Literal::String(std::mem::take(s))),
            TokenKind::Timestamp(ts) => Some(Literal::Timestamp(*ts)),
            TokenKind::Keyword(Keyword::Null) => Some(Literal::Null),
            TokenKind::Keyword(Keyword::Missing) => Some(Literal::Missing),
            TokenKind::Keyword(Keyword::True) => Some(Literal::Bool(true)),
            TokenKind::Keyword(Keyword::False) => Some(Literal::Bool(false)),
            kind => builders::number_literal(kind),
        };
        if let Some(lit) = literal {
            self.advance();
            return Ok(Expr::Literal(lit));
        }

        match self.current.kind {
            TokenKind::Identifier(_) => self.parse_identifier_expr(),
            TokenKind::Aggregate(op) => {
                self.advance();
                self.parse_aggregate(op, start)
            }
            TokenKind::LeftParen => self.parse_parenthesized(),
            TokenKind::LeftBracket => self.parse_list(),
            TokenKind::LeftBrace => self.parse_struct(),
            TokenKind::Keyword(keyword) => self.parse_keyword_expr(keyword, start),
            _ => Err(self.error("expression")),
        }
    }

    fn parse_keyword_expr(&mut self, keyword: Keyword, start: usize) -> Result<Expr, ParseError> {
        match keyword {
            Keyword::Case => self.parse_case(),
            Keyword::Cast => self.parse_cast(),
            Keyword::DateAdd => self.parse_date_function(DateFn::Add),
            Keyword::DateDiff => self.parse_date_function(DateFn::Diff),
            Keyword::DateTrunc => self.parse_date_function(DateFn::Trunc),
            Keyword::Extract => self.parse_date_function(DateFn::Extract),
            Keyword::Trim => self.parse_trim(),
            Keyword::Coalesce => {
                let args = self.parse_call_args(1)?;
                Ok(builders::coalesce(args))
            }
            Keyword::Nullif => {
                let mut args = self.parse_call_args(2)?.into_iter();
                match (args.next(), args.next(), args.next()) {
                    (Some(a), Some(b), None) => Ok(builders::nullif(a, b)),
                    _ => Err(self.semantic(start, "NULLIF accepts exactly 2 arguments")),
                }
            }
            Keyword::Concat => {
                let args = self.parse_call_args(2)?;
                self.grow(args.len())?;
                let mut args = args.into_iter();
                let first = args.next().unwrap_or_else(Expr::null);
                Ok(args.fold(first, builders::concat))
            }
            Keyword::Exists => {
                self.advance();
                self.expect(&TokenKind::LeftParen)?;
                if !self.check_keyword(Keyword::Select) {
                    return Err(self.error("SELECT"));
                }
                let select = self.parse_select(false)?;
                self.expect(&TokenKind::RightParen)?;
                Ok(builders::exists(select))
            }
            Keyword::Utcnow => {
                self.advance();
                self.expect(&TokenKind::LeftParen)?;
                self.expect(&TokenKind::RightParen)?;
                Ok(Expr::Literal(Literal::Timestamp(self.state.now())))
            }
            _ => Err(self.error("expression")),
        }
    }

    /// Parses `KEYWORD(e, ...)` with at least `min` arguments.
    fn parse_call_args(&mut self, min: usize) -> Result<Vec<Expr>, ParseError> {
        self.advance();
        self.expect(&TokenKind::LeftParen)?;
        let mut args = vec![self.parse_expr(Precedence::Lowest)?];
        while args.len() < min || self.check(&TokenKind::Comma) {
            self.expect(&TokenKind::Comma)?;
            args.push(self.parse_expr(Precedence::Lowest)?);
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(args)
    }

    /// A path root or a call of a plain builtin or table function.
    fn parse_identifier_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        let name = self.expect_identifier()?;
        if !self.check(&TokenKind::LeftParen) {
            return Ok(Expr::Ident(name));
        }

        let name = name.to_ascii_uppercase();
        if name == AggregateOp::ApproxPercentile.as_str() {
            return self.parse_aggregate(AggregateOp::ApproxPercentile, start);
        }
        builders::check_builtin(&name).map_err(|m| self.semantic(start, m))?;

        self.advance();
        let args = if self.check(&TokenKind::RightParen) {
            vec![]
        } else {
            self.parse_expr_list()?
        };
        self.expect(&TokenKind::RightParen)?;
        Ok(Expr::call(name, args))
    }

    /// `( expr )`, or a sub-query.
    fn parse_parenthesized(&mut self) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let expr = if self.check_keyword(Keyword::Select) {
            self.parse_select_body(false)?
        } else {
            self.parse_expr(Precedence::Lowest)?
        };
        self.expect(&TokenKind::RightParen)?;
        Ok(expr)
    }

    fn parse_list(&mut self) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftBracket)?;
        let items = if self.check(&TokenKind::RightBracket) {
            vec![]
        } else {
            self.parse_expr_list()?
        };
        self.expect(&TokenKind::RightBracket)?;
        Ok(Expr::List(items))
    }

    fn parse_struct(&mut self) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftBrace)?;
        let mut fields = vec![];
        if !self.check(&TokenKind::RightBrace) {
            loop {
                let key = self.expect_string()?;
                self.expect(&TokenKind::Colon)?;
                let value = self.parse_expr(Precedence::Lowest)?;
                fields.push(StructField { key, value });
                if !self.consume(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RightBrace)?;
        Ok(Expr::Struct(fields))
    }

    fn parse_case(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword(Keyword::Case)?;
        let operand = if self.check_keyword(Keyword::When) {
            None
        } else {
            Some(self.parse_expr(Precedence::Lowest)?)
        };

        let mut limbs = vec![];
        while self.consume_keyword(Keyword::When) {
            let when = self.parse_expr(Precedence::Lowest)?;
            self.expect_keyword(Keyword::Then)?;
            let then = self.parse_expr(Precedence::Lowest)?;
            limbs.push(CaseLimb { when, then });
        }
        if limbs.is_empty() {
            return Err(self.error("WHEN"));
        }

        let otherwise = if self.consume_keyword(Keyword::Else) {
            Some(self.parse_expr(Precedence::Lowest)?)
        } else {
            None
        };
        self.expect_keyword(Keyword::End)?;
        Ok(builders::case(operand, limbs, otherwise))
    }

    fn parse_cast(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword(Keyword::Cast)?;
        self.expect(&TokenKind::LeftParen)?;
        let expr = self.parse_expr(Precedence::Lowest)?;
        self.expect_keyword(Keyword::As)?;
        // the lexer never treats the word after AS as a keyword, so type
        // names like NULL and MISSING arrive as identifiers
        let start = self.current.span.start;
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::RightParen)?;
        builders::cast(expr, &name).map_err(|m| self.semantic(start, m))
    }

    fn parse_date_function(&mut self, func: DateFn) -> Result<Expr, ParseError> {
        self.advance();
        self.expect(&TokenKind::LeftParen)?;

        let part_start = self.current.span.start;
        let part = self.expect_identifier()?;
        let date_func = if func == DateFn::Trunc
            && part.eq_ignore_ascii_case("WEEK")
            && self.consume(&TokenKind::LeftParen)
        {
            let day_start = self.current.span.start;
            let day = self.expect_identifier()?;
            self.expect(&TokenKind::RightParen)?;
            DateFunc::TruncWeek(
                builders::weekday(&day).map_err(|m| self.semantic(day_start, m))?,
            )
        } else {
            builders::date_func(func, &part).map_err(|m| self.semantic(part_start, m))?
        };

        if func == DateFn::Extract {
            self.expect_keyword(Keyword::From)?;
        } else {
            self.expect(&TokenKind::Comma)?;
        }
        let mut args = vec![self.parse_expr(Precedence::Lowest)?];
        while args.len() < func.arity() {
            self.expect(&TokenKind::Comma)?;
            args.push(self.parse_expr(Precedence::Lowest)?);
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(Expr::Date {
            func: date_func,
            args,
        })
    }

    /// `TRIM(x)`, `TRIM(x, chars)`, `TRIM(chars FROM x)` and
    /// `TRIM(LEADING|TRAILING|BOTH [chars] FROM x)`.
    fn parse_trim(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword(Keyword::Trim)?;
        self.expect(&TokenKind::LeftParen)?;

        let side = if self.consume_keyword(Keyword::Leading) {
            Some(TrimKind::Leading)
        } else if self.consume_keyword(Keyword::Trailing) {
            Some(TrimKind::Trailing)
        } else if self.consume_keyword(Keyword::Both) {
            Some(TrimKind::Both)
        } else {
            None
        };

        let expr = if let Some(side) = side {
            let chars = if self.check_keyword(Keyword::From) {
                None
            } else {
                Some(self.parse_expr(Precedence::Lowest)?)
            };
            self.expect_keyword(Keyword::From)?;
            let target = self.parse_expr(Precedence::Lowest)?;
            builders::trim(side, target, chars)
        } else {
            let first = self.parse_expr(Precedence::Lowest)?;
            if self.consume_keyword(Keyword::From) {
                let target = self.parse_expr(Precedence::Lowest)?;
                builders::trim(TrimKind::Both, target, Some(first))
            } else if self.consume(&TokenKind::Comma) {
                let chars = self.parse_expr(Precedence::Lowest)?;
                builders::trim(TrimKind::Both, first, Some(chars))
            } else {
                builders::trim(TrimKind::Both, first, None)
            }
        };
        self.expect(&TokenKind::RightParen)?;
        Ok(expr)
    }

    /// Parses the argument list and trailing clauses of an aggregate whose
    /// name has been consumed.
    fn parse_aggregate(&mut self, op: AggregateOp, start: usize) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let distinct = self.consume_keyword(Keyword::Distinct);
        let args = if self.consume(&TokenKind::Star) {
            AggregateArgs::Star
        } else if self.check(&TokenKind::RightParen) {
            AggregateArgs::Empty
        } else {
            AggregateArgs::Exprs(self.parse_expr_list()?)
        };
        self.expect(&TokenKind::RightParen)?;
        let mut agg = builders::aggregate(op, distinct, args).map_err(|m| self.semantic(start, m))?;

        if self.consume_keyword(Keyword::Filter) {
            self.expect(&TokenKind::LeftParen)?;
            self.expect_keyword(Keyword::Where)?;
            agg.filter = Some(self.parse_expr(Precedence::Lowest)?);
            self.expect(&TokenKind::RightParen)?;
        }
        if self.consume_keyword(Keyword::Over) {
            agg.over = Some(self.parse_window()?);
        }
        Ok(Expr::Aggregate(Box::new(agg)))
    }

    fn parse_window(&mut self) -> Result<Window, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let mut window = Window::default();
        if self.consume_keyword(Keyword::Partition) {
            self.expect_keyword(Keyword::By)?;
            window.partition_by = self.parse_expr_list()?;
        }
        if self.consume_keyword(Keyword::Order) {
            self.expect_keyword(Keyword::By)?;
            window.order_by = self.parse_order_by()?;
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ArithOp, CompareOp, LogicalOp};

    fn parse(input: &str) -> Result<Query, ParseError> {
        let mut state = ParserState::default();
        Parser::new(input.as_bytes(), &mut state).parse_query()
    }

    fn parse_expr(input: &str) -> Expr {
        let query = parse(&format!("SELECT {input}")).unwrap();
        let Expr::Select(select) = query.body else {
            panic!("expected SELECT");
        };
        select.columns.into_iter().next().unwrap().expr
    }

    #[test]
    fn test_simple_select() {
        let query = parse("SELECT a, b AS c FROM t WHERE a = 1").unwrap();
        let Expr::Select(select) = query.body else {
            panic!("expected SELECT");
        };
        assert_eq!(select.columns.len(), 2);
        assert_eq!(select.columns[1].alias.as_deref(), Some("c"));
        assert!(matches!(
            select.from,
            Some(FromClause::Table(Binding {
                expr: Expr::Ident(ref name),
                alias: None
            })) if name == "t"
        ));
        assert!(select.where_clause.is_some());
    }

    #[test]
    fn test_arithmetic_precedence() {
        let expr = parse_expr("1 + 2 * 3");
        assert_eq!(
            expr,
            Expr::integer(1).arith(
                ArithOp::Add,
                Expr::integer(2).arith(ArithOp::Mul, Expr::integer(3))
            )
        );
    }

    #[test]
    fn test_left_associativity() {
        let expr = parse_expr("a - b - c");
        assert_eq!(
            expr,
            Expr::ident("a")
                .arith(ArithOp::Sub, Expr::ident("b"))
                .arith(ArithOp::Sub, Expr::ident("c"))
        );
    }

    #[test]
    fn test_split_negative_literal() {
        assert_eq!(
            parse_expr("x-1*2"),
            Expr::ident("x").arith(
                ArithOp::Sub,
                Expr::integer(1).arith(ArithOp::Mul, Expr::integer(2))
            )
        );
        assert_eq!(
            parse_expr("5-4"),
            Expr::integer(5).arith(ArithOp::Sub, Expr::integer(4))
        );
        assert_eq!(parse_expr("-4"), Expr::integer(-4));
    }

    #[test]
    fn test_logical_precedence() {
        let expr = parse_expr("a OR b AND NOT c");
        let Expr::Logical {
            op: LogicalOp::Or,
            right,
            ..
        } = expr
        else {
            panic!("expected OR at the root");
        };
        assert_eq!(*right, Expr::ident("b").and(Expr::ident("c").not()));
    }

    #[test]
    fn test_not_binds_above_comparison() {
        assert_eq!(
            parse_expr("NOT a = b"),
            Expr::ident("a").eq(Expr::ident("b")).not()
        );
    }

    #[test]
    fn test_predicates_bind_tighter_than_comparison() {
        assert_eq!(
            parse_expr("a.x IS MISSING <> b IS MISSING"),
            Expr::ident("a")
                .dot("x")
                .is(IsKey::Missing)
                .compare(CompareOp::NotEq, Expr::ident("b").is(IsKey::Missing))
        );
    }

    #[test]
    fn test_negated_predicates() {
        assert_eq!(
            parse_expr("x NOT LIKE 'a%'"),
            Expr::Match {
                op: MatchOp::Like,
                expr: Box::new(Expr::ident("x")),
                pattern: String::from("a%"),
                escape: None,
            }
            .not()
        );
        assert_eq!(
            parse_expr("x IS NOT NULL"),
            Expr::ident("x").is(IsKey::NotNull)
        );
        assert_eq!(
            parse_expr("x NOT IN (1)"),
            Expr::ident("x").eq(Expr::integer(1)).not()
        );
    }

    #[test]
    fn test_between() {
        assert_eq!(
            parse_expr("x BETWEEN 1 AND 2"),
            Expr::ident("x")
                .compare(CompareOp::GtEq, Expr::integer(1))
                .and(Expr::ident("x").compare(CompareOp::LtEq, Expr::integer(2)))
        );
    }

    #[test]
    fn test_paths() {
        assert_eq!(
            parse_expr("x[0].y['z']"),
            Expr::ident("x").index(0).dot("y").dot("z")
        );
        assert_eq!(parse_expr("t.select"), Expr::ident("t").dot("select"));
    }

    #[test]
    fn test_append_chain_is_flat() {
        let query = parse("SELECT * FROM a ++ b ++ c").unwrap();
        let Expr::Select(select) = query.body else {
            panic!("expected SELECT");
        };
        let Some(FromClause::Table(binding)) = select.from else {
            panic!("expected a single source");
        };
        assert_eq!(
            binding.expr,
            Expr::Appended(vec![Expr::ident("a"), Expr::ident("b"), Expr::ident("c")])
        );
    }

    #[test]
    fn test_joins() {
        let query =
            parse("SELECT * FROM a AS x LEFT OUTER JOIN b AS y ON x.id = y.id, c FULL JOIN d ON p")
                .unwrap();
        let Expr::Select(select) = query.body else {
            panic!("expected SELECT");
        };
        let Some(FromClause::Join(full)) = select.from else {
            panic!("expected a join");
        };
        assert_eq!(full.kind, JoinKind::Full);
        let FromClause::Join(cross) = &full.left else {
            panic!("expected a nested join");
        };
        assert_eq!(cross.kind, JoinKind::Cross);
        let FromClause::Join(left) = &cross.left else {
            panic!("expected a nested join");
        };
        assert_eq!(left.kind, JoinKind::Left);
        assert!(left.on.is_some());
    }

    #[test]
    fn test_union_chain_is_left_deep() {
        let query = parse("SELECT a FROM x UNION ALL SELECT b FROM y UNION SELECT c FROM z").unwrap();
        let Expr::Union(outer) = query.body else {
            panic!("expected UNION");
        };
        assert_eq!(outer.kind, UnionKind::Distinct);
        assert!(matches!(&outer.left, Expr::Union(inner) if inner.kind == UnionKind::All));
    }

    #[test]
    fn test_into_lifted_to_query() {
        let query = parse("SELECT x INTO db.t FROM y").unwrap();
        assert_eq!(query.into, Some(Expr::ident("db").dot("t")));
    }

    #[test]
    fn test_into_rejected_in_nested_select() {
        let err = parse("SELECT (SELECT x INTO db.t FROM y)").unwrap_err();
        assert_eq!(err.message(), "unexpected INTO, expecting ')'");
    }

    #[test]
    fn test_ctes_and_explain() {
        let query = parse("EXPLAIN AS list WITH a AS (SELECT 1), b AS (SELECT 2) SELECT * FROM a")
            .unwrap();
        assert_eq!(query.explain, ExplainFormat::List);
        assert_eq!(query.with.len(), 2);
        assert_eq!(query.with[1].name, "b");
    }

    #[test]
    fn test_limit_and_offset() {
        let query = parse("SELECT x FROM t LIMIT 10 OFFSET 5").unwrap();
        let Expr::Select(select) = query.body else {
            panic!("expected SELECT");
        };
        assert_eq!(select.limit, Some(10));
        assert_eq!(select.offset, Some(5));

        let err = parse("SELECT x FROM t LIMIT -1").unwrap_err();
        assert_eq!(err.message(), "LIMIT must be non-negative");
    }

    #[test]
    fn test_lexical_error_wins() {
        let err = parse("SELECT x FROM t WHERE $").unwrap_err();
        assert_eq!(err.kind(), crate::parser::ErrorKind::Lexical);
    }

    #[test]
    fn test_trailing_garbage() {
        let err = parse("SELECT x FROM t t2").unwrap_err();
        assert_eq!(err.message(), "unexpected ID, expecting end of input");
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("SELECT {}x{}", "(".repeat(200), ")".repeat(200));
        let err = parse(&deep).unwrap_err();
        assert_eq!(err.message(), "expression nested too deeply");
    }

    #[test]
    fn test_height_limit_counts_chain_links() {
        let chain = |n: usize| format!("{}a", "a + ".repeat(n));
        let err = parse(&format!("SELECT {}", chain(MAX_HEIGHT))).unwrap_err();
        assert_eq!(err.message(), "expression nested too deeply");

        // siblings do not add up
        let c = chain(MAX_HEIGHT - 10);
        assert!(parse(&format!("SELECT {c}, {c} FROM t WHERE {c}")).is_ok());
        let arm = format!("SELECT {c}");
        assert!(parse(&format!("{arm} UNION {arm}")).is_ok());
    }
}
