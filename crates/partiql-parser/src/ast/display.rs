//! Canonical text rendering.
//!
//! The output of every `Display` impl here re-parses to an equivalent
//! tree. Parentheses are only emitted where the parser would otherwise
//! bind differently, using the same [`Precedence`] table the parser
//! uses.

use std::borrow::Cow;
use std::fmt::{self, Write};

use chrono::{DateTime, Timelike, Utc};

use super::expression::{
    Aggregate, ArithOp, CaseLimb, DateFunc, Expr, Literal, LogicalOp, StructField, UnaryOp,
};
use super::statement::{
    Binding, Cte, Distinct, FromClause, OrderBy, Query, Select, Union, Unpivot,
};
use super::types::{AggregateOp, ExplainFormat, APPROX_COUNT_DISTINCT_DEFAULT_PRECISION};
use crate::lexer::is_keyword;

/// Binding strength of operators, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Or,
    And,
    /// Prefix `NOT`, `!` and `~`.
    Not,
    Between,
    Compare,
    /// `LIKE`, `ILIKE`, `IN`, `IS`, `SIMILAR TO`, regex match.
    Predicate,
    BitOr,
    BitXor,
    BitAnd,
    Shift,
    Additive,
    Multiplicative,
    /// `||` and `++`.
    Concat,
    /// Prefix `-`.
    Negate,
    /// `.field` and `[index]`.
    Postfix,
    Primary,
}

impl Precedence {
    /// The next stronger level.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Lowest => Self::Or,
            Self::Or => Self::And,
            Self::And => Self::Not,
            Self::Not => Self::Between,
            Self::Between => Self::Compare,
            Self::Compare => Self::Predicate,
            Self::Predicate => Self::BitOr,
            Self::BitOr => Self::BitXor,
            Self::BitXor => Self::BitAnd,
            Self::BitAnd => Self::Shift,
            Self::Shift => Self::Additive,
            Self::Additive => Self::Multiplicative,
            Self::Multiplicative => Self::Concat,
            Self::Concat => Self::Negate,
            Self::Negate => Self::Postfix,
            Self::Postfix | Self::Primary => Self::Primary,
        }
    }
}

impl ArithOp {
    /// Precedence level of the operator.
    #[must_use]
    pub const fn precedence(&self) -> Precedence {
        match self {
            Self::BitOr => Precedence::BitOr,
            Self::BitXor => Precedence::BitXor,
            Self::BitAnd => Precedence::BitAnd,
            Self::ShiftLeft | Self::ShiftRightArith | Self::ShiftRightLogical => Precedence::Shift,
            Self::Add | Self::Sub => Precedence::Additive,
            Self::Mul | Self::Div | Self::Mod => Precedence::Multiplicative,
        }
    }
}

impl Expr {
    /// Precedence of the node when rendered.
    #[must_use]
    pub const fn precedence(&self) -> Precedence {
        match self {
            Self::Logical {
                op: LogicalOp::Or, ..
            } => Precedence::Or,
            Self::Logical {
                op: LogicalOp::And,
                ..
            } => Precedence::And,
            Self::Not(_)
            | Self::Unary {
                op: UnaryOp::BitNot,
                ..
            } => Precedence::Not,
            Self::Compare { .. } => Precedence::Compare,
            Self::Match { .. } | Self::Is { .. } | Self::Member { .. } | Self::InSubquery { .. } => {
                Precedence::Predicate
            }
            Self::Arith { op, .. } => op.precedence(),
            Self::Unary {
                op: UnaryOp::Neg, ..
            } => Precedence::Negate,
            Self::Dot { .. } | Self::Index { .. } => Precedence::Postfix,
            _ => Precedence::Primary,
        }
    }
}

/// Quotes an identifier when it would not lex back as itself.
#[must_use]
pub fn quote_id(id: &str) -> Cow<'_, str> {
    if is_plain_word(id) && !is_keyword(id) {
        Cow::Borrowed(id)
    } else {
        let mut out = String::with_capacity(id.len() + 2);
        push_quoted(&mut out, id, '"');
        Cow::Owned(out)
    }
}

fn is_plain_word(id: &str) -> bool {
    let mut bytes = id.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' || b == b'@' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'@')
}

fn push_quoted(out: &mut String, text: &str, quote: char) {
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            c if u32::from(c) <= 0xffff => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => {
                let _ = write!(out, "\\U{:08x}", u32::from(c));
            }
        }
    }
    out.push(quote);
}

/// Formats a float the way `%g` does with the shortest precision that
/// round-trips: `50000`, `0.04`, `1e+19`, `1.5e-07`.
#[must_use]
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return String::from("NaN");
    }
    if value.is_infinite() {
        return String::from(if value > 0.0 { "+Inf" } else { "-Inf" });
    }
    if value == 0.0 {
        return String::from(if value.is_sign_negative() { "-0" } else { "0" });
    }

    // `{:e}` yields the shortest round-trip digits, e.g. "-1.25e-3".
    let sci = format!("{value:e}");
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let (sign, mantissa) = mantissa
        .strip_prefix('-')
        .map_or(("", mantissa), |m| ("-", m));
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();

    if !(-4..6).contains(&exp) {
        let mut out = String::from(sign);
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        let _ = write!(
            out,
            "e{}{:02}",
            if exp < 0 { '-' } else { '+' },
            exp.unsigned_abs()
        );
        return out;
    }

    let mut out = String::from(sign);
    if exp < 0 {
        out.push_str("0.");
        for _ in 0..(-exp - 1) {
            out.push('0');
        }
        out.push_str(&digits);
    } else {
        let int_len = usize::try_from(exp).unwrap_or(0) + 1;
        if digits.len() <= int_len {
            out.push_str(&digits);
            for _ in digits.len()..int_len {
                out.push('0');
            }
        } else {
            out.push_str(&digits[..int_len]);
            out.push('.');
            out.push_str(&digits[int_len..]);
        }
    }
    out
}

/// RFC 3339 in UTC with the fraction trimmed of trailing zeros.
#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    let mut out = ts.format("%Y-%m-%dT%H:%M:%S").to_string();
    let nanos = ts.nanosecond() % 1_000_000_000;
    if nanos != 0 {
        let frac = format!("{nanos:09}");
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
    out.push('Z');
    out
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Missing => f.write_str("MISSING"),
            Self::Bool(true) => f.write_str("TRUE"),
            Self::Bool(false) => f.write_str("FALSE"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => f.write_str(&format_float(*v)),
            Self::Rational(r) if r.is_integer() => write!(f, "{}", r.num),
            Self::Rational(r) => f.write_str(&format_float(r.to_f64())),
            Self::String(s) => {
                let mut out = String::with_capacity(s.len() + 2);
                push_quoted(&mut out, s, '\'');
                f.write_str(&out)
            }
            Self::Timestamp(ts) => write!(f, "`{}`", format_timestamp(ts)),
        }
    }
}

/// Writes `expr`, parenthesized if it binds weaker than `min`.
fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, min: Precedence) -> fmt::Result {
    if expr.precedence() < min {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Inner part of a path; numbers need parentheses so the dot is not
/// lexed as part of the literal.
fn write_path_inner(f: &mut fmt::Formatter<'_>, inner: &Expr) -> fmt::Result {
    let numeric = inner.as_literal().is_some_and(Literal::is_number);
    if numeric || inner.precedence() < Precedence::Postfix {
        write!(f, "({inner})")
    } else {
        write!(f, "{inner}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit) => write!(f, "{lit}"),
            Self::Ident(name) => f.write_str(&quote_id(name)),
            Self::Star => f.write_str("*"),
            Self::Dot { inner, field } => {
                write_path_inner(f, inner)?;
                write!(f, ".{}", quote_id(field))
            }
            Self::Index { inner, offset } => {
                write_path_inner(f, inner)?;
                write!(f, "[{offset}]")
            }
            Self::Not(inner) => {
                f.write_str("NOT ")?;
                write_operand(f, inner, Precedence::Not)
            }
            Self::Unary { op, operand } => write!(f, "{}({operand})", op.as_str()),
            Self::Logical { op, left, right } => {
                let prec = self.precedence();
                write_operand(f, left, prec)?;
                write!(f, " {} ", op.as_str())?;
                write_operand(f, right, prec.next())
            }
            Self::Compare { op, left, right } => {
                write_operand(f, left, Precedence::Compare)?;
                write!(f, " {} ", op.as_str())?;
                write_operand(f, right, Precedence::Predicate)
            }
            Self::Arith { op, left, right } => {
                let prec = op.precedence();
                write_operand(f, left, prec)?;
                write!(f, " {} ", op.as_str())?;
                write_operand(f, right, prec.next())
            }
            Self::Match {
                op,
                expr,
                pattern,
                escape,
            } => {
                write_operand(f, expr, Precedence::Predicate)?;
                write!(f, " {} {}", op.as_str(), Literal::String(pattern.clone()))?;
                if let Some(esc) = escape {
                    write!(f, " ESCAPE {}", Literal::String(esc.clone()))?;
                }
                Ok(())
            }
            Self::Is { expr, key } => {
                write_operand(f, expr, Precedence::Predicate)?;
                write!(f, " IS {}", key.as_str())
            }
            Self::Member { expr, values } => {
                write_operand(f, expr, Precedence::Predicate)?;
                f.write_str(" IN (")?;
                write_list(f, values)?;
                f.write_str(")")
            }
            Self::InSubquery { expr, select } => {
                write_operand(f, expr, Precedence::Predicate)?;
                write!(f, " IN ({select})")
            }
            Self::Case { limbs, otherwise } => {
                f.write_str("CASE")?;
                for CaseLimb { when, then } in limbs {
                    write!(f, " WHEN {when} THEN {then}")?;
                }
                if let Some(e) = otherwise {
                    write!(f, " ELSE {e}")?;
                }
                f.write_str(" END")
            }
            Self::Cast { expr, to } => write!(f, "CAST({expr} AS {})", to.as_str()),
            Self::Call { name, args } => {
                if is_plain_word(name) {
                    f.write_str(name)?;
                } else {
                    f.write_str(&quote_id(name))?;
                }
                f.write_str("(")?;
                write_list(f, args)?;
                f.write_str(")")
            }
            Self::Date { func, args } => write_date(f, *func, args),
            Self::Aggregate(agg) => write!(f, "{agg}"),
            Self::Struct(fields) => {
                f.write_str("{")?;
                write_list(f, fields)?;
                f.write_str("}")
            }
            Self::List(items) => {
                f.write_str("[")?;
                write_list(f, items)?;
                f.write_str("]")
            }
            Self::Appended(parts) => {
                f.write_str("(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ++ ")?;
                    }
                    write_operand(f, part, Precedence::Negate)?;
                }
                f.write_str(")")
            }
            Self::Select(select) => write!(f, "({select})"),
            Self::Union(union) => write!(f, "({union})"),
            Self::Unpivot(unpivot) => write!(f, "{unpivot}"),
        }
    }
}

fn write_date(f: &mut fmt::Formatter<'_>, func: DateFunc, args: &[Expr]) -> fmt::Result {
    match func {
        DateFunc::Add(part) => write!(f, "DATE_ADD({part}, ")?,
        DateFunc::Diff(part) => write!(f, "DATE_DIFF({part}, ")?,
        DateFunc::Trunc(part) => write!(f, "DATE_TRUNC({part}, ")?,
        DateFunc::TruncWeek(day) => write!(f, "DATE_TRUNC(WEEK({}), ", day.as_str())?,
        DateFunc::Extract(part) => {
            write!(f, "EXTRACT({part} FROM ")?;
            write_list(f, args)?;
            return f.write_str(")");
        }
    }
    write_list(f, args)?;
    f.write_str(")")
}

impl fmt::Display for StructField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", Literal::String(self.key.clone()), self.value)
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            AggregateOp::CountDistinct => f.write_str("COUNT(DISTINCT ")?,
            op => write!(f, "{op}(")?,
        }
        if let Some(inner) = &self.inner {
            write!(f, "{inner}")?;
        }
        match (self.op, self.precision, self.percentile) {
            (AggregateOp::ApproxCountDistinct, Some(p), _)
                if p != APPROX_COUNT_DISTINCT_DEFAULT_PRECISION =>
            {
                write!(f, ", {p}")?;
            }
            (AggregateOp::ApproxPercentile, _, Some(p)) => {
                let text = format_float(p);
                if text.contains(['.', 'e']) {
                    write!(f, ", {text}")?;
                } else {
                    write!(f, ", {text}.0")?;
                }
            }
            _ => {}
        }
        f.write_str(")")?;

        if let Some(filter) = &self.filter {
            write!(f, " FILTER (WHERE {filter})")?;
        }
        if let Some(window) = &self.over {
            f.write_str(" OVER (")?;
            if !window.partition_by.is_empty() {
                f.write_str("PARTITION BY ")?;
                write_list(f, &window.partition_by)?;
                if !window.order_by.is_empty() {
                    f.write_str(" ")?;
                }
            }
            if !window.order_by.is_empty() {
                f.write_str("ORDER BY ")?;
                write_list(f, &window.order_by)?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {}", quote_id(alias))?;
        }
        Ok(())
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.column,
            self.direction.as_str(),
            self.nulls.as_str()
        )
    }
}

/// Writes a FROM source. Sources are parsed at `||` strength, so
/// anything weaker needs parentheses.
fn write_source(f: &mut fmt::Formatter<'_>, binding: &Binding) -> fmt::Result {
    write_operand(f, &binding.expr, Precedence::Concat)?;
    if let Some(alias) = &binding.alias {
        write!(f, " AS {}", quote_id(alias))?;
    }
    Ok(())
}

impl fmt::Display for FromClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(binding) => write_source(f, binding),
            Self::Join(join) => {
                write!(f, "{} {} ", join.left, join.kind.as_str())?;
                write_source(f, &join.right)?;
                if let Some(on) = &join.on {
                    write!(f, " ON {on}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Unpivot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UNPIVOT ")?;
        write_operand(f, &self.source, Precedence::Concat)?;
        if let Some(alias) = &self.as_alias {
            write!(f, " AS {}", quote_id(alias))?;
        }
        if let Some(alias) = &self.at_alias {
            write!(f, " AT {}", quote_id(alias))?;
        }
        Ok(())
    }
}

impl Select {
    /// Writes the block without surrounding parentheses; `into` is the
    /// query-level INTO target when this is the outermost SELECT.
    fn write_to(&self, f: &mut fmt::Formatter<'_>, into: Option<&Expr>) -> fmt::Result {
        f.write_str("SELECT ")?;
        match &self.distinct {
            Distinct::All => {}
            Distinct::Distinct => f.write_str("DISTINCT ")?,
            Distinct::On(exprs) => {
                f.write_str("DISTINCT ON (")?;
                write_list(f, exprs)?;
                f.write_str(") ")?;
            }
        }
        write_list(f, &self.columns)?;
        if let Some(target) = into {
            write!(f, " INTO {target}")?;
        }
        if let Some(from) = &self.from {
            write!(f, " FROM {from}")?;
        }
        if let Some(cond) = &self.where_clause {
            write!(f, " WHERE {cond}")?;
        }
        if !self.group_by.is_empty() {
            f.write_str(" GROUP BY ")?;
            write_list(f, &self.group_by)?;
        }
        if let Some(cond) = &self.having {
            write!(f, " HAVING {cond}")?;
        }
        if !self.order_by.is_empty() {
            f.write_str(" ORDER BY ")?;
            write_list(f, &self.order_by)?;
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {limit}")?;
        }
        if let Some(offset) = self.offset {
            write!(f, " OFFSET {offset}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f, None)
    }
}

/// Writes a union arm or query body: selects bare, unions flattened.
fn write_body(f: &mut fmt::Formatter<'_>, body: &Expr, into: Option<&Expr>) -> fmt::Result {
    match body {
        Expr::Select(select) => select.write_to(f, into),
        Expr::Union(union) => union.write_to(f, into),
        other => write!(f, "{other}"),
    }
}

impl Union {
    fn write_to(&self, f: &mut fmt::Formatter<'_>, into: Option<&Expr>) -> fmt::Result {
        write_body(f, &self.left, into)?;
        write!(f, " {} ", self.kind.as_str())?;
        match &self.right {
            Expr::Select(select) => select.write_to(f, None),
            other => write!(f, "{other}"),
        }
    }
}

impl fmt::Display for Union {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f, None)
    }
}

impl fmt::Display for Cte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} AS ({})", quote_id(&self.name), self.select)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.explain, self.explain.as_str()) {
            (ExplainFormat::None, _) => {}
            (_, Some(name)) => write!(f, "EXPLAIN AS {name} ")?,
            (_, None) => f.write_str("EXPLAIN ")?,
        }
        if !self.with.is_empty() {
            f.write_str("WITH ")?;
            write_list(f, &self.with)?;
            f.write_str(" ")?;
        }
        write_body(f, &self.body, self.into.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::ast::types::JoinKind;
    use crate::ast::{CompareOp, Join};

    #[test]
    fn test_format_float_matches_g_verb() {
        assert_eq!(format_float(50000.0), "50000");
        assert_eq!(format_float(-0.04), "-0.04");
        assert_eq!(format_float(1e19), "1e+19");
        assert_eq!(format_float(1e100), "1e+100");
        assert_eq!(format_float(1_234_567.0), "1.234567e+06");
        assert_eq!(format_float(0.000_15), "0.00015");
        assert_eq!(format_float(0.000_015), "1.5e-05");
        assert_eq!(format_float(3.25), "3.25");
        assert_eq!(format_float(123_456.0), "123456");
    }

    #[test]
    fn test_format_timestamp_trims_fraction() {
        let ts = Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap()
            + chrono::Duration::milliseconds(999);
        assert_eq!(format_timestamp(&ts), "2006-01-02T15:04:05.999Z");
        let whole = Utc.with_ymd_and_hms(2006, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_timestamp(&whole), "2006-01-01T00:00:00Z");
    }

    #[test]
    fn test_quote_id() {
        assert_eq!(quote_id("foo"), "foo");
        assert_eq!(quote_id("join"), "\"join\"");
        assert_eq!(quote_id("count"), "\"count\"");
        assert_eq!(quote_id("a-b"), "\"a-b\"");
        assert_eq!(quote_id("1st"), "\"1st\"");
        assert_eq!(quote_id("@timestamp"), "@timestamp");
    }

    #[test]
    fn test_string_escapes() {
        let lit = Literal::String(String::from("it's\n\u{2408}"));
        assert_eq!(lit.to_string(), "'it\\'s\\n\\u2408'");
    }

    #[test]
    fn test_operand_parentheses() {
        let sum = Expr::integer(1).arith(
            ArithOp::Add,
            Expr::ident("x").arith(ArithOp::Add, Expr::integer(2)),
        );
        assert_eq!(sum.to_string(), "1 + (x + 2)");

        let cmp = Expr::ident("a")
            .and(Expr::ident("b"))
            .compare(CompareOp::Eq, Expr::ident("c"));
        assert_eq!(cmp.to_string(), "(a AND b) = c");

        let not = Expr::ident("a").or(Expr::ident("b")).not();
        assert_eq!(not.to_string(), "NOT (a OR b)");
    }

    #[test]
    fn test_numeric_path_root_is_parenthesized() {
        let path = Expr::integer(3).dot("x");
        assert_eq!(path.to_string(), "(3).x");
    }

    #[test]
    fn test_join_rendering() {
        let from = FromClause::Join(Box::new(Join {
            kind: JoinKind::Cross,
            left: FromClause::Table(Binding::named(Expr::string("outer"), "o")),
            right: Binding::named(Expr::string("inner"), "i"),
            on: None,
        }));
        assert_eq!(from.to_string(), "'outer' AS o CROSS JOIN 'inner' AS i");
    }

    #[test]
    fn test_weak_from_source_is_parenthesized() {
        let sum = Expr::ident("a").arith(ArithOp::Add, Expr::ident("b"));
        let from = FromClause::Table(Binding::named(sum, "s"));
        assert_eq!(from.to_string(), "(a + b) AS s");

        let appended = FromClause::Table(Binding::new(Expr::Appended(vec![
            Expr::ident("a"),
            Expr::ident("b"),
        ])));
        assert_eq!(appended.to_string(), "(a ++ b)");
    }
}
