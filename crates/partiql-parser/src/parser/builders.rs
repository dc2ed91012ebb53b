//! Node construction with validation.
//!
//! Grammar actions call into this module to build compound nodes. The
//! functions here are pure; failures are returned as plain messages and
//! positioned by the caller.

use crate::ast::{
    format_float, Aggregate, AggregateOp, ArithOp, CaseLimb, CastType, CompareOp, DateFunc, Distinct,
    ExplainFormat, Expr, IsKey, Literal, Rational, Select, TimePart, Weekday,
    APPROX_COUNT_DISTINCT_DEFAULT_PRECISION, APPROX_COUNT_DISTINCT_MAX_PRECISION,
    APPROX_COUNT_DISTINCT_MIN_PRECISION,
};
use crate::lexer::TokenKind;

/// Builtins that only the planner may introduce.
const RESERVED_BUILTINS: [&str; 12] = [
    "CONCAT",
    "CONTAINS",
    "CONTAINS_CI",
    "IN_SUBQUERY",
    "HASH_LOOKUP",
    "IN_REPLACEMENT",
    "HASH_REPLACEMENT",
    "SCALAR_REPLACEMENT",
    "STRUCT_REPLACEMENT",
    "LIST_REPLACEMENT",
    "MAKE_LIST",
    "MAKE_STRUCT",
];

const RESERVED_PREFIXES: [&str; 4] = ["DATE_ADD_", "DATE_DIFF_", "DATE_EXTRACT_", "DATE_TRUNC_"];

/// Rejects calls to reserved builtins by name. `name` is upper-case.
pub fn check_builtin(name: &str) -> Result<(), String> {
    let reserved = RESERVED_BUILTINS.contains(&name)
        || RESERVED_PREFIXES
            .iter()
            .any(|prefix| name.starts_with(prefix));
    if reserved {
        Err(format!("cannot use reserved builtin {name}"))
    } else {
        Ok(())
    }
}

/// Resolves the type name of a CAST.
pub fn cast(expr: Expr, name: &str) -> Result<Expr, String> {
    let to = CastType::from_name(name).ok_or_else(|| format!("unrecognized CAST type {name:?}"))?;
    Ok(Expr::Cast {
        expr: Box::new(expr),
        to,
    })
}

/// The surface date/time functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFn {
    Add,
    Diff,
    Extract,
    Trunc,
}

impl DateFn {
    /// Returns the SQL name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "DATE_ADD",
            Self::Diff => "DATE_DIFF",
            Self::Extract => "EXTRACT",
            Self::Trunc => "DATE_TRUNC",
        }
    }

    /// Number of value arguments after the part.
    #[must_use]
    pub const fn arity(&self) -> usize {
        match self {
            Self::Add | Self::Diff => 2,
            Self::Extract | Self::Trunc => 1,
        }
    }

    const fn allows(&self, part: TimePart) -> bool {
        match self {
            Self::Add | Self::Diff | Self::Trunc => !matches!(part, TimePart::Dow | TimePart::Doy),
            Self::Extract => !matches!(part, TimePart::Week),
        }
    }
}

/// Resolves the part argument of a date function.
///
/// A plain `WEEK` in `DATE_TRUNC` truncates to Sunday.
pub fn date_func(func: DateFn, part: &str) -> Result<DateFunc, String> {
    let resolved = TimePart::from_name(part)
        .filter(|p| func.allows(*p))
        .ok_or_else(|| format!("bad {} part {part:?}", func.as_str()))?;
    Ok(match func {
        DateFn::Add => DateFunc::Add(resolved),
        DateFn::Diff => DateFunc::Diff(resolved),
        DateFn::Extract => DateFunc::Extract(resolved),
        DateFn::Trunc if resolved == TimePart::Week => DateFunc::TruncWeek(Weekday::Sunday),
        DateFn::Trunc => DateFunc::Trunc(resolved),
    })
}

/// Resolves the day in `DATE_TRUNC(WEEK(day), ...)`.
pub fn weekday(name: &str) -> Result<Weekday, String> {
    Weekday::from_name(name).ok_or_else(|| format!("bad weekday {name:?}"))
}

/// Which side TRIM strips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimKind {
    Both,
    Leading,
    Trailing,
}

impl TrimKind {
    const fn function(self) -> &'static str {
        match self {
            Self::Both => "TRIM",
            Self::Leading => "LTRIM",
            Self::Trailing => "RTRIM",
        }
    }
}

/// Builds `TRIM`, `LTRIM` or `RTRIM` of `target`.
#[must_use]
pub fn trim(kind: TrimKind, target: Expr, chars: Option<Expr>) -> Expr {
    let mut args = vec![target];
    args.extend(chars);
    Expr::call(kind.function(), args)
}

/// Rewrites `EXISTS (select)` as `(select LIMIT 1) IS NOT MISSING`.
#[must_use]
pub fn exists(mut select: Select) -> Expr {
    if select.limit == Some(0) {
        return Expr::boolean(false);
    }
    if select.is_star() {
        select.columns[0].expr = Expr::boolean(true);
    }
    select.limit = Some(1);
    Expr::Select(Box::new(select)).is(IsKey::NotMissing)
}

/// Builds a searched CASE; a simple CASE compares `operand` with each
/// `WHEN` value.
#[must_use]
pub fn case(operand: Option<Expr>, limbs: Vec<CaseLimb>, otherwise: Option<Expr>) -> Expr {
    let limbs = match operand {
        None => limbs,
        Some(operand) => limbs
            .into_iter()
            .map(|limb| CaseLimb {
                when: operand.clone().eq(limb.when),
                then: limb.then,
            })
            .collect(),
    };
    Expr::Case {
        limbs,
        otherwise: otherwise.map(Box::new),
    }
}

/// `COALESCE(a, b, ...)` as a CASE over `IS NOT NULL` tests.
#[must_use]
pub fn coalesce(args: Vec<Expr>) -> Expr {
    let limbs = args
        .into_iter()
        .map(|arg| CaseLimb {
            when: arg.clone().is(IsKey::NotNull),
            then: arg,
        })
        .collect();
    Expr::Case {
        limbs,
        otherwise: Some(Box::new(Expr::null())),
    }
}

/// `NULLIF(a, b)` as `CASE WHEN a = b THEN NULL ELSE a END`.
#[must_use]
pub fn nullif(a: Expr, b: Expr) -> Expr {
    Expr::Case {
        limbs: vec![CaseLimb {
            when: a.clone().eq(b),
            then: Expr::null(),
        }],
        otherwise: Some(Box::new(a)),
    }
}

/// String concatenation.
#[must_use]
pub fn concat(left: Expr, right: Expr) -> Expr {
    Expr::call("CONCAT", vec![left, right])
}

/// `x BETWEEN lo AND hi` as `x >= lo AND x <= hi`.
#[must_use]
pub fn between(expr: Expr, low: Expr, high: Expr) -> Expr {
    expr.clone()
        .compare(CompareOp::GtEq, low)
        .and(expr.compare(CompareOp::LtEq, high))
}

/// `x IN (v, ...)` over a value list.
///
/// One value is a plain equality. Constants become a membership test;
/// anything else becomes a chain of equalities joined with OR.
#[must_use]
pub fn membership(expr: Expr, mut values: Vec<Expr>) -> Expr {
    if values.len() == 1 {
        if let Some(value) = values.pop() {
            return expr.eq(value);
        }
    }
    if values.iter().all(|v| v.as_literal().is_some()) {
        let values = values
            .into_iter()
            .filter_map(|v| match v {
                Expr::Literal(lit) => Some(lit),
                _ => None,
            })
            .collect();
        return Expr::Member {
            expr: Box::new(expr),
            values,
        };
    }
    let mut tests = values.into_iter().map(|v| expr.clone().eq(v));
    let first = tests.next().unwrap_or_else(|| Expr::boolean(false));
    tests.fold(first, Expr::or)
}

/// Number of OR links [`membership`] builds for `values`; 0 when the
/// result is flat.
#[must_use]
pub fn membership_chain_len(values: &[Expr]) -> usize {
    if values.len() > 1 && values.iter().any(|v| v.as_literal().is_none()) {
        values.len()
    } else {
        0
    }
}

/// Converts the literal inside `x[...]` into an offset.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn to_index(lit: &Literal) -> Result<i64, String> {
    match lit {
        Literal::Integer(i) => Ok(*i),
        Literal::Float(f) if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 => {
            Ok(*f as i64)
        }
        Literal::Float(f) => Err(format!("cannot use {} as an index", format_float(*f))),
        Literal::Rational(r) if r.is_integer() => Ok(r.num),
        Literal::Rational(_) => Err(String::from("integer out-of-range for indexing")),
        other => Err(format!("cannot use {other} as an index")),
    }
}

/// Converts a numeric token into a literal.
#[must_use]
pub fn number_literal(kind: &TokenKind) -> Option<Literal> {
    match kind {
        TokenKind::Integer(i) => Some(Literal::Integer(*i)),
        TokenKind::Float(f) => Some(Literal::Float(*f)),
        TokenKind::Rational(r) => Some(Literal::Rational(*r)),
        _ => None,
    }
}

/// The magnitude of a negative number token, used when `x-1` lexes as
/// `x` followed by the literal `-1`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn magnitude(kind: &TokenKind) -> Option<Literal> {
    let lit = match kind {
        TokenKind::Integer(i) => i
            .checked_neg()
            .map_or_else(|| Literal::Float(-(*i as f64)), Literal::Integer),
        TokenKind::Float(f) => Literal::Float(-f),
        TokenKind::Rational(r) => r.num.checked_neg().map_or_else(
            || Literal::Float(-r.to_f64()),
            |num| Literal::Rational(Rational { num, den: r.den }),
        ),
        _ => return None,
    };
    Some(lit)
}

/// Subtraction of a split negative literal.
#[must_use]
pub fn subtract(left: Expr, right: Expr) -> Expr {
    left.arith(ArithOp::Sub, right)
}

/// Decodes the DISTINCT capture of a SELECT: nothing, an empty list, or
/// the `ON (...)` expressions.
#[must_use]
pub fn distinct(capture: Option<Vec<Expr>>) -> Distinct {
    match capture {
        None => Distinct::All,
        Some(exprs) if exprs.is_empty() => Distinct::Distinct,
        Some(exprs) => Distinct::On(exprs),
    }
}

/// Maps the name after `EXPLAIN AS`.
pub fn explain_format(name: &str) -> Result<ExplainFormat, String> {
    match ExplainFormat::from_name(name) {
        Some(ExplainFormat::None) | None => Err(format!("{name:?} is a wrong explain type")),
        Some(format) => Ok(format),
    }
}

/// The argument list of an aggregate call.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateArgs {
    /// `()`
    Empty,
    /// `(*)`
    Star,
    /// `(e, ...)`, never empty.
    Exprs(Vec<Expr>),
}

/// Validates an aggregate call and builds the node.
pub fn aggregate(op: AggregateOp, distinct: bool, args: AggregateArgs) -> Result<Aggregate, String> {
    let name = op.as_str();
    if distinct && !op.accepts_distinct() {
        return Err(format!("{name}: cannot use DISTINCT with {name}"));
    }
    let op = if distinct && op == AggregateOp::Count {
        AggregateOp::CountDistinct
    } else {
        op
    };

    let mut exprs = match args {
        AggregateArgs::Star if distinct => {
            return Err(format!("{name}: cannot use DISTINCT with *"));
        }
        AggregateArgs::Star if op.accepts_star() => {
            return Ok(Aggregate::new(op, Some(Expr::Star)));
        }
        AggregateArgs::Star => return Err(format!("{name}: cannot use * with {name}")),
        AggregateArgs::Empty if op.is_ranking() => return Ok(Aggregate::new(op, None)),
        AggregateArgs::Empty if !op.accepts_expression() => {
            return Err(format!("{name}: accepts only *"));
        }
        AggregateArgs::Empty => return Err(format!("{name}: expects an argument")),
        AggregateArgs::Exprs(exprs) => exprs.into_iter(),
    };
    if op.is_ranking() {
        return Err(format!("{name}: does not accept arguments"));
    }
    if !op.accepts_expression() {
        return Err(format!("{name}: accepts only *"));
    }
    let inner = exprs
        .next()
        .ok_or_else(|| format!("{name}: expects an argument"))?;
    let extra: Vec<Expr> = exprs.collect();

    let mut agg = Aggregate::new(op, Some(inner));
    match op {
        AggregateOp::ApproxCountDistinct => {
            agg.precision = Some(approx_count_distinct_precision(&extra)?);
        }
        AggregateOp::ApproxPercentile => {
            agg.percentile = Some(approx_percentile(&extra)?);
        }
        _ if !extra.is_empty() => return Err(format!("{name}: does not accept arguments")),
        _ => {}
    }
    Ok(agg)
}

fn approx_count_distinct_precision(extra: &[Expr]) -> Result<u8, String> {
    const NAME: &str = "APPROX_COUNT_DISTINCT";
    let arg = match extra {
        [] => return Ok(APPROX_COUNT_DISTINCT_DEFAULT_PRECISION),
        [arg] => arg,
        _ => return Err(format!("{NAME}: accepts at most 2 arguments")),
    };
    let Some(Literal::Integer(p)) = arg.as_literal() else {
        return Err(format!("{NAME}: precision has to be a constant integer"));
    };
    let range = APPROX_COUNT_DISTINCT_MIN_PRECISION..=APPROX_COUNT_DISTINCT_MAX_PRECISION;
    if !range.contains(p) {
        return Err(format!(
            "{NAME}: precision has to be in range [{}, {}]",
            range.start(),
            range.end()
        ));
    }
    u8::try_from(*p).map_err(|e| e.to_string())
}

fn approx_percentile(extra: &[Expr]) -> Result<f64, String> {
    const NAME: &str = "APPROX_PERCENTILE";
    let [arg] = extra else {
        return Err(format!("{NAME}: accepts exactly 2 arguments"));
    };
    let Some(Literal::Float(p)) = arg.as_literal() else {
        return Err(format!("{NAME}: percentile p={arg} has to be floating point"));
    };
    if !(0.0..=1.0).contains(p) {
        return Err(format!(
            "{NAME}: percentile p={} has to be in range [0.0, 1.0]",
            format_float(*p)
        ));
    }
    Ok(*p)
}
