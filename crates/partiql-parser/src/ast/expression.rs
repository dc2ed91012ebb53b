//! Expression AST types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::statement::{OrderBy, Select, Union, Unpivot};
use super::types::{AggregateOp, CastType, TimePart, Weekday};

/// An exact fraction `num / den` in lowest terms with `den > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rational {
    pub num: i64,
    pub den: i64,
}

impl Rational {
    /// Whether the fraction is a whole number.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        self.den == 1
    }

    /// Lossy conversion to `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

/// A constant value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// NULL.
    Null,
    /// MISSING.
    Missing,
    /// TRUE / FALSE.
    Bool(bool),
    /// 64-bit integer.
    Integer(i64),
    /// Double-precision float.
    Float(f64),
    /// Exact fraction.
    Rational(Rational),
    /// String literal (already unescaped).
    String(String),
    /// Timestamp, always UTC with microsecond resolution.
    Timestamp(DateTime<Utc>),
}

impl Literal {
    /// Whether the literal is numeric.
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Float(_) | Self::Rational(_))
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CompareOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
        }
    }
}

/// AND / OR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// Arithmetic and bitwise binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    /// `>>`
    ShiftRightArith,
    /// `>>>`
    ShiftRightLogical,
}

impl ArithOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::ShiftLeft => "<<",
            Self::ShiftRightArith => ">>",
            Self::ShiftRightLogical => ">>>",
        }
    }
}

/// Prefix arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `~x`
    BitNot,
}

impl UnaryOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::BitNot => "~",
        }
    }
}

/// String pattern-matching operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchOp {
    Like,
    Ilike,
    SimilarTo,
    /// `~`
    RegexMatch,
    /// `~*`
    RegexMatchCi,
}

impl MatchOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "LIKE",
            Self::Ilike => "ILIKE",
            Self::SimilarTo => "SIMILAR TO",
            Self::RegexMatch => "~",
            Self::RegexMatchCi => "~*",
        }
    }
}

/// The right-hand side of an `IS` test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IsKey {
    Null,
    NotNull,
    Missing,
    NotMissing,
    True,
    NotTrue,
    False,
    NotFalse,
}

impl IsKey {
    /// Returns the text following `IS`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::NotNull => "NOT NULL",
            Self::Missing => "MISSING",
            Self::NotMissing => "NOT MISSING",
            Self::True => "TRUE",
            Self::NotTrue => "NOT TRUE",
            Self::False => "FALSE",
            Self::NotFalse => "NOT FALSE",
        }
    }

    /// Returns the negated test.
    #[must_use]
    pub const fn negate(self) -> Self {
        match self {
            Self::Null => Self::NotNull,
            Self::NotNull => Self::Null,
            Self::Missing => Self::NotMissing,
            Self::NotMissing => Self::Missing,
            Self::True => Self::NotTrue,
            Self::NotTrue => Self::True,
            Self::False => Self::NotFalse,
            Self::NotFalse => Self::False,
        }
    }
}

/// Date/time builtin family together with its part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateFunc {
    /// `DATE_ADD(part, n, t)`
    Add(TimePart),
    /// `DATE_DIFF(part, a, b)`
    Diff(TimePart),
    /// `EXTRACT(part FROM t)`
    Extract(TimePart),
    /// `DATE_TRUNC(part, t)`
    Trunc(TimePart),
    /// `DATE_TRUNC(WEEK(day), t)`
    TruncWeek(Weekday),
}

impl DateFunc {
    /// The engine-level builtin name, e.g. `DATE_EXTRACT_MINUTE`.
    #[must_use]
    pub fn builtin_name(&self) -> String {
        match self {
            Self::Add(p) => format!("DATE_ADD_{p}"),
            Self::Diff(p) => format!("DATE_DIFF_{p}"),
            Self::Extract(p) => format!("DATE_EXTRACT_{p}"),
            Self::Trunc(p) => format!("DATE_TRUNC_{p}"),
            Self::TruncWeek(_) => String::from("DATE_TRUNC_DOW"),
        }
    }
}

/// One `WHEN ... THEN ...` arm of a CASE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseLimb {
    pub when: Expr,
    pub then: Expr,
}

/// A `'key': value` entry of a struct literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructField {
    pub key: String,
    pub value: Expr,
}

/// `OVER (PARTITION BY ... ORDER BY ...)`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Window {
    pub partition_by: Vec<Expr>,
    pub order_by: Vec<OrderBy>,
}

/// An aggregate or window function application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub op: AggregateOp,
    /// `None` for an empty argument list, `Some(Expr::Star)` for `*`.
    pub inner: Option<Expr>,
    /// APPROX_COUNT_DISTINCT precision.
    pub precision: Option<u8>,
    /// APPROX_PERCENTILE fraction in `[0, 1]`.
    pub percentile: Option<f64>,
    pub filter: Option<Expr>,
    pub over: Option<Window>,
}

impl Aggregate {
    /// Creates a plain aggregate over `inner`.
    #[must_use]
    pub const fn new(op: AggregateOp, inner: Option<Expr>) -> Self {
        Self {
            op,
            inner,
            precision: None,
            percentile: None,
            filter: None,
            over: None,
        }
    }
}

/// An expression node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Constant.
    Literal(Literal),
    /// Root of a path: a bare or quoted identifier.
    Ident(String),
    /// `*`
    Star,
    /// `inner.field`
    Dot { inner: Box<Expr>, field: String },
    /// `inner[offset]`
    Index { inner: Box<Expr>, offset: i64 },
    /// Logical negation.
    Not(Box<Expr>),
    /// `-x` / `~x`
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// `AND` / `OR`
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Comparison.
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Arithmetic or bitwise operation.
    Arith {
        op: ArithOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `expr LIKE 'pattern' [ESCAPE 'c']` and friends.
    Match {
        op: MatchOp,
        expr: Box<Expr>,
        pattern: String,
        escape: Option<String>,
    },
    /// `expr IS [NOT] NULL|MISSING|TRUE|FALSE`
    Is { expr: Box<Expr>, key: IsKey },
    /// `expr IN (c1, c2, ...)` over constants.
    Member { expr: Box<Expr>, values: Vec<Literal> },
    /// `expr IN (SELECT ...)`
    InSubquery { expr: Box<Expr>, select: Box<Select> },
    /// Searched CASE.
    Case {
        limbs: Vec<CaseLimb>,
        otherwise: Option<Box<Expr>>,
    },
    /// `CAST(expr AS type)`
    Cast { expr: Box<Expr>, to: CastType },
    /// Builtin or table function call; `name` is upper-case.
    Call { name: String, args: Vec<Expr> },
    /// Date/time builtin.
    Date { func: DateFunc, args: Vec<Expr> },
    /// Aggregate or window function.
    Aggregate(Box<Aggregate>),
    /// `{'k': v, ...}`
    Struct(Vec<StructField>),
    /// `[a, b, ...]`
    List(Vec<Expr>),
    /// `a ++ b ++ ...`
    Appended(Vec<Expr>),
    /// Sub-select.
    Select(Box<Select>),
    /// `left UNION [ALL] right`
    Union(Box<Union>),
    /// `UNPIVOT source [AS v] [AT k]`
    Unpivot(Box<Unpivot>),
}

impl Expr {
    /// Creates an identifier.
    #[must_use]
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident(name.into())
    }

    /// Creates an integer literal.
    #[must_use]
    pub const fn integer(value: i64) -> Self {
        Self::Literal(Literal::Integer(value))
    }

    /// Creates a string literal.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(Literal::String(value.into()))
    }

    /// Creates a boolean literal.
    #[must_use]
    pub const fn boolean(value: bool) -> Self {
        Self::Literal(Literal::Bool(value))
    }

    /// Creates a NULL literal.
    #[must_use]
    pub const fn null() -> Self {
        Self::Literal(Literal::Null)
    }

    /// Creates `self.field`.
    #[must_use]
    pub fn dot(self, field: impl Into<String>) -> Self {
        Self::Dot {
            inner: Box::new(self),
            field: field.into(),
        }
    }

    /// Creates `self[offset]`.
    #[must_use]
    pub fn index(self, offset: i64) -> Self {
        Self::Index {
            inner: Box::new(self),
            offset,
        }
    }

    /// Creates a comparison.
    #[must_use]
    pub fn compare(self, op: CompareOp, right: Self) -> Self {
        Self::Compare {
            op,
            left: Box::new(self),
            right: Box::new(right),
        }
    }

    /// Creates an equality comparison.
    #[must_use]
    pub fn eq(self, right: Self) -> Self {
        self.compare(CompareOp::Eq, right)
    }

    /// Creates an arithmetic expression.
    #[must_use]
    pub fn arith(self, op: ArithOp, right: Self) -> Self {
        Self::Arith {
            op,
            left: Box::new(self),
            right: Box::new(right),
        }
    }

    /// Creates an AND expression.
    #[must_use]
    pub fn and(self, right: Self) -> Self {
        Self::Logical {
            op: LogicalOp::And,
            left: Box::new(self),
            right: Box::new(right),
        }
    }

    /// Creates an OR expression.
    #[must_use]
    pub fn or(self, right: Self) -> Self {
        Self::Logical {
            op: LogicalOp::Or,
            left: Box::new(self),
            right: Box::new(right),
        }
    }

    /// Creates a logical negation.
    #[must_use]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Creates an `IS` test.
    #[must_use]
    pub fn is(self, key: IsKey) -> Self {
        Self::Is {
            expr: Box::new(self),
            key,
        }
    }

    /// Creates a builtin call.
    #[must_use]
    pub fn call(name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Call {
            name: name.into(),
            args,
        }
    }

    /// Returns the literal if this node is one.
    #[must_use]
    pub const fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// Returns the aggregate if this node is one.
    #[must_use]
    pub fn as_aggregate(&self) -> Option<&Aggregate> {
        match self {
            Self::Aggregate(agg) => Some(agg),
            _ => None,
        }
    }

    /// Visits this node and every node below it, depth first.
    ///
    /// Returning `false` from the visitor skips the children of that
    /// node.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Self) -> bool) {
        if !visit(self) {
            return;
        }
        match self {
            Self::Literal(_) | Self::Ident(_) | Self::Star => {}
            Self::Dot { inner, .. } | Self::Index { inner, .. } => inner.walk(visit),
            Self::Not(inner) | Self::Unary { operand: inner, .. } => inner.walk(visit),
            Self::Logical { left, right, .. }
            | Self::Compare { left, right, .. }
            | Self::Arith { left, right, .. } => {
                left.walk(visit);
                right.walk(visit);
            }
            Self::Match { expr, .. }
            | Self::Is { expr, .. }
            | Self::Member { expr, .. }
            | Self::Cast { expr, .. } => expr.walk(visit),
            Self::InSubquery { expr, select } => {
                expr.walk(visit);
                select.walk(visit);
            }
            Self::Case { limbs, otherwise } => {
                for limb in limbs {
                    limb.when.walk(visit);
                    limb.then.walk(visit);
                }
                if let Some(e) = otherwise {
                    e.walk(visit);
                }
            }
            Self::Call { args, .. }
            | Self::Date { args, .. }
            | Self::List(args)
            | Self::Appended(args) => {
                for arg in args {
                    arg.walk(visit);
                }
            }
            Self::Aggregate(agg) => {
                if let Some(inner) = &agg.inner {
                    inner.walk(visit);
                }
                if let Some(filter) = &agg.filter {
                    filter.walk(visit);
                }
                if let Some(window) = &agg.over {
                    for e in &window.partition_by {
                        e.walk(visit);
                    }
                    for o in &window.order_by {
                        o.column.walk(visit);
                    }
                }
            }
            Self::Struct(fields) => {
                for field in fields {
                    field.value.walk(visit);
                }
            }
            Self::Select(select) => select.walk(visit),
            Self::Union(union) => {
                union.left.walk(visit);
                union.right.walk(visit);
            }
            Self::Unpivot(unpivot) => unpivot.source.walk(visit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expr_builders() {
        let path = Expr::ident("x").dot("y").index(3);
        assert!(matches!(path, Expr::Index { offset: 3, .. }));

        let lit = Expr::integer(42);
        assert!(matches!(lit, Expr::Literal(Literal::Integer(42))));
    }

    #[test]
    fn test_expr_chaining() {
        let expr = Expr::ident("age")
            .compare(CompareOp::Gt, Expr::integer(18))
            .and(Expr::ident("status").eq(Expr::string("active")));

        assert!(matches!(
            expr,
            Expr::Logical {
                op: LogicalOp::And,
                ..
            }
        ));
    }

    #[test]
    fn test_is_key_negate() {
        assert_eq!(IsKey::Missing.negate(), IsKey::NotMissing);
        assert_eq!(IsKey::NotTrue.negate(), IsKey::True);
    }

    #[test]
    fn test_date_builtin_names() {
        assert_eq!(
            DateFunc::Extract(TimePart::Minute).builtin_name(),
            "DATE_EXTRACT_MINUTE"
        );
        assert_eq!(
            DateFunc::TruncWeek(Weekday::Monday).builtin_name(),
            "DATE_TRUNC_DOW"
        );
    }

    #[test]
    fn test_walk_counts_nodes() {
        let expr = Expr::ident("a").eq(Expr::integer(1)).not();
        let mut count = 0;
        expr.walk(&mut |_| {
            count += 1;
            true
        });
        assert_eq!(count, 4);
    }
}
