//! Abstract Syntax Tree (AST) types for queries.

pub mod codec;
mod display;
mod equivalence;
mod expression;
mod statement;
mod types;

pub use display::{format_float, format_timestamp, quote_id, Precedence};
pub use expression::{
    Aggregate, ArithOp, CaseLimb, CompareOp, DateFunc, Expr, IsKey, Literal, LogicalOp, MatchOp,
    Rational, StructField, UnaryOp, Window,
};
pub use statement::{
    Binding, Cte, Distinct, FromClause, Join, OrderBy, Query, Select, Union, Unpivot,
};
pub use types::{
    AggregateOp, CastType, ExplainFormat, JoinKind, NullOrdering, OrderDirection, TimePart,
    UnionKind, Weekday, APPROX_COUNT_DISTINCT_DEFAULT_PRECISION,
    APPROX_COUNT_DISTINCT_MAX_PRECISION, APPROX_COUNT_DISTINCT_MIN_PRECISION,
};
