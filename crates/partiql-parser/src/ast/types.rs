//! Closed enumerations used by AST nodes: aggregate operators, cast
//! targets, date/time parts, and query-level modes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Aggregate (and window) operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateOp {
    /// COUNT(x) or COUNT(*).
    Count,
    /// COUNT(DISTINCT x).
    CountDistinct,
    /// SUM.
    Sum,
    /// AVG.
    Avg,
    /// MIN.
    Min,
    /// MAX.
    Max,
    /// BIT_AND.
    BitAnd,
    /// BIT_OR.
    BitOr,
    /// BIT_XOR.
    BitXor,
    /// BOOL_AND (also spelled EVERY).
    BoolAnd,
    /// BOOL_OR.
    BoolOr,
    /// EARLIEST.
    Earliest,
    /// LATEST.
    Latest,
    /// APPROX_COUNT_DISTINCT with a precision parameter.
    ApproxCountDistinct,
    /// APPROX_PERCENTILE with a percentile parameter.
    ApproxPercentile,
    /// SYSTEM_DATASHAPE(*).
    SystemDatashape,
    /// ROW_NUMBER.
    RowNumber,
    /// RANK.
    Rank,
    /// DENSE_RANK.
    DenseRank,
    /// STDDEV_POP (also spelled STDDEV).
    StdDevPop,
    /// VARIANCE_POP (also spelled VARIANCE).
    VariancePop,
}

impl AggregateOp {
    /// Returns the canonical SQL name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "COUNT",
            Self::CountDistinct => "COUNT DISTINCT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::BitAnd => "BIT_AND",
            Self::BitOr => "BIT_OR",
            Self::BitXor => "BIT_XOR",
            Self::BoolAnd => "BOOL_AND",
            Self::BoolOr => "BOOL_OR",
            Self::Earliest => "EARLIEST",
            Self::Latest => "LATEST",
            Self::ApproxCountDistinct => "APPROX_COUNT_DISTINCT",
            Self::ApproxPercentile => "APPROX_PERCENTILE",
            Self::SystemDatashape => "SYSTEM_DATASHAPE",
            Self::RowNumber => "ROW_NUMBER",
            Self::Rank => "RANK",
            Self::DenseRank => "DENSE_RANK",
            Self::StdDevPop => "STDDEV_POP",
            Self::VariancePop => "VARIANCE_POP",
        }
    }

    /// Whether the operator can be combined with DISTINCT.
    #[must_use]
    pub const fn accepts_distinct(&self) -> bool {
        matches!(
            self,
            Self::Count
                | Self::CountDistinct
                | Self::Min
                | Self::Max
                | Self::Earliest
                | Self::Latest
        )
    }

    /// Whether the operator can take `*` as its argument.
    #[must_use]
    pub const fn accepts_star(&self) -> bool {
        matches!(self, Self::Count | Self::SystemDatashape)
    }

    /// Whether the operator can take an arbitrary expression.
    #[must_use]
    pub const fn accepts_expression(&self) -> bool {
        !matches!(self, Self::SystemDatashape)
    }

    /// Ranking functions are called with an empty argument list.
    #[must_use]
    pub const fn is_ranking(&self) -> bool {
        matches!(self, Self::RowNumber | Self::Rank | Self::DenseRank)
    }
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Smallest precision accepted by APPROX_COUNT_DISTINCT.
pub const APPROX_COUNT_DISTINCT_MIN_PRECISION: i64 = 4;
/// Largest precision accepted by APPROX_COUNT_DISTINCT.
pub const APPROX_COUNT_DISTINCT_MAX_PRECISION: i64 = 16;
/// Precision used when APPROX_COUNT_DISTINCT has no second argument.
pub const APPROX_COUNT_DISTINCT_DEFAULT_PRECISION: u8 = 11;

/// Target type of a CAST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastType {
    Integer,
    Float,
    Boolean,
    Null,
    Missing,
    Timestamp,
    String,
    Decimal,
    Struct,
    List,
    Symbol,
}

impl CastType {
    const ALL: [Self; 11] = [
        Self::Integer,
        Self::Float,
        Self::Boolean,
        Self::Null,
        Self::Missing,
        Self::Timestamp,
        Self::String,
        Self::Decimal,
        Self::Struct,
        Self::List,
        Self::Symbol,
    ];

    /// Returns the SQL spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Float => "FLOAT",
            Self::Boolean => "BOOLEAN",
            Self::Null => "NULL",
            Self::Missing => "MISSING",
            Self::Timestamp => "TIMESTAMP",
            Self::String => "STRING",
            Self::Decimal => "DECIMAL",
            Self::Struct => "STRUCT",
            Self::List => "LIST",
            Self::Symbol => "SYMBOL",
        }
    }

    /// Case-insensitive lookup of a type name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
    }
}

/// A date/time component used by the date functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimePart {
    Microsecond,
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    /// Day of week.
    Dow,
    /// Day of year.
    Doy,
    Week,
    Month,
    Quarter,
    Year,
}

impl TimePart {
    /// Returns the canonical spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Microsecond => "MICROSECOND",
            Self::Millisecond => "MILLISECOND",
            Self::Second => "SECOND",
            Self::Minute => "MINUTE",
            Self::Hour => "HOUR",
            Self::Day => "DAY",
            Self::Dow => "DOW",
            Self::Doy => "DOY",
            Self::Week => "WEEK",
            Self::Month => "MONTH",
            Self::Quarter => "QUARTER",
            Self::Year => "YEAR",
        }
    }

    /// Case-insensitive lookup; the plural forms of the sub-second
    /// parts are accepted too.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        let part = match upper.as_str() {
            "MICROSECOND" | "MICROSECONDS" => Self::Microsecond,
            "MILLISECOND" | "MILLISECONDS" => Self::Millisecond,
            "SECOND" => Self::Second,
            "MINUTE" => Self::Minute,
            "HOUR" => Self::Hour,
            "DAY" => Self::Day,
            "DOW" => Self::Dow,
            "DOY" => Self::Doy,
            "WEEK" => Self::Week,
            "MONTH" => Self::Month,
            "QUARTER" => Self::Quarter,
            "YEAR" => Self::Year,
            _ => return None,
        };
        Some(part)
    }
}

impl fmt::Display for TimePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day of the week; the discriminant is the value passed to
/// `DATE_TRUNC_DOW`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl Weekday {
    /// Returns the canonical spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sunday => "SUNDAY",
            Self::Monday => "MONDAY",
            Self::Tuesday => "TUESDAY",
            Self::Wednesday => "WEDNESDAY",
            Self::Thursday => "THURSDAY",
            Self::Friday => "FRIDAY",
            Self::Saturday => "SATURDAY",
        }
    }

    /// Case-insensitive lookup of a weekday name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::Sunday,
            Self::Monday,
            Self::Tuesday,
            Self::Wednesday,
            Self::Thursday,
            Self::Friday,
            Self::Saturday,
        ]
        .into_iter()
        .find(|d| d.as_str().eq_ignore_ascii_case(name))
    }
}

/// Output mode requested by `EXPLAIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExplainFormat {
    /// Not an EXPLAIN query.
    #[default]
    None,
    /// `EXPLAIN` without a format.
    Default,
    Text,
    List,
    Graphviz,
}

impl ExplainFormat {
    /// Returns the name rendered after `EXPLAIN AS`, if any.
    #[must_use]
    pub const fn as_str(&self) -> Option<&'static str> {
        match self {
            Self::None | Self::Default => None,
            Self::Text => Some("text"),
            Self::List => Some("list"),
            Self::Graphviz => Some("graphviz"),
        }
    }

    /// Maps the word after `EXPLAIN AS` to a format.
    ///
    /// The empty string means "no EXPLAIN". Names are case-insensitive.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "" => Some(Self::None),
            "default" => Some(Self::Default),
            "text" => Some(Self::Text),
            "list" => Some(Self::List),
            "gv" | "graphviz" => Some(Self::Graphviz),
            _ => None,
        }
    }
}

/// Join flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinKind {
    /// `JOIN` / `INNER JOIN`.
    Inner,
    /// `LEFT [OUTER] JOIN`.
    Left,
    /// `RIGHT [OUTER] JOIN`.
    Right,
    /// `FULL [OUTER] JOIN`.
    Full,
    /// `CROSS JOIN` or a comma.
    Cross,
}

impl JoinKind {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }
}

/// `UNION` vs `UNION ALL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnionKind {
    Distinct,
    All,
}

impl UnionKind {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Distinct => "UNION",
            Self::All => "UNION ALL",
        }
    }
}

/// Order direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderDirection {
    /// Ascending order (default).
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl OrderDirection {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Null ordering for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NullOrdering {
    /// NULLs come first (default).
    #[default]
    First,
    /// NULLs come last.
    Last,
}

impl NullOrdering {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::First => "NULLS FIRST",
            Self::Last => "NULLS LAST",
        }
    }
}
