//! Query-level AST types.

use serde::{Deserialize, Serialize};

use super::expression::Expr;
use super::types::{ExplainFormat, JoinKind, NullOrdering, OrderDirection, UnionKind};

/// An expression with an optional explicit `AS` name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl Binding {
    /// Creates an unnamed binding.
    #[must_use]
    pub const fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    /// Creates a binding with an explicit name.
    #[must_use]
    pub fn named(expr: Expr, alias: impl Into<String>) -> Self {
        Self {
            expr,
            alias: Some(alias.into()),
        }
    }
}

/// An ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: Expr,
    pub direction: OrderDirection,
    pub nulls: NullOrdering,
}

/// A join of the sources to its left with one more binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub kind: JoinKind,
    pub left: FromClause,
    pub right: Binding,
    pub on: Option<Expr>,
}

/// The FROM clause: a single binding or a left-deep join tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FromClause {
    Table(Binding),
    Join(Box<Join>),
}

/// DISTINCT mode of a SELECT.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Distinct {
    /// Plain SELECT.
    #[default]
    All,
    /// `SELECT DISTINCT`
    Distinct,
    /// `SELECT DISTINCT ON (...)`
    On(Vec<Expr>),
}

/// A SELECT-FROM-WHERE block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Select {
    pub distinct: Distinct,
    pub columns: Vec<Binding>,
    pub from: Option<FromClause>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Binding>,
    pub having: Option<Expr>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Select {
    /// Whether the projection is exactly `*`.
    #[must_use]
    pub fn is_star(&self) -> bool {
        matches!(self.columns.as_slice(), [Binding { expr: Expr::Star, alias: None }])
    }

    /// Visits every expression of the block, depth first.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Expr) -> bool) {
        if let Distinct::On(exprs) = &self.distinct {
            for e in exprs {
                e.walk(visit);
            }
        }
        for column in &self.columns {
            column.expr.walk(visit);
        }
        if let Some(from) = &self.from {
            from.walk(visit);
        }
        if let Some(e) = &self.where_clause {
            e.walk(visit);
        }
        for binding in &self.group_by {
            binding.expr.walk(visit);
        }
        if let Some(e) = &self.having {
            e.walk(visit);
        }
        for order in &self.order_by {
            order.column.walk(visit);
        }
    }
}

impl FromClause {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Expr) -> bool) {
        match self {
            Self::Table(binding) => binding.expr.walk(visit),
            Self::Join(join) => {
                join.left.walk(visit);
                join.right.expr.walk(visit);
                if let Some(on) = &join.on {
                    on.walk(visit);
                }
            }
        }
    }
}

/// `left UNION [ALL] right`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Union {
    pub kind: UnionKind,
    pub left: Expr,
    pub right: Expr,
}

/// `UNPIVOT source [AS value_alias] [AT key_alias]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unpivot {
    pub source: Expr,
    pub as_alias: Option<String>,
    pub at_alias: Option<String>,
}

/// A `WITH name AS (SELECT ...)` binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cte {
    pub name: String,
    pub select: Select,
}

/// A complete parsed query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub explain: ExplainFormat,
    pub with: Vec<Cte>,
    /// `SELECT ... INTO target` of the outermost SELECT.
    pub into: Option<Expr>,
    /// A `Select` or a `Union` tree of selects.
    pub body: Expr,
}
