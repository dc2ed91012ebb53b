//! Structural equivalence that ignores numeric representation.
//!
//! `1`, `1.0` and the rational `2/2` are the same constant; everything
//! else must match exactly.

use super::expression::{Expr, Literal};
use super::statement::{Distinct, FromClause, Query, Select};

/// Largest magnitude (exclusive) an `f64` may have to convert to `i64`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn normalize_literal(lit: &mut Literal) {
    match *lit {
        #[allow(clippy::cast_possible_truncation)]
        Literal::Float(v) if v.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&v) => {
            *lit = Literal::Integer(v as i64);
        }
        Literal::Rational(r) if r.is_integer() => *lit = Literal::Integer(r.num),
        Literal::Rational(r) => *lit = Literal::Float(r.to_f64()),
        _ => {}
    }
}

fn normalize_expr(expr: &mut Expr) {
    match expr {
        Expr::Literal(lit) => normalize_literal(lit),
        Expr::Ident(_) | Expr::Star => {}
        Expr::Dot { inner, .. } | Expr::Index { inner, .. } => normalize_expr(inner),
        Expr::Not(inner) | Expr::Unary { operand: inner, .. } => normalize_expr(inner),
        Expr::Logical { left, right, .. }
        | Expr::Compare { left, right, .. }
        | Expr::Arith { left, right, .. } => {
            normalize_expr(left);
            normalize_expr(right);
        }
        Expr::Match { expr, .. } | Expr::Is { expr, .. } | Expr::Cast { expr, .. } => {
            normalize_expr(expr);
        }
        Expr::Member { expr, values } => {
            normalize_expr(expr);
            values.iter_mut().for_each(normalize_literal);
        }
        Expr::InSubquery { expr, select } => {
            normalize_expr(expr);
            normalize_select(select);
        }
        Expr::Case { limbs, otherwise } => {
            for limb in limbs {
                normalize_expr(&mut limb.when);
                normalize_expr(&mut limb.then);
            }
            if let Some(e) = otherwise {
                normalize_expr(e);
            }
        }
        Expr::Call { args, .. }
        | Expr::Date { args, .. }
        | Expr::List(args)
        | Expr::Appended(args) => args.iter_mut().for_each(normalize_expr),
        Expr::Aggregate(agg) => {
            if let Some(inner) = &mut agg.inner {
                normalize_expr(inner);
            }
            if let Some(filter) = &mut agg.filter {
                normalize_expr(filter);
            }
            if let Some(window) = &mut agg.over {
                window.partition_by.iter_mut().for_each(normalize_expr);
                for order in &mut window.order_by {
                    normalize_expr(&mut order.column);
                }
            }
        }
        Expr::Struct(fields) => {
            for field in fields {
                normalize_expr(&mut field.value);
            }
        }
        Expr::Select(select) => normalize_select(select),
        Expr::Union(union) => {
            normalize_expr(&mut union.left);
            normalize_expr(&mut union.right);
        }
        Expr::Unpivot(unpivot) => normalize_expr(&mut unpivot.source),
    }
}

fn normalize_from(from: &mut FromClause) {
    match from {
        FromClause::Table(binding) => normalize_expr(&mut binding.expr),
        FromClause::Join(join) => {
            normalize_from(&mut join.left);
            normalize_expr(&mut join.right.expr);
            if let Some(on) = &mut join.on {
                normalize_expr(on);
            }
        }
    }
}

fn normalize_select(select: &mut Select) {
    if let Distinct::On(exprs) = &mut select.distinct {
        exprs.iter_mut().for_each(normalize_expr);
    }
    for column in &mut select.columns {
        normalize_expr(&mut column.expr);
    }
    if let Some(from) = &mut select.from {
        normalize_from(from);
    }
    if let Some(e) = &mut select.where_clause {
        normalize_expr(e);
    }
    for binding in &mut select.group_by {
        normalize_expr(&mut binding.expr);
    }
    if let Some(e) = &mut select.having {
        normalize_expr(e);
    }
    for order in &mut select.order_by {
        normalize_expr(&mut order.column);
    }
}

impl Expr {
    /// Whether two trees are equal up to numeric literal representation.
    #[must_use]
    pub fn equivalent(&self, other: &Self) -> bool {
        let mut left = self.clone();
        let mut right = other.clone();
        normalize_expr(&mut left);
        normalize_expr(&mut right);
        left == right
    }
}

impl Query {
    /// Whether two queries are equal up to numeric literal representation.
    #[must_use]
    pub fn equivalent(&self, other: &Self) -> bool {
        let mut left = self.clone();
        let mut right = other.clone();
        for query in [&mut left, &mut right] {
            for cte in &mut query.with {
                normalize_select(&mut cte.select);
            }
            if let Some(into) = &mut query.into {
                normalize_expr(into);
            }
            normalize_expr(&mut query.body);
        }
        left == right
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Rational;

    #[test]
    fn test_numbers_compare_by_value() {
        let int = Expr::ident("x").eq(Expr::integer(2));
        let float = Expr::ident("x").eq(Expr::Literal(Literal::Float(2.0)));
        let ratio = Expr::ident("x").eq(Expr::Literal(Literal::Rational(Rational {
            num: 2,
            den: 1,
        })));
        assert!(int.equivalent(&float));
        assert!(int.equivalent(&ratio));
        assert_ne!(int, float);
    }

    #[test]
    fn test_structure_still_matters() {
        let a = Expr::ident("x").eq(Expr::integer(2));
        let b = Expr::ident("y").eq(Expr::integer(2));
        let c = Expr::ident("x").eq(Expr::Literal(Literal::Float(2.5)));
        assert!(!a.equivalent(&b));
        assert!(!a.equivalent(&c));
    }

    #[test]
    fn test_non_integral_rational_matches_float() {
        let ratio = Expr::Literal(Literal::Rational(Rational { num: 1, den: 4 }));
        let float = Expr::Literal(Literal::Float(0.25));
        assert!(ratio.equivalent(&float));
    }
}
