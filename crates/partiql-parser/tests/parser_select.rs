//! Tests for SELECT structure: projections, FROM sources and joins,
//! clauses, CTEs, unions and EXPLAIN.

mod common;
use common::*;

use partiql_parser::ast::{
    Binding, Distinct, ExplainFormat, Expr, FromClause, JoinKind, Literal, NullOrdering,
    OrderDirection, UnionKind,
};
use pretty_assertions::assert_eq;

// ===================================================================
// Projection
// ===================================================================

#[test]
fn star_projection() {
    let s = parse_select("SELECT * FROM t");
    assert!(s.is_star());
    assert_eq!(s.distinct, Distinct::All);
}

#[test]
fn aliased_columns() {
    let s = parse_select(r#"SELECT a AS x, b, c.d AS "select" FROM t"#);
    let aliases: Vec<_> = s.columns.iter().map(|c| c.alias.as_deref()).collect();
    assert_eq!(aliases, [Some("x"), None, Some("select")]);
}

#[test]
fn alias_may_be_a_keyword_after_as() {
    let s = parse_select("SELECT x AS join FROM t AS from");
    assert_eq!(s.columns[0].alias.as_deref(), Some("join"));
    let Some(FromClause::Table(source)) = s.from else {
        panic!("expected a single source");
    };
    assert_eq!(source.alias.as_deref(), Some("from"));
}

#[test]
fn distinct_forms() {
    assert_eq!(parse_select("SELECT DISTINCT x FROM t").distinct, Distinct::Distinct);
    assert_eq!(
        parse_select("SELECT DISTINCT ON (a, b) x FROM t").distinct,
        Distinct::On(vec![Expr::ident("a"), Expr::ident("b")])
    );
    let s = parse_select("SELECT DISTINCT ON (x) * FROM table");
    assert!(s.is_star());
}

#[test]
fn select_without_from() {
    let s = parse_select("SELECT 1, 'two'");
    assert!(s.from.is_none());
    assert_eq!(s.columns[1].expr, Expr::string("two"));
}

// ===================================================================
// FROM
// ===================================================================

fn single_source(sql: &str) -> Binding {
    match parse_select(sql).from {
        Some(FromClause::Table(binding)) => binding,
        other => panic!("expected a single source, got {other:?}"),
    }
}

#[test]
fn from_sources() {
    assert_eq!(single_source("SELECT * FROM db.t").expr, Expr::ident("db").dot("t"));
    assert_eq!(single_source("SELECT * FROM 'first'").expr, Expr::string("first"));
    assert_eq!(
        single_source("SELECT * FROM read_file('x.json')").expr,
        Expr::call("READ_FILE", vec![Expr::string("x.json")])
    );
    assert!(matches!(
        single_source("SELECT * FROM (SELECT x FROM y) AS s").expr,
        Expr::Select(_)
    ));
    assert!(matches!(
        single_source("SELECT * FROM [1, 2]").expr,
        Expr::List(items) if items.len() == 2
    ));
}

#[test]
fn join_kinds() {
    for (sql, kind) in [
        ("SELECT * FROM a JOIN b ON TRUE", JoinKind::Inner),
        ("SELECT * FROM a INNER JOIN b ON TRUE", JoinKind::Inner),
        ("SELECT * FROM a LEFT JOIN b ON TRUE", JoinKind::Left),
        ("SELECT * FROM a LEFT OUTER JOIN b ON TRUE", JoinKind::Left),
        ("SELECT * FROM a RIGHT OUTER JOIN b ON TRUE", JoinKind::Right),
        ("SELECT * FROM a FULL JOIN b ON TRUE", JoinKind::Full),
        ("SELECT * FROM a full outer join b ON TRUE", JoinKind::Full),
        ("SELECT * FROM a CROSS JOIN b", JoinKind::Cross),
        ("SELECT * FROM a, b", JoinKind::Cross),
    ] {
        let Some(FromClause::Join(join)) = parse_select(sql).from else {
            panic!("expected a join: {sql}");
        };
        assert_eq!(join.kind, kind, "{sql}");
        assert_eq!(join.on.is_some(), kind != JoinKind::Cross, "{sql}");
    }
}

#[test]
fn comma_join_renders_as_cross_join() {
    normalizes_to(
        "SELECT * FROM a AS x, b AS y",
        "SELECT * FROM a AS x CROSS JOIN b AS y",
    );
}

#[test]
fn outer_and_full_stay_identifiers_in_paths() {
    round_trip("SELECT t.outer, t.full FROM t");
    round_trip("SELECT full FROM outer");
}

#[test]
fn joins_are_left_deep() {
    let Some(FromClause::Join(top)) =
        parse_select("SELECT * FROM a JOIN b ON p LEFT JOIN c ON q").from
    else {
        panic!("expected a join");
    };
    assert_eq!(top.kind, JoinKind::Left);
    assert_eq!(top.right.expr, Expr::ident("c"));
    assert!(matches!(&top.left, FromClause::Join(inner) if inner.kind == JoinKind::Inner));
}

#[test]
fn unpivot_aliases() {
    let source = single_source("SELECT k, v FROM UNPIVOT t AT k AS v");
    let Expr::Unpivot(unpivot) = source.expr else {
        panic!("expected UNPIVOT");
    };
    assert_eq!(unpivot.source, Expr::ident("t"));
    assert_eq!(unpivot.as_alias.as_deref(), Some("v"));
    assert_eq!(unpivot.at_alias.as_deref(), Some("k"));
}

// ===================================================================
// Clauses
// ===================================================================

#[test]
fn group_by_having() {
    let s = parse_select("SELECT x, COUNT(*) FROM t GROUP BY x AS g, y HAVING COUNT(*) > 1");
    assert_eq!(s.group_by.len(), 2);
    assert_eq!(s.group_by[0].alias.as_deref(), Some("g"));
    assert!(s.having.is_some());
}

#[test]
fn order_by_defaults() {
    let s = parse_select("SELECT x FROM t ORDER BY a, b DESC, c NULLS LAST");
    let got: Vec<_> = s.order_by.iter().map(|o| (o.direction, o.nulls)).collect();
    assert_eq!(
        got,
        [
            (OrderDirection::Asc, NullOrdering::First),
            (OrderDirection::Desc, NullOrdering::First),
            (OrderDirection::Asc, NullOrdering::Last),
        ]
    );
}

#[test]
fn limit_and_offset() {
    let s = parse_select("SELECT x FROM t LIMIT 10 OFFSET 20");
    assert_eq!((s.limit, s.offset), (Some(10), Some(20)));
    round_trip("SELECT x FROM t LIMIT 0");
}

#[test]
fn into_is_lifted_to_the_query() {
    let q = parse("SELECT x INTO db.out FROM db.in");
    assert_eq!(q.into, Some(Expr::ident("db").dot("out")));
    let Expr::Select(s) = q.body else {
        panic!("expected SELECT");
    };
    assert_eq!(s.from.map(|f| f.to_string()).as_deref(), Some("db.\"in\""));
}

// ===================================================================
// Query level
// ===================================================================

#[test]
fn ctes_in_order() {
    let q = parse("WITH a AS (SELECT 1), b AS (SELECT x FROM a) SELECT * FROM b");
    let names: Vec<_> = q.with.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["a", "b"]);
    assert_eq!(
        q.with[0].select.columns[0].expr,
        Expr::Literal(Literal::Integer(1))
    );
}

#[test]
fn unions_are_left_deep() {
    let q = parse("SELECT a FROM x UNION SELECT b FROM y UNION ALL SELECT c FROM z");
    let Expr::Union(top) = q.body else {
        panic!("expected UNION");
    };
    assert_eq!(top.kind, UnionKind::All);
    assert!(matches!(top.right, Expr::Select(_)));
    assert!(matches!(&top.left, Expr::Union(u) if u.kind == UnionKind::Distinct));
}

#[test]
fn union_into_renders_in_first_arm() {
    round_trip("SELECT a INTO db.t FROM x UNION ALL SELECT b FROM y");
}

#[test]
fn explain_formats() {
    for (sql, format) in [
        ("SELECT 1", ExplainFormat::None),
        ("EXPLAIN SELECT 1", ExplainFormat::Default),
        ("EXPLAIN AS default SELECT 1", ExplainFormat::Default),
        ("EXPLAIN AS TEXT SELECT 1", ExplainFormat::Text),
        ("EXPLAIN AS list SELECT 1", ExplainFormat::List),
        ("EXPLAIN AS gv SELECT 1", ExplainFormat::Graphviz),
        ("EXPLAIN AS graphviz SELECT 1", ExplainFormat::Graphviz),
    ] {
        assert_eq!(parse(sql).explain, format, "{sql}");
    }
}

#[test]
fn subquery_union_is_parenthesized() {
    round_trip("SELECT * FROM (SELECT a FROM x UNION SELECT b FROM y) AS u");
}
