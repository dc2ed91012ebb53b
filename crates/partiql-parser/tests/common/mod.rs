#![allow(dead_code)]

use pretty_assertions::assert_eq;

use partiql_parser::ast::{codec, Expr, Query, Select};
use partiql_parser::{parse_str, ParseError};

pub fn parse(sql: &str) -> Query {
    parse_str(sql).unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e}"))
}

pub fn parse_err(sql: &str) -> ParseError {
    parse_str(sql).expect_err(&format!("Expected parse error for: {sql}"))
}

/// Asserts that parsing `sql` fails with a message containing `needle`.
pub fn assert_error_contains(sql: &str, needle: &str) {
    let err = parse_err(sql);
    let msg = err.to_string();
    assert!(
        msg.contains(needle),
        "Unexpected error for: {sql}\n  got:  {msg}\n  want: {needle}"
    );
}

pub fn parse_select(sql: &str) -> Select {
    match parse(sql).body {
        Expr::Select(s) => *s,
        other => panic!("Expected SELECT, got {other:?}"),
    }
}

/// The first projected expression of a single SELECT.
pub fn parse_column(sql: &str) -> Expr {
    let mut select = parse_select(sql);
    assert!(!select.columns.is_empty(), "no columns in: {sql}");
    select.columns.swap_remove(0).expr
}

/// Verifies that `sql` is already canonical: it renders back to itself,
/// re-parses to an equivalent tree and survives the binary encoding.
pub fn round_trip(sql: &str) {
    let query = parse(sql);
    assert_eq!(query.to_string(), sql);

    let reparsed = parse(&query.to_string());
    assert!(
        reparsed.equivalent(&query),
        "Re-parse changed the tree.\n  Input: {sql}\n  First:  {query:?}\n  Second: {reparsed:?}"
    );
    assert_binary_round_trip(&query);
}

/// Verifies that `sql` renders as `canonical`, and that `canonical` is a
/// fixed point.
pub fn normalizes_to(sql: &str, canonical: &str) {
    let query = parse(sql);
    assert_eq!(query.to_string(), canonical, "normalizing: {sql}");
    let again = parse(canonical);
    assert_eq!(again.to_string(), canonical);
    assert!(again.equivalent(&query));
    assert_binary_round_trip(&query);
}

/// Encodes the query body and decodes it back.
pub fn assert_binary_round_trip(query: &Query) {
    let bytes = codec::encode(&query.body).expect("encode");
    let decoded: Expr = codec::decode(&bytes).expect("decode");
    assert!(
        decoded.equivalent(&query.body),
        "Binary round trip changed the tree: {query}"
    );
}

/// Small deterministic xorshift generator for fuzz-style tests.
pub struct XorShift(u64);

impl XorShift {
    pub const fn new(seed: u64) -> Self {
        Self(seed | 1)
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    pub fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}
