//! Case-insensitive keyword table.
//!
//! Two lookup strategies share one declarative word list: a table
//! bucketed by word length and first letter ([`lookup`], used by the
//! lexer), and a sorted table keyed by a packed 5-bit-per-letter code
//! ([`lookup_by_code`]). Neither allocates.

use once_cell::sync::Lazy;

use super::Keyword;
use crate::ast::AggregateOp;

/// What a reserved word lexes as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Keyword(Keyword),
    Aggregate(AggregateOp),
}

const AGGREGATES: [(&str, AggregateOp); 22] = [
    ("COUNT", AggregateOp::Count),
    ("SUM", AggregateOp::Sum),
    ("AVG", AggregateOp::Avg),
    ("MIN", AggregateOp::Min),
    ("MAX", AggregateOp::Max),
    ("BIT_AND", AggregateOp::BitAnd),
    ("BIT_OR", AggregateOp::BitOr),
    ("BIT_XOR", AggregateOp::BitXor),
    ("BOOL_AND", AggregateOp::BoolAnd),
    ("EVERY", AggregateOp::BoolAnd),
    ("BOOL_OR", AggregateOp::BoolOr),
    ("EARLIEST", AggregateOp::Earliest),
    ("LATEST", AggregateOp::Latest),
    ("APPROX_COUNT_DISTINCT", AggregateOp::ApproxCountDistinct),
    ("SYSTEM_DATASHAPE", AggregateOp::SystemDatashape),
    ("ROW_NUMBER", AggregateOp::RowNumber),
    ("RANK", AggregateOp::Rank),
    ("DENSE_RANK", AggregateOp::DenseRank),
    ("STDDEV_POP", AggregateOp::StdDevPop),
    ("STDDEV", AggregateOp::StdDevPop),
    ("VARIANCE_POP", AggregateOp::VariancePop),
    ("VARIANCE", AggregateOp::VariancePop),
];

type Entry = (&'static str, Terminal);

/// Every reserved spelling with its terminal.
pub fn entries() -> impl Iterator<Item = Entry> {
    Keyword::ALL
        .into_iter()
        .map(|kw| (kw.as_str(), Terminal::Keyword(kw)))
        .chain(
            AGGREGATES
                .into_iter()
                .map(|(name, op)| (name, Terminal::Aggregate(op))),
        )
}

/// Buckets indexed by word length, each sorted by first letter.
static BY_LENGTH: Lazy<Vec<Vec<Entry>>> = Lazy::new(|| {
    let longest = entries().map(|(name, _)| name.len()).max().unwrap_or(0);
    let mut buckets = vec![Vec::new(); longest + 1];
    for entry in entries() {
        buckets[entry.0.len()].push(entry);
    }
    for bucket in &mut buckets {
        bucket.sort_by_key(|(name, _)| name.as_bytes().first().copied());
    }
    buckets
});

/// Looks up a word, ignoring ASCII case.
#[must_use]
pub fn lookup(word: &[u8]) -> Option<Terminal> {
    let bucket = BY_LENGTH.get(word.len())?;
    let first = word.first()?.to_ascii_uppercase();
    let start = bucket.partition_point(|(name, _)| name.as_bytes().first() < Some(&first));
    bucket[start..]
        .iter()
        .take_while(|(name, _)| name.as_bytes().first() == Some(&first))
        .find(|(name, _)| name.as_bytes().eq_ignore_ascii_case(word))
        .map(|&(_, terminal)| terminal)
}

/// Whether `word` is reserved and must be quoted to be used as an
/// identifier.
#[must_use]
pub fn is_keyword(word: &str) -> bool {
    lookup(word.as_bytes()).is_some()
}

/// Longest word a 64-bit code can hold.
const MAX_CODE_LEN: usize = 12;

const fn char_code(b: u8) -> Option<u64> {
    match b {
        b'a'..=b'z' => Some((b - b'a') as u64 + 1),
        b'A'..=b'Z' => Some((b - b'A') as u64 + 1),
        b'_' => Some(27),
        b'0'..=b'3' => Some((b - b'0') as u64 + 28),
        _ => None,
    }
}

/// Packs a short word into an integer, 5 bits per character, folding
/// case. Returns `None` for words that cannot be encoded.
#[must_use]
pub fn word_code(word: &[u8]) -> Option<u64> {
    if word.len() > MAX_CODE_LEN {
        return None;
    }
    word.iter()
        .try_fold(0_u64, |code, &b| Some((code << 5) | char_code(b)?))
}

struct CodeTable {
    /// Sorted by code.
    codes: Vec<(u64, Terminal)>,
    /// Words without a code, compared directly.
    long: Vec<Entry>,
}

static BY_CODE: Lazy<CodeTable> = Lazy::new(|| {
    let mut codes = Vec::new();
    let mut long = Vec::new();
    for (name, terminal) in entries() {
        match word_code(name.as_bytes()) {
            Some(code) => codes.push((code, terminal)),
            None => long.push((name, terminal)),
        }
    }
    codes.sort_unstable_by_key(|&(code, _)| code);
    CodeTable { codes, long }
});

/// Same contract as [`lookup`], via binary search over word codes.
#[must_use]
pub fn lookup_by_code(word: &[u8]) -> Option<Terminal> {
    let table = &*BY_CODE;
    match word_code(word) {
        Some(code) => table
            .codes
            .binary_search_by_key(&code, |&(c, _)| c)
            .ok()
            .map(|i| table.codes[i].1),
        None => table
            .long
            .iter()
            .find(|(name, _)| name.as_bytes().eq_ignore_ascii_case(word))
            .map(|&(_, terminal)| terminal),
    }
}
