//! Compact binary encoding of parsed queries.
//!
//! The payload is a one-byte format version followed by the bincode
//! serialization of the tree.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Current format version.
pub const FORMAT_VERSION: u8 = 1;

/// Errors from [`encode`] and [`decode`].
#[derive(Debug, Error)]
pub enum CodecError {
    /// The input was empty.
    #[error("empty input")]
    Empty,
    /// The version byte is not one this build understands.
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u8),
    /// Serialization or deserialization failed.
    #[error("bincode: {0}")]
    Bincode(#[from] bincode::Error),
}

/// Encodes a tree (usually a `Query` or an `Expr`).
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    let mut out = vec![FORMAT_VERSION];
    bincode::serialize_into(&mut out, value)?;
    Ok(out)
}

/// Decodes a tree produced by [`encode`].
///
/// # Errors
///
/// Returns an error on an empty buffer, an unknown version, or a
/// malformed payload.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    let (&version, payload) = bytes.split_first().ok_or(CodecError::Empty)?;
    if version != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }
    Ok(bincode::deserialize(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Binding, Expr, Query, Select};

    fn sample() -> Query {
        Query {
            explain: crate::ast::ExplainFormat::None,
            with: Vec::new(),
            into: None,
            body: Expr::Select(Box::new(Select {
                columns: vec![Binding::named(Expr::ident("x").dot("y"), "z")],
                where_clause: Some(Expr::ident("x").eq(Expr::string("hi"))),
                limit: Some(10),
                ..Select::default()
            })),
        }
    }

    #[test]
    fn test_encode_decode() {
        let query = sample();
        let bytes = encode(&query).unwrap();
        assert_eq!(bytes[0], FORMAT_VERSION);
        let back: Query = decode(&bytes).unwrap();
        assert_eq!(back, query);
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(matches!(decode::<Query>(&[]), Err(CodecError::Empty)));
        assert!(matches!(
            decode::<Query>(&[9, 0, 0]),
            Err(CodecError::UnsupportedVersion(9))
        ));
        let mut bytes = encode(&sample()).unwrap();
        bytes.truncate(bytes.len() / 2);
        assert!(matches!(decode::<Query>(&bytes), Err(CodecError::Bincode(_))));
    }
}
