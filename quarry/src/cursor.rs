//! Opaque keyset cursors
//!
//! A cursor is `base64(json(sort values))` of the last row on a page. It has
//! no server-side lifetime and stays valid as long as the ordering of the
//! underlying data does not shift.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

/// Encode a sort-key tuple
pub fn encode(sort_values: &[Value]) -> String {
    let json = serde_json::to_string(sort_values).unwrap_or_default();
    STANDARD.encode(json)
}

/// Decode a cursor back into its sort-key tuple.
///
/// Anything that isn't base64 of a JSON array yields `None`.
pub fn decode(cursor: &str) -> Option<Vec<Value>> {
    let cursor = cursor.trim();
    if cursor.is_empty() {
        return None;
    }
    let bytes = STANDARD.decode(cursor).ok()?;
    match serde_json::from_slice(&bytes).ok()? {
        Value::Array(values) => Some(values),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_known_encoding() {
        assert_eq!(encode(&[json!(1), json!("a")]), "WzEsImEiXQ==");
        assert_eq!(decode("WzEsImEiXQ=="), Some(vec![json!(1), json!("a")]));
    }

    #[test]
    fn test_malformed_is_none() {
        assert_eq!(decode(""), None);
        assert_eq!(decode("not base64!!"), None);
        // base64 of `{"a":1}`: valid JSON but not a tuple
        assert_eq!(decode("eyJhIjoxfQ=="), None);
        // base64 of `[1,`
        assert_eq!(decode("WzEs"), None);
    }
}
