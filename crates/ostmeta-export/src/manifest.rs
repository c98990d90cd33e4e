//! Manifest canonicalization.

use serde_json::Value;

/// Recursively sorts every object's keys, leaving array order untouched.
///
/// Objects are unordered in the source format while arrays are semantically
/// ordered, so this is the identity on meaning and makes output byte-stable.
pub fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Parses manifest bytes and canonicalizes the result.
pub fn parse_and_canonicalize(bytes: &[u8]) -> serde_json::Result<Value> {
    serde_json::from_slice(bytes).map(canonicalize)
}
