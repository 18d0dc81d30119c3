//! Response body decoding
//!
//! Normalizes a stored body into a record list. Malformed bodies decode to an
//! empty list and are logged, never returned as errors.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Decode a stored body into records.
///
/// Accepts a JSON-encoded string, an object whose `data` field is a non-empty
/// list, or a non-empty list. Anything else yields an empty list.
pub fn decode<T: DeserializeOwned>(raw: &Value) -> Vec<T> {
    let parsed;
    let value = match raw {
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(v) => {
                parsed = v;
                &parsed
            }
            Err(e) => {
                warn!(error = %e, "response body is not valid JSON");
                return Vec::new();
            }
        },
        other => other,
    };

    let list = match value {
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(items)) if !items.is_empty() => items,
            _ => return Vec::new(),
        },
        Value::Array(items) if !items.is_empty() => items,
        _ => return Vec::new(),
    };

    serde_json::from_value::<Vec<T>>(Value::Array(list.clone())).unwrap_or_else(|e| {
        warn!(error = %e, "response body records have an unexpected shape");
        Vec::new()
    })
}
