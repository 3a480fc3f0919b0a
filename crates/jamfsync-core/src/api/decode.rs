//! Envelope decoding with path-aware errors.
//!
//! Jamf wraps every payload under a resource-specific key (`{"computers": [...]}`,
//! `{"computer": {...}}`). Bodies are parsed into a `serde_json::Value` first so
//! that a failure can be reported with the envelope key and, for lists, the
//! index of the offending element.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::DecodeError;

const ROOT: &str = "$";

/// Decode a bare (unwrapped) JSON body.
pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, DecodeError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| DecodeError::Corrupted {
        path: ROOT.to_string(),
        detail: e.to_string(),
    })?;
    serde_json::from_value(value).map_err(|e| classify(e, ROOT.to_string()))
}

/// Decode a single object wrapped under `key`.
pub fn decode_envelope<T: DeserializeOwned>(body: &[u8], key: &str) -> Result<T, DecodeError> {
    let (value, path) = unwrap_envelope(body, key)?;
    serde_json::from_value(value).map_err(|e| classify(e, path))
}

/// Decode an array wrapped under `key`, element by element.
pub fn decode_list_envelope<T: DeserializeOwned>(
    body: &[u8],
    key: &str,
) -> Result<Vec<T>, DecodeError> {
    let (value, path) = unwrap_envelope(body, key)?;
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(DecodeError::TypeMismatch {
                expected: "an array".to_string(),
                found: describe(&other).to_string(),
                path,
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item).map_err(|e| classify(e, format!("{}[{}]", path, i)))
        })
        .collect()
}

fn unwrap_envelope(body: &[u8], key: &str) -> Result<(Value, String), DecodeError> {
    let root: Value = serde_json::from_slice(body).map_err(|e| DecodeError::Corrupted {
        path: ROOT.to_string(),
        detail: e.to_string(),
    })?;

    let mut object = match root {
        Value::Object(map) => map,
        other => {
            return Err(DecodeError::TypeMismatch {
                expected: "an object".to_string(),
                found: describe(&other).to_string(),
                path: ROOT.to_string(),
            })
        }
    };

    let path = format!("{}.{}", ROOT, key);
    match object.remove(key) {
        None => Err(DecodeError::KeyNotFound {
            key: key.to_string(),
            path: ROOT.to_string(),
        }),
        Some(Value::Null) => Err(DecodeError::ValueNotFound {
            path,
            expected: "a value".to_string(),
        }),
        Some(value) => Ok((value, path)),
    }
}

/// Map a serde data error onto the taxonomy.
///
/// serde_json only exposes the category of a data error through its message,
/// so the well-known prefixes emitted by serde's derive are matched here.
fn classify(err: serde_json::Error, path: String) -> DecodeError {
    let message = err.to_string();

    if let Some(rest) = message.strip_prefix("missing field `") {
        let key = rest.split('`').next().unwrap_or_default().to_string();
        return DecodeError::KeyNotFound { key, path };
    }

    if let Some(rest) = message.strip_prefix("invalid type: ") {
        if let Some(expected) = rest.strip_prefix("null, expected ") {
            return DecodeError::ValueNotFound {
                path,
                expected: expected.to_string(),
            };
        }
        if let Some((found, expected)) = rest.split_once(", expected ") {
            return DecodeError::TypeMismatch {
                expected: expected.to_string(),
                found: found.to_string(),
                path,
            };
        }
    }

    DecodeError::Other {
        path,
        detail: message,
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
