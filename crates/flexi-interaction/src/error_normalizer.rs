//! Turns backend error bodies into one user-facing line.

use serde_json::Value;

const FALLBACK_MESSAGE: &str = "An error occurred";

/// Builds the message shown for a non-success response.
///
/// JSON payloads are searched for `detail`, `error`, `message` and then the
/// first of `non_field_errors`; anything else is shown as compact JSON. A
/// body that is not JSON at all becomes `HTTP <status>: <reason>`.
pub fn normalize_error_message(status: u16, reason: &str, body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(payload) => message_from_payload(&payload),
        Err(_) => format!("HTTP {}: {}", status, reason),
    }
}

pub fn message_from_payload(payload: &Value) -> String {
    for key in ["detail", "error", "message"] {
        if let Some(text) = payload.get(key).and_then(as_text) {
            return text;
        }
    }

    if let Some(text) = payload
        .get("non_field_errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
        .and_then(as_text)
    {
        return text;
    }

    match payload {
        Value::Null => FALLBACK_MESSAGE.to_string(),
        other => serde_json::to_string(other).unwrap_or_else(|_| FALLBACK_MESSAGE.to_string()),
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => serde_json::to_string(other).ok(),
    }
}
