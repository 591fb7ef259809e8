use serde_json::{Map, Value};

/// Tries to read `text` as a JSON literal. `None` means "not a literal";
/// callers decide the fallback.
#[must_use]
pub fn parse_literal(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

/// A JSON object literal, or `None`
#[must_use]
pub fn parse_object_literal(text: &str) -> Option<Map<String, Value>> {
    match parse_literal(text)? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
