//! Helpers around `serde_json::Value`, the value model of every descriptor.
//!
//! JSON has no date or regular expression type, so both use the extended
//! JSON shapes document stores understand:
//!
//! ```json
//! {"$date": "2021-01-01T00:00:00.000Z"}
//! {"$regex": "^jo", "$options": "i"}
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde_json::{Map, Number, Value};
use std::sync::LazyLock;

pub const DATE_KEY: &str = "$date";
pub const REGEX_KEY: &str = "$regex";
pub const REGEX_OPTIONS_KEY: &str = "$options";

/// 2^53 - 1, the largest integer an IEEE double represents exactly
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

static DECIMAL_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$").expect("valid decimal pattern")
});

#[must_use]
pub fn regex_value(pattern: &str, flags: Option<&str>) -> Value {
    let mut map = Map::new();
    map.insert(REGEX_KEY.to_string(), Value::String(pattern.to_string()));
    if let Some(flags) = flags.filter(|flags| !flags.is_empty()) {
        map.insert(REGEX_OPTIONS_KEY.to_string(), Value::String(flags.to_string()));
    }
    Value::Object(map)
}

/// Returns `(pattern, flags)` when `value` is a regex produced by [`regex_value`]
#[must_use]
pub fn as_regex(value: &Value) -> Option<(&str, &str)> {
    let map = value.as_object()?;
    let pattern = map.get(REGEX_KEY)?.as_str()?;
    let flags = map
        .get(REGEX_OPTIONS_KEY)
        .and_then(Value::as_str)
        .unwrap_or_default();
    Some((pattern, flags))
}

#[must_use]
pub fn date_value(date: DateTime<Utc>) -> Value {
    let mut map = Map::new();
    map.insert(
        DATE_KEY.to_string(),
        Value::String(date.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    Value::Object(map)
}

#[must_use]
pub fn as_date(value: &Value) -> Option<DateTime<Utc>> {
    let text = value.as_object()?.get(DATE_KEY)?.as_str()?;
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/// Integral numbers inside the safe range become JSON integers so `"18"`
/// serializes as `18` rather than `18.0`. Non-finite numbers become `null`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn number_value(number: f64) -> Value {
    if number.fract() == 0.0 && number.abs() <= MAX_SAFE_INTEGER {
        return Value::Number(Number::from(number as i64));
    }
    Number::from_f64(number).map_or(Value::Null, Value::Number)
}

/// Lenient numeric conversion: surrounding whitespace is ignored, empty text
/// is `0`, and `0x`/`0o`/`0b` prefixes, exponents and `Infinity` are accepted.
///
/// Returns `None` for anything else.
#[must_use]
pub fn coerce_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }

    match trimmed {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            return parse_radix(digits, radix);
        }
    }

    if DECIMAL_LITERAL.is_match(trimmed) {
        return trimmed.parse::<f64>().ok();
    }
    None
}

#[allow(clippy::cast_precision_loss)]
fn parse_radix(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    // Digits are valid; only an overflowing value can fail, and those are
    // far outside the safe range anyway.
    Some(u128::from_str_radix(digits, radix).map_or(f64::INFINITY, |n| n as f64))
}

/// Whether a parameter carries a value: `""`, `0`, `false` and `null` do not
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text form of a parameter value: lists join with commas, other
/// non-string values use their JSON text
#[must_use]
pub fn param_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(param_text).collect::<Vec<_>>().join(","),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
