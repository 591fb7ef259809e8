//! # Value Casting
//!
//! Every filter value arrives as text. Casting turns it into a typed JSON
//! value, either through an explicit `caster(arg)` call or through a fixed
//! chain of heuristics:
//!
//! | step | input | result |
//! |------|-------|--------|
//! | explicit cast | `string(123)` | `"123"` |
//! | multi-value | `a,b` or `/a/,/b/i` | list of casts |
//! | field caster | `castParams.zip = "string"` | caster output |
//! | regex | `/^jo/i` | `{"$regex": "^jo", "$options": "i"}` |
//! | boolean | `true` | `true` |
//! | null | `null` | `null` |
//! | number | `42`, `-1.5`, `1e3` | number (`007` is not a number) |
//! | date | `2021-01-01T10:00Z` | `{"$date": ...}` |
//! | fallback | anything else | string |
//!
//! The order is part of the contract: an earlier match always wins.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::Value;
use std::{collections::HashMap, fmt, sync::Arc, sync::LazyLock};

use crate::value::{MAX_SAFE_INTEGER, coerce_number, date_value, number_value, regex_value};

static REGEX_PARTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/.*?/[igm]*").expect("valid regex part pattern"));

static REGEX_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/(.*)/([igm]*)$").expect("valid regex literal pattern"));

static LEADING_ZERO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0[0-9]+").expect("valid leading zero pattern"));

static DATE_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[12]\d{3}(-(0[1-9]|1[0-2])(-(0[1-9]|[12][0-9]|3[01]))?)(T| )?(([01][0-9]|2[0-3]):[0-5]\d(:[0-5]\d(\.\d+)?)?(Z|[+-]\d{2}:\d{2})?)?$",
    )
    .expect("valid date pattern")
});

/// Converts a text token, with optional flags, into a value.
///
/// Closures with the matching signature implement this trait, so custom
/// casters are usually plain functions:
///
/// ```rust
/// use api_query_params::casting::CasterRegistry;
/// use serde_json::{Value, json};
///
/// let mut casters = CasterRegistry::default();
/// casters.register("upper", |value: &str, _flags: Option<&str>| json!(value.to_uppercase()));
/// assert_eq!(casters.cast("upper", "abc", None), Some(json!("ABC")));
/// ```
pub trait Caster: Send + Sync {
    fn cast(&self, value: &str, flags: Option<&str>) -> Value;
}

impl<F> Caster for F
where
    F: Fn(&str, Option<&str>) -> Value + Send + Sync,
{
    fn cast(&self, value: &str, flags: Option<&str>) -> Value {
        self(value, flags)
    }
}

/// Casters every registry starts with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinCaster {
    Boolean,
    Date,
    Null,
    Number,
    Regex,
    String,
}

impl BuiltinCaster {
    pub const ALL: [Self; 6] = [
        Self::Boolean,
        Self::Date,
        Self::Null,
        Self::Number,
        Self::Regex,
        Self::String,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Null => "null",
            Self::Number => "number",
            Self::Regex => "regex",
            Self::String => "string",
        }
    }
}

impl Caster for BuiltinCaster {
    fn cast(&self, value: &str, flags: Option<&str>) -> Value {
        match self {
            Self::Boolean => Value::Bool(value == "true"),
            Self::Date => parse_date(value).map_or_else(
                || {
                    tracing::debug!(value, "Unparseable date cast to null");
                    Value::Null
                },
                date_value,
            ),
            Self::Null => Value::Null,
            Self::Number => coerce_number(value).map_or(Value::Null, number_value),
            Self::Regex => regex_value(value, flags),
            Self::String => Value::String(value.to_string()),
        }
    }
}

/// Named casters available to explicit `name(arg)` syntax, `castParams`
/// and the heuristic chain
#[derive(Clone)]
pub struct CasterRegistry {
    casters: HashMap<String, Arc<dyn Caster>>,
}

impl Default for CasterRegistry {
    fn default() -> Self {
        let casters = BuiltinCaster::ALL
            .into_iter()
            .map(|builtin| (builtin.name().to_string(), Arc::new(builtin) as Arc<dyn Caster>))
            .collect();
        Self { casters }
    }
}

impl fmt::Debug for CasterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.casters.keys().collect();
        names.sort();
        f.debug_struct("CasterRegistry").field("casters", &names).finish()
    }
}

impl CasterRegistry {
    /// Adds a caster, replacing any caster (built-in included) of the same name
    pub fn register(&mut self, name: impl Into<String>, caster: impl Caster + 'static) {
        self.casters.insert(name.into(), Arc::new(caster));
    }

    /// Applies the caster registered as `name`, if any
    #[must_use]
    pub fn cast(&self, name: &str, value: &str, flags: Option<&str>) -> Option<Value> {
        self.casters.get(name).map(|caster| caster.cast(value, flags))
    }

    /// Applies a built-in by name, honouring overrides
    fn apply(&self, builtin: BuiltinCaster, value: &str, flags: Option<&str>) -> Value {
        self.cast(builtin.name(), value, flags)
            .unwrap_or_else(|| builtin.cast(value, flags))
    }
}

/// Casts raw tokens for one parse call
pub struct ValueCaster<'a> {
    casters: &'a CasterRegistry,
    cast_params: &'a HashMap<String, String>,
}

impl<'a> ValueCaster<'a> {
    #[must_use]
    pub fn new(casters: &'a CasterRegistry, cast_params: &'a HashMap<String, String>) -> Self {
        Self {
            casters,
            cast_params,
        }
    }

    /// Casts `value`, parsed from the parameter named `field`.
    #[must_use]
    pub fn cast(&self, value: &str, field: &str) -> Value {
        if let Some(cast) = self.explicit_cast(value) {
            return cast;
        }

        let parts = split_parts(value);
        if parts.len() > 1 {
            return Value::Array(parts.into_iter().map(|part| self.cast(part, field)).collect());
        }

        if let Some(cast) = self
            .cast_params
            .get(field)
            .and_then(|name| self.casters.cast(name, value, None))
        {
            return cast;
        }

        if let Some(captures) = REGEX_LITERAL.captures(value) {
            return self
                .casters
                .apply(BuiltinCaster::Regex, &captures[1], Some(&captures[2]));
        }

        if value == "true" || value == "false" {
            return self.casters.apply(BuiltinCaster::Boolean, value, None);
        }

        if value == "null" {
            return self.casters.apply(BuiltinCaster::Null, value, None);
        }

        if is_numeric(value) {
            return self.casters.apply(BuiltinCaster::Number, value, None);
        }

        if DATE_LITERAL.is_match(value) {
            return self.casters.apply(BuiltinCaster::Date, value, None);
        }

        self.casters.apply(BuiltinCaster::String, value, None)
    }

    /// `name(arg)` with a registered `name` and no `)` inside `arg`
    fn explicit_cast(&self, value: &str) -> Option<Value> {
        let (name, rest) = value.split_once('(')?;
        let argument = rest.strip_suffix(')')?;
        if argument.contains(')') {
            return None;
        }
        self.casters.cast(name, argument, None)
    }
}

/// Embedded `/pattern/flags` tokens when there are any, comma-separated parts otherwise
fn split_parts(value: &str) -> Vec<&str> {
    let regexes: Vec<&str> = REGEX_PARTS.find_iter(value).map(|m| m.as_str()).collect();
    if regexes.is_empty() {
        value.split(',').collect()
    } else {
        regexes
    }
}

fn is_numeric(value: &str) -> bool {
    coerce_number(value).is_some_and(|number| number.is_finite() && number.abs() <= MAX_SAFE_INTEGER)
        && !LEADING_ZERO.is_match(value)
}

/// Dates without an offset are read as UTC
fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let normalized = value.trim().replacen(' ', "T", 1);
    let normalized = match normalized.strip_suffix('Z') {
        Some(local) => format!("{local}+00:00"),
        None => normalized,
    };

    for format in ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"] {
        if let Ok(date) = DateTime::parse_from_str(&normalized, format) {
            return Some(date.with_timezone(&Utc));
        }
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(date) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Some(date.and_utc());
        }
    }

    let day = if normalized.len() == 7 {
        format!("{normalized}-01")
    } else {
        normalized
    };
    NaiveDate::parse_from_str(&day, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| date.and_utc())
}
