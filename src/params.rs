use serde_json::{Map, Value};
use url::form_urlencoded;

/// Parameters keyed by name. Values are strings, or lists of strings for
/// repeated keys; a pre-decoded mapping may carry any JSON value.
pub type Params = Map<String, Value>;

/// Input accepted by [`crate::QueryParser::parse`]
#[derive(Debug, Clone)]
pub enum RawQuery<'a> {
    /// `application/x-www-form-urlencoded` text, with or without a leading `?`
    Encoded(&'a str),
    /// Parameters already decoded by the caller, used unchanged
    Params(Params),
}

impl<'a> From<&'a str> for RawQuery<'a> {
    fn from(query: &'a str) -> Self {
        Self::Encoded(query)
    }
}

impl<'a> From<&'a String> for RawQuery<'a> {
    fn from(query: &'a String) -> Self {
        Self::Encoded(query)
    }
}

impl From<Params> for RawQuery<'_> {
    fn from(params: Params) -> Self {
        Self::Params(params)
    }
}

impl RawQuery<'_> {
    #[must_use]
    pub fn into_params(self) -> Params {
        match self {
            Self::Encoded(query) => decode_params(query),
            Self::Params(params) => params,
        }
    }
}

/// Decodes a query string; the first repeat of a key turns its value into a
/// two-element list, later repeats append.
#[must_use]
pub fn decode_params(query: &str) -> Params {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut params = Params::new();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let value = Value::String(value.into_owned());
        match params.get_mut(&*key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                params.insert(key.into_owned(), value);
            }
        }
    }

    params
}
