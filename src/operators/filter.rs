use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use crate::casting::ValueCaster;
use crate::errors::QueryError;
use crate::literal::parse_object_literal;
use crate::models::Filter;
use crate::params::Params;
use crate::value::{as_date, as_regex, is_truthy, param_text};

static FILTER_PARAMETER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(!?)([^><!=]+)([><]=?|!?=|)(.*)$").expect("valid filter parameter pattern")
});

/// Canonical operator codes of a filter condition map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Exists,
    In,
    Nin,
    Not,
}

impl Operator {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Ne => "$ne",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::Exists => "$exists",
            Self::In => "$in",
            Self::Nin => "$nin",
            Self::Not => "$not",
        }
    }
}

/// Maps a comparison symbol; anything unrecognized, the empty symbol
/// included, means "field exists"
#[must_use]
pub fn parse_operator(symbol: &str) -> Operator {
    match symbol {
        "=" => Operator::Eq,
        "!=" => Operator::Ne,
        ">" => Operator::Gt,
        ">=" => Operator::Gte,
        "<" => Operator::Lt,
        "<=" => Operator::Lte,
        _ => Operator::Exists,
    }
}

/// Allow and deny lists for filter fields
#[derive(Debug, Clone, Copy)]
pub struct FieldRules<'a> {
    /// Configured blacklist plus every reserved key
    pub blacklist: &'a [String],
    pub whitelist: Option<&'a [String]>,
}

impl FieldRules<'_> {
    fn allows(&self, field: &str) -> bool {
        !self.blacklist.iter().any(|denied| denied == field)
            && self
                .whitelist
                .is_none_or(|allowed| allowed.iter().any(|name| name == field))
    }
}

/// One leftover parameter, split and cast
#[derive(Debug, Clone, PartialEq)]
struct Condition {
    negated: bool,
    field: String,
    operator: Operator,
    value: Value,
}

fn parse_condition(subject: &str, caster: &ValueCaster<'_>) -> Result<Condition, QueryError> {
    let captures = FILTER_PARAMETER
        .captures(subject)
        .ok_or_else(|| QueryError::malformed_parameter(subject))?;

    let field = &captures[2];
    Ok(Condition {
        negated: &captures[1] == "!",
        field: field.to_string(),
        operator: parse_operator(&captures[3]),
        value: caster.cast(&captures[4], field),
    })
}

/// Turns the explicit `filter` parameter into the starting object
fn parse_filter(filter: Option<&Value>) -> Result<Filter, QueryError> {
    match filter {
        None => Ok(Filter::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(Value::String(text)) => parse_object_literal(text).ok_or_else(|| {
            tracing::warn!(filter = %text, "Invalid filter syntax");
            QueryError::invalid_filter(text.as_str())
        }),
        Some(other) => Err(QueryError::invalid_filter(other.to_string())),
    }
}

/// Builds the filter from the explicit `filter` value and every
/// non-reserved parameter.
///
/// ```text
/// age>18&age<65      → {"age": {"$gt": 18, "$lt": 65}}
/// name=John          → {"name": "John"}
/// tags=a,b           → {"tags": {"$in": ["a", "b"]}}
/// status!=a,b        → {"status": {"$nin": ["a", "b"]}}
/// name!=/^jo/i       → {"name": {"$not": {"$regex": "^jo", "$options": "i"}}}
/// deleted / !deleted → {"deleted": {"$exists": true}} / {"$exists": false}
/// ```
///
/// # Errors
///
/// `InvalidFilter` when a text `filter` is not a JSON object, and
/// `MalformedParameter` when a parameter does not fit `[!]field[op][value]`.
pub fn build_filter(
    filter: Option<&Value>,
    params: &Params,
    reserved: &[&str],
    rules: FieldRules<'_>,
    caster: &ValueCaster<'_>,
) -> Result<Filter, QueryError> {
    let mut result = parse_filter(filter)?;

    for (key, value) in params {
        if reserved.contains(&key.as_str()) {
            continue;
        }

        let subject = if is_truthy(value) {
            format!("{key}={}", param_text(value))
        } else {
            key.clone()
        };

        let condition = parse_condition(&subject, caster)?;
        if !rules.allows(&condition.field) {
            tracing::debug!(field = %condition.field, "Filter field not allowed, dropping");
            continue;
        }

        apply_condition(&mut result, condition);
    }

    Ok(result)
}

/// Dates and regexes are objects too, but compare as plain values
fn is_typed_literal(value: &Value) -> bool {
    as_date(value).is_some() || as_regex(value).is_some()
}

fn apply_condition(result: &mut Filter, condition: Condition) {
    let Condition {
        negated,
        field,
        operator,
        value,
    } = condition;

    let equals = |scalar: Value| Map::from_iter([(Operator::Eq.code().to_string(), scalar)]);
    let mut conditions = match result.get_mut(&field).map(Value::take) {
        None => Map::new(),
        Some(existing) if is_typed_literal(&existing) => equals(existing),
        Some(Value::Object(map)) => map,
        Some(scalar) => equals(scalar),
    };

    let entry = if value.is_array() {
        let code = if operator == Operator::Ne {
            Operator::Nin
        } else {
            Operator::In
        };
        conditions.insert(code.code().to_string(), value);
        Value::Object(conditions)
    } else if operator == Operator::Exists {
        conditions.insert(operator.code().to_string(), Value::Bool(!negated));
        Value::Object(conditions)
    } else if operator == Operator::Eq && conditions.is_empty() {
        value
    } else if operator == Operator::Ne && value.is_object() {
        conditions.insert(Operator::Not.code().to_string(), value);
        Value::Object(conditions)
    } else {
        conditions.insert(operator.code().to_string(), value);
        Value::Object(conditions)
    };

    result.insert(field, entry);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::casting::CasterRegistry;
    use crate::params::decode_params;
    use serde_json::json;
    use std::collections::HashMap;

    const RESERVED: [&str; 6] = ["populate", "fields", "sort", "skip", "limit", "filter"];

    fn filter_with(query: &str, blacklist: &[String], whitelist: Option<&[String]>) -> Result<Value, QueryError> {
        let params = decode_params(query);
        let casters = CasterRegistry::default();
        let cast_params = HashMap::new();
        let caster = ValueCaster::new(&casters, &cast_params);
        let rules = FieldRules { blacklist, whitelist };
        build_filter(params.get("filter"), &params, &RESERVED, rules, &caster).map(Value::Object)
    }

    fn filter(query: &str) -> Value {
        filter_with(query, &[], None).unwrap()
    }

    // ========================================================================
    // Operator mapping
    // ========================================================================

    #[test]
    fn test_parse_operator() {
        assert_eq!(parse_operator("="), Operator::Eq);
        assert_eq!(parse_operator("!="), Operator::Ne);
        assert_eq!(parse_operator(">"), Operator::Gt);
        assert_eq!(parse_operator(">="), Operator::Gte);
        assert_eq!(parse_operator("<"), Operator::Lt);
        assert_eq!(parse_operator("<="), Operator::Lte);
        assert_eq!(parse_operator(""), Operator::Exists);
        assert_eq!(parse_operator("=>"), Operator::Exists);
    }

    // ========================================================================
    // Conditions
    // ========================================================================

    #[test]
    fn test_equality_collapses() {
        assert_eq!(filter("name=John"), json!({"name": "John"}));
        assert_eq!(filter("age=18"), json!({"age": 18}));
    }

    #[test]
    fn test_range() {
        assert_eq!(filter("age>18&age<65"), json!({"age": {"$gt": 18, "$lt": 65}}));
        assert_eq!(filter("age>=18&age<=65"), json!({"age": {"$gte": 18, "$lte": 65}}));
    }

    #[test]
    fn test_not_equal() {
        assert_eq!(filter("status!=archived"), json!({"status": {"$ne": "archived"}}));
    }

    #[test]
    fn test_lists_become_membership() {
        assert_eq!(filter("tags=a,b"), json!({"tags": {"$in": ["a", "b"]}}));
        assert_eq!(filter("tags!=a,b"), json!({"tags": {"$nin": ["a", "b"]}}));
        assert_eq!(filter("id=1&id=2"), json!({"id": {"$in": [1, 2]}}));
        assert_eq!(filter("age>1,2"), json!({"age": {"$in": [1, 2]}}));
    }

    #[test]
    fn test_exists() {
        assert_eq!(filter("phone"), json!({"phone": {"$exists": true}}));
        assert_eq!(filter("!phone"), json!({"phone": {"$exists": false}}));
        assert_eq!(filter("phone="), json!({"phone": {"$exists": true}}));
    }

    #[test]
    fn test_not_equal_object_is_negated() {
        assert_eq!(
            filter("name!=/^jo/i"),
            json!({"name": {"$not": {"$regex": "^jo", "$options": "i"}}})
        );
    }

    #[test]
    fn test_regex_equality_collapses() {
        assert_eq!(filter("name=/^jo/i"), json!({"name": {"$regex": "^jo", "$options": "i"}}));
    }

    #[test]
    fn test_collapsed_scalar_is_wrapped() {
        assert_eq!(filter("age=18&age!=20"), json!({"age": {"$eq": 18, "$ne": 20}}));
        assert_eq!(filter("name=x&name>a"), json!({"name": {"$eq": "x", "$gt": "a"}}));
    }

    #[test]
    fn test_collapsed_date_is_wrapped() {
        assert_eq!(
            filter("created=2021-01-01&created<2022-01-01"),
            json!({"created": {
                "$eq": {"$date": "2021-01-01T00:00:00.000Z"},
                "$lt": {"$date": "2022-01-01T00:00:00.000Z"}
            }})
        );
    }

    #[test]
    fn test_collapsed_regex_is_wrapped() {
        assert_eq!(
            filter("name=/a/&name>m"),
            json!({"name": {"$eq": {"$regex": "a"}, "$gt": "m"}})
        );
        assert_eq!(
            filter("name=/^jo/i&name%3C=z"),
            json!({"name": {"$eq": {"$regex": "^jo", "$options": "i"}, "$lte": "z"}})
        );
    }

    #[test]
    fn test_equality_after_operator_is_nested() {
        assert_eq!(filter("age>1&age=5"), json!({"age": {"$gt": 1, "$eq": 5}}));
    }

    #[test]
    fn test_negation_prefix_only_affects_exists() {
        assert_eq!(filter("!name=John"), json!({"name": "John"}));
    }

    #[test]
    fn test_bare_comparison_key() {
        assert_eq!(filter("price%3C10"), json!({"price": {"$lt": 10}}));
    }

    #[test]
    fn test_field_position_is_kept() {
        let result = filter("a=1&b=2&a>0");
        let keys: Vec<_> = result.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    // ========================================================================
    // Explicit filter parameter
    // ========================================================================

    #[test]
    fn test_json_filter_is_the_base() {
        assert_eq!(
            filter(r#"filter={"status":"active"}&age>18"#),
            json!({"status": "active", "age": {"$gt": 18}})
        );
    }

    #[test]
    fn test_json_filter_operators_are_extended() {
        assert_eq!(
            filter(r#"filter={"age":{"$gt":18}}&age<65"#),
            json!({"age": {"$gt": 18, "$lt": 65}})
        );
    }

    #[test]
    fn test_invalid_filter_text_is_an_error() {
        let err = filter_with("filter=oops", &[], None).unwrap_err();
        assert_eq!(err, QueryError::invalid_filter("oops"));
        let err = filter_with("filter=[1]", &[], None).unwrap_err();
        assert_eq!(err, QueryError::invalid_filter("[1]"));
    }

    #[test]
    fn test_structured_filter_is_used_as_is() {
        let base = json!({"age": {"$gt": 18}, "name": "John"});
        let params = Params::new();
        let casters = CasterRegistry::default();
        let cast_params = HashMap::new();
        let caster = ValueCaster::new(&casters, &cast_params);
        let rules = FieldRules { blacklist: &[], whitelist: None };
        let result = build_filter(Some(&base), &params, &RESERVED, rules, &caster).unwrap();
        assert_eq!(Value::Object(result), base);
    }

    #[test]
    fn test_non_object_structured_filter_is_an_error() {
        let params = Params::new();
        let casters = CasterRegistry::default();
        let cast_params = HashMap::new();
        let caster = ValueCaster::new(&casters, &cast_params);
        let rules = FieldRules { blacklist: &[], whitelist: None };
        let result = build_filter(Some(&json!([1])), &params, &RESERVED, rules, &caster);
        assert_eq!(result, Err(QueryError::invalid_filter("[1]")));
    }

    // ========================================================================
    // Field rules and grammar errors
    // ========================================================================

    #[test]
    fn test_reserved_keys_are_skipped() {
        assert_eq!(filter("sort=-age&limit=10&name=x"), json!({"name": "x"}));
    }

    #[test]
    fn test_blacklist() {
        let blacklist = vec!["password".to_string()];
        let result = filter_with("password=x&price%3C10&name=a", &blacklist, None).unwrap();
        assert_eq!(result, json!({"price": {"$lt": 10}, "name": "a"}));
    }

    #[test]
    fn test_blacklist_applies_to_parsed_field() {
        let blacklist = vec!["price".to_string()];
        let result = filter_with("price%3C10&price>=2", &blacklist, None).unwrap();
        assert_eq!(result, json!({}));
    }

    #[test]
    fn test_whitelist() {
        let whitelist = vec!["name".to_string()];
        let result = filter_with("name=a&age=3&secret", &[], Some(whitelist.as_slice())).unwrap();
        assert_eq!(result, json!({"name": "a"}));
    }

    #[test]
    fn test_malformed_parameter_is_an_error() {
        let err = filter_with("=5", &[], None).unwrap_err();
        assert_eq!(err, QueryError::malformed_parameter("=5"));
        let err = filter_with("%3E3", &[], None).unwrap_err();
        assert_eq!(err, QueryError::malformed_parameter(">3"));
    }

    #[test]
    fn test_multiline_value_matches() {
        assert_eq!(filter("note=a%0Ab"), json!({"note": "a\nb"}));
    }
}
