use std::sync::Arc;

use serde_json::Value;

use crate::casting::ValueCaster;
use crate::errors::QueryError;
use crate::models::{Filter, QueryDescriptor};
use crate::operators::{
    FieldRules, build_filter, build_population, build_projection, build_sort, merge_projection,
};
use crate::options::{QueryOperator, QueryOptions};
use crate::params::{Params, RawQuery};
use crate::value::{coerce_number, is_truthy, param_text};

/// Turns raw queries into [`QueryDescriptor`]s.
///
/// The parser only holds its options, so it is cheap to clone and can be
/// shared between handlers as axum state.
#[derive(Debug, Clone, Default)]
pub struct QueryParser {
    options: Arc<QueryOptions>,
}

impl QueryParser {
    #[must_use]
    pub fn new(options: QueryOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    #[must_use]
    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Parses an encoded query string or a decoded parameter map.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidFilter`] when the filter parameter is text
    /// but not a JSON object, and [`QueryError::MalformedParameter`] when a
    /// filter parameter does not fit `[!]field[op][value]`.
    pub fn parse<'a>(&self, query: impl Into<RawQuery<'a>>) -> Result<QueryDescriptor, QueryError> {
        let params = query.into().into_params();
        let options = &*self.options;

        let mut descriptor = QueryDescriptor::default();
        let mut blacklist = options.blacklist.clone();
        let mut reserved = Vec::with_capacity(QueryOperator::ALL.len());

        for operator in QueryOperator::ALL {
            let key = options.key_for(operator);
            blacklist.push(key.to_string());
            reserved.push(key);

            let value = params.get(key).filter(|value| is_truthy(value));
            let Some(value) = value else {
                if operator == QueryOperator::Filter {
                    descriptor.filter = Some(self.filter(None, &params, &reserved, &blacklist)?);
                }
                continue;
            };

            match operator {
                QueryOperator::Population => {
                    descriptor.population = Some(build_population(&param_text(value)));
                }
                QueryOperator::Projection => {
                    descriptor.projection = Some(build_projection(&param_text(value)));
                }
                QueryOperator::Sort => descriptor.sort = Some(build_sort(&param_text(value))),
                QueryOperator::Skip => {
                    descriptor.skip = Some(coerce_number(&param_text(value)).unwrap_or(f64::NAN));
                }
                QueryOperator::Limit => {
                    descriptor.limit = Some(coerce_number(&param_text(value)).unwrap_or(f64::NAN));
                }
                QueryOperator::Filter => {
                    descriptor.filter = Some(self.filter(Some(value), &params, &reserved, &blacklist)?);
                }
            }
        }

        if let (Some(projection), Some(population)) =
            (descriptor.projection.as_mut(), descriptor.population.as_mut())
        {
            merge_projection(projection, population);
        }

        Ok(descriptor)
    }

    fn filter(
        &self,
        filter: Option<&Value>,
        params: &Params,
        reserved: &[&str],
        blacklist: &[String],
    ) -> Result<Filter, QueryError> {
        let caster = ValueCaster::new(&self.options.casters, &self.options.cast_params);
        let rules = FieldRules {
            blacklist,
            whitelist: self.options.whitelist.as_deref(),
        };
        build_filter(filter, params, reserved, rules, &caster)
    }
}

/// Parses `query` with default options.
///
/// ```rust
/// use api_query_params::parse_query;
/// use serde_json::json;
///
/// let descriptor = parse_query("status=active&age>18&sort=-age&limit=10").unwrap();
/// assert_eq!(
///     serde_json::to_value(&descriptor).unwrap(),
///     json!({
///         "sort": {"age": -1},
///         "limit": 10,
///         "filter": {"status": "active", "age": {"$gt": 18}}
///     })
/// );
/// ```
///
/// # Errors
///
/// See [`QueryParser::parse`].
pub fn parse_query<'a>(query: impl Into<RawQuery<'a>>) -> Result<QueryDescriptor, QueryError> {
    QueryParser::default().parse(query)
}
