//! Parser configuration.
//!
//! Everything except custom casters can be loaded from configuration files
//! through serde, using the camelCase option names:
//!
//! ```rust
//! use api_query_params::QueryOptions;
//!
//! let options: QueryOptions = serde_json::from_str(r#"{
//!     "blacklist": ["password"],
//!     "castParams": {"zip": "string"},
//!     "limitKey": "per_page"
//! }"#).unwrap();
//! assert_eq!(options.limit_key.as_deref(), Some("per_page"));
//! ```

use serde::Deserialize;
use std::collections::HashMap;

use crate::casting::{Caster, CasterRegistry};

/// The descriptor parts driven by a reserved query parameter, in the order
/// the parser extracts them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOperator {
    Population,
    Projection,
    Sort,
    Skip,
    Limit,
    Filter,
}

impl QueryOperator {
    pub const ALL: [Self; 6] = [
        Self::Population,
        Self::Projection,
        Self::Sort,
        Self::Skip,
        Self::Limit,
        Self::Filter,
    ];

    #[must_use]
    pub const fn default_key(self) -> &'static str {
        match self {
            Self::Population => "populate",
            Self::Projection => "fields",
            Self::Sort => "sort",
            Self::Skip => "skip",
            Self::Limit => "limit",
            Self::Filter => "filter",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryOptions {
    /// Built-in casters plus any registered with [`QueryOptions::with_caster`]
    #[serde(skip)]
    pub casters: CasterRegistry,
    /// Field → caster name, applied before the heuristics
    pub cast_params: HashMap<String, String>,
    /// Fields never allowed in the filter
    pub blacklist: Vec<String>,
    /// When set, the only fields allowed in the filter
    pub whitelist: Option<Vec<String>>,
    pub population_key: Option<String>,
    pub projection_key: Option<String>,
    pub sort_key: Option<String>,
    pub skip_key: Option<String>,
    pub limit_key: Option<String>,
    pub filter_key: Option<String>,
}

impl QueryOptions {
    #[must_use]
    pub fn with_caster(mut self, name: impl Into<String>, caster: impl Caster + 'static) -> Self {
        self.casters.register(name, caster);
        self
    }

    #[must_use]
    pub fn cast_param(mut self, field: impl Into<String>, caster: impl Into<String>) -> Self {
        self.cast_params.insert(field.into(), caster.into());
        self
    }

    #[must_use]
    pub fn blacklist<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blacklist.extend(fields.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn whitelist<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.whitelist = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Renames the parameter that drives `operator`
    #[must_use]
    pub fn reserved_key(mut self, operator: QueryOperator, key: impl Into<String>) -> Self {
        let key = Some(key.into());
        match operator {
            QueryOperator::Population => self.population_key = key,
            QueryOperator::Projection => self.projection_key = key,
            QueryOperator::Sort => self.sort_key = key,
            QueryOperator::Skip => self.skip_key = key,
            QueryOperator::Limit => self.limit_key = key,
            QueryOperator::Filter => self.filter_key = key,
        }
        self
    }

    /// The parameter name currently driving `operator`
    #[must_use]
    pub fn key_for(&self, operator: QueryOperator) -> &str {
        let configured = match operator {
            QueryOperator::Population => &self.population_key,
            QueryOperator::Projection => &self.projection_key,
            QueryOperator::Sort => &self.sort_key,
            QueryOperator::Skip => &self.skip_key,
            QueryOperator::Limit => &self.limit_key,
            QueryOperator::Filter => &self.filter_key,
        };
        configured.as_deref().unwrap_or(operator.default_key())
    }
}
