use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};

use crate::value::number_value;

/// Ordered field → weight map used for projections and sort orders.
///
/// Inserting an existing field replaces its weight but keeps its position,
/// so `sort=a,b,-a` sorts by `a` descending, then `b`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(String, i64)>,
}

/// Inclusion (`1`) / exclusion (`0`) map
pub type Projection = FieldMap;

/// Field → direction (`1` ascending, `-1` descending)
pub type Sort = FieldMap;

/// Field → condition map, ready for a document-store `find`
pub type Filter = Map<String, Value>;

impl FieldMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, weight: i64) {
        let field = field.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == field) {
            Some(entry) => entry.1 = weight,
            None => self.entries.push((field, weight)),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.entries.iter().map(|(field, weight)| (field.as_str(), *weight))
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, i64) -> bool) {
        self.entries.retain(|(field, weight)| keep(field, *weight));
    }

    /// Removes and returns, in order, the entries whose key is `prefix`
    /// followed by a single path segment. Returned keys have the prefix stripped.
    pub fn take_children(&mut self, prefix: &str) -> Vec<(String, i64)> {
        let mut children = Vec::new();
        self.entries.retain(|(field, weight)| {
            match field.strip_prefix(prefix).filter(|rest| !rest.contains('.')) {
                Some(rest) => {
                    children.push((rest.to_string(), *weight));
                    false
                }
                None => true,
            }
        });
        children
    }
}

impl<K: Into<String>> FromIterator<(K, i64)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (field, weight) in iter {
            map.insert(field, weight);
        }
        map
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, weight) in &self.entries {
            map.serialize_entry(field, weight)?;
        }
        map.end()
    }
}

/// One segment of a relation path to expand inline.
///
/// `populate=author.profile` produces
/// `{ path: "author", populate: { path: "profile" } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopulationNode {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<Projection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub populate: Option<Box<PopulationNode>>,
}

impl PopulationNode {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            select: None,
            populate: None,
        }
    }
}

// Deep chains come straight from user input; unlink them iteratively
impl Drop for PopulationNode {
    fn drop(&mut self) {
        let mut next = self.populate.take();
        while let Some(mut node) = next {
            next = node.populate.take();
        }
    }
}

/// Everything a listing endpoint needs to run a document query.
///
/// Parts whose parameter was absent stay `None` and are omitted when
/// serialized. `skip` and `limit` keep the numeric conversion of their
/// parameter even when it is not a usable page bound; see
/// [`crate::pagination::Pagination`] for validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population: Option<Vec<PopulationNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<Projection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_number")]
    pub skip: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_number")]
    pub limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
}

#[allow(clippy::ref_option)]
fn serialize_number<S: Serializer>(number: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    number.map_or(Value::Null, number_value).serialize(serializer)
}

/// Query parameters understood by listing endpoints with the default
/// reserved keys.
///
/// This struct only documents the parameters in OpenAPI; parsing goes
/// through [`crate::QueryParser`], which also turns every other parameter
/// into a filter condition.
#[derive(Debug, Deserialize, IntoParams, ToSchema, Default)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Comma-separated relation paths to populate, dotted for nested relations.
    #[param(example = "author.profile,comments")]
    pub populate: Option<String>,
    /// Fields to return: `name,email`, `-password`, or a JSON object.
    #[param(example = "name,email,author.name")]
    pub fields: Option<String>,
    /// Comma-separated sort fields, `-` prefix for descending.
    #[param(example = "-createdAt,name")]
    pub sort: Option<String>,
    /// Page number (1-based).
    #[param(example = 1)]
    pub skip: Option<u64>,
    /// Items per page.
    #[param(example = 10)]
    pub limit: Option<u64>,
    /// JSON-encoded base filter, merged with the field parameters.
    #[param(example = json!({"status": "active"}))]
    pub filter: Option<String>,
}
