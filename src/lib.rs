//! Turns REST query strings into document-store query descriptors.
//!
//! ```rust
//! use api_query_params::parse_query;
//!
//! let query = parse_query("populate=author&fields=title,author.name&sort=-createdAt&skip=1&limit=20&status=published&views>=100").unwrap();
//! assert_eq!(query.limit, Some(20.0));
//! assert!(query.filter.unwrap().contains_key("views"));
//! ```
//!
//! See [`operators`] for the parameter syntax and [`QueryOptions`] for
//! blacklists, whitelists, custom casters and renamed reserved keys.

pub mod casting;
pub mod errors;
pub mod extract;
pub mod literal;
pub mod models;
pub mod operators;
pub mod options;
pub mod pagination;
pub mod params;
pub mod parser;
pub mod value;

pub use casting::{BuiltinCaster, Caster, CasterRegistry};
pub use errors::QueryError;
pub use extract::ParsedQuery;
pub use models::{FieldMap, Filter, ListParams, PopulationNode, Projection, QueryDescriptor, Sort};
pub use options::{QueryOperator, QueryOptions};
pub use pagination::{PageMeta, Pagination};
pub use params::{Params, RawQuery};
pub use parser::{QueryParser, parse_query};
