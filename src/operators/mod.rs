//! # Descriptor Builders
//!
//! One builder per reserved parameter, plus the filter built from every
//! other parameter:
//!
//! ```rust,ignore
//! // Population: dotted paths become chained nodes
//! GET /posts?populate=author.profile,comments
//!
//! // Projection: field list or JSON object
//! GET /posts?fields=title,-body
//! GET /posts?fields={"title":1}
//!
//! // Sort: `-` for descending
//! GET /posts?sort=-createdAt,title
//!
//! // Pagination
//! GET /posts?skip=2&limit=20
//!
//! // Filter: everything else, plus an optional JSON base
//! GET /posts?status=published&views>=100&tags=rust,axum&!deletedAt
//! GET /posts?filter={"$or":[{"a":1},{"b":2}]}&status=published
//! ```
//!
//! After all builders ran, [`merge_projection`] moves projection entries
//! addressing a populated relation (`author.name`) into that relation's
//! own `select`.

pub mod filter;
pub mod merge;
pub mod population;
pub mod projection;
pub mod sort;

pub use filter::{FieldRules, Operator, build_filter, parse_operator};
pub use merge::merge_projection;
pub use population::build_population;
pub use projection::build_projection;
pub use sort::{UnaryWeights, build_sort, parse_unaries};
