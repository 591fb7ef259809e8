use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::errors::QueryError;
use crate::models::QueryDescriptor;
use crate::parser::QueryParser;

/// Extractor parsing the request's query string with the [`QueryParser`]
/// held in the router state.
///
/// ```rust,ignore
/// async fn list_posts(ParsedQuery(query): ParsedQuery) -> Json<QueryDescriptor> {
///     Json(query)
/// }
///
/// let app = Router::new()
///     .route("/posts", get(list_posts))
///     .with_state(QueryParser::new(QueryOptions::default().blacklist(["password"])));
/// ```
///
/// Rejects with [`QueryError`], which renders as `400 Bad Request`.
#[derive(Debug, Clone)]
pub struct ParsedQuery(pub QueryDescriptor);

impl<S> FromRequestParts<S> for ParsedQuery
where
    S: Send + Sync,
    QueryParser: FromRef<S>,
{
    type Rejection = QueryError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let parser = QueryParser::from_ref(state);
        let query = parts.uri.query().unwrap_or_default();
        parser.parse(query).map(Self)
    }
}
