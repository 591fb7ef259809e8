use api_query_params::{Pagination, ParsedQuery, QueryDescriptor, QueryError, QueryParser};
use axum::{Json, Router, body::Body, http::Request, response::Response};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Number of rows the paged listing pretends to hold
pub const TOTAL_POSTS: u64 = 42;

async fn describe_handler(ParsedQuery(query): ParsedQuery) -> Json<QueryDescriptor> {
    Json(query)
}

async fn paged_handler(ParsedQuery(query): ParsedQuery) -> Result<Json<Value>, QueryError> {
    let page = Pagination::from_descriptor(&query)?;
    Ok(Json(json!({
        "offset": page.offset(),
        "meta": page.meta(TOTAL_POSTS),
    })))
}

pub fn setup_test_app(parser: QueryParser) -> Router {
    let api = Router::new()
        .route("/posts", axum::routing::get(describe_handler))
        .route("/posts/paged", axum::routing::get(paged_handler))
        .with_state(parser);

    Router::new().nest("/api/v1", api)
}

pub async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
