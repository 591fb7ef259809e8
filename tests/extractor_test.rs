//! Tests for the `ParsedQuery` extractor and `QueryError` responses

use api_query_params::{QueryOperator, QueryOptions, QueryParser};
use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{TOTAL_POSTS, body_json, get, setup_test_app};

#[tokio::test]
async fn test_extractor_returns_descriptor() {
    let app = setup_test_app(QueryParser::default());

    let response = get(
        &app,
        "/api/v1/posts?populate=author&fields=title,author.name&sort=-createdAt&status=published&views%3E=100",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({
            "population": [{"path": "author", "select": {"name": 1}}],
            "projection": {"title": 1},
            "sort": {"createdAt": -1},
            "filter": {"status": "published", "views": {"$gte": 100}}
        })
    );
}

#[tokio::test]
async fn test_extractor_without_query_string() {
    let app = setup_test_app(QueryParser::default());

    let response = get(&app, "/api/v1/posts").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"filter": {}}));
}

#[tokio::test]
async fn test_extractor_uses_state_options() {
    let parser = QueryParser::new(
        QueryOptions::default()
            .blacklist(["password"])
            .reserved_key(QueryOperator::Sort, "order"),
    );
    let app = setup_test_app(parser);

    let response = get(&app, "/api/v1/posts?order=name&password=hunter2&role=admin").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"sort": {"name": 1}, "filter": {"role": "admin"}})
    );
}

#[tokio::test]
async fn test_invalid_filter_is_bad_request() {
    let app = setup_test_app(QueryParser::default());

    let response = get(&app, "/api/v1/posts?filter=%7Bnot-json").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Invalid filter syntax: {not-json"})
    );
}

#[tokio::test]
async fn test_malformed_parameter_is_bad_request() {
    let app = setup_test_app(QueryParser::default());

    let response = get(&app, "/api/v1/posts?%3Dvalue").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Malformed filter parameter: =value");
}

#[tokio::test]
async fn test_paged_listing_meta() {
    let app = setup_test_app(QueryParser::default());

    let response = get(&app, "/api/v1/posts/paged?skip=2&limit=10").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "offset": 10,
            "meta": {
                "totalItems": TOTAL_POSTS,
                "totalPages": 5,
                "currentPage": 2,
                "itemsPerPage": 10
            }
        })
    );
}

#[tokio::test]
async fn test_paged_listing_rejects_zero_limit() {
    let app = setup_test_app(QueryParser::default());

    let response = get(&app, "/api/v1/posts/paged?skip=1&limit=0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Limit must be greater than 0"})
    );
}
