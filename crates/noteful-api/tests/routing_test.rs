//! Operational routes and middleware.

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use tower::ServiceExt;

use common::*;

#[tokio::test]
async fn test_health() {
    let (app, _store) = test_app();
    let res = get(&app, "/health").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "healthy");
    assert_eq!(res.body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (app, _store) = test_app();
    for uri in ["/nope", "/api/widgets", "/api/folders/a/b"] {
        let res = get(&app, uri).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(res.body["message"], "Not Found");
    }
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (app, _store) = test_app();
    let res = get(&app, "/openapi.yaml").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.headers[header::CONTENT_TYPE], "application/yaml");
    let text = res.body.as_str().unwrap();
    assert!(text.starts_with("openapi:"));
    assert!(text.contains("/api/folders/{id}"));
}

#[tokio::test]
async fn test_request_id_is_set() {
    let (app, _store) = test_app();
    let res = get(&app, "/api/folders").await;
    let id = res.headers["x-request-id"].to_str().unwrap();
    let parsed = uuid::Uuid::parse_str(id).unwrap();
    assert_eq!(parsed.get_version_num(), 7);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let (app, _store) = test_app();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let (app, _store) = test_app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/notes")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/notes")
        .header(header::ORIGIN, "https://evil.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_missing_content_type_is_400() {
    let (app, _store) = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/folders")
        .body(Body::from(r#"{"name":"Work"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
