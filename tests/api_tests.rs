//! HTTP surface tests driven through the router with `oneshot`

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::http::StatusCode;
use axum::Router;
use common::*;
use ragbot::api::auth::ApiKeyState;
use ragbot::api::build_app;
use ragbot::api::handlers::AppState;
use serde_json::json;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

const QUERY_PATH: &str = "/v1/chatbot-service/generate/query";

fn test_app(dir: &TempDir) -> Router {
    write_corpus(dir.path());
    let config = test_config(dir.path());
    let rag = Arc::new(rag_service(
        &config,
        Arc::new(KeywordEmbedder::default()),
        Arc::new(RecordingModel::new("Open **settings**.")),
    ));

    build_app(
        AppState::new(rag, None),
        ApiKeyState::new(config.auth.write_secret.clone()),
        &config.server.route_prefix,
        false,
    )
}

fn post(path: &str, key: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_generate_query_success() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = send(
        test_app(&dir),
        post(QUERY_PATH, Some(TEST_API_KEY), r#"{"query": "How do I reset my password?"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"status": "success", "data": "Open **settings**."}));
}

#[tokio::test]
async fn test_generate_query_served_under_api_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = send(
        test_app(&dir),
        post(
            "/api/v1/chatbot-service/generate/query",
            Some(TEST_API_KEY),
            r#"{"query": "reset password"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn test_missing_api_key_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = send(test_app(&dir), post(QUERY_PATH, None, r#"{"query": "hi"}"#)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"status": "failed", "message": "Invalid API key"}));
}

#[tokio::test]
async fn test_wrong_api_key_rejected_before_validation() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = send(
        test_app(&dir),
        post(QUERY_PATH, Some("not-the-key"), r#"{"query": 123}"#),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid API key");
}

#[tokio::test]
async fn test_non_string_query_is_422() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = send(
        test_app(&dir),
        post(QUERY_PATH, Some(TEST_API_KEY), r#"{"query": 123}"#),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, json!({"errors": [{"query": "query should be a string"}]}));
}

#[tokio::test]
async fn test_malformed_body_is_422() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = send(
        test_app(&dir),
        post(QUERY_PATH, Some(TEST_API_KEY), "{not json"),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, json!({"errors": [{"body": "request body must be a JSON object"}]}));
}

#[tokio::test]
async fn test_absent_query_fails_in_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = send(test_app(&dir), post(QUERY_PATH, Some(TEST_API_KEY), "{}")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "failed");
    assert!(body["error"].as_str().unwrap().contains("query must not be empty"));
}

#[tokio::test]
async fn test_pipeline_failure_is_500() {
    let dir = tempfile::tempdir().unwrap();
    // No corpus written: loading fails
    let config = test_config(dir.path());
    let rag = Arc::new(rag_service(
        &config,
        Arc::new(KeywordEmbedder::default()),
        Arc::new(RecordingModel::new("unused")),
    ));
    let app = build_app(
        AppState::new(rag, None),
        ApiKeyState::new(config.auth.write_secret.clone()),
        &config.server.route_prefix,
        false,
    );

    let (status, body) = send(app, post(QUERY_PATH, Some(TEST_API_KEY), r#"{"query": "hi"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "failed");
    assert!(body["error"].as_str().unwrap().contains("Failed to load documents"));
}

#[tokio::test]
async fn test_healthcheck() {
    let dir = tempfile::tempdir().unwrap();
    let request = Request::builder()
        .uri("/healthcheck")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(test_app(&dir), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["message"], "OK");
    assert!(body["data"]["uptime"].as_f64().unwrap() >= 0.0);
    assert_eq!(body["data"]["responsetime"].as_array().unwrap().len(), 2);
    assert!(body["data"]["timestamp"].as_i64().unwrap() > 1_600_000_000_000);
}

#[tokio::test]
async fn test_query_route_requires_post() {
    let dir = tempfile::tempdir().unwrap();
    let request = Request::builder()
        .uri(QUERY_PATH)
        .header("x-api-key", TEST_API_KEY)
        .body(Body::empty())
        .unwrap();

    let response = test_app(&dir).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_provider_failure_is_500() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path());
    let config = test_config(dir.path());
    let rag = Arc::new(rag_service(
        &config,
        Arc::new(FailingEmbedder),
        Arc::new(RecordingModel::new("unused")),
    ));
    let app = build_app(
        AppState::new(rag, None),
        ApiKeyState::new(config.auth.write_secret.clone()),
        &config.server.route_prefix,
        false,
    );

    let (status, body) = send(app, post(QUERY_PATH, Some(TEST_API_KEY), r#"{"query": "hi"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "failed");
    assert!(body["error"].as_str().unwrap().contains("provider unavailable"));
}
