#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use heatvote_api::config::ServerConfig;
use heatvote_api::router::build_app_router;
use heatvote_api::state::AppState;
use heatvote_db::MemoryRecordStore;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout, and the production rate limits.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        vote_cooldown_minutes: 10,
        rate_limit_enabled: true,
        ip_throttle_limit: 30,
        ip_throttle_window_secs: 3600,
        half_life_minutes: 30.0,
        cutoff_minutes: 120.0,
        recent_vote_hours: 24,
    }
}

/// Build the full application router over an in-memory record store.
///
/// Returns the state as well so tests can reach the broadcast hub.
pub fn build_test_app_with(config: ServerConfig) -> (Router, AppState) {
    let state = AppState::new(Arc::new(MemoryRecordStore::new()), config.clone());
    let app = build_app_router(state.clone(), &config);
    (app, state)
}

pub fn build_test_app() -> Router {
    build_test_app_with(test_config()).0
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    json_request(app, Method::POST, uri, body, None).await
}

pub async fn put_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    json_request(app, Method::PUT, uri, body, None).await
}

/// POST a JSON body as a known visitor.
pub async fn post_json_as(app: &Router, uri: &str, visitor: &str, body: Value) -> Response<Body> {
    json_request(app, Method::POST, uri, body, Some(visitor)).await
}

async fn json_request(
    app: &Router,
    method: Method,
    uri: &str,
    body: Value,
    visitor: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(visitor) = visitor {
        builder = builder.header("x-visitor-id", visitor);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a floor-plan through the API and return its id.
pub async fn create_floorplan(app: &Router, name: &str) -> i64 {
    let response = post_json(app, "/api/v1/floorplans", serde_json::json!({ "name": name })).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
