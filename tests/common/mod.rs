#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use goldenhouse_api::{app, database::manager, AppState};

/// The seeded admin user's id doubles as its session token.
pub const ADMIN_TOKEN: &str = "1";

/// Build the full router against a fresh in-memory database with the default
/// seeds applied, so every test starts from a clean brokerage.
pub async fn test_app() -> Router {
    let pool = manager::connect_in_memory().await.expect("in-memory pool");
    manager::migrate(&pool).await.expect("migrate");
    manager::seed(&pool).await.expect("seed");

    let uploads_dir = tempfile::tempdir().expect("tempdir").into_path();
    app(AppState::new(pool, uploads_dir))
}

/// Issue an authenticated JSON request and decode the response body.
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    send(app, method, uri, body, Some(ADMIN_TOKEN)).await
}

/// Same, without a session token.
pub async fn request_unauthed(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    send(app, method, uri, body, None).await
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", token);
    }

    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}
