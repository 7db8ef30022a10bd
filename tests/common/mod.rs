// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use auraflow_api::config::Config;
use auraflow_api::routes::create_router;
use auraflow_api::AppState;
use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// A router over a throwaway data directory. Keep `dir` alive for the test.
#[allow(dead_code)]
pub struct TestApp {
    pub app: axum::Router,
    pub state: Arc<AppState>,
    pub dir: TempDir,
}

/// Create a test app backed by a fresh temporary directory.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let (app, state) = create_test_app_in(dir.path());
    TestApp { app, state, dir }
}

/// Create a test app over an existing data directory (simulates a restart).
#[allow(dead_code)]
pub fn create_test_app_in(data_dir: &Path) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default(data_dir);
    let state = Arc::new(AppState::new(config).expect("Failed to open store"));
    (create_router(state.clone()), state)
}

/// Registration body for `email` with valid defaults for every other field.
#[allow(dead_code)]
pub fn register_body(email: &str, password: &str) -> Value {
    json!({
        "email": email,
        "password": password,
        "name": "Test User",
        "age": 30,
        "weight": 150,
        "heightFeet": 5,
        "heightInches": 10,
        "targetWeight": 140
    })
}

/// Send a request with an optional JSON body and bearer token.
#[allow(dead_code)]
pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}

/// Register an account and return its token.
#[allow(dead_code)]
pub async fn register(app: &axum::Router, email: &str, password: &str) -> String {
    let response = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(register_body(email, password)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["token"]
        .as_str()
        .expect("token missing")
        .to_string()
}

/// Log in and return the new token.
#[allow(dead_code)]
pub async fn login(app: &axum::Router, email: &str, password: &str) -> String {
    let response = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["token"]
        .as_str()
        .expect("token missing")
        .to_string()
}
