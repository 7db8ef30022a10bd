// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API authentication and CORS tests.
//!
//! These tests verify that:
//! 1. Protected routes reject requests without a live token
//! 2. Tokens from register and login both work, independently
//! 3. Logout revokes only the presenting session
//! 4. CORS preflight requests return correct headers

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{body_json, login, register, send};

const PROTECTED: [(&str, &str); 6] = [
    ("POST", "/api/auth/logout"),
    ("GET", "/api/user/profile"),
    ("PUT", "/api/user/profile"),
    ("POST", "/api/user/steps"),
    ("POST", "/api/user/add-routine"),
    ("GET", "/api/user/routines"),
];

#[tokio::test]
async fn test_protected_routes_without_token() {
    let t = common::create_test_app();

    for (method, uri) in PROTECTED {
        let response = send(&t.app, method, uri, None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body_json(response).await["error"], "Unauthorized");
    }
}

#[tokio::test]
async fn test_protected_route_with_unknown_token() {
    let t = common::create_test_app();

    let response = send(&t.app, "GET", "/api/user/profile", Some("not-a-session"), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_wrong_scheme() {
    let t = common::create_test_app();
    let token = register(&t.app, "alice@x.com", "Passw0rd1").await;

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/user/profile")
                .header(header::AUTHORIZATION, format!("Token {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_gate_rejects_before_handler_runs() {
    let t = common::create_test_app();

    // A rejected add-routine must not reach the store.
    let response = send(
        &t.app,
        "POST",
        "/api/user/add-routine",
        Some("bogus"),
        Some(json!({ "muscleGroup": "chest" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(t.state.store.account_count(), 0);
}

#[tokio::test]
async fn test_register_login_logout_scenario() {
    let t = common::create_test_app();

    let t1 = register(&t.app, "alice@x.com", "Passw0rd1").await;
    let t2 = login(&t.app, "alice@x.com", "Passw0rd1").await;
    assert_ne!(t1, t2);
    assert_eq!(t.state.sessions.resolve_token(&t1).as_deref(), Some("alice@x.com"));
    assert_eq!(t.state.sessions.resolve_token(&t2).as_deref(), Some("alice@x.com"));

    let response = send(&t.app, "POST", "/api/auth/logout", Some(&t1), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Logged out successfully");

    let response = send(&t.app, "GET", "/api/user/profile", Some(&t1), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&t.app, "GET", "/api/user/profile", Some(&t2), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["email"], "alice@x.com");
}

#[tokio::test]
async fn test_logout_twice_is_unauthorized() {
    let t = common::create_test_app();
    let token = register(&t.app, "alice@x.com", "Passw0rd1").await;

    let first = send(&t.app, "POST", "/api/auth/logout", Some(&token), None).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = send(&t.app, "POST", "/api/auth/logout", Some(&token), None).await;
    assert_eq!(second.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_bad_credentials() {
    let t = common::create_test_app();
    register(&t.app, "alice@x.com", "Passw0rd1").await;

    let response = send(
        &t.app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@x.com", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid credentials");

    let response = send(
        &t.app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@x.com", "password": "Passw0rd1" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_response_hides_credential() {
    let t = common::create_test_app();

    let response = send(
        &t.app,
        "POST",
        "/api/auth/register",
        None,
        Some(common::register_body("alice@x.com", "Passw0rd1")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["email"], "alice@x.com");
    assert_eq!(body["user"]["heightFeet"], 5);
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_cors_preflight() {
    let t = common::create_test_app();

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/user/profile")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // OPTIONS should return 200 (CORS preflight success)
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:5173"
    );
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_cors_unknown_origin_not_allowed() {
    let t = common::create_test_app();

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/user/profile")
                .header(header::ORIGIN, "https://evil.example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(!response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_public_route_no_auth_required() {
    let t = common::create_test_app();

    let response = send(&t.app, "GET", "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["endpoints"]["register"], "POST /api/auth/register");
}
