// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rate limiting tests for auth attempts and general API traffic.

use auraflow_api::config::{Config, AUTH_ATTEMPT_LIMIT};
use auraflow_api::routes::create_router;
use auraflow_api::AppState;
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Request, StatusCode},
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

mod common;
use common::{body_json, register};

fn peer(ip: &str) -> ConnectInfo<SocketAddr> {
    ConnectInfo(SocketAddr::new(ip.parse().unwrap(), 40_000))
}

async fn login_via(
    app: &axum::Router,
    client: &str,
    forwarded_for: Option<&str>,
    password: &str,
) -> StatusCode {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .extension(peer(client));
    if let Some(forwarded) = forwarded_for {
        builder = builder.header("x-forwarded-for", forwarded);
    }

    app.clone()
        .oneshot(
            builder
                .body(Body::from(
                    json!({ "email": "alice@x.com", "password": password }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
}

async fn login_from(app: &axum::Router, client: &str, password: &str) -> StatusCode {
    login_via(app, client, None, password).await
}

#[tokio::test]
async fn test_failed_logins_are_limited() {
    let t = common::create_test_app();
    register(&t.app, "alice@x.com", "Passw0rd1").await;

    for _ in 0..AUTH_ATTEMPT_LIMIT {
        assert_eq!(
            login_from(&t.app, "198.51.100.1", "wrong-password").await,
            StatusCode::UNAUTHORIZED
        );
    }

    // Locked out, even with the right password.
    assert_eq!(
        login_from(&t.app, "198.51.100.1", "Passw0rd1").await,
        StatusCode::TOO_MANY_REQUESTS
    );

    // Other clients are unaffected.
    assert_eq!(
        login_from(&t.app, "198.51.100.2", "Passw0rd1").await,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_forwarded_for_is_ignored_by_default() {
    let t = common::create_test_app();
    register(&t.app, "alice@x.com", "Passw0rd1").await;

    for i in 0..AUTH_ATTEMPT_LIMIT {
        let forged = format!("10.0.0.{i}");
        assert_eq!(
            login_via(&t.app, "198.51.100.4", Some(&forged), "wrong-password").await,
            StatusCode::UNAUTHORIZED
        );
    }

    assert_eq!(
        login_via(&t.app, "198.51.100.4", Some("10.0.0.250"), "wrong-password").await,
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[tokio::test]
async fn test_forwarded_for_used_behind_trusted_proxy() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        trust_proxy: true,
        ..Config::test_default(dir.path())
    };
    let app = create_router(Arc::new(AppState::new(config).unwrap()));
    register(&app, "alice@x.com", "Passw0rd1").await;

    // Every request arrives from the proxy's address.
    for _ in 0..AUTH_ATTEMPT_LIMIT {
        assert_eq!(
            login_via(&app, "10.0.0.1", Some("198.51.100.5"), "wrong-password").await,
            StatusCode::UNAUTHORIZED
        );
    }
    assert_eq!(
        login_via(&app, "10.0.0.1", Some("198.51.100.5"), "Passw0rd1").await,
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(
        login_via(&app, "10.0.0.1", Some("198.51.100.6"), "Passw0rd1").await,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_successful_logins_do_not_count() {
    let t = common::create_test_app();
    register(&t.app, "alice@x.com", "Passw0rd1").await;

    for _ in 0..(AUTH_ATTEMPT_LIMIT * 2) {
        assert_eq!(
            login_from(&t.app, "198.51.100.3", "Passw0rd1").await,
            StatusCode::OK
        );
    }
}

#[tokio::test]
async fn test_general_api_limit() {
    let t = common::create_test_app();
    let token = register(&t.app, "alice@x.com", "Passw0rd1").await;
    let limit = t.state.config.rate_limit_max;

    let profile = |client: &'static str| {
        let app = t.app.clone();
        let token = token.clone();
        async move {
            app.oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/user/profile")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .extension(peer(client))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
        }
    };

    for _ in 0..limit {
        assert_eq!(profile("203.0.113.9").await.status(), StatusCode::OK);
    }

    let response = profile("203.0.113.9").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_json(response).await["error"], "Too many requests");

    // Health check is outside /api and not limited.
    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .extension(peer("203.0.113.9"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
