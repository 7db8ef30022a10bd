// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod api;
pub mod auth;

use crate::config::MAX_BODY_BYTES;
use crate::middleware::auth::require_auth;
use crate::middleware::rate_limit::{limit_api, limit_auth_attempts};
use crate::AppState;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Endpoint directory advertised by the health check.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoints {
    pub register: &'static str,
    pub login: &'static str,
    pub logout: &'static str,
    pub profile: &'static str,
    pub update_profile: &'static str,
    pub update_steps: &'static str,
    pub add_routine: &'static str,
    pub routines: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub endpoints: Endpoints,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Fitness App API is running!".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: Endpoints {
            register: "POST /api/auth/register",
            login: "POST /api/auth/login",
            logout: "POST /api/auth/logout",
            profile: "GET /api/user/profile",
            update_profile: "PUT /api/user/profile",
            update_steps: "POST /api/user/steps",
            add_routine: "POST /api/user/add-routine",
            routines: "GET /api/user/routines",
        },
    })
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allow_any = state.config.allows_any_origin();
    let allowed = state.config.allowed_origins.clone();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _request_parts: &axum::http::request::Parts| {
                let origin_str = origin.to_str().unwrap_or("");
                let ok = allow_any || allowed.iter().any(|o| o == origin_str);
                if !ok {
                    tracing::warn!(origin = %origin_str, "CORS blocked origin");
                }
                ok
            },
        ))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state);

    // Register/login: no token, but failed attempts are limited.
    let public_routes = auth::routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        limit_auth_attempts,
    ));

    // Everything else under /api needs a live session.
    let protected_routes = api::routes()
        .merge(auth::session_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let api_routes = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(state.clone(), limit_api));

    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .merge(api_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
