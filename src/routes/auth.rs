// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration, login and logout routes.

use crate::error::{ApiJson, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{LoginRequest, RegisterRequest};
use crate::services::AuthSession;
use crate::AppState;
use axum::{extract::State, routing::post, Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Unauthenticated routes. The failed-attempt limiter is applied in
/// routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
}

/// Routes that act on the caller's own session (auth required).
pub fn session_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/auth/logout", post(logout))
}

/// Plain confirmation message.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/generated/")
)]
pub struct MessageResponse {
    pub message: String,
}

/// Create an account and return its first session token.
async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<Json<AuthSession>> {
    Ok(Json(state.accounts.register(body).await?))
}

/// Exchange credentials for a new session token.
async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<AuthSession>> {
    Ok(Json(state.accounts.login(body).await?))
}

/// Revoke the session used to make this request. Other sessions of the
/// same account stay valid.
async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Json<MessageResponse> {
    state.sessions.revoke_token(&user.token).await;
    tracing::info!(email = %user.email, "User logged out");

    Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    })
}
