// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{ApiJson, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{
    AccountView, NewRoutineRequest, ProfileUpdateRequest, ProfileView, Routine, StepsRequest,
};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication via bearer token).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/user/profile", get(get_profile).put(update_profile))
        .route("/api/user/steps", post(record_steps))
        .route("/api/user/add-routine", post(add_routine))
        .route("/api/user/routines", get(list_routines))
}

// ─── User Profile ────────────────────────────────────────────

/// Get the caller's profile, including step history.
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfileView>> {
    Ok(Json(state.accounts.profile(&user.email)?))
}

/// Partially update the caller's profile.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<ProfileUpdateRequest>,
) -> Result<Json<AccountView>> {
    let view = state.accounts.update_profile(&user.email, body).await?;
    tracing::debug!(email = %user.email, "Profile updated");
    Ok(Json(view))
}

// ─── Steps ───────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/generated/")
)]
pub struct StepsResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub steps: u64,
}

async fn record_steps(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<StepsRequest>,
) -> Result<Json<StepsResponse>> {
    let count = body.step_count()?;
    let steps = state
        .accounts
        .record_steps(&user.email, body.date.as_deref(), count)
        .await?;
    Ok(Json(StepsResponse { steps }))
}

// ─── Routines ────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/generated/")
)]
pub struct AddRoutineResponse {
    pub message: String,
    pub routine: Routine,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/generated/")
)]
pub struct RoutinesResponse {
    pub routines: Vec<Routine>,
}

async fn add_routine(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<NewRoutineRequest>,
) -> Result<Json<AddRoutineResponse>> {
    let routine = state.accounts.add_routine(&user.email, body).await?;
    tracing::info!(email = %user.email, routine_id = %routine.id, "Routine added");

    Ok(Json(AddRoutineResponse {
        message: "Routine added successfully".to_string(),
        routine,
    }))
}

/// Workout history in the order it was logged.
async fn list_routines(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<RoutinesResponse>> {
    let routines = state.accounts.list_routines(&user.email)?;
    Ok(Json(RoutinesResponse { routines }))
}
