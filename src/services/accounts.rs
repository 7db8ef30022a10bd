// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account management: registration, login, profile, steps and routines.

use crate::db::FileStore;
use crate::error::{AppError, Result};
use crate::models::routine::next_routine_id;
use crate::models::{
    Account, AccountView, LoginRequest, NewRoutineRequest, ProfileUpdateRequest, ProfileView,
    RegisterRequest, Routine,
};
use crate::services::password::{PasswordHasher, Verification};
use crate::services::sessions::SessionManager;
use crate::time_utils::{format_utc_rfc3339, parse_iso_date, today_iso_date};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Token plus public account view, returned by register and login.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/generated/")
)]
pub struct AuthSession {
    pub token: String,
    pub user: AccountView,
}

/// Account operations over the shared store.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<FileStore>,
    sessions: SessionManager,
    hasher: PasswordHasher,
}

impl AccountService {
    pub fn new(store: Arc<FileStore>, sessions: SessionManager, hasher: PasswordHasher) -> Self {
        Self {
            store,
            sessions,
            hasher,
        }
    }

    /// Create an account and open a first session for it.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthSession> {
        let new_account = request.into_new_account()?;

        // Cheap pre-check so a duplicate doesn't pay for hashing.
        if self.store.with_account(&new_account.email, |_| ()).is_some() {
            return Err(user_exists());
        }

        let password_hash = self
            .hasher
            .spawn_hash(new_account.password.clone())
            .await?;
        let account = Account::new(
            new_account,
            password_hash,
            format_utc_rfc3339(chrono::Utc::now()),
        );
        let view = account.view();

        if !self.store.create_account(account).await {
            return Err(user_exists());
        }

        let token = self.sessions.issue_token(&view.email).await?;
        tracing::info!(email = %view.email, "New user registered");

        Ok(AuthSession { token, user: view })
    }

    /// Check credentials and open a new session. Existing sessions for the
    /// account are left alone.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthSession> {
        let (email, password) = request.into_credentials()?;

        let Some(account) = self.store.get_account(&email) else {
            tracing::warn!(email = %email, "Login for unknown account");
            return Err(AppError::InvalidCredentials);
        };

        let verification = self
            .hasher
            .spawn_verify(account.password_hash.clone(), password.clone())
            .await?;
        match verification {
            Verification::Valid => {}
            Verification::ValidLegacy => self.upgrade_credential(&email, &password).await?,
            Verification::Invalid => {
                tracing::warn!(email = %email, "Login with wrong password");
                return Err(AppError::InvalidCredentials);
            }
        }

        let token = self.sessions.issue_token(&email).await?;
        tracing::info!(email = %email, "User logged in");

        Ok(AuthSession {
            token,
            user: account.view(),
        })
    }

    /// Replace a plaintext credential with a hashed one.
    async fn upgrade_credential(&self, email: &str, password: &str) -> Result<()> {
        let password_hash = self.hasher.spawn_hash(password.to_string()).await?;
        self.store
            .update_account(email, |account| account.password_hash = password_hash)
            .await
            .ok_or_else(AppError::user_not_found)?;
        tracing::info!(email = %email, "Upgraded plaintext credential");
        Ok(())
    }

    /// Public view plus step history.
    pub fn profile(&self, email: &str) -> Result<ProfileView> {
        self.store
            .with_account(email, Account::profile)
            .ok_or_else(AppError::user_not_found)
    }

    /// Apply the fields present in `request`; absent fields are untouched.
    pub async fn update_profile(
        &self,
        email: &str,
        request: ProfileUpdateRequest,
    ) -> Result<AccountView> {
        let update = request.into_update()?;

        if update.is_empty() {
            return self
                .store
                .with_account(email, Account::view)
                .ok_or_else(AppError::user_not_found);
        }

        self.store
            .update_account(email, |account| {
                update.apply(account);
                account.view()
            })
            .await
            .ok_or_else(AppError::user_not_found)
    }

    /// Set the step count for `date` (today when `None`).
    ///
    /// The running `steps` total mirrors the most recently recorded day
    /// rather than summing across days.
    pub async fn record_steps(&self, email: &str, date: Option<&str>, steps: u64) -> Result<u64> {
        let day = match date {
            Some(raw) => parse_iso_date(raw).ok_or_else(|| {
                AppError::Validation("date must be formatted as YYYY-MM-DD".to_string())
            })?,
            None => today_iso_date(),
        };

        self.store
            .update_account(email, |account| {
                account.daily_steps.insert(day, steps);
                account.steps = steps;
                account.steps
            })
            .await
            .ok_or_else(AppError::user_not_found)
    }

    /// Append a routine to the account's log.
    pub async fn add_routine(&self, email: &str, request: NewRoutineRequest) -> Result<Routine> {
        let now = chrono::Utc::now();

        self.store
            .update_account(email, |account| {
                let routine = Routine {
                    id: next_routine_id(&account.routines, now.timestamp_millis()),
                    date: request.date,
                    muscle_group: request.muscle_group,
                    location: request.location,
                    exercises: request.exercises.unwrap_or_default(),
                    completed: request.completed.unwrap_or(false),
                    created_at: format_utc_rfc3339(now),
                };
                account.routines.push(routine.clone());
                routine
            })
            .await
            .ok_or_else(AppError::user_not_found)
    }

    /// Routines in insertion order.
    pub fn list_routines(&self, email: &str) -> Result<Vec<Routine>> {
        self.store
            .with_account(email, |account| account.routines.clone())
            .ok_or_else(AppError::user_not_found)
    }
}

fn user_exists() -> AppError {
    AppError::Conflict("User already exists".to_string())
}
