// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! AuraFlow fitness API
//!
//! This crate provides the backend for the AuraFlow mobile app: account
//! registration and login with bearer-token sessions, profile storage,
//! step tracking and a workout routine log, persisted to flat JSON files.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::{Config, AUTH_ATTEMPT_LIMIT, AUTH_ATTEMPT_WINDOW};
use db::{FileStore, StoreError};
use middleware::RateLimiter;
use services::{AccountService, PasswordHasher, SessionManager};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<FileStore>,
    pub sessions: SessionManager,
    pub accounts: AccountService,
    pub api_limiter: RateLimiter,
    pub auth_limiter: RateLimiter,
}

impl AppState {
    /// Open the store under `config.data_dir` and wire up the services.
    pub fn new(config: Config) -> Result<Self, StoreError> {
        let store = Arc::new(FileStore::open(&config.data_dir)?);
        let sessions = SessionManager::new(store.clone());
        let accounts = AccountService::new(
            store.clone(),
            sessions.clone(),
            PasswordHasher::new(config.password_hash_iterations),
        );

        Ok(Self {
            api_limiter: RateLimiter::new(config.rate_limit_max, config.rate_limit_window),
            auth_limiter: RateLimiter::new(AUTH_ATTEMPT_LIMIT, AUTH_ATTEMPT_WINDOW),
            config,
            store,
            sessions,
            accounts,
        })
    }
}
