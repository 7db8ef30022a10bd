// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-client fixed-window rate limiting.
//!
//! Two limiters are in use:
//! - every `/api/` request counts against the general limiter;
//! - register/login only count failed attempts, so a client that keeps
//!   getting its password wrong is locked out while normal use is not.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Above this many tracked clients, expired windows are swept on insert.
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window counter keyed by client.
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    clients: DashMap<String, Window>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            clients: DashMap::new(),
        }
    }

    /// Whether `key` still has budget in its current window.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    /// Count one request against `key`.
    pub fn record(&self, key: &str) {
        self.record_at(key, Instant::now());
    }

    /// Count a request and report whether it was within budget.
    pub fn hit(&self, key: &str) -> bool {
        let now = Instant::now();
        let allowed = self.check_at(key, now);
        if allowed {
            self.record_at(key, now);
        }
        allowed
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        match self.clients.get(key) {
            Some(w) if now.duration_since(w.started) < self.window => w.count < self.limit,
            _ => true,
        }
    }

    fn record_at(&self, key: &str, now: Instant) {
        if self.clients.len() > PRUNE_THRESHOLD {
            self.prune(now);
        }

        let mut entry = self.clients.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }
        entry.count = entry.count.saturating_add(1);
    }

    fn prune(&self, now: Instant) {
        self.clients
            .retain(|_, w| now.duration_since(w.started) < self.window);
    }
}

/// Identify the client by its peer address. The first `X-Forwarded-For`
/// hop is used instead only when `trust_proxy` is set.
pub fn client_key(request: &Request, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(forwarded) = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
        {
            return forwarded.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// General limiter for all `/api/` routes.
pub async fn limit_api(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = client_key(&request, state.config.trust_proxy);
    if !state.api_limiter.hit(&key) {
        tracing::warn!(client = %key, "Rate limit exceeded");
        return Err(AppError::TooManyRequests);
    }
    Ok(next.run(request).await)
}

/// Auth limiter: only unsuccessful responses use up the budget.
pub async fn limit_auth_attempts(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = client_key(&request, state.config.trust_proxy);
    if !state.auth_limiter.check(&key) {
        tracing::warn!(client = %key, "Too many failed authentication attempts");
        return Err(AppError::TooManyRequests);
    }

    let response = next.run(request).await;
    if !response.status().is_success() {
        state.auth_limiter.record(&key);
    }
    Ok(response)
}
