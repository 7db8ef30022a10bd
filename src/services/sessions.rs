// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token sessions.
//!
//! Tokens are opaque: 18 random bytes (URL-safe base64) followed by the
//! issue time in hex milliseconds. A token maps to one email until it is
//! revoked. Sessions do not expire.

use crate::db::FileStore;
use crate::error::AppError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::Arc;

const TOKEN_RANDOM_BYTES: usize = 18;
const MAX_ISSUE_ATTEMPTS: usize = 8;

/// Issues, resolves and revokes bearer tokens.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<FileStore>,
    rng: SystemRandom,
}

impl SessionManager {
    pub fn new(store: Arc<FileStore>) -> Self {
        Self {
            store,
            rng: SystemRandom::new(),
        }
    }

    /// Issue a new token for `email` and persist the session collection.
    ///
    /// Existing sessions for the same account stay valid.
    pub async fn issue_token(&self, email: &str) -> Result<String, AppError> {
        for _ in 0..MAX_ISSUE_ATTEMPTS {
            let token = self.generate_token()?;
            if self.store.create_session(&token, email).await {
                tracing::debug!(email = %email, "Session issued");
                return Ok(token);
            }
            tracing::warn!("Generated token collided with a live session, retrying");
        }

        Err(AppError::Internal(anyhow::anyhow!(
            "Could not generate a unique session token"
        )))
    }

    /// Email owning `token`, or `None` if the token is unknown or revoked.
    pub fn resolve_token(&self, token: &str) -> Option<String> {
        self.store.session_owner(token)
    }

    /// Revoke `token`. Revoking an unknown token is a no-op.
    pub async fn revoke_token(&self, token: &str) {
        if self.store.remove_session(token).await {
            tracing::debug!("Session revoked");
        }
    }

    fn generate_token(&self) -> Result<String, AppError> {
        let mut random = [0u8; TOKEN_RANDOM_BYTES];
        self.rng
            .fill(&mut random)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to generate token")))?;

        let issued_ms = chrono::Utc::now().timestamp_millis();
        Ok(format!("{}{:x}", URL_SAFE_NO_PAD.encode(random), issued_ms))
    }
}
