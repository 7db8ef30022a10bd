// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential hashing.
//!
//! Stored format: `pbkdf2-sha256$<iterations>$<salt hex>$<hash hex>`.
//! Anything else is a plaintext password left behind by an older server.

use crate::error::AppError;
use ring::rand::{SecureRandom, SystemRandom};
use ring::{digest, pbkdf2};
use std::num::NonZeroU32;
use subtle::ConstantTimeEq;

static ALGORITHM: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;
const SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const HASH_LEN: usize = digest::SHA256_OUTPUT_LEN;

/// Outcome of checking a password against a stored credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Valid,
    /// Matched a plaintext credential; the caller should re-hash it.
    ValidLegacy,
    Invalid,
}

impl Verification {
    pub fn is_valid(self) -> bool {
        !matches!(self, Verification::Invalid)
    }
}

/// Salted PBKDF2 password hasher.
#[derive(Clone)]
pub struct PasswordHasher {
    iterations: NonZeroU32,
    rng: SystemRandom,
}

impl PasswordHasher {
    pub fn new(iterations: NonZeroU32) -> Self {
        Self {
            iterations,
            rng: SystemRandom::new(),
        }
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let mut salt = [0u8; SALT_LEN];
        self.rng
            .fill(&mut salt)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to generate salt")))?;

        let mut hash = [0u8; HASH_LEN];
        pbkdf2::derive(
            ALGORITHM,
            self.iterations,
            &salt,
            password.as_bytes(),
            &mut hash,
        );

        Ok(format!(
            "{SCHEME}${}${}${}",
            self.iterations,
            hex::encode(salt),
            hex::encode(hash)
        ))
    }

    /// Check `password` against a stored credential in constant time.
    pub fn verify(&self, stored: &str, password: &str) -> Verification {
        let Some(rest) = stored
            .strip_prefix(SCHEME)
            .and_then(|r| r.strip_prefix('$'))
        else {
            let matches: bool = stored.as_bytes().ct_eq(password.as_bytes()).into();
            return if matches {
                Verification::ValidLegacy
            } else {
                Verification::Invalid
            };
        };

        let Some((iterations, salt, hash)) = parse_encoded(rest) else {
            tracing::warn!("Stored credential is malformed");
            return Verification::Invalid;
        };

        match pbkdf2::verify(ALGORITHM, iterations, &salt, password.as_bytes(), &hash) {
            Ok(()) => Verification::Valid,
            Err(_) => Verification::Invalid,
        }
    }

    /// [`hash`](Self::hash) on tokio's blocking pool, keeping PBKDF2 off the
    /// async workers.
    pub async fn spawn_hash(&self, password: String) -> Result<String, AppError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(e.into()))?
    }

    /// [`verify`](Self::verify) on tokio's blocking pool.
    pub async fn spawn_verify(
        &self,
        stored: String,
        password: String,
    ) -> Result<Verification, AppError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&stored, &password))
            .await
            .map_err(|e| AppError::Internal(e.into()))
    }
}

fn parse_encoded(encoded: &str) -> Option<(NonZeroU32, Vec<u8>, Vec<u8>)> {
    let mut parts = encoded.split('$');
    let iterations = parts.next()?.parse::<NonZeroU32>().ok()?;
    let salt = hex::decode(parts.next()?).ok()?;
    let hash = hex::decode(parts.next()?).ok()?;
    if parts.next().is_some() || hash.len() != HASH_LEN {
        return None;
    }
    Some((iterations, salt, hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(NonZeroU32::new(1_000).unwrap())
    }

    #[test]
    fn test_hash_then_verify() {
        let hasher = hasher();
        let stored = hasher.hash("Passw0rd1").unwrap();

        assert!(stored.starts_with("pbkdf2-sha256$1000$"));
        assert!(!stored.contains("Passw0rd1"));
        assert_eq!(hasher.verify(&stored, "Passw0rd1"), Verification::Valid);
        assert_eq!(hasher.verify(&stored, "passw0rd1"), Verification::Invalid);
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let hasher = hasher();
        assert_ne!(hasher.hash("Passw0rd1").unwrap(), hasher.hash("Passw0rd1").unwrap());
    }

    #[test]
    fn test_plaintext_credential_is_legacy() {
        let hasher = hasher();
        assert_eq!(hasher.verify("hunter2hunter2", "hunter2hunter2"), Verification::ValidLegacy);
        assert_eq!(hasher.verify("hunter2hunter2", "hunter2"), Verification::Invalid);
    }

    #[test]
    fn test_malformed_hash_is_invalid() {
        let hasher = hasher();
        assert_eq!(hasher.verify("pbkdf2-sha256$abc$00$00", "x"), Verification::Invalid);
        assert_eq!(hasher.verify("pbkdf2-sha256$1000$zz$00", "x"), Verification::Invalid);
    }

    #[tokio::test]
    async fn test_spawned_hash_and_verify() {
        let hasher = hasher();
        let stored = hasher.spawn_hash("Passw0rd1".to_string()).await.unwrap();
        let result = hasher
            .spawn_verify(stored, "Passw0rd1".to_string())
            .await
            .unwrap();
        assert_eq!(result, Verification::Valid);
    }

    #[test]
    fn test_verification_uses_stored_iterations() {
        let stored = PasswordHasher::new(NonZeroU32::new(2_000).unwrap())
            .hash("Passw0rd1")
            .unwrap();
        assert!(hasher().verify(&stored, "Passw0rd1").is_valid());
    }
}
