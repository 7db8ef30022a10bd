// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honoured for local development. Every setting has a
//! default so the service starts with an empty environment.

use std::env;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 5000;
/// Default directory for the persisted collections.
pub const DEFAULT_DATA_DIR: &str = "data";
/// Origins allowed when `ALLOWED_ORIGINS` is unset.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["capacitor://localhost", "http://localhost:5173"];
/// Failed register/login attempts allowed per client per window.
pub const AUTH_ATTEMPT_LIMIT: u32 = 5;
/// Window for the auth attempt limiter.
pub const AUTH_ATTEMPT_WINDOW: Duration = Duration::from_secs(15 * 60);
/// Maximum accepted JSON body size.
pub const MAX_BODY_BYTES: usize = 10 * 1024;

const DEFAULT_RATE_LIMIT_WINDOW_MINUTES: u64 = 15;
const DEFAULT_RATE_LIMIT_MAX: u32 = 100;
const DEFAULT_HASH_ITERATIONS: u32 = 100_000;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Directory holding `users.json` and `sessions.json`
    pub data_dir: PathBuf,
    /// CORS origins; a single `*` entry allows any origin
    pub allowed_origins: Vec<String>,
    /// Window of the general API rate limiter
    pub rate_limit_window: Duration,
    /// Requests allowed per client per window on `/api/` routes
    pub rate_limit_max: u32,
    /// PBKDF2 iteration count for new credentials
    pub password_hash_iterations: NonZeroU32,
    /// Key rate limits on the first `X-Forwarded-For` hop instead of the
    /// peer address. Only safe behind a proxy that overwrites the header.
    pub trust_proxy: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let allowed_origins = match env::var("ALLOWED_ORIGINS") {
            Ok(raw) => parse_origins(&raw)?,
            Err(_) => DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Self {
            port: parse_or("PORT", DEFAULT_PORT),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR)),
            allowed_origins,
            rate_limit_window: Duration::from_secs(
                parse_or("RATE_LIMIT_WINDOW", DEFAULT_RATE_LIMIT_WINDOW_MINUTES) * 60,
            ),
            rate_limit_max: parse_or("RATE_LIMIT_MAX", DEFAULT_RATE_LIMIT_MAX),
            password_hash_iterations: NonZeroU32::new(parse_or(
                "PASSWORD_HASH_ITERATIONS",
                DEFAULT_HASH_ITERATIONS,
            ))
            .ok_or(ConfigError::Invalid("PASSWORD_HASH_ITERATIONS"))?,
            trust_proxy: parse_flag("TRUST_PROXY")?,
        })
    }

    /// Config for tests: storage under `data_dir`, cheap password hashing.
    pub fn test_default(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            port: DEFAULT_PORT,
            data_dir: data_dir.into(),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
            rate_limit_window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_MINUTES * 60),
            rate_limit_max: DEFAULT_RATE_LIMIT_MAX,
            password_hash_iterations: NonZeroU32::MIN.saturating_add(999),
            trust_proxy: false,
        }
    }

    /// Whether any origin is accepted.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// Read and parse an env var, falling back to `default` when unset or invalid.
fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Boolean env var; unset means `false`.
fn parse_flag(name: &'static str) -> Result<bool, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(false),
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "" | "0" | "false" | "no" => Ok(false),
            "1" | "true" | "yes" => Ok(true),
            _ => Err(ConfigError::Invalid(name)),
        },
    }
}

fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect();

    if origins.is_empty() {
        return Err(ConfigError::Invalid("ALLOWED_ORIGINS"));
    }
    Ok(origins)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
