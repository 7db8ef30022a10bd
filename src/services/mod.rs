// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod accounts;
pub mod password;
pub mod sessions;

pub use accounts::{AccountService, AuthSession};
pub use password::{PasswordHasher, Verification};
pub use sessions::SessionManager;
