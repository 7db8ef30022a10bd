// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (flat JSON files).

pub mod file_store;

pub use file_store::{FileStore, StoreError};

/// The persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// email -> account record
    Accounts,
    /// bearer token -> email
    Sessions,
}

impl Collection {
    pub const fn name(self) -> &'static str {
        match self {
            Collection::Accounts => "users",
            Collection::Sessions => "sessions",
        }
    }

    /// File name inside the data directory.
    pub const fn file_name(self) -> &'static str {
        match self {
            Collection::Accounts => "users.json",
            Collection::Sessions => "sessions.json",
        }
    }
}
