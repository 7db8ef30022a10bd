// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Flat-file store with typed operations.
//!
//! Two collections live in memory and are mirrored to JSON files:
//! - Accounts (email -> account record)
//! - Sessions (bearer token -> owning email)
//!
//! Every mutation rewrites the whole collection file. Writers to one
//! collection are serialised by a mutex held across mutate-then-persist;
//! readers go straight to the map and see the latest committed state.
//! A failed write is logged and leaves memory ahead of disk until the next
//! successful save of that collection.

use crate::db::Collection;
use crate::models::Account;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// File-backed store for accounts and sessions.
pub struct FileStore {
    data_dir: PathBuf,
    accounts: DashMap<String, Account>,
    sessions: DashMap<String, String>,
    accounts_write: Mutex<()>,
    sessions_write: Mutex<()>,
}

impl FileStore {
    /// Open the store, creating `data_dir` if needed and loading both
    /// collections. Missing or corrupt files load as empty collections.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir).map_err(|source| StoreError::Io {
            path: data_dir.clone(),
            source,
        })?;

        let accounts: HashMap<String, Account> = load(&data_dir, Collection::Accounts);
        let sessions: HashMap<String, String> = load(&data_dir, Collection::Sessions);

        tracing::info!(
            data_dir = %data_dir.display(),
            accounts = accounts.len(),
            sessions = sessions.len(),
            "Loaded store from disk"
        );

        Ok(Self {
            data_dir,
            accounts: accounts.into_iter().collect(),
            sessions: sessions.into_iter().collect(),
            accounts_write: Mutex::new(()),
            sessions_write: Mutex::new(()),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    // ─── Account Operations ──────────────────────────────────────

    /// Get a copy of an account.
    pub fn get_account(&self, email: &str) -> Option<Account> {
        self.accounts.get(email).map(|a| a.value().clone())
    }

    /// Read from an account without copying it.
    pub fn with_account<R>(&self, email: &str, read: impl FnOnce(&Account) -> R) -> Option<R> {
        self.accounts.get(email).map(|a| read(a.value()))
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Insert a new account. Returns `false` without touching anything if
    /// the email is already taken.
    pub async fn create_account(&self, account: Account) -> bool {
        let _guard = self.accounts_write.lock().await;

        match self.accounts.entry(account.email.clone()) {
            Entry::Occupied(_) => return false,
            Entry::Vacant(slot) => {
                slot.insert(account);
            }
        }

        self.persist(Collection::Accounts, &self.accounts).await;
        true
    }

    /// Mutate an existing account in place and persist. Returns `None` if
    /// there is no account for `email`.
    pub async fn update_account<R>(
        &self,
        email: &str,
        apply: impl FnOnce(&mut Account) -> R,
    ) -> Option<R> {
        let _guard = self.accounts_write.lock().await;

        let result = {
            let mut account = self.accounts.get_mut(email)?;
            apply(account.value_mut())
        };

        self.persist(Collection::Accounts, &self.accounts).await;
        Some(result)
    }

    // ─── Session Operations ──────────────────────────────────────

    /// Email owning `token`, if the session is live.
    pub fn session_owner(&self, token: &str) -> Option<String> {
        self.sessions.get(token).map(|s| s.value().clone())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Register a session. Returns `false` if the token is already live.
    pub async fn create_session(&self, token: &str, email: &str) -> bool {
        let _guard = self.sessions_write.lock().await;

        match self.sessions.entry(token.to_string()) {
            Entry::Occupied(_) => return false,
            Entry::Vacant(slot) => {
                slot.insert(email.to_string());
            }
        }

        self.persist(Collection::Sessions, &self.sessions).await;
        true
    }

    /// Remove a session. Returns whether it existed. Unknown tokens are not
    /// an error, but the collection is persisted either way.
    pub async fn remove_session(&self, token: &str) -> bool {
        let _guard = self.sessions_write.lock().await;
        let removed = self.sessions.remove(token).is_some();
        self.persist(Collection::Sessions, &self.sessions).await;
        removed
    }

    // ─── Persistence ─────────────────────────────────────────────

    /// Re-read a collection from disk, independent of the in-memory state.
    pub fn load<V: DeserializeOwned>(&self, collection: Collection) -> HashMap<String, V> {
        load(&self.data_dir, collection)
    }

    /// Snapshot a map and write it. Callers hold the collection's write lock.
    async fn persist<V>(&self, collection: Collection, map: &DashMap<String, V>)
    where
        V: Serialize + Clone,
    {
        let snapshot = snapshot(map);
        if let Err(e) = save(&self.data_dir, collection, &snapshot).await {
            tracing::error!(
                collection = collection.name(),
                error = %e,
                "Failed to persist collection; in-memory state is ahead of disk"
            );
        }
    }
}

/// Copy a map into key-sorted pairs, the on-disk layout.
fn snapshot<K, V>(map: &DashMap<K, V>) -> Vec<(K, V)>
where
    K: Ord + Clone + Hash + Eq,
    V: Clone,
{
    let mut entries: Vec<(K, V)> = map
        .iter()
        .map(|entry| (entry.key().clone(), entry.value().clone()))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}

/// Load a collection file into a map.
///
/// The file holds a JSON array of `[key, value]` pairs. A missing file is an
/// empty collection; an unreadable or corrupt one is logged and also treated
/// as empty.
pub fn load<V: DeserializeOwned>(data_dir: &Path, collection: Collection) -> HashMap<String, V> {
    let path = data_dir.join(collection.file_name());

    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to read collection");
            return HashMap::new();
        }
    };

    match serde_json::from_slice::<Vec<(String, V)>>(&bytes) {
        Ok(entries) => entries.into_iter().collect(),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to parse collection");
            HashMap::new()
        }
    }
}

/// Overwrite a collection file with `entries`.
///
/// Writes to a sibling temporary file first and renames it into place, so a
/// crash never leaves a half-written collection behind.
pub async fn save<V: Serialize>(
    data_dir: &Path,
    collection: Collection,
    entries: &[(String, V)],
) -> Result<(), StoreError> {
    let path = data_dir.join(collection.file_name());
    let tmp_path = data_dir.join(format!("{}.tmp", collection.file_name()));

    let json = serde_json::to_vec_pretty(entries)?;

    tokio::fs::write(&tmp_path, json)
        .await
        .map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
    tokio::fs::rename(&tmp_path, &path)
        .await
        .map_err(|source| StoreError::Io { path, source })?;

    Ok(())
}

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize collection: {0}")]
    Serialize(#[from] serde_json::Error),
}
