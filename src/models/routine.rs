// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout routine model.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A workout routine logged by an account. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/generated/")
)]
pub struct Routine {
    /// Creation time in epoch milliseconds, as a string
    pub id: String,
    pub date: Option<String>,
    pub muscle_group: Option<String>,
    pub location: Option<String>,
    /// Exercises as sent by the client (opaque to the server)
    #[serde(default)]
    pub exercises: Vec<serde_json::Value>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: String,
}

/// Pick a routine id from the creation time, strictly greater than the
/// newest existing id so ids stay unique and ordered within one account.
pub fn next_routine_id(existing: &[Routine], now_millis: i64) -> String {
    let last = existing
        .last()
        .and_then(|r| r.id.parse::<i64>().ok())
        .unwrap_or(i64::MIN);

    now_millis.max(last.saturating_add(1)).to_string()
}
