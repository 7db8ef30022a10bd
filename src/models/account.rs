// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account model for storage and API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::borrow::Cow;
use validator::{Validate, ValidationError};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Account record as persisted in the accounts collection (keyed by email).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Normalised email, also the collection key. Never changes.
    pub email: String,
    /// Encoded credential. Files written by older servers store the
    /// plaintext password under `password`; it is upgraded on next login.
    #[serde(alias = "password")]
    pub password_hash: String,
    pub name: String,
    pub age: u32,
    pub weight: f64,
    pub height_feet: u32,
    pub height_inches: u32,
    pub target_weight: f64,
    /// When the account was registered (RFC3339)
    pub created_at: String,
    /// Step count of the most recently recorded day
    #[serde(default)]
    pub steps: u64,
    /// Steps per calendar date (`YYYY-MM-DD`)
    #[serde(default)]
    pub daily_steps: BTreeMap<String, u64>,
    /// Workout routines in insertion order
    #[serde(default)]
    pub routines: Vec<super::Routine>,
}

impl Account {
    /// Build a fresh account with empty step history and no routines.
    pub fn new(new: NewAccount, password_hash: String, created_at: String) -> Self {
        Self {
            email: new.email,
            password_hash,
            name: new.name,
            age: new.age,
            weight: new.weight,
            height_feet: new.height_feet,
            height_inches: new.height_inches,
            target_weight: new.target_weight,
            created_at,
            steps: 0,
            daily_steps: BTreeMap::new(),
            routines: Vec::new(),
        }
    }

    /// Public view of the account (no credential).
    pub fn view(&self) -> AccountView {
        AccountView {
            email: self.email.clone(),
            name: self.name.clone(),
            age: self.age,
            weight: self.weight,
            height_feet: self.height_feet,
            height_inches: self.height_inches,
            target_weight: self.target_weight,
        }
    }

    /// Public view plus step history.
    pub fn profile(&self) -> ProfileView {
        ProfileView {
            account: self.view(),
            steps: self.steps,
            daily_steps: self.daily_steps.clone(),
        }
    }
}

/// Validated registration input, ready to become an [`Account`].
#[derive(Debug, Clone, Validate)]
pub struct NewAccount {
    #[validate(
        email(message = "Invalid email format"),
        custom(function = "validate_dotted_domain")
    )]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub name: String,
    pub age: u32,
    pub weight: f64,
    pub height_feet: u32,
    pub height_inches: u32,
    pub target_weight: f64,
}

/// Require a `local@domain.tld` shape: the domain needs an inner dot.
fn validate_dotted_domain(email: &str) -> Result<(), ValidationError> {
    let dotted = email.rsplit_once('@').is_some_and(|(_, domain)| {
        domain
            .char_indices()
            .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
    });
    if dotted {
        Ok(())
    } else {
        Err(ValidationError::new("email_domain")
            .with_message(Cow::Borrowed("Invalid email format")))
    }
}

/// Account fields safe to return to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/generated/")
)]
pub struct AccountView {
    pub email: String,
    pub name: String,
    pub age: u32,
    pub weight: f64,
    pub height_feet: u32,
    pub height_inches: u32,
    pub target_weight: f64,
}

/// Profile response: public view plus step history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/generated/")
)]
pub struct ProfileView {
    #[serde(flatten)]
    pub account: AccountView,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub steps: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "Record<string, number>"))]
    pub daily_steps: BTreeMap<String, u64>,
}
