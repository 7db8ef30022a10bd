// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request payloads and their conversion into validated domain input.
//!
//! Clients send numbers either as JSON numbers or as numeric strings, and
//! may omit any field. Conversion turns "absent" into `None` and rejects
//! values that are present but cannot be read as numbers.

use super::account::{Account, NewAccount};
use crate::error::AppError;
use serde::Deserialize;
use validator::Validate;

/// Longest stored display name, in characters.
pub const MAX_NAME_CHARS: usize = 100;

const AGE_RANGE: (i64, i64) = (1, 150);
const WEIGHT_RANGE: (f64, f64) = (20.0, 500.0);
const HEIGHT_FEET_RANGE: (i64, i64) = (1, 8);
const HEIGHT_INCHES_RANGE: (i64, i64) = (0, 11);

/// A number as it arrives on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireNumber {
    Number(f64),
    Text(String),
}

impl WireNumber {
    /// Zero or an empty string; such values count as "not provided".
    pub fn is_blank(&self) -> bool {
        match self {
            WireNumber::Number(n) => *n == 0.0,
            WireNumber::Text(s) => s.trim().is_empty(),
        }
    }

    pub fn to_float(&self, field: &str) -> Result<f64, AppError> {
        let value = match self {
            WireNumber::Number(n) => Some(*n),
            WireNumber::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value
            .filter(|n| n.is_finite())
            .ok_or_else(|| AppError::Validation(format!("{field} must be a number")))
    }

    /// Integer value, truncating any fractional part.
    pub fn to_integer(&self, field: &str) -> Result<i64, AppError> {
        Ok(self.to_float(field)?.trunc() as i64)
    }
}

/// Body of `POST /api/auth/register`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub age: Option<WireNumber>,
    pub weight: Option<WireNumber>,
    pub height_feet: Option<WireNumber>,
    pub height_inches: Option<WireNumber>,
    pub target_weight: Option<WireNumber>,
}

impl RegisterRequest {
    /// Check required fields, coerce and clamp numbers, normalise the email.
    pub fn into_new_account(self) -> Result<NewAccount, AppError> {
        let missing = || AppError::Validation("All fields are required".to_string());

        let email = self.email.filter(|s| !s.is_empty()).ok_or_else(missing)?;
        let password = self.password.filter(|s| !s.is_empty()).ok_or_else(missing)?;
        let name = self.name.filter(|s| !s.is_empty()).ok_or_else(missing)?;
        let age = self.age.filter(|n| !n.is_blank()).ok_or_else(missing)?;
        let weight = self.weight.filter(|n| !n.is_blank()).ok_or_else(missing)?;
        let height_feet = self.height_feet.ok_or_else(missing)?;
        let height_inches = self.height_inches.ok_or_else(missing)?;

        let weight = clamp_float(weight.to_float("weight")?, WEIGHT_RANGE);
        let target_weight = match self.target_weight.filter(|n| !n.is_blank()) {
            Some(target) => target.to_float("targetWeight")?,
            None => weight,
        };

        let account = NewAccount {
            // Validated as sent, apart from case; stray whitespace is rejected.
            email: email.to_lowercase(),
            password,
            name: sanitize_name(&name),
            age: clamp_int(age.to_integer("age")?, AGE_RANGE),
            weight,
            height_feet: clamp_int(height_feet.to_integer("heightFeet")?, HEIGHT_FEET_RANGE),
            height_inches: clamp_int(
                height_inches.to_integer("heightInches")?,
                HEIGHT_INCHES_RANGE,
            ),
            target_weight,
        };

        account.validate().map_err(|errors| {
            let fields = errors.field_errors();
            // Report the email problem first, as clients show one message.
            let message = ["email", "password"]
                .iter()
                .filter_map(|field| fields.get(*field))
                .flat_map(|errs| errs.iter())
                .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| "Invalid registration data".to_string());
            AppError::Validation(message)
        })?;

        Ok(account)
    }
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Returns the normalised email and the password.
    pub fn into_credentials(self) -> Result<(String, String), AppError> {
        match (self.email, self.password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Ok((normalize_email(&email), password))
            }
            _ => Err(AppError::Validation(
                "Email and password required".to_string(),
            )),
        }
    }
}

/// Body of `PUT /api/user/profile`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub age: Option<WireNumber>,
    pub weight: Option<WireNumber>,
    pub height_feet: Option<WireNumber>,
    pub height_inches: Option<WireNumber>,
    pub target_weight: Option<WireNumber>,
}

/// A parsed partial profile update; `None` means "leave unchanged".
///
/// Age, weight and target weight treat zero or an empty string as absent.
/// Height fields only skip absent or `null` values, since zero inches is real.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub weight: Option<f64>,
    pub height_feet: Option<u32>,
    pub height_inches: Option<u32>,
    pub target_weight: Option<f64>,
}

impl ProfileUpdateRequest {
    pub fn into_update(self) -> Result<ProfileUpdate, AppError> {
        Ok(ProfileUpdate {
            name: self
                .name
                .filter(|n| !n.trim().is_empty())
                .map(|n| sanitize_name(&n)),
            age: self
                .age
                .filter(|n| !n.is_blank())
                .map(|n| n.to_integer("age").map(|v| clamp_int(v, AGE_RANGE)))
                .transpose()?,
            weight: self
                .weight
                .filter(|n| !n.is_blank())
                .map(|n| n.to_float("weight").map(|v| clamp_float(v, WEIGHT_RANGE)))
                .transpose()?,
            height_feet: self
                .height_feet
                .map(|n| {
                    n.to_integer("heightFeet")
                        .map(|v| clamp_int(v, HEIGHT_FEET_RANGE))
                })
                .transpose()?,
            height_inches: self
                .height_inches
                .map(|n| {
                    n.to_integer("heightInches")
                        .map(|v| clamp_int(v, HEIGHT_INCHES_RANGE))
                })
                .transpose()?,
            target_weight: self
                .target_weight
                .filter(|n| !n.is_blank())
                .map(|n| n.to_float("targetWeight"))
                .transpose()?,
        })
    }
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ProfileUpdate::default()
    }

    /// Write the provided fields into `account`.
    pub fn apply(&self, account: &mut Account) {
        if let Some(name) = &self.name {
            account.name = name.clone();
        }
        if let Some(age) = self.age {
            account.age = age;
        }
        if let Some(weight) = self.weight {
            account.weight = weight;
        }
        if let Some(feet) = self.height_feet {
            account.height_feet = feet;
        }
        if let Some(inches) = self.height_inches {
            account.height_inches = inches;
        }
        if let Some(target) = self.target_weight {
            account.target_weight = target;
        }
    }
}

/// Body of `POST /api/user/steps`.
#[derive(Debug, Default, Deserialize)]
pub struct StepsRequest {
    pub steps: Option<WireNumber>,
    /// Calendar date `YYYY-MM-DD`; today (UTC) when absent
    pub date: Option<String>,
}

impl StepsRequest {
    pub fn step_count(&self) -> Result<u64, AppError> {
        let steps = self
            .steps
            .as_ref()
            .ok_or_else(|| AppError::Validation("steps is required".to_string()))?
            .to_integer("steps")?;
        u64::try_from(steps)
            .map_err(|_| AppError::Validation("steps must not be negative".to_string()))
    }
}

/// Body of `POST /api/user/add-routine`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoutineRequest {
    pub date: Option<String>,
    pub muscle_group: Option<String>,
    pub location: Option<String>,
    pub exercises: Option<Vec<serde_json::Value>>,
    pub completed: Option<bool>,
}

/// Lower-case and trim an email so lookups are consistent.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn sanitize_name(raw: &str) -> String {
    raw.trim().chars().take(MAX_NAME_CHARS).collect()
}

fn clamp_int(value: i64, (min, max): (i64, i64)) -> u32 {
    // Ranges are small and non-negative, so the clamped value fits.
    u32::try_from(value.clamp(min, max)).unwrap_or_default()
}

fn clamp_float(value: f64, (min, max): (f64, f64)) -> f64 {
    value.clamp(min, max)
}
