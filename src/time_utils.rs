// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Calendar date format used as the key of the daily step map.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Today's UTC calendar date as `YYYY-MM-DD`.
pub fn today_iso_date() -> String {
    Utc::now().format(ISO_DATE_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` date, returning it in canonical form.
pub fn parse_iso_date(raw: &str) -> Option<String> {
    NaiveDate::parse_from_str(raw.trim(), ISO_DATE_FORMAT)
        .ok()
        .map(|d| d.format(ISO_DATE_FORMAT).to_string())
}
