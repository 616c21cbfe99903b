// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timestamp formatting shared between the scheduler and the storage layer.
//!
//! All timestamps are persisted as TEXT in the same shape SQLite's
//! `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')` produces, so lexicographic
//! comparison in SQL equals chronological comparison.

use chrono::{NaiveDateTime, Utc};

/// Format written by this crate: millisecond precision, trailing `Z`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Format accepted on read: any fractional-second precision.
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Current wall-clock time as a naive datetime.
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Render a datetime in the canonical storage format.
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp. Returns `None` for anything that is not in the
/// canonical format (including SQLite-default rows written by hand).
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_PARSE_FORMAT).ok()
}
