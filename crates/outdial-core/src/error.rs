// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the outdial call-queue backend.

use thiserror::Error;

/// The primary error type used across all outdial crates.
///
/// Domain failures (unknown contact, unassignable contact, unrecognized
/// outcome) are returned as values and mapped to status codes by the calling
/// layer; only storage failures carry an underlying source error.
#[derive(Debug, Error)]
pub enum OutdialError {
    /// Referenced contact id does not exist.
    #[error("contact not found: {id}")]
    ContactNotFound { id: i64 },

    /// Contact is blacklisted, inactive, or at its attempt cap when an
    /// assignment or reschedule was attempted.
    #[error("contact {id} cannot be assigned: {reason}")]
    ContactNotAssignable { id: i64, reason: String },

    /// Submitted call status is not in the recognized outcome enumeration.
    #[error("unrecognized call outcome `{0}`")]
    InvalidOutcome(String),

    /// Referenced blacklist entry id does not exist.
    #[error("blacklist entry not found: {id}")]
    BlacklistEntryNotFound { id: i64 },

    /// Concurrent-write detection during a queue claim; the caller should
    /// retry the whole selection.
    #[error("persistence conflict: {0}")]
    PersistenceConflict(String),

    /// Configuration errors (invalid TOML, out-of-range values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl OutdialError {
    /// Wrap any error as a storage failure.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(source),
        }
    }
}
