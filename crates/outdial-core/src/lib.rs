// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the outdial call-queue backend.
//!
//! This crate provides the domain types (contacts, calls, blacklist entries),
//! the error taxonomy, the call-outcome dispatch table, and the pure
//! business-hours scheduling rules. It has no I/O dependencies; persistence
//! and orchestration live in `outdial-storage` and `outdial-queue`.

pub mod error;
pub mod outcome;
pub mod schedule;
pub mod time;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::OutdialError;
pub use outcome::{CallOutcome, Disposition};
pub use schedule::BusinessHours;
pub use types::{
    BlacklistEntry, Call, CallStatus, Contact, NewBlacklistEntry, NewCall, NewContact, Priority,
    QueueStatus, QueueType,
};
