// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the outdial call-queue backend.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and synchronous query modules that
//! compose inside one transaction. All writes are serialized through
//! tokio-rusqlite's single background thread; do NOT create additional
//! `Connection` instances for writes.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::{db_err, Database};
pub use models::*;
