// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for outdial integration tests.
//!
//! Provides a test harness over a temp-dir SQLite database and a recording
//! stats sink, for fast, deterministic, CI-runnable tests without external
//! services.
//!
//! # Components
//!
//! - [`TestHarness`] - Full queue stack over a throwaway database
//! - [`RecordingStats`] - Lead-stats sink that captures notifications

pub mod harness;
pub mod mock_stats;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_stats::RecordingStats;
