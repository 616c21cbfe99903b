// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording lead-stats sink for assertions on notification behavior.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use outdial_core::OutdialError;
use outdial_queue::{LeadEvent, LeadStatsSink};

/// Sink that captures every event it receives and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingStats {
    events: Mutex<Vec<LeadEvent>>,
    fail: Mutex<bool>,
}

impl RecordingStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent notification fail, to verify that outcome
    /// processing is unaffected by a broken sink.
    pub fn fail_next_calls(&self) {
        *self.fail.lock().unwrap() = true;
    }

    /// Events received so far.
    pub fn events(&self) -> Vec<LeadEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Poll until at least `n` events have arrived or the timeout passes.
    /// Notifications are spawned post-commit, so tests must wait for them.
    pub async fn wait_for(&self, n: usize, timeout: Duration) -> Vec<LeadEvent> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let events = self.events();
            if events.len() >= n || tokio::time::Instant::now() >= deadline {
                return events;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl LeadStatsSink for RecordingStats {
    async fn lead_recorded(&self, event: LeadEvent) -> Result<(), OutdialError> {
        if *self.fail.lock().unwrap() {
            return Err(OutdialError::Internal("stats sink down".into()));
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}
