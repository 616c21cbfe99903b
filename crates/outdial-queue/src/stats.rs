// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead statistics notification.
//!
//! When an outcome of `lead` is recorded, the queue manager notifies a
//! [`LeadStatsSink`] after the transaction commits. Notification is
//! fire-and-forget: a sink failure is logged and never rolls back or fails
//! the recorded outcome.

use async_trait::async_trait;
use outdial_core::OutdialError;
use serde::{Deserialize, Serialize};

/// A successfully recorded lead, for downstream statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadEvent {
    pub contact_id: i64,
    pub ankieter_id: i64,
    pub call_id: i64,
    pub campaign_id: Option<i64>,
    pub recorded_at: String,
}

/// Destination for lead events (an external stats service, a message bus,
/// or a test recorder).
#[async_trait]
pub trait LeadStatsSink: Send + Sync {
    async fn lead_recorded(&self, event: LeadEvent) -> Result<(), OutdialError>;
}

/// Sink that discards every event. Used when no stats collaborator is
/// configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLeadStats;

#[async_trait]
impl LeadStatsSink for NoopLeadStats {
    async fn lead_recorded(&self, _event: LeadEvent) -> Result<(), OutdialError> {
        Ok(())
    }
}
