// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types shared across the outdial workspace.
//!
//! The canonical entities are defined here for use across crate boundaries;
//! `outdial-storage` re-exports them for convenience. All closed enums derive
//! `strum` Display/EnumString with `snake_case` serialization so the stored
//! TEXT columns round-trip exactly and unknown wire strings fail to parse.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Terminal and in-flight statuses a call row can carry.
///
/// `Pending` and `InProgress` describe not-yet-resolved queue rows; the rest
/// are recorded outcomes (see [`crate::outcome::CallOutcome`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Pending,
    InProgress,
    Lead,
    Rejection,
    Callback,
    NoAnswer,
    Busy,
    WrongNumber,
    Blacklist,
}

/// Queue tier. Evaluated in strict `High` > `Medium` > `Low` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Lifecycle of a queue row. `Pending` rows are not-yet-executed work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

/// Why a queue row exists: fresh assignment, agent-scheduled callback, or
/// automatic retry after `no_answer`/`busy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QueueType {
    New,
    Callback,
    Retry,
}

/// A calling target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub campaign_id: Option<i64>,
    pub call_attempts: i32,
    pub max_call_attempts: i32,
    pub is_blacklisted: bool,
    pub is_active: bool,
    pub assigned_ankieter_id: Option<i64>,
    pub last_call_date: Option<String>,
    pub notes: Option<String>,
    /// Semantically a set, but insertion order is preserved for display.
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Contact {
    /// Eligibility invariant: not blacklisted, below the attempt cap, active.
    pub fn can_be_called(&self) -> bool {
        !self.is_blacklisted && self.call_attempts < self.max_call_attempts && self.is_active
    }

    /// Human-readable reason a contact fails `can_be_called`, for error
    /// reporting. Returns `None` when the contact is callable.
    pub fn assignability_block(&self) -> Option<&'static str> {
        if self.is_blacklisted {
            Some("blacklisted")
        } else if self.call_attempts >= self.max_call_attempts {
            Some("max call attempts reached")
        } else if !self.is_active {
            Some("inactive")
        } else {
            None
        }
    }
}

/// Fields for creating a contact (import pipeline or manual entry).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub campaign_id: Option<i64>,
    pub max_call_attempts: i32,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}

/// A call row: ledger entry and queue entry in one table.
///
/// A row with `queue_status = Pending` represents not-yet-executed queued
/// work; a row with a terminal `status` and `queue_status = Completed` is a
/// finished attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub id: i64,
    pub contact_id: i64,
    pub ankieter_id: i64,
    pub campaign_id: Option<i64>,
    /// When the attempt was actually placed (claim or resolution time).
    pub call_date: Option<String>,
    pub status: CallStatus,
    pub priority: Priority,
    pub queue_status: QueueStatus,
    pub queue_type: QueueType,
    /// When a queued attempt becomes eligible for selection.
    pub scheduled_date: Option<String>,
    /// Set only for callback outcomes.
    pub next_call_date: Option<String>,
    pub duration_seconds: Option<i64>,
    pub notes: Option<String>,
    /// Correlation id supplied by the telephony collaborator.
    pub event_id: Option<String>,
    pub created_at: String,
}

/// Fields for inserting a call row (queue entry or ledger append).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCall {
    pub contact_id: i64,
    pub ankieter_id: i64,
    pub campaign_id: Option<i64>,
    pub call_date: Option<String>,
    pub status: CallStatus,
    pub priority: Priority,
    pub queue_status: QueueStatus,
    pub queue_type: QueueType,
    pub scheduled_date: Option<String>,
    pub next_call_date: Option<String>,
    pub duration_seconds: Option<i64>,
    pub notes: Option<String>,
    pub event_id: Option<String>,
}

/// A phone exclusion, globally scoped (`campaign_id = None`) or scoped to one
/// campaign. Soft-deleted via `is_active`, never hard-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    pub id: i64,
    pub phone: String,
    pub reason: Option<String>,
    pub campaign_id: Option<i64>,
    /// Originating contact, when created from a call outcome.
    pub contact_id: Option<i64>,
    /// Admin user who created the entry, when created manually.
    pub blacklisted_by: Option<i64>,
    pub is_active: bool,
    pub created_at: String,
}

/// Fields for creating a blacklist entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBlacklistEntry {
    pub phone: String,
    pub reason: Option<String>,
    pub campaign_id: Option<i64>,
    pub contact_id: Option<i64>,
    pub blacklisted_by: Option<i64>,
}

/// Serialize a tag list to its TEXT column representation (JSON array).
pub fn tags_to_json(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

/// Parse the TEXT column representation back into an ordered tag list.
/// Malformed stored values read as an empty list rather than failing the row.
pub fn tags_from_json(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn callable_contact() -> Contact {
        Contact {
            id: 1,
            name: "Jan Kowalski".into(),
            phone: "+48555000111".into(),
            email: None,
            company: None,
            campaign_id: Some(3),
            call_attempts: 0,
            max_call_attempts: 3,
            is_blacklisted: false,
            is_active: true,
            assigned_ankieter_id: None,
            last_call_date: None,
            notes: None,
            tags: vec![],
            created_at: "2026-01-01T00:00:00.000Z".into(),
            updated_at: "2026-01-01T00:00:00.000Z".into(),
        }
    }

    #[test]
    fn can_be_called_requires_all_three_conditions() {
        let contact = callable_contact();
        assert!(contact.can_be_called());

        let mut blacklisted = callable_contact();
        blacklisted.is_blacklisted = true;
        assert!(!blacklisted.can_be_called());
        assert_eq!(blacklisted.assignability_block(), Some("blacklisted"));

        let mut exhausted = callable_contact();
        exhausted.call_attempts = 3;
        assert!(!exhausted.can_be_called());

        let mut inactive = callable_contact();
        inactive.is_active = false;
        assert!(!inactive.can_be_called());
    }

    #[test]
    fn statuses_round_trip_as_snake_case() {
        assert_eq!(CallStatus::NoAnswer.to_string(), "no_answer");
        assert_eq!(CallStatus::WrongNumber.to_string(), "wrong_number");
        assert_eq!(CallStatus::from_str("busy").unwrap(), CallStatus::Busy);
        assert_eq!(QueueStatus::InProgress.to_string(), "in_progress");
        assert_eq!(QueueType::from_str("retry").unwrap(), QueueType::Retry);
        assert_eq!(Priority::from_str("high").unwrap(), Priority::High);
        assert!(CallStatus::from_str("voicemail").is_err());
    }

    #[test]
    fn tags_round_trip_preserves_order() {
        let tags = vec!["vip".to_string(), "warsaw".to_string(), "b2b".to_string()];
        let json = tags_to_json(&tags);
        assert_eq!(tags_from_json(&json), tags);
    }

    #[test]
    fn malformed_tags_read_as_empty() {
        assert!(tags_from_json("not json").is_empty());
        assert!(tags_from_json("").is_empty());
    }
}
