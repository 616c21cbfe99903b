// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Call-outcome enumeration and the dispatch table that drives the queue
//! state machine.
//!
//! The set of accepted outcomes is closed: anything an agent can submit is a
//! [`CallOutcome`] variant, and the follow-up behavior is a total function
//! from outcome to [`Disposition`]. Unrecognized wire strings fail at the
//! parse boundary with `OutdialError::InvalidOutcome` instead of silently
//! falling through.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::OutdialError;
use crate::types::CallStatus;

/// Resolution of a call attempt, as submitted by an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    /// Contact agreed to the offer. Terminal success.
    Lead,
    /// Contact declined. Terminal.
    Rejection,
    /// Contact asked to be called again at a specific time.
    Callback,
    /// Nobody picked up. Automatically retried within business hours.
    NoAnswer,
    /// Line was busy. Automatically retried within business hours.
    Busy,
    /// Number does not belong to the contact. Terminal, not a blacklisting.
    WrongNumber,
    /// Contact demanded no further calls. Terminal, creates a blacklist entry.
    Blacklist,
}

/// What happens after an outcome is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// No new queue entry. `blacklist` additionally creates an exclusion.
    Terminal { blacklist: bool },
    /// Auto-reschedule: retry delay clamped to business hours, high priority,
    /// queue type `retry`.
    RetryLater,
    /// Manual reschedule at the caller-supplied time (or the configured
    /// fallback delay), high priority, queue type `callback`.
    CallbackAt,
}

impl CallOutcome {
    /// The §4.2 transition table.
    pub fn disposition(self) -> Disposition {
        match self {
            CallOutcome::Lead | CallOutcome::Rejection | CallOutcome::WrongNumber => {
                Disposition::Terminal { blacklist: false }
            }
            CallOutcome::Blacklist => Disposition::Terminal { blacklist: true },
            CallOutcome::NoAnswer | CallOutcome::Busy => Disposition::RetryLater,
            CallOutcome::Callback => Disposition::CallbackAt,
        }
    }

    /// Whether hitting the attempt cap on this outcome blacklists the contact
    /// instead of following the table above. Applies to the outcomes that
    /// indicate the number keeps going nowhere.
    pub fn blacklists_at_cap(self) -> bool {
        matches!(
            self,
            CallOutcome::NoAnswer | CallOutcome::Busy | CallOutcome::WrongNumber
        )
    }

    /// The ledger status recorded for this outcome.
    pub fn as_status(self) -> CallStatus {
        match self {
            CallOutcome::Lead => CallStatus::Lead,
            CallOutcome::Rejection => CallStatus::Rejection,
            CallOutcome::Callback => CallStatus::Callback,
            CallOutcome::NoAnswer => CallStatus::NoAnswer,
            CallOutcome::Busy => CallStatus::Busy,
            CallOutcome::WrongNumber => CallStatus::WrongNumber,
            CallOutcome::Blacklist => CallStatus::Blacklist,
        }
    }
}

/// Parse an outcome string from the HTTP/CLI boundary.
pub fn parse_outcome(value: &str) -> Result<CallOutcome, OutdialError> {
    CallOutcome::from_str(value).map_err(|_| OutdialError::InvalidOutcome(value.to_string()))
}
