// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue orchestration for the outdial call-queue backend.
//!
//! [`QueueManager`] drives per-agent selection, assignment, callback
//! scheduling, and the outcome state machine; [`BlacklistRegistry`] covers
//! manual exclusion administration. Both run every operation as a single
//! storage transaction over the shared [`outdial_storage::Database`] handle.
//!
//! Selection is strictly tiered. When the head entry of a tier points at a
//! contact that is no longer callable, that tier yields nothing for the
//! current selection and the dead entry is cancelled, so a later selection
//! can reach the work queued behind it. A `None` from
//! [`QueueManager::next_contact_for_ankieter`] therefore does not mean the
//! queue is empty; callers polling for work should simply ask again.

pub mod manager;
pub mod registry;
pub mod stats;

pub use manager::{
    CallReport, FollowUp, NextCall, OutcomeReport, QueueManager, QueuePolicy, QueueSnapshot,
};
pub use registry::{BlacklistRegistry, DeactivationOutcome};
pub use stats::{LeadEvent, LeadStatsSink, NoopLeadStats};
