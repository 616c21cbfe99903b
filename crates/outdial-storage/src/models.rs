// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `outdial-core::types` for use across
//! crate boundaries. This module re-exports them for convenience within the
//! storage crate.

pub use outdial_core::types::{
    BlacklistEntry, Call, CallStatus, Contact, NewBlacklistEntry, NewCall, NewContact, Priority,
    QueueStatus, QueueType,
};
