// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `outdial status` command implementation.
//!
//! Displays contact and queue counters for the configured database. With
//! `--json`, outputs structured JSON for scripting.

use colored::Colorize;
use serde::Serialize;

use outdial_core::OutdialError;
use outdial_queue::QueueManager;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub total_contacts: i64,
    pub callable_contacts: i64,
    pub blacklisted_contacts: i64,
    pub pending_calls: i64,
}

/// Run the `outdial status` command.
pub async fn run_status(manager: &QueueManager, json: bool) -> Result<(), OutdialError> {
    let snap = manager.snapshot().await?;
    let response = StatusResponse {
        total_contacts: snap.total_contacts,
        callable_contacts: snap.callable_contacts,
        blacklisted_contacts: snap.blacklisted_contacts,
        pending_calls: snap.pending_calls,
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&response).map_err(OutdialError::storage)?
        );
        return Ok(());
    }

    println!("{}", "outdial status".bold());
    println!("  contacts:    {}", response.total_contacts);
    println!(
        "  callable:    {}",
        response.callable_contacts.to_string().green()
    );
    println!(
        "  blacklisted: {}",
        response.blacklisted_contacts.to_string().red()
    );
    println!("  pending:     {}", response.pending_calls);
    Ok(())
}
