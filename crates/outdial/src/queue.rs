// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue subcommands: `next`, `assign`, `auto-assign`, `callback`, `outcome`.

use chrono::NaiveDateTime;
use colored::Colorize;
use serde_json::json;

use outdial_core::outcome::parse_outcome;
use outdial_core::types::Priority;
use outdial_core::OutdialError;
use outdial_queue::{CallReport, QueueManager};

/// Accepted shapes for datetime arguments.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

fn parse_datetime_arg(value: &str) -> Result<NaiveDateTime, OutdialError> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .ok_or_else(|| {
            OutdialError::Config(format!(
                "invalid datetime `{value}`, expected YYYY-MM-DDTHH:MM[:SS]"
            ))
        })
}

/// Run `outdial next`.
pub async fn run_next(
    manager: &QueueManager,
    ankieter_id: i64,
    json: bool,
) -> Result<(), OutdialError> {
    match manager.next_contact_for_ankieter(ankieter_id).await? {
        Some(next) => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "call": next.call,
                        "contact": next.contact,
                    }))
                    .map_err(OutdialError::storage)?
                );
            } else {
                println!(
                    "{} {} ({}) [{} / {}]",
                    "next:".green().bold(),
                    next.contact.name,
                    next.contact.phone,
                    next.call.priority,
                    next.call.queue_type,
                );
                println!(
                    "  contact {} call {} attempts {}/{}",
                    next.contact.id,
                    next.call.id,
                    next.contact.call_attempts,
                    next.contact.max_call_attempts
                );
            }
        }
        None => {
            if json {
                println!("null");
            } else {
                println!("{}", "queue empty".yellow());
            }
        }
    }
    Ok(())
}

/// Run `outdial assign`.
pub async fn run_assign(
    manager: &QueueManager,
    contact_id: i64,
    ankieter_id: i64,
    priority: Option<String>,
    json: bool,
) -> Result<(), OutdialError> {
    let priority = match priority.as_deref() {
        None => Priority::Low,
        Some(value) => value
            .parse()
            .map_err(|_| OutdialError::Config(format!("invalid priority `{value}`")))?,
    };
    let call = manager
        .assign_contact_with_priority(contact_id, ankieter_id, priority)
        .await?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&call).map_err(OutdialError::storage)?
        );
    } else {
        println!(
            "{} contact {contact_id} -> agent {ankieter_id} (queue entry {})",
            "assigned:".green().bold(),
            call.id
        );
    }
    Ok(())
}

/// Run `outdial auto-assign`.
pub async fn run_auto_assign(
    manager: &QueueManager,
    ankieter_id: i64,
    limit: Option<u32>,
    json: bool,
) -> Result<(), OutdialError> {
    let assigned = manager
        .auto_assign_contacts_to_ankieter(ankieter_id, limit)
        .await?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&assigned).map_err(OutdialError::storage)?
        );
    } else {
        println!(
            "{} {} contact(s) to agent {ankieter_id}",
            "auto-assigned:".green().bold(),
            assigned.len()
        );
        for contact in &assigned {
            println!("  {} {} ({})", contact.id, contact.name, contact.phone);
        }
    }
    Ok(())
}

/// Run `outdial callback`.
pub async fn run_callback(
    manager: &QueueManager,
    contact_id: i64,
    ankieter_id: i64,
    at: Option<String>,
    notes: Option<String>,
    json: bool,
) -> Result<(), OutdialError> {
    let at = at.as_deref().map(parse_datetime_arg).transpose()?;
    let call = manager
        .schedule_callback(contact_id, ankieter_id, at, notes)
        .await?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&call).map_err(OutdialError::storage)?
        );
    } else {
        println!(
            "{} contact {contact_id} for {}",
            "callback scheduled:".green().bold(),
            call.scheduled_date.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

/// Run `outdial outcome`.
#[allow(clippy::too_many_arguments)]
pub async fn run_outcome(
    manager: &QueueManager,
    contact_id: i64,
    ankieter_id: i64,
    outcome: &str,
    duration: Option<i64>,
    notes: Option<String>,
    event_id: Option<String>,
    callback_at: Option<String>,
    json: bool,
) -> Result<(), OutdialError> {
    let outcome = parse_outcome(outcome)?;
    let callback_at = callback_at.as_deref().map(parse_datetime_arg).transpose()?;
    let report = manager
        .process_call_result(
            contact_id,
            ankieter_id,
            outcome,
            CallReport {
                duration_seconds: duration,
                notes,
                event_id,
                callback_at,
            },
        )
        .await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "outcome": report.outcome,
                "call_id": report.call_id,
                "attempts": report.attempts,
                "blacklisted": report.blacklisted,
                "follow_up": report.follow_up.as_ref().map(|f| json!({
                    "call_id": f.call_id,
                    "scheduled_at": f.scheduled_at,
                    "queue_type": f.queue_type,
                })),
            }))
            .map_err(OutdialError::storage)?
        );
        return Ok(());
    }

    println!(
        "{} {} (attempt {})",
        "recorded:".green().bold(),
        report.outcome,
        report.attempts
    );
    if report.blacklisted {
        println!("  {}", "contact blacklisted".red());
    }
    if let Some(follow_up) = &report.follow_up {
        println!(
            "  {} {} at {}",
            "follow-up:".cyan(),
            follow_up.queue_type,
            follow_up.scheduled_at
        );
    }
    Ok(())
}
