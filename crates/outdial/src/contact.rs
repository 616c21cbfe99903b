// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `outdial contact` subcommands.

use clap::Subcommand;
use colored::Colorize;

use outdial_core::types::NewContact;
use outdial_core::OutdialError;
use outdial_queue::QueueManager;

#[derive(Subcommand, Debug)]
pub enum ContactCommands {
    /// Create a contact.
    Add {
        name: String,
        phone: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        campaign: Option<i64>,
        /// Attempt cap; defaults to `queue.default_max_call_attempts`.
        #[arg(long)]
        max_attempts: Option<i32>,
        #[arg(long)]
        notes: Option<String>,
        /// Repeatable tag flag.
        #[arg(long)]
        tag: Vec<String>,
    },
    /// Show a contact.
    Show { contact_id: i64 },
    /// Show a contact's call history, newest first.
    History { contact_id: i64 },
}

pub async fn run(
    manager: &QueueManager,
    command: ContactCommands,
    json: bool,
) -> Result<(), OutdialError> {
    match command {
        ContactCommands::Add {
            name,
            phone,
            email,
            company,
            campaign,
            max_attempts,
            notes,
            tag,
        } => {
            let contact = manager
                .add_contact(NewContact {
                    name,
                    phone,
                    email,
                    company,
                    campaign_id: campaign,
                    max_call_attempts: max_attempts.unwrap_or(0),
                    notes,
                    tags: tag,
                })
                .await?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&contact).map_err(OutdialError::storage)?
                );
            } else {
                println!(
                    "{} {} ({}) as contact {}",
                    "added:".green().bold(),
                    contact.name,
                    contact.phone,
                    contact.id
                );
                if contact.is_blacklisted {
                    println!("  {}", "phone is blacklisted".red());
                }
            }
        }
        ContactCommands::Show { contact_id } => {
            let contact = manager.contact(contact_id).await?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&contact).map_err(OutdialError::storage)?
                );
            } else {
                println!("{} {} ({})", contact.id, contact.name.bold(), contact.phone);
                println!(
                    "  campaign {:?}  attempts {}/{}  assigned {:?}",
                    contact.campaign_id,
                    contact.call_attempts,
                    contact.max_call_attempts,
                    contact.assigned_ankieter_id
                );
                let state = match contact.assignability_block() {
                    None => "callable".green(),
                    Some(reason) => reason.red(),
                };
                println!("  state: {state}");
            }
        }
        ContactCommands::History { contact_id } => {
            let history = manager.call_history(contact_id).await?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&history).map_err(OutdialError::storage)?
                );
            } else if history.is_empty() {
                println!("{}", "no calls recorded".yellow());
            } else {
                for call in &history {
                    println!(
                        "{} {} [{}] agent {} {}",
                        call.id,
                        call.created_at,
                        call.status,
                        call.ankieter_id,
                        call.notes.as_deref().unwrap_or("")
                    );
                }
            }
        }
    }
    Ok(())
}
