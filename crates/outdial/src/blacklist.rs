// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `outdial blacklist` subcommands.

use clap::Subcommand;
use colored::Colorize;

use outdial_core::types::NewBlacklistEntry;
use outdial_core::OutdialError;
use outdial_queue::BlacklistRegistry;

#[derive(Subcommand, Debug)]
pub enum BlacklistCommands {
    /// Add a phone number to the blacklist.
    Add {
        phone: String,
        /// Limit the entry to one campaign; global when omitted.
        #[arg(long)]
        campaign: Option<i64>,
        #[arg(long)]
        reason: Option<String>,
        /// Admin user id creating the entry.
        #[arg(long)]
        by: Option<i64>,
    },
    /// Deactivate a blacklist entry by id.
    Remove { entry_id: i64 },
    /// List active blacklist entries, newest first.
    List,
    /// Check whether a phone is blacklisted in a campaign context.
    Check {
        phone: String,
        #[arg(long)]
        campaign: Option<i64>,
    },
}

pub async fn run(
    registry: &BlacklistRegistry,
    command: BlacklistCommands,
    json: bool,
) -> Result<(), OutdialError> {
    match command {
        BlacklistCommands::Add {
            phone,
            campaign,
            reason,
            by,
        } => {
            let entry = registry
                .add(NewBlacklistEntry {
                    phone,
                    reason,
                    campaign_id: campaign,
                    contact_id: None,
                    blacklisted_by: by,
                })
                .await?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&entry).map_err(OutdialError::storage)?
                );
            } else {
                let scope = entry
                    .campaign_id
                    .map(|id| format!("campaign {id}"))
                    .unwrap_or_else(|| "all campaigns".to_string());
                println!(
                    "{} {} ({scope}) as entry {}",
                    "blacklisted:".red().bold(),
                    entry.phone,
                    entry.id
                );
            }
        }
        BlacklistCommands::Remove { entry_id } => {
            let outcome = registry.deactivate(entry_id).await?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "entry": outcome.entry,
                        "contacts_cleared": outcome.contacts_cleared,
                    }))
                    .map_err(OutdialError::storage)?
                );
            } else {
                println!(
                    "{} entry {} ({} contact(s) cleared)",
                    "deactivated:".green().bold(),
                    entry_id,
                    outcome.contacts_cleared
                );
            }
        }
        BlacklistCommands::List => {
            let entries = registry.list().await?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&entries).map_err(OutdialError::storage)?
                );
            } else if entries.is_empty() {
                println!("{}", "blacklist is empty".yellow());
            } else {
                for entry in &entries {
                    let scope = entry
                        .campaign_id
                        .map(|id| format!("campaign {id}"))
                        .unwrap_or_else(|| "global".to_string());
                    println!(
                        "{} {} [{scope}] {} {}",
                        entry.id,
                        entry.phone,
                        entry.created_at,
                        entry.reason.as_deref().unwrap_or("")
                    );
                }
            }
        }
        BlacklistCommands::Check { phone, campaign } => {
            let covered = registry.is_blacklisted(&phone, campaign).await?;
            if json {
                println!("{}", serde_json::json!({ "blacklisted": covered }));
            } else if covered {
                println!("{} {phone}", "blacklisted:".red().bold());
            } else {
                println!("{} {phone}", "clear:".green().bold());
            }
        }
    }
    Ok(())
}
