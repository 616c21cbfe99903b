// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outdial - outbound call queue manager for telemarketing campaigns.
//!
//! This is the binary entry point for the outdial CLI.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use outdial_core::OutdialError;
use outdial_queue::{BlacklistRegistry, QueueManager, QueuePolicy};
use outdial_storage::Database;

mod blacklist;
mod contact;
mod queue;
mod status;

/// Outdial - outbound call queue manager for telemarketing campaigns.
#[derive(Parser, Debug)]
#[command(name = "outdial", version, about, long_about = None)]
struct Cli {
    /// Output structured JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Claim the next queued call for an agent.
    Next {
        /// Agent (ankieter) id.
        ankieter_id: i64,
    },
    /// Put a contact on an agent's queue.
    Assign {
        contact_id: i64,
        ankieter_id: i64,
        /// Queue tier: high, medium, or low (default).
        #[arg(long)]
        priority: Option<String>,
    },
    /// Assign a batch of unassigned callable contacts to an agent.
    AutoAssign {
        ankieter_id: i64,
        /// Batch size; defaults to `queue.auto_assign_limit`.
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Schedule a callback for a contact.
    Callback {
        contact_id: i64,
        ankieter_id: i64,
        /// Callback time (`2026-03-10T14:30` or with seconds). Defaults to
        /// now plus the configured fallback delay.
        #[arg(long)]
        at: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Record the outcome of a call.
    Outcome {
        contact_id: i64,
        ankieter_id: i64,
        /// One of: lead, rejection, callback, no_answer, busy,
        /// wrong_number, blacklist.
        outcome: String,
        /// Call duration in seconds.
        #[arg(long)]
        duration: Option<i64>,
        #[arg(long)]
        notes: Option<String>,
        /// Correlation id from the telephony system.
        #[arg(long)]
        event_id: Option<String>,
        /// Requested time for a callback outcome.
        #[arg(long)]
        callback_at: Option<String>,
    },
    /// Manage contacts.
    Contact {
        #[command(subcommand)]
        command: contact::ContactCommands,
    },
    /// Manage the blacklist.
    Blacklist {
        #[command(subcommand)]
        command: blacklist::BlacklistCommands,
    },
    /// Show queue and contact counters.
    Status,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match outdial_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            outdial_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.service.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    log_startup(&config);

    if let Err(err) = run(cli, config).await {
        eprintln!("outdial: {err}");
        std::process::exit(1);
    }
}

fn log_startup(config: &outdial_config::OutdialConfig) {
    info!(
        service = %config.service.name,
        database = %config.storage.database_path,
        "starting outdial"
    );
}

async fn run(cli: Cli, config: outdial_config::OutdialConfig) -> Result<(), OutdialError> {
    let db = Database::open_with(&config.storage.database_path, config.storage.wal_mode).await?;
    let policy = QueuePolicy::from_config(&config.queue)?;
    let manager = QueueManager::new(db.clone(), policy);
    let registry = BlacklistRegistry::new(db.clone(), config.blacklist.deactivation_scope);

    let result = match cli.command {
        Commands::Next { ankieter_id } => queue::run_next(&manager, ankieter_id, cli.json).await,
        Commands::Assign {
            contact_id,
            ankieter_id,
            priority,
        } => queue::run_assign(&manager, contact_id, ankieter_id, priority, cli.json).await,
        Commands::AutoAssign { ankieter_id, limit } => {
            queue::run_auto_assign(&manager, ankieter_id, limit, cli.json).await
        }
        Commands::Callback {
            contact_id,
            ankieter_id,
            at,
            notes,
        } => queue::run_callback(&manager, contact_id, ankieter_id, at, notes, cli.json).await,
        Commands::Outcome {
            contact_id,
            ankieter_id,
            outcome,
            duration,
            notes,
            event_id,
            callback_at,
        } => {
            queue::run_outcome(
                &manager,
                contact_id,
                ankieter_id,
                &outcome,
                duration,
                notes,
                event_id,
                callback_at,
                cli.json,
            )
            .await
        }
        Commands::Contact { command } => contact::run(&manager, command, cli.json).await,
        Commands::Blacklist { command } => blacklist::run(&registry, command, cli.json).await,
        Commands::Status => status::run_status(&manager, cli.json).await,
    };

    db.close().await?;
    result
}

#[cfg(test)]
mod tests {
    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Verify jemalloc is the global allocator by advancing the epoch.
        // Only jemalloc supports this -- the system allocator would fail.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn startup_event_names_the_database() {
        use std::io::Write;
        use std::sync::{Arc, Mutex};

        #[derive(Clone)]
        struct Capture(Arc<Mutex<Vec<u8>>>);

        impl Write for Capture {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for Capture {
            type Writer = Capture;
            fn make_writer(&'a self) -> Capture {
                self.clone()
            }
        }

        let capture = Capture(Arc::new(Mutex::new(Vec::new())));
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            super::log_startup(&outdial_config::OutdialConfig::default());
        });

        let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("starting outdial"));
        assert!(output.contains("outdial.db"));
    }

    #[test]
    fn cli_parses_outcome_command() {
        use clap::Parser;
        let cli = super::Cli::parse_from([
            "outdial", "outcome", "12", "7", "no_answer", "--duration", "30",
        ]);
        assert!(matches!(
            cli.command,
            super::Commands::Outcome {
                contact_id: 12,
                ankieter_id: 7,
                ..
            }
        ));
    }
}
