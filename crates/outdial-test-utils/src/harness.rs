// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end queue testing.
//!
//! `TestHarness` assembles the full stack over a temp-dir SQLite database:
//! queue manager, blacklist registry, and a recording stats sink. Seed
//! helpers cover the common fixtures so integration tests read as scenarios.

use std::sync::Arc;

use outdial_config::model::QueueConfig;
use outdial_config::DeactivationScope;
use outdial_core::types::{Contact, NewContact};
use outdial_core::OutdialError;
use outdial_queue::{BlacklistRegistry, QueueManager, QueuePolicy};
use outdial_storage::Database;

use crate::mock_stats::RecordingStats;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    queue_config: QueueConfig,
    deactivation_scope: DeactivationScope,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            queue_config: QueueConfig::default(),
            deactivation_scope: DeactivationScope::default(),
        }
    }

    /// Override the queue configuration (retry delays, business hours).
    pub fn with_queue_config(mut self, config: QueueConfig) -> Self {
        self.queue_config = config;
        self
    }

    /// Set the blacklist deactivation fan-out scope.
    pub fn with_deactivation_scope(mut self, scope: DeactivationScope) -> Self {
        self.deactivation_scope = scope;
        self
    }

    /// Build the harness, creating the temp database and all subsystems.
    pub async fn build(self) -> Result<TestHarness, OutdialError> {
        let temp_dir = tempfile::TempDir::new().map_err(OutdialError::storage)?;
        let db_path = temp_dir.path().join("test.db");
        let db = Database::open(&db_path.to_string_lossy()).await?;

        let policy = QueuePolicy::from_config(&self.queue_config)?;
        let stats = Arc::new(RecordingStats::new());
        let queue = QueueManager::with_stats(db.clone(), policy, stats.clone());
        let blacklist = BlacklistRegistry::new(db.clone(), self.deactivation_scope);

        Ok(TestHarness {
            db,
            queue,
            blacklist,
            stats,
            _temp_dir: temp_dir,
        })
    }
}

/// Complete stack over a throwaway database.
pub struct TestHarness {
    pub db: Database,
    pub queue: QueueManager,
    pub blacklist: BlacklistRegistry,
    pub stats: Arc<RecordingStats>,
    // Dropped with the harness, deleting the database file.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with default configuration.
    pub async fn new() -> Result<Self, OutdialError> {
        Self::builder().build().await
    }

    /// Create a contact with the given phone and campaign.
    pub async fn seed_contact(
        &self,
        phone: &str,
        campaign_id: Option<i64>,
    ) -> Result<Contact, OutdialError> {
        self.queue
            .add_contact(NewContact {
                name: format!("Contact {phone}"),
                phone: phone.to_string(),
                campaign_id,
                ..NewContact::default()
            })
            .await
    }

    /// Create a contact already queued for an agent.
    pub async fn seed_assigned_contact(
        &self,
        phone: &str,
        campaign_id: Option<i64>,
        ankieter_id: i64,
    ) -> Result<Contact, OutdialError> {
        let contact = self.seed_contact(phone, campaign_id).await?;
        self.queue
            .assign_contact_to_ankieter(contact.id, ankieter_id)
            .await?;
        Ok(contact)
    }
}
