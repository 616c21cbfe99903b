// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Administrative blacklist operations.
//!
//! Entries created from call outcomes go through the queue manager; this
//! registry covers the manual surface: adding an exclusion by phone number,
//! deactivating one by id, and listing what is active. Every mutation fans
//! the `is_blacklisted` flag out to the contacts it affects in the same
//! transaction.

use tracing::info;

use outdial_config::DeactivationScope;
use outdial_core::time::{format_timestamp, now};
use outdial_core::types::{BlacklistEntry, NewBlacklistEntry};
use outdial_core::OutdialError;
use outdial_storage::database::db_err;
use outdial_storage::queries::{blacklist, contacts};
use outdial_storage::Database;

/// Result of deactivating an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct DeactivationOutcome {
    pub entry: BlacklistEntry,
    /// Contacts whose `is_blacklisted` flag was cleared. Contacts still
    /// covered by another active entry stay flagged.
    pub contacts_cleared: usize,
}

/// Manual blacklist administration over the shared database handle.
#[derive(Clone)]
pub struct BlacklistRegistry {
    db: Database,
    scope: DeactivationScope,
}

impl BlacklistRegistry {
    pub fn new(db: Database, scope: DeactivationScope) -> Self {
        Self { db, scope }
    }

    /// Whether any active entry covers `phone` in the given campaign
    /// context. A globally scoped entry covers every campaign.
    pub async fn is_blacklisted(
        &self,
        phone: &str,
        campaign_id: Option<i64>,
    ) -> Result<bool, OutdialError> {
        let phone = phone.to_string();
        self.db
            .transaction(move |tx| blacklist::covers(tx, &phone, campaign_id).map_err(db_err))
            .await
    }

    /// Create an entry and flag every contact it covers. An identical active
    /// entry already existing is a conflict, not a silent no-op.
    pub async fn add(&self, entry: NewBlacklistEntry) -> Result<BlacklistEntry, OutdialError> {
        let now_text = format_timestamp(now());
        let created = self
            .db
            .transaction(move |tx| {
                if blacklist::active_for_pair(tx, &entry.phone, entry.campaign_id)
                    .map_err(db_err)?
                    .is_some()
                {
                    return Err(OutdialError::PersistenceConflict(format!(
                        "active blacklist entry for {} already exists in this scope",
                        entry.phone
                    )));
                }
                let id = blacklist::insert(tx, &entry).map_err(db_err)?;
                contacts::mark_blacklisted_by_phone(tx, &entry.phone, entry.campaign_id, &now_text)
                    .map_err(db_err)?;
                blacklist::get(tx, id)
                    .map_err(db_err)?
                    .ok_or(OutdialError::BlacklistEntryNotFound { id })
            })
            .await?;
        info!(
            phone = %created.phone,
            campaign_id = ?created.campaign_id,
            entry_id = created.id,
            "blacklist entry added"
        );
        Ok(created)
    }

    /// Soft-delete an entry and clear the flag on contacts it covered,
    /// except those still covered by another active entry. Deactivating an
    /// already-inactive entry is a no-op that still reports the entry.
    pub async fn deactivate(&self, id: i64) -> Result<DeactivationOutcome, OutdialError> {
        let scope = self.scope;
        let now_text = format_timestamp(now());
        let outcome = self
            .db
            .transaction(move |tx| {
                let entry = blacklist::get(tx, id)
                    .map_err(db_err)?
                    .ok_or(OutdialError::BlacklistEntryNotFound { id })?;
                if !blacklist::deactivate(tx, id).map_err(db_err)? {
                    return Ok(DeactivationOutcome {
                        entry,
                        contacts_cleared: 0,
                    });
                }
                let clear_campaign = match scope {
                    DeactivationScope::Campaign => entry.campaign_id,
                    DeactivationScope::Global => None,
                };
                let cleared =
                    contacts::clear_blacklisted_by_phone(tx, &entry.phone, clear_campaign, &now_text)
                        .map_err(db_err)?;
                let entry = blacklist::get(tx, id)
                    .map_err(db_err)?
                    .ok_or(OutdialError::BlacklistEntryNotFound { id })?;
                Ok(DeactivationOutcome {
                    entry,
                    contacts_cleared: cleared,
                })
            })
            .await?;
        info!(
            entry_id = id,
            contacts_cleared = outcome.contacts_cleared,
            "blacklist entry deactivated"
        );
        Ok(outcome)
    }

    /// All active entries, newest first.
    pub async fn list(&self) -> Result<Vec<BlacklistEntry>, OutdialError> {
        self.db
            .transaction(|tx| blacklist::list_active(tx).map_err(db_err))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outdial_core::types::NewContact;

    async fn setup() -> (Database, BlacklistRegistry) {
        let db = Database::open_in_memory().await.unwrap();
        let registry = BlacklistRegistry::new(db.clone(), DeactivationScope::Campaign);
        (db, registry)
    }

    async fn seed_contact(db: &Database, phone: &str, campaign_id: Option<i64>) -> i64 {
        let phone = phone.to_string();
        db.transaction(move |tx| {
            contacts::insert(
                tx,
                &NewContact {
                    name: "Seed".into(),
                    phone,
                    campaign_id,
                    max_call_attempts: 3,
                    ..NewContact::default()
                },
            )
            .map_err(db_err)
        })
        .await
        .unwrap()
    }

    async fn contact_flag(db: &Database, id: i64) -> bool {
        db.transaction(move |tx| {
            Ok(contacts::get(tx, id)
                .map_err(db_err)?
                .map(|c| c.is_blacklisted)
                .unwrap_or(false))
        })
        .await
        .unwrap()
    }

    fn entry(phone: &str, campaign_id: Option<i64>) -> NewBlacklistEntry {
        NewBlacklistEntry {
            phone: phone.into(),
            reason: Some("manual opt-out".into()),
            campaign_id,
            blacklisted_by: Some(1),
            ..NewBlacklistEntry::default()
        }
    }

    #[tokio::test]
    async fn add_flags_covered_contacts() {
        let (db, registry) = setup().await;
        let in_scope = seed_contact(&db, "+48900", Some(3)).await;
        let out_of_scope = seed_contact(&db, "+48900", Some(4)).await;

        registry.add(entry("+48900", Some(3))).await.unwrap();
        assert!(contact_flag(&db, in_scope).await);
        assert!(!contact_flag(&db, out_of_scope).await);
        assert!(registry.is_blacklisted("+48900", Some(3)).await.unwrap());
        assert!(!registry.is_blacklisted("+48900", Some(4)).await.unwrap());
    }

    #[tokio::test]
    async fn global_entry_covers_every_campaign() {
        let (db, registry) = setup().await;
        let a = seed_contact(&db, "+48901", Some(1)).await;
        let b = seed_contact(&db, "+48901", Some(2)).await;

        registry.add(entry("+48901", None)).await.unwrap();
        assert!(contact_flag(&db, a).await);
        assert!(contact_flag(&db, b).await);
        assert!(registry.is_blacklisted("+48901", Some(2)).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_active_entry_is_a_conflict() {
        let (_db, registry) = setup().await;
        registry.add(entry("+48902", Some(1))).await.unwrap();

        let err = registry.add(entry("+48902", Some(1))).await.unwrap_err();
        assert!(matches!(err, OutdialError::PersistenceConflict(_)));

        // A different scope is a different entry.
        registry.add(entry("+48902", Some(2))).await.unwrap();
    }

    #[tokio::test]
    async fn deactivate_clears_contacts_and_lists_shrink() {
        let (db, registry) = setup().await;
        let contact = seed_contact(&db, "+48903", Some(1)).await;
        let created = registry.add(entry("+48903", Some(1))).await.unwrap();
        assert!(contact_flag(&db, contact).await);

        let outcome = registry.deactivate(created.id).await.unwrap();
        assert!(!outcome.entry.is_active);
        assert_eq!(outcome.contacts_cleared, 1);
        assert!(!contact_flag(&db, contact).await);
        assert!(registry.list().await.unwrap().is_empty());

        // Re-adding after deactivation is allowed.
        registry.add(entry("+48903", Some(1))).await.unwrap();
    }

    #[tokio::test]
    async fn deactivate_keeps_contacts_covered_elsewhere() {
        let (db, registry) = setup().await;
        let contact = seed_contact(&db, "+48904", Some(1)).await;
        let scoped = registry.add(entry("+48904", Some(1))).await.unwrap();
        registry.add(entry("+48904", None)).await.unwrap();

        let outcome = registry.deactivate(scoped.id).await.unwrap();
        assert_eq!(outcome.contacts_cleared, 0);
        assert!(contact_flag(&db, contact).await, "global entry still covers");
    }

    #[tokio::test]
    async fn deactivate_unknown_id_fails() {
        let (_db, registry) = setup().await;
        let err = registry.deactivate(404).await.unwrap_err();
        assert!(matches!(
            err,
            OutdialError::BlacklistEntryNotFound { id: 404 }
        ));
    }

    #[tokio::test]
    async fn deactivate_twice_is_a_reported_no_op() {
        let (_db, registry) = setup().await;
        let created = registry.add(entry("+48905", None)).await.unwrap();
        registry.deactivate(created.id).await.unwrap();

        let again = registry.deactivate(created.id).await.unwrap();
        assert!(!again.entry.is_active);
        assert_eq!(again.contacts_cleared, 0);
    }

    #[tokio::test]
    async fn list_is_newest_first_and_active_only() {
        let (_db, registry) = setup().await;
        let first = registry.add(entry("+48906", None)).await.unwrap();
        registry.add(entry("+48907", None)).await.unwrap();
        registry.deactivate(first.id).await.unwrap();

        let active = registry.list().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].phone, "+48907");
    }
}
