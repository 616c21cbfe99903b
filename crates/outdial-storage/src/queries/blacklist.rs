// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blacklist entry operations.
//!
//! Entries are soft-deleted: `deactivate` flips `is_active` and the row stays
//! as an audit record. A global entry (`campaign_id IS NULL`) covers every
//! campaign; a scoped entry covers only its own.

use outdial_core::types::{BlacklistEntry, NewBlacklistEntry};
use rusqlite::{params, Connection, Row};

use super::OptionalExt;

const BLACKLIST_COLS: &str =
    "id, phone, reason, campaign_id, contact_id, blacklisted_by, is_active, created_at";

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<BlacklistEntry> {
    Ok(BlacklistEntry {
        id: row.get(0)?,
        phone: row.get(1)?,
        reason: row.get(2)?,
        campaign_id: row.get(3)?,
        contact_id: row.get(4)?,
        blacklisted_by: row.get(5)?,
        is_active: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Insert an active entry. Returns the new id.
pub fn insert(conn: &Connection, entry: &NewBlacklistEntry) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO blacklist (phone, reason, campaign_id, contact_id, blacklisted_by)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            entry.phone,
            entry.reason,
            entry.campaign_id,
            entry.contact_id,
            entry.blacklisted_by,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get an entry by id.
pub fn get(conn: &Connection, id: i64) -> rusqlite::Result<Option<BlacklistEntry>> {
    conn.query_row(
        &format!("SELECT {BLACKLIST_COLS} FROM blacklist WHERE id = ?1"),
        params![id],
        row_to_entry,
    )
    .optional()
}

/// The active entry for an exact (phone, scope) pair, if any. `IS` makes the
/// NULL (global) scope comparable.
pub fn active_for_pair(
    conn: &Connection,
    phone: &str,
    campaign_id: Option<i64>,
) -> rusqlite::Result<Option<BlacklistEntry>> {
    conn.query_row(
        &format!(
            "SELECT {BLACKLIST_COLS} FROM blacklist
             WHERE phone = ?1 AND campaign_id IS ?2 AND is_active = 1
             LIMIT 1"
        ),
        params![phone, campaign_id],
        row_to_entry,
    )
    .optional()
}

/// Whether any active entry covers a phone in a campaign context: a global
/// entry always does, a scoped entry only within its campaign.
pub fn covers(conn: &Connection, phone: &str, campaign_id: Option<i64>) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM blacklist
         WHERE phone = ?1 AND is_active = 1
           AND (campaign_id IS NULL OR campaign_id IS ?2)",
        params![phone, campaign_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Soft-delete an entry. Returns `false` when the id does not exist or the
/// entry is already inactive.
pub fn deactivate(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE blacklist SET is_active = 0 WHERE id = ?1 AND is_active = 1",
        params![id],
    )?;
    Ok(changed == 1)
}

/// All active entries, newest first.
pub fn list_active(conn: &Connection) -> rusqlite::Result<Vec<BlacklistEntry>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BLACKLIST_COLS} FROM blacklist WHERE is_active = 1
         ORDER BY created_at DESC, id DESC"
    ))?;
    let rows = stmt.query_map([], row_to_entry)?;
    rows.collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        crate::migrations::run_migrations(&mut conn).unwrap();
        conn
    }

    fn entry(phone: &str, campaign_id: Option<i64>) -> NewBlacklistEntry {
        NewBlacklistEntry {
            phone: phone.into(),
            reason: Some("opt-out".into()),
            campaign_id,
            ..NewBlacklistEntry::default()
        }
    }

    #[test]
    fn insert_and_get_round_trips() {
        let conn = setup_conn();
        let id = insert(&conn, &entry("+48111", Some(5))).unwrap();
        let stored = get(&conn, id).unwrap().unwrap();
        assert_eq!(stored.phone, "+48111");
        assert_eq!(stored.campaign_id, Some(5));
        assert!(stored.is_active);
    }

    #[test]
    fn active_for_pair_distinguishes_null_scope() {
        let conn = setup_conn();
        insert(&conn, &entry("+48222", None)).unwrap();

        assert!(active_for_pair(&conn, "+48222", None).unwrap().is_some());
        // A global entry is not the same pair as a scoped one.
        assert!(active_for_pair(&conn, "+48222", Some(5)).unwrap().is_none());
    }

    #[test]
    fn covers_global_applies_everywhere() {
        let conn = setup_conn();
        insert(&conn, &entry("+48333", None)).unwrap();

        assert!(covers(&conn, "+48333", None).unwrap());
        assert!(covers(&conn, "+48333", Some(5)).unwrap());
    }

    #[test]
    fn covers_scoped_applies_only_within_campaign() {
        let conn = setup_conn();
        insert(&conn, &entry("+48444", Some(5))).unwrap();

        assert!(covers(&conn, "+48444", Some(5)).unwrap());
        assert!(!covers(&conn, "+48444", Some(6)).unwrap());
        assert!(!covers(&conn, "+48444", None).unwrap());
    }

    #[test]
    fn deactivate_is_soft_and_idempotence_visible() {
        let conn = setup_conn();
        let id = insert(&conn, &entry("+48555", None)).unwrap();

        assert!(deactivate(&conn, id).unwrap());
        assert!(!deactivate(&conn, id).unwrap(), "already inactive");
        assert!(!deactivate(&conn, 9999).unwrap(), "unknown id");

        // Row survives as an audit record.
        let stored = get(&conn, id).unwrap().unwrap();
        assert!(!stored.is_active);
        assert!(!covers(&conn, "+48555", None).unwrap());
    }

    #[test]
    fn list_active_excludes_deactivated() {
        let conn = setup_conn();
        let a = insert(&conn, &entry("+48666", None)).unwrap();
        insert(&conn, &entry("+48777", Some(2))).unwrap();
        deactivate(&conn, a).unwrap();

        let active = list_active(&conn).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].phone, "+48777");
    }
}
