// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contact store: calling targets and their eligibility state.

use outdial_core::types::{tags_from_json, tags_to_json, Contact, NewContact};
use rusqlite::{params, Connection, Row};

use super::OptionalExt;

const CONTACT_COLS: &str = "id, name, phone, email, company, campaign_id, call_attempts, \
     max_call_attempts, is_blacklisted, is_active, assigned_ankieter_id, last_call_date, \
     notes, tags, created_at, updated_at";

fn row_to_contact(row: &Row<'_>) -> rusqlite::Result<Contact> {
    let tags_raw: String = row.get(13)?;
    Ok(Contact {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
        company: row.get(4)?,
        campaign_id: row.get(5)?,
        call_attempts: row.get(6)?,
        max_call_attempts: row.get(7)?,
        is_blacklisted: row.get(8)?,
        is_active: row.get(9)?,
        assigned_ankieter_id: row.get(10)?,
        last_call_date: row.get(11)?,
        notes: row.get(12)?,
        tags: tags_from_json(&tags_raw),
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

/// Insert a new contact. Returns the auto-generated id.
pub fn insert(conn: &Connection, contact: &NewContact) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO contacts (name, phone, email, company, campaign_id, max_call_attempts, notes, tags)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            contact.name,
            contact.phone,
            contact.email,
            contact.company,
            contact.campaign_id,
            contact.max_call_attempts,
            contact.notes,
            tags_to_json(&contact.tags),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get a contact by id.
pub fn get(conn: &Connection, id: i64) -> rusqlite::Result<Option<Contact>> {
    conn.query_row(
        &format!("SELECT {CONTACT_COLS} FROM contacts WHERE id = ?1"),
        params![id],
        row_to_contact,
    )
    .optional()
}

/// Record a processed attempt: increment `call_attempts` and stamp
/// `last_call_date`. Happens unconditionally for every processed outcome.
pub fn record_attempt(conn: &Connection, id: i64, now: &str) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE contacts SET call_attempts = call_attempts + 1,
         last_call_date = ?2, updated_at = ?2
         WHERE id = ?1",
        params![id, now],
    )?;
    Ok(())
}

/// Set (or clear) the agent a contact is assigned to.
pub fn set_assigned(
    conn: &Connection,
    id: i64,
    ankieter_id: Option<i64>,
    now: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE contacts SET assigned_ankieter_id = ?2, updated_at = ?3 WHERE id = ?1",
        params![id, ankieter_id, now],
    )?;
    Ok(())
}

/// Unassigned, callable contacts for batch auto-assignment, oldest first.
pub fn unassigned_callable(conn: &Connection, limit: u32) -> rusqlite::Result<Vec<Contact>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CONTACT_COLS} FROM contacts
         WHERE assigned_ankieter_id IS NULL
           AND is_active = 1
           AND is_blacklisted = 0
           AND call_attempts < max_call_attempts
         ORDER BY id ASC
         LIMIT ?1"
    ))?;
    let rows = stmt.query_map(params![limit], row_to_contact)?;
    rows.collect()
}

/// Blacklist fan-out: set `is_blacklisted` on every contact sharing `phone`,
/// scoped to one campaign when `campaign_id` is given, across all campaigns
/// when it is `None` (a globally scoped entry).
pub fn mark_blacklisted_by_phone(
    conn: &Connection,
    phone: &str,
    campaign_id: Option<i64>,
    now: &str,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE contacts SET is_blacklisted = 1, updated_at = ?2
         WHERE phone = ?1 AND (?3 IS NULL OR campaign_id = ?3)",
        params![phone, now, campaign_id],
    )
}

/// Reverse fan-out on entry deactivation: clear `is_blacklisted` on contacts
/// sharing `phone` within the scope, except those still covered by another
/// active entry (global or matching their campaign).
pub fn clear_blacklisted_by_phone(
    conn: &Connection,
    phone: &str,
    campaign_id: Option<i64>,
    now: &str,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE contacts SET is_blacklisted = 0, updated_at = ?2
         WHERE phone = ?1
           AND (?3 IS NULL OR campaign_id = ?3)
           AND NOT EXISTS (
               SELECT 1 FROM blacklist b
               WHERE b.phone = contacts.phone
                 AND b.is_active = 1
                 AND (b.campaign_id IS NULL OR b.campaign_id = contacts.campaign_id)
           )",
        params![phone, now, campaign_id],
    )
}

/// (total, callable, blacklisted) counts for the status report.
pub fn counts(conn: &Connection) -> rusqlite::Result<(i64, i64, i64)> {
    conn.query_row(
        "SELECT COUNT(*),
                SUM(CASE WHEN is_active = 1 AND is_blacklisted = 0
                          AND call_attempts < max_call_attempts THEN 1 ELSE 0 END),
                SUM(CASE WHEN is_blacklisted = 1 THEN 1 ELSE 0 END)
         FROM contacts",
        [],
        |row| {
            Ok((
                row.get(0)?,
                row.get::<_, Option<i64>>(1)?.unwrap_or(0),
                row.get::<_, Option<i64>>(2)?.unwrap_or(0),
            ))
        },
    )
}
