// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Call ledger and queue operations.
//!
//! One table serves both roles: `queue_status = 'pending'` rows are queued
//! work, rows with a terminal `status` and `queue_status = 'completed'` are
//! finished attempts. The ledger side is append-only; the only mutation a
//! resolved row ever sees is its open queue row flipping to `completed`.

use outdial_core::types::{Call, NewCall, Priority};
use rusqlite::{params, Connection, Row};

use super::{parse_enum_col, OptionalExt};

const CALL_COLS: &str = "id, contact_id, ankieter_id, campaign_id, call_date, status, priority, \
     queue_status, queue_type, scheduled_date, next_call_date, duration_seconds, notes, \
     event_id, created_at";

fn row_to_call(row: &Row<'_>) -> rusqlite::Result<Call> {
    Ok(Call {
        id: row.get(0)?,
        contact_id: row.get(1)?,
        ankieter_id: row.get(2)?,
        campaign_id: row.get(3)?,
        call_date: row.get(4)?,
        status: parse_enum_col(5, row.get::<_, String>(5)?)?,
        priority: parse_enum_col(6, row.get::<_, String>(6)?)?,
        queue_status: parse_enum_col(7, row.get::<_, String>(7)?)?,
        queue_type: parse_enum_col(8, row.get::<_, String>(8)?)?,
        scheduled_date: row.get(9)?,
        next_call_date: row.get(10)?,
        duration_seconds: row.get(11)?,
        notes: row.get(12)?,
        event_id: row.get(13)?,
        created_at: row.get(14)?,
    })
}

/// Insert a call row (queue entry or ledger append). Returns the new id.
pub fn insert(conn: &Connection, call: &NewCall) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO calls (contact_id, ankieter_id, campaign_id, call_date, status, priority,
                            queue_status, queue_type, scheduled_date, next_call_date,
                            duration_seconds, notes, event_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            call.contact_id,
            call.ankieter_id,
            call.campaign_id,
            call.call_date,
            call.status.to_string(),
            call.priority.to_string(),
            call.queue_status.to_string(),
            call.queue_type.to_string(),
            call.scheduled_date,
            call.next_call_date,
            call.duration_seconds,
            call.notes,
            call.event_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get a call row by id.
pub fn get(conn: &Connection, id: i64) -> rusqlite::Result<Option<Call>> {
    conn.query_row(
        &format!("SELECT {CALL_COLS} FROM calls WHERE id = ?1"),
        params![id],
        row_to_call,
    )
    .optional()
}

/// The single pending queue row for a (contact, ankieter) pair, if any.
/// The idempotent-assignment invariant keeps this at most one.
pub fn pending_for_pair(
    conn: &Connection,
    contact_id: i64,
    ankieter_id: i64,
) -> rusqlite::Result<Option<Call>> {
    conn.query_row(
        &format!(
            "SELECT {CALL_COLS} FROM calls
             WHERE contact_id = ?1 AND ankieter_id = ?2 AND queue_status = 'pending'
             LIMIT 1"
        ),
        params![contact_id, ankieter_id],
        row_to_call,
    )
    .optional()
}

/// The open (pending or claimed) queue row for a pair, if any.
pub fn open_for_pair(
    conn: &Connection,
    contact_id: i64,
    ankieter_id: i64,
) -> rusqlite::Result<Option<Call>> {
    conn.query_row(
        &format!(
            "SELECT {CALL_COLS} FROM calls
             WHERE contact_id = ?1 AND ankieter_id = ?2
               AND queue_status IN ('pending', 'in_progress')
             ORDER BY id DESC
             LIMIT 1"
        ),
        params![contact_id, ankieter_id],
        row_to_call,
    )
    .optional()
}

/// Mark every open queue row for a pair as completed (superseded by a new
/// ledger row). Returns the number of rows flipped.
pub fn complete_open_for_pair(
    conn: &Connection,
    contact_id: i64,
    ankieter_id: i64,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE calls SET queue_status = 'completed'
         WHERE contact_id = ?1 AND ankieter_id = ?2
           AND queue_status IN ('pending', 'in_progress')",
        params![contact_id, ankieter_id],
    )
}

/// Head of the high-priority tier for an agent: pending rows whose
/// `scheduled_date` is null or due, earliest schedule first.
pub fn next_pending_scheduled(
    conn: &Connection,
    ankieter_id: i64,
    now: &str,
) -> rusqlite::Result<Option<Call>> {
    conn.query_row(
        &format!(
            "SELECT {CALL_COLS} FROM calls
             WHERE ankieter_id = ?1 AND queue_status = 'pending' AND priority = 'high'
               AND (scheduled_date IS NULL OR scheduled_date <= ?2)
             ORDER BY scheduled_date ASC
             LIMIT 1"
        ),
        params![ankieter_id, now],
        row_to_call,
    )
    .optional()
}

/// Head of the medium or low tier: pending rows ordered by creation.
pub fn next_pending_by_created(
    conn: &Connection,
    ankieter_id: i64,
    priority: Priority,
) -> rusqlite::Result<Option<Call>> {
    conn.query_row(
        &format!(
            "SELECT {CALL_COLS} FROM calls
             WHERE ankieter_id = ?1 AND queue_status = 'pending' AND priority = ?2
             ORDER BY created_at ASC, id ASC
             LIMIT 1"
        ),
        params![ankieter_id, priority.to_string()],
        row_to_call,
    )
    .optional()
}

/// Atomically claim a pending queue row for execution.
///
/// The conditional update closes the next-contact race: of two concurrent
/// selections of the same row, only one sees a row still pending. Returns
/// `false` when the row was already claimed or resolved.
pub fn claim(conn: &Connection, call_id: i64, now: &str) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE calls SET queue_status = 'in_progress', status = 'in_progress', call_date = ?2
         WHERE id = ?1 AND queue_status = 'pending'",
        params![call_id, now],
    )?;
    Ok(changed == 1)
}

/// Drop a pending queue row whose contact is no longer callable. Returns
/// `false` when the row was already claimed or resolved.
pub fn cancel(conn: &Connection, call_id: i64) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE calls SET queue_status = 'cancelled' WHERE id = ?1 AND queue_status = 'pending'",
        params![call_id],
    )?;
    Ok(changed == 1)
}

/// Full call history for a contact, newest first, for reporting consumers.
pub fn history_for_contact(conn: &Connection, contact_id: i64) -> rusqlite::Result<Vec<Call>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CALL_COLS} FROM calls WHERE contact_id = ?1
         ORDER BY created_at DESC, id DESC"
    ))?;
    let rows = stmt.query_map(params![contact_id], row_to_call)?;
    rows.collect()
}

/// Number of pending queue rows across all agents.
pub fn count_pending(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM calls WHERE queue_status = 'pending'",
        [],
        |row| row.get(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use outdial_core::types::{CallStatus, NewContact, QueueStatus, QueueType};

    fn setup_conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        crate::migrations::run_migrations(&mut conn).unwrap();
        conn
    }

    fn seed_contact(conn: &Connection, phone: &str) -> i64 {
        crate::queries::contacts::insert(
            conn,
            &NewContact {
                name: "X".into(),
                phone: phone.into(),
                max_call_attempts: 3,
                ..NewContact::default()
            },
        )
        .unwrap()
    }

    fn pending_call(contact_id: i64, ankieter_id: i64, priority: Priority) -> NewCall {
        NewCall {
            contact_id,
            ankieter_id,
            campaign_id: None,
            call_date: None,
            status: CallStatus::Pending,
            priority,
            queue_status: QueueStatus::Pending,
            queue_type: QueueType::New,
            scheduled_date: None,
            next_call_date: None,
            duration_seconds: None,
            notes: None,
            event_id: None,
        }
    }

    #[test]
    fn insert_and_get_round_trips_enums() {
        let conn = setup_conn();
        let contact = seed_contact(&conn, "+481");
        let id = insert(&conn, &pending_call(contact, 7, Priority::Medium)).unwrap();

        let call = get(&conn, id).unwrap().unwrap();
        assert_eq!(call.status, CallStatus::Pending);
        assert_eq!(call.priority, Priority::Medium);
        assert_eq!(call.queue_status, QueueStatus::Pending);
        assert_eq!(call.queue_type, QueueType::New);
    }

    #[test]
    fn claim_is_single_winner() {
        let conn = setup_conn();
        let contact = seed_contact(&conn, "+482");
        let id = insert(&conn, &pending_call(contact, 7, Priority::Low)).unwrap();

        assert!(claim(&conn, id, "2026-01-01T09:00:00.000Z").unwrap());
        // Second claim of the same row loses.
        assert!(!claim(&conn, id, "2026-01-01T09:00:01.000Z").unwrap());

        let call = get(&conn, id).unwrap().unwrap();
        assert_eq!(call.queue_status, QueueStatus::InProgress);
        assert_eq!(call.status, CallStatus::InProgress);
        assert_eq!(call.call_date.as_deref(), Some("2026-01-01T09:00:00.000Z"));
    }

    #[test]
    fn scheduled_tier_gates_on_due_date() {
        let conn = setup_conn();
        let contact = seed_contact(&conn, "+483");
        let mut future = pending_call(contact, 7, Priority::High);
        future.scheduled_date = Some("2026-02-01T10:00:00.000Z".into());
        future.queue_type = QueueType::Callback;
        insert(&conn, &future).unwrap();

        // Not yet due.
        let none = next_pending_scheduled(&conn, 7, "2026-01-15T10:00:00.000Z").unwrap();
        assert!(none.is_none());

        // Due now.
        let due = next_pending_scheduled(&conn, 7, "2026-02-01T10:00:00.000Z").unwrap();
        assert!(due.is_some());
    }

    #[test]
    fn scheduled_tier_orders_by_schedule() {
        let conn = setup_conn();
        let c1 = seed_contact(&conn, "+484");
        let c2 = seed_contact(&conn, "+485");
        let mut later = pending_call(c1, 7, Priority::High);
        later.scheduled_date = Some("2026-01-10T12:00:00.000Z".into());
        insert(&conn, &later).unwrap();
        let mut earlier = pending_call(c2, 7, Priority::High);
        earlier.scheduled_date = Some("2026-01-10T09:00:00.000Z".into());
        let earlier_id = insert(&conn, &earlier).unwrap();

        let head = next_pending_scheduled(&conn, 7, "2026-01-11T00:00:00.000Z")
            .unwrap()
            .unwrap();
        assert_eq!(head.id, earlier_id);
    }

    #[test]
    fn created_tier_is_fifo() {
        let conn = setup_conn();
        let c1 = seed_contact(&conn, "+486");
        let c2 = seed_contact(&conn, "+487");
        let first = insert(&conn, &pending_call(c1, 7, Priority::Low)).unwrap();
        insert(&conn, &pending_call(c2, 7, Priority::Low)).unwrap();

        let head = next_pending_by_created(&conn, 7, Priority::Low)
            .unwrap()
            .unwrap();
        assert_eq!(head.id, first);
    }

    #[test]
    fn complete_open_for_pair_flips_pending_and_claimed() {
        let conn = setup_conn();
        let contact = seed_contact(&conn, "+488");
        let id = insert(&conn, &pending_call(contact, 7, Priority::Low)).unwrap();
        claim(&conn, id, "2026-01-01T09:00:00.000Z").unwrap();

        let flipped = complete_open_for_pair(&conn, contact, 7).unwrap();
        assert_eq!(flipped, 1);
        assert!(pending_for_pair(&conn, contact, 7).unwrap().is_none());
        assert!(open_for_pair(&conn, contact, 7).unwrap().is_none());
    }

    #[test]
    fn history_is_newest_first() {
        let conn = setup_conn();
        let contact = seed_contact(&conn, "+489");
        let a = insert(&conn, &pending_call(contact, 7, Priority::Low)).unwrap();
        let b = insert(&conn, &pending_call(contact, 8, Priority::Low)).unwrap();

        let history = history_for_contact(&conn, contact).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, b.max(a));
    }
}
