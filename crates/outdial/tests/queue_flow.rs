// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end queue lifecycle over a real temp-dir database.

use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use outdial_core::outcome::CallOutcome;
use outdial_core::types::{CallStatus, NewBlacklistEntry, QueueType};
use outdial_core::OutdialError;
use outdial_queue::CallReport;
use outdial_test_utils::TestHarness;

fn at(day: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 4, day)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

#[tokio::test]
async fn full_lifecycle_from_import_to_lead() {
    let harness = TestHarness::new().await.unwrap();
    let contact = harness.seed_contact("+48555100200", Some(1)).await.unwrap();

    // Batch assignment picks up the fresh contact.
    let assigned = harness
        .queue
        .auto_assign_contacts_to_ankieter(7, None)
        .await
        .unwrap();
    assert_eq!(assigned.len(), 1);

    // First attempt: nobody answers, a clamped retry is queued.
    let next = harness
        .queue
        .next_contact_for_ankieter_at(7, at(6, 10, 0))
        .await
        .unwrap()
        .expect("fresh entry selectable");
    assert_eq!(next.contact.id, contact.id);

    let report = harness
        .queue
        .process_call_result_at(
            contact.id,
            7,
            CallOutcome::NoAnswer,
            CallReport::default(),
            at(6, 19, 0),
        )
        .await
        .unwrap();
    let retry = report.follow_up.expect("no_answer queues a retry");
    assert_eq!(retry.queue_type, QueueType::Retry);
    // 19:00 + 4h falls past closing; next morning at opening.
    assert_eq!(retry.scheduled_at, "2026-04-07T08:00:00.000Z");

    // The retry is invisible before its due time and selectable after.
    assert!(harness
        .queue
        .next_contact_for_ankieter_at(7, at(6, 20, 0))
        .await
        .unwrap()
        .is_none());
    let next = harness
        .queue
        .next_contact_for_ankieter_at(7, at(7, 9, 0))
        .await
        .unwrap()
        .expect("due retry selectable");
    assert_eq!(next.call.queue_type, QueueType::Retry);

    // Second attempt converts; stats are notified once, post-commit.
    let report = harness
        .queue
        .process_call_result_at(
            contact.id,
            7,
            CallOutcome::Lead,
            CallReport {
                duration_seconds: Some(240),
                event_id: Some("evt-1".into()),
                ..CallReport::default()
            },
            at(7, 9, 5),
        )
        .await
        .unwrap();
    assert!(report.follow_up.is_none());

    let events = harness.stats.wait_for(1, Duration::from_secs(2)).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].contact_id, contact.id);
    assert_eq!(events[0].call_id, report.call_id);

    // Ledger shows both recorded attempts; no queue entries remain.
    let history = harness.queue.call_history(contact.id).await.unwrap();
    let recorded: Vec<_> = history
        .iter()
        .filter(|c| !matches!(c.status, CallStatus::Pending | CallStatus::InProgress))
        .collect();
    assert_eq!(recorded.len(), 2);
    assert!(recorded.iter().any(|c| c.status == CallStatus::NoAnswer));
    assert!(recorded.iter().any(|c| c.status == CallStatus::Lead));
    let snap = harness.queue.snapshot().await.unwrap();
    assert_eq!(snap.pending_calls, 0);
}

#[tokio::test]
async fn broken_stats_sink_never_fails_the_outcome() {
    let harness = TestHarness::new().await.unwrap();
    harness.stats.fail_next_calls();
    let contact = harness
        .seed_assigned_contact("+48555100201", Some(1), 7)
        .await
        .unwrap();

    let report = harness
        .queue
        .process_call_result(contact.id, 7, CallOutcome::Lead, CallReport::default())
        .await
        .unwrap();
    assert_eq!(report.attempts, 1);

    // The sink rejected the event; nothing was recorded and nothing failed.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(harness.stats.events().is_empty());
    let updated = harness.queue.contact(contact.id).await.unwrap();
    assert_eq!(updated.call_attempts, 1);
}

#[tokio::test]
async fn blacklisting_mid_campaign_stops_further_calls() {
    let harness = TestHarness::new().await.unwrap();
    let contact = harness
        .seed_assigned_contact("+48555100202", Some(2), 7)
        .await
        .unwrap();

    harness
        .queue
        .process_call_result(contact.id, 7, CallOutcome::Blacklist, CallReport::default())
        .await
        .unwrap();

    // The queue refuses new work for the contact.
    let err = harness
        .queue
        .assign_contact_to_ankieter(contact.id, 8)
        .await
        .unwrap_err();
    assert!(matches!(err, OutdialError::ContactNotAssignable { .. }));
    assert!(harness
        .blacklist
        .is_blacklisted("+48555100202", Some(2))
        .await
        .unwrap());

    // Deactivating the entry makes the contact callable again.
    let entries = harness.blacklist.list().await.unwrap();
    assert_eq!(entries.len(), 1);
    let outcome = harness.blacklist.deactivate(entries[0].id).await.unwrap();
    assert_eq!(outcome.contacts_cleared, 1);
    harness
        .queue
        .assign_contact_to_ankieter(contact.id, 8)
        .await
        .unwrap();
}

#[tokio::test]
async fn manual_blacklist_entry_cancels_queued_work() {
    let harness = TestHarness::new().await.unwrap();
    let victim = harness
        .seed_assigned_contact("+48555100203", Some(3), 7)
        .await
        .unwrap();
    let other = harness
        .seed_assigned_contact("+48555100204", Some(3), 7)
        .await
        .unwrap();

    harness
        .blacklist
        .add(NewBlacklistEntry {
            phone: victim.phone.clone(),
            reason: Some("complaint".into()),
            campaign_id: Some(3),
            ..NewBlacklistEntry::default()
        })
        .await
        .unwrap();

    // The blacklisted head makes its tier yield nothing and the dead entry
    // is cancelled; the following selection serves the other contact.
    assert!(harness
        .queue
        .next_contact_for_ankieter_at(7, at(10, 10, 0))
        .await
        .unwrap()
        .is_none());
    let next = harness
        .queue
        .next_contact_for_ankieter_at(7, at(10, 10, 1))
        .await
        .unwrap()
        .expect("other contact still queued");
    assert_eq!(next.contact.id, other.id);
    assert!(harness
        .queue
        .next_contact_for_ankieter_at(7, at(10, 10, 5))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn callbacks_beat_fresh_work_when_due() {
    let harness = TestHarness::new().await.unwrap();
    let fresh = harness
        .seed_assigned_contact("+48555100205", None, 7)
        .await
        .unwrap();
    let returning = harness.seed_contact("+48555100206", None).await.unwrap();

    harness
        .queue
        .schedule_callback_at(
            returning.id,
            7,
            Some(at(12, 15, 0)),
            Some("asked for afternoon".into()),
            at(12, 9, 0),
        )
        .await
        .unwrap();

    // Morning: callback not due yet, fresh work is served.
    let next = harness
        .queue
        .next_contact_for_ankieter_at(7, at(12, 10, 0))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(next.contact.id, fresh.id);
    harness
        .queue
        .process_call_result_at(
            fresh.id,
            7,
            CallOutcome::Rejection,
            CallReport::default(),
            at(12, 10, 4),
        )
        .await
        .unwrap();

    // Afternoon: the due callback wins.
    let next = harness
        .queue
        .next_contact_for_ankieter_at(7, at(12, 15, 30))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(next.contact.id, returning.id);
    assert_eq!(next.call.queue_type, QueueType::Callback);
    assert_eq!(next.call.notes.as_deref(), Some("asked for afternoon"));
}
