// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue orchestration: per-agent selection, assignment, callback scheduling,
//! and the outcome state machine.
//!
//! Every public operation runs as one storage transaction, so a crash or a
//! domain error mid-operation leaves no partial state. Methods come in pairs:
//! the public form stamps the wall clock, the `_at` form takes an explicit
//! `now` for deterministic tests.

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use tracing::{debug, info, warn};

use outdial_config::model::QueueConfig;
use outdial_core::outcome::{CallOutcome, Disposition};
use outdial_core::time::{format_timestamp, now};
use outdial_core::types::{
    Call, CallStatus, Contact, NewBlacklistEntry, NewCall, NewContact, Priority, QueueStatus,
    QueueType,
};
use outdial_core::{BusinessHours, OutdialError};
use outdial_storage::database::db_err;
use outdial_storage::queries::{blacklist, calls, contacts};
use outdial_storage::Database;

use crate::stats::{LeadEvent, LeadStatsSink, NoopLeadStats};

/// Scheduling parameters derived from `[queue]` configuration.
#[derive(Debug, Clone, Copy)]
pub struct QueuePolicy {
    /// Delay before an automatic retry after `no_answer`/`busy`.
    pub retry_delay: Duration,
    /// Fallback delay for a callback without an explicit date.
    pub callback_fallback: Duration,
    /// Window that automatic retries are clamped into.
    pub hours: BusinessHours,
    /// Batch size for auto-assignment when the caller gives none.
    pub auto_assign_limit: u32,
    /// Attempt cap applied to contacts created without one.
    pub default_max_call_attempts: i32,
}

impl QueuePolicy {
    pub fn from_config(config: &QueueConfig) -> Result<Self, OutdialError> {
        Ok(Self {
            retry_delay: Duration::hours(config.retry_delay_hours),
            callback_fallback: Duration::minutes(config.callback_fallback_minutes),
            hours: BusinessHours::new(config.business_hours_open, config.business_hours_close)?,
            auto_assign_limit: config.auto_assign_limit,
            default_max_call_attempts: config.default_max_call_attempts,
        })
    }
}

impl Default for QueuePolicy {
    fn default() -> Self {
        let defaults = QueueConfig::default();
        Self {
            retry_delay: Duration::hours(defaults.retry_delay_hours),
            callback_fallback: Duration::minutes(defaults.callback_fallback_minutes),
            hours: BusinessHours::default(),
            auto_assign_limit: defaults.auto_assign_limit,
            default_max_call_attempts: defaults.default_max_call_attempts,
        }
    }
}

/// A claimed queue entry handed to an agent.
#[derive(Debug, Clone, PartialEq)]
pub struct NextCall {
    pub call: Call,
    pub contact: Contact,
}

/// Agent-supplied details accompanying a call outcome.
#[derive(Debug, Clone, Default)]
pub struct CallReport {
    pub duration_seconds: Option<i64>,
    pub notes: Option<String>,
    /// Correlation id from the telephony collaborator.
    pub event_id: Option<String>,
    /// Requested time for a `callback` outcome. Ignored for other outcomes.
    pub callback_at: Option<NaiveDateTime>,
}

/// The queue entry created by a processed outcome, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowUp {
    pub call_id: i64,
    pub scheduled_at: String,
    pub queue_type: QueueType,
}

/// What `process_call_result` did.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeReport {
    pub outcome: CallOutcome,
    /// Ledger row recording this attempt.
    pub call_id: i64,
    /// Attempt count after this one.
    pub attempts: i32,
    /// Whether this outcome blacklisted the contact (explicit request or
    /// attempt-cap override).
    pub blacklisted: bool,
    pub follow_up: Option<FollowUp>,
}

/// Aggregate counters for the status report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub total_contacts: i64,
    pub callable_contacts: i64,
    pub blacklisted_contacts: i64,
    pub pending_calls: i64,
}

/// Orchestrates queue selection and the outcome state machine over the
/// shared database handle.
#[derive(Clone)]
pub struct QueueManager {
    db: Database,
    policy: QueuePolicy,
    stats: Arc<dyn LeadStatsSink>,
}

impl QueueManager {
    pub fn new(db: Database, policy: QueuePolicy) -> Self {
        Self::with_stats(db, policy, Arc::new(NoopLeadStats))
    }

    pub fn with_stats(db: Database, policy: QueuePolicy, stats: Arc<dyn LeadStatsSink>) -> Self {
        Self { db, policy, stats }
    }

    pub fn policy(&self) -> &QueuePolicy {
        &self.policy
    }

    /// Create a contact, applying the configured attempt cap when none is
    /// given. A contact whose phone is already covered by an active blacklist
    /// entry is created blacklisted.
    pub async fn add_contact(&self, mut contact: NewContact) -> Result<Contact, OutdialError> {
        if contact.max_call_attempts <= 0 {
            contact.max_call_attempts = self.policy.default_max_call_attempts;
        }
        let now_text = format_timestamp(now());
        self.db
            .transaction(move |tx| {
                let id = contacts::insert(tx, &contact).map_err(db_err)?;
                if blacklist::covers(tx, &contact.phone, contact.campaign_id).map_err(db_err)? {
                    contacts::mark_blacklisted_by_phone(
                        tx,
                        &contact.phone,
                        contact.campaign_id,
                        &now_text,
                    )
                    .map_err(db_err)?;
                }
                contacts::get(tx, id)
                    .map_err(db_err)?
                    .ok_or(OutdialError::ContactNotFound { id })
            })
            .await
    }

    /// Fetch a contact by id.
    pub async fn contact(&self, contact_id: i64) -> Result<Contact, OutdialError> {
        self.db
            .transaction(move |tx| {
                contacts::get(tx, contact_id)
                    .map_err(db_err)?
                    .ok_or(OutdialError::ContactNotFound { id: contact_id })
            })
            .await
    }

    /// Full call history for a contact, newest first.
    pub async fn call_history(&self, contact_id: i64) -> Result<Vec<Call>, OutdialError> {
        self.db
            .transaction(move |tx| {
                contacts::get(tx, contact_id)
                    .map_err(db_err)?
                    .ok_or(OutdialError::ContactNotFound { id: contact_id })?;
                calls::history_for_contact(tx, contact_id).map_err(db_err)
            })
            .await
    }

    /// Aggregate counters for the status report.
    pub async fn snapshot(&self) -> Result<QueueSnapshot, OutdialError> {
        self.db
            .transaction(|tx| {
                let (total, callable, blacklisted) = contacts::counts(tx).map_err(db_err)?;
                let pending = calls::count_pending(tx).map_err(db_err)?;
                Ok(QueueSnapshot {
                    total_contacts: total,
                    callable_contacts: callable,
                    blacklisted_contacts: blacklisted,
                    pending_calls: pending,
                })
            })
            .await
    }

    /// Put a contact on an agent's queue at the default `low` priority.
    /// Idempotent: repeating an assignment returns the existing pending
    /// entry instead of creating a duplicate.
    pub async fn assign_contact_to_ankieter(
        &self,
        contact_id: i64,
        ankieter_id: i64,
    ) -> Result<Call, OutdialError> {
        self.assign_contact_with_priority(contact_id, ankieter_id, Priority::Low)
            .await
    }

    /// Assignment with an explicit queue tier.
    pub async fn assign_contact_with_priority(
        &self,
        contact_id: i64,
        ankieter_id: i64,
        priority: Priority,
    ) -> Result<Call, OutdialError> {
        let now_text = format_timestamp(now());
        let result = self
            .db
            .transaction(move |tx| {
                let contact = contacts::get(tx, contact_id)
                    .map_err(db_err)?
                    .ok_or(OutdialError::ContactNotFound { id: contact_id })?;
                if let Some(reason) = contact.assignability_block() {
                    return Err(OutdialError::ContactNotAssignable {
                        id: contact_id,
                        reason: reason.to_string(),
                    });
                }
                if let Some(existing) =
                    calls::pending_for_pair(tx, contact_id, ankieter_id).map_err(db_err)?
                {
                    return Ok((existing, false));
                }
                contacts::set_assigned(tx, contact_id, Some(ankieter_id), &now_text)
                    .map_err(db_err)?;
                let id = calls::insert(
                    tx,
                    &queue_entry(&contact, ankieter_id, priority, QueueType::New, None),
                )
                .map_err(db_err)?;
                let call = calls::get(tx, id)
                    .map_err(db_err)?
                    .ok_or_else(|| OutdialError::Internal(format!("queue row {id} vanished")))?;
                Ok((call, true))
            })
            .await?;
        let (call, created) = result;
        if created {
            debug!(contact_id, ankieter_id, call_id = call.id, "contact assigned");
        }
        Ok(call)
    }

    /// Assign up to `limit` unassigned callable contacts to an agent, oldest
    /// first. Returns the contacts actually assigned.
    pub async fn auto_assign_contacts_to_ankieter(
        &self,
        ankieter_id: i64,
        limit: Option<u32>,
    ) -> Result<Vec<Contact>, OutdialError> {
        let limit = limit.unwrap_or(self.policy.auto_assign_limit);
        let now_text = format_timestamp(now());
        let assigned = self
            .db
            .transaction(move |tx| {
                let batch = contacts::unassigned_callable(tx, limit).map_err(db_err)?;
                for contact in &batch {
                    contacts::set_assigned(tx, contact.id, Some(ankieter_id), &now_text)
                        .map_err(db_err)?;
                    calls::insert(
                        tx,
                        &queue_entry(contact, ankieter_id, Priority::Low, QueueType::New, None),
                    )
                    .map_err(db_err)?;
                }
                Ok(batch)
            })
            .await?;
        info!(ankieter_id, count = assigned.len(), "auto-assignment batch");
        Ok(assigned)
    }

    /// Select and claim the next call for an agent.
    pub async fn next_contact_for_ankieter(
        &self,
        ankieter_id: i64,
    ) -> Result<Option<NextCall>, OutdialError> {
        self.next_contact_for_ankieter_at(ankieter_id, now()).await
    }

    /// Selection with an explicit clock.
    ///
    /// Tiers are strict: a due high-priority entry always beats medium, and
    /// medium always beats low. High entries are gated on `scheduled_date`;
    /// the other tiers are plain FIFO. A tier whose head contact has become
    /// ineligible yields nothing for this selection (no fallback to the next
    /// row within the tier); the dead entry is cancelled so it cannot block
    /// later selections.
    pub async fn next_contact_for_ankieter_at(
        &self,
        ankieter_id: i64,
        at: NaiveDateTime,
    ) -> Result<Option<NextCall>, OutdialError> {
        let now_text = format_timestamp(at);
        self.db
            .transaction(move |tx| {
                for tier in [Priority::High, Priority::Medium, Priority::Low] {
                    let head = match tier {
                        Priority::High => calls::next_pending_scheduled(tx, ankieter_id, &now_text),
                        tier => calls::next_pending_by_created(tx, ankieter_id, tier),
                    }
                    .map_err(db_err)?;
                    let Some(call) = head else { continue };
                    let contact = contacts::get(tx, call.contact_id)
                        .map_err(db_err)?
                        .ok_or(OutdialError::ContactNotFound {
                            id: call.contact_id,
                        })?;
                    if !contact.can_be_called() {
                        calls::cancel(tx, call.id).map_err(db_err)?;
                        continue;
                    }
                    if !calls::claim(tx, call.id, &now_text).map_err(db_err)? {
                        return Err(OutdialError::PersistenceConflict(format!(
                            "queue entry {} was claimed concurrently",
                            call.id
                        )));
                    }
                    let claimed = calls::get(tx, call.id).map_err(db_err)?.ok_or_else(|| {
                        OutdialError::Internal(format!("queue row {} vanished", call.id))
                    })?;
                    return Ok(Some(NextCall {
                        call: claimed,
                        contact,
                    }));
                }
                Ok(None)
            })
            .await
    }

    /// Schedule a manual callback for a contact on an agent's queue.
    pub async fn schedule_callback(
        &self,
        contact_id: i64,
        ankieter_id: i64,
        at: Option<NaiveDateTime>,
        notes: Option<String>,
    ) -> Result<Call, OutdialError> {
        self.schedule_callback_at(contact_id, ankieter_id, at, notes, now())
            .await
    }

    pub async fn schedule_callback_at(
        &self,
        contact_id: i64,
        ankieter_id: i64,
        at: Option<NaiveDateTime>,
        notes: Option<String>,
        clock: NaiveDateTime,
    ) -> Result<Call, OutdialError> {
        let scheduled = at.unwrap_or_else(|| {
            clock
                .checked_add_signed(self.policy.callback_fallback)
                .unwrap_or(clock)
        });
        let scheduled_text = format_timestamp(scheduled);
        let now_text = format_timestamp(clock);
        self.db
            .transaction(move |tx| {
                let contact = contacts::get(tx, contact_id)
                    .map_err(db_err)?
                    .ok_or(OutdialError::ContactNotFound { id: contact_id })?;
                if let Some(reason) = contact.assignability_block() {
                    return Err(OutdialError::ContactNotAssignable {
                        id: contact_id,
                        reason: reason.to_string(),
                    });
                }
                contacts::set_assigned(tx, contact_id, Some(ankieter_id), &now_text)
                    .map_err(db_err)?;
                let mut entry = queue_entry(
                    &contact,
                    ankieter_id,
                    Priority::High,
                    QueueType::Callback,
                    Some(scheduled_text.clone()),
                );
                entry.notes = notes;
                let id = calls::insert(tx, &entry).map_err(db_err)?;
                calls::get(tx, id)
                    .map_err(db_err)?
                    .ok_or_else(|| OutdialError::Internal(format!("queue row {id} vanished")))
            })
            .await
    }

    /// Record a call outcome and apply its follow-up behavior.
    pub async fn process_call_result(
        &self,
        contact_id: i64,
        ankieter_id: i64,
        outcome: CallOutcome,
        report: CallReport,
    ) -> Result<OutcomeReport, OutdialError> {
        self.process_call_result_at(contact_id, ankieter_id, outcome, report, now())
            .await
    }

    /// Outcome processing with an explicit clock. One transaction covers the
    /// attempt counter, the ledger append, queue completion, blacklisting,
    /// and any follow-up entry; the lead-stats notification happens only
    /// after that transaction commits.
    pub async fn process_call_result_at(
        &self,
        contact_id: i64,
        ankieter_id: i64,
        outcome: CallOutcome,
        report: CallReport,
        clock: NaiveDateTime,
    ) -> Result<OutcomeReport, OutdialError> {
        let policy = self.policy;
        let now_text = format_timestamp(clock);
        let (result, lead) = self
            .db
            .transaction(move |tx| {
                let contact = contacts::get(tx, contact_id)
                    .map_err(db_err)?
                    .ok_or(OutdialError::ContactNotFound { id: contact_id })?;

                // Every processed outcome counts as an attempt, even ones
                // that end the contact's participation.
                contacts::record_attempt(tx, contact_id, &now_text).map_err(db_err)?;
                let attempts = contact.call_attempts + 1;

                // The resolved queue entry carries the priority and queue
                // type the ledger row inherits. An outcome reported without
                // one (a call placed outside the queue) gets the defaults.
                let open = calls::open_for_pair(tx, contact_id, ankieter_id).map_err(db_err)?;
                calls::complete_open_for_pair(tx, contact_id, ankieter_id).map_err(db_err)?;
                let (priority, queue_type) = open
                    .as_ref()
                    .map(|c| (c.priority, c.queue_type))
                    .unwrap_or((Priority::Low, QueueType::New));

                let ledger_id = calls::insert(
                    tx,
                    &NewCall {
                        contact_id,
                        ankieter_id,
                        campaign_id: contact.campaign_id,
                        call_date: Some(now_text.clone()),
                        status: outcome.as_status(),
                        priority,
                        queue_status: QueueStatus::Completed,
                        queue_type,
                        scheduled_date: None,
                        next_call_date: None,
                        duration_seconds: report.duration_seconds,
                        notes: report.notes.clone(),
                        event_id: report.event_id.clone(),
                    },
                )
                .map_err(db_err)?;

                let at_cap = attempts >= contact.max_call_attempts;
                let mut blacklisted = false;
                let mut follow_up = None;

                if at_cap && outcome.blacklists_at_cap() {
                    // Cap override: the number keeps going nowhere, so the
                    // contact is blacklisted instead of retried.
                    add_blacklist_entry(
                        tx,
                        &contact,
                        Some("max call attempts reached".to_string()),
                        &now_text,
                    )?;
                    blacklisted = true;
                } else {
                    match outcome.disposition() {
                        Disposition::Terminal { blacklist: true } => {
                            add_blacklist_entry(
                                tx,
                                &contact,
                                Some("contact requested no further calls".to_string()),
                                &now_text,
                            )?;
                            blacklisted = true;
                        }
                        Disposition::Terminal { blacklist: false } => {}
                        Disposition::RetryLater if at_cap => {
                            // Retryable outcome at the cap without override
                            // coverage cannot happen (RetryLater outcomes all
                            // blacklist at cap), but stay inert if it does.
                        }
                        Disposition::RetryLater => {
                            let scheduled = policy.hours.clamp(
                                clock
                                    .checked_add_signed(policy.retry_delay)
                                    .unwrap_or(clock),
                            );
                            let scheduled_text = format_timestamp(scheduled);
                            let id = calls::insert(
                                tx,
                                &queue_entry(
                                    &contact,
                                    ankieter_id,
                                    Priority::High,
                                    QueueType::Retry,
                                    Some(scheduled_text.clone()),
                                ),
                            )
                            .map_err(db_err)?;
                            follow_up = Some(FollowUp {
                                call_id: id,
                                scheduled_at: scheduled_text,
                                queue_type: QueueType::Retry,
                            });
                        }
                        Disposition::CallbackAt => {
                            // Explicit callback times are honored verbatim;
                            // only the fallback applies the configured delay.
                            let scheduled = report.callback_at.unwrap_or_else(|| {
                                clock
                                    .checked_add_signed(policy.callback_fallback)
                                    .unwrap_or(clock)
                            });
                            let scheduled_text = format_timestamp(scheduled);
                            let mut entry = queue_entry(
                                &contact,
                                ankieter_id,
                                Priority::High,
                                QueueType::Callback,
                                Some(scheduled_text.clone()),
                            );
                            entry.next_call_date = Some(scheduled_text.clone());
                            let id = calls::insert(tx, &entry).map_err(db_err)?;
                            follow_up = Some(FollowUp {
                                call_id: id,
                                scheduled_at: scheduled_text,
                                queue_type: QueueType::Callback,
                            });
                        }
                    }
                }

                let lead = (outcome == CallOutcome::Lead).then(|| LeadEvent {
                    contact_id,
                    ankieter_id,
                    call_id: ledger_id,
                    campaign_id: contact.campaign_id,
                    recorded_at: now_text.clone(),
                });
                Ok((
                    OutcomeReport {
                        outcome,
                        call_id: ledger_id,
                        attempts,
                        blacklisted,
                        follow_up,
                    },
                    lead,
                ))
            })
            .await?;

        debug!(
            contact_id,
            ankieter_id,
            outcome = %result.outcome,
            attempts = result.attempts,
            blacklisted = result.blacklisted,
            "call outcome processed"
        );
        if let Some(event) = lead {
            let sink = Arc::clone(&self.stats);
            tokio::spawn(async move {
                if let Err(err) = sink.lead_recorded(event).await {
                    warn!(error = %err, "lead stats notification failed");
                }
            });
        }
        Ok(result)
    }
}

/// Build a pending queue entry for a contact.
fn queue_entry(
    contact: &Contact,
    ankieter_id: i64,
    priority: Priority,
    queue_type: QueueType,
    scheduled_date: Option<String>,
) -> NewCall {
    NewCall {
        contact_id: contact.id,
        ankieter_id,
        campaign_id: contact.campaign_id,
        call_date: None,
        status: CallStatus::Pending,
        priority,
        queue_status: QueueStatus::Pending,
        queue_type,
        scheduled_date,
        next_call_date: None,
        duration_seconds: None,
        notes: None,
        event_id: None,
    }
}

/// Create a blacklist entry from a call outcome and fan the flag out to
/// contacts sharing the phone within the entry's scope. Skips the insert when
/// an identical active entry already exists (repeat outcomes are not an
/// error).
fn add_blacklist_entry(
    tx: &rusqlite::Transaction<'_>,
    contact: &Contact,
    reason: Option<String>,
    now_text: &str,
) -> Result<(), OutdialError> {
    if blacklist::active_for_pair(tx, &contact.phone, contact.campaign_id)
        .map_err(db_err)?
        .is_none()
    {
        blacklist::insert(
            tx,
            &NewBlacklistEntry {
                phone: contact.phone.clone(),
                reason,
                campaign_id: contact.campaign_id,
                contact_id: Some(contact.id),
                blacklisted_by: None,
            },
        )
        .map_err(db_err)?;
    }
    contacts::mark_blacklisted_by_phone(tx, &contact.phone, contact.campaign_id, now_text)
        .map_err(db_err)?;
    Ok(())
}
