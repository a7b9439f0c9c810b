//! Sync engine - per-user calendar reconciliation.
//!
//! Fetches a user's upcoming meetings, classifies them, upserts them into
//! the meeting store with dedup-by-external-id semantics, and publishes one
//! prep trigger event for each meeting newly inside its prep window.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use preppulse_domain::{Meeting, MeetingStatus, PrepTriggerEvent, Result, User};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::ports::{CalendarSource, MeetingRepository, TriggerPublisher};
use crate::classification::MeetingClassifier;

/// Counters returned by one per-user sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub meetings_synced: usize,
    pub preps_triggered: usize,
}

/// Per-user reconciliation engine.
pub struct SyncEngine {
    classifier: Arc<MeetingClassifier>,
    meetings: Arc<dyn MeetingRepository>,
    calendar: Arc<dyn CalendarSource>,
    publisher: Arc<dyn TriggerPublisher>,
    lookahead_days: i64,
    max_results: usize,
}

impl SyncEngine {
    /// Create a new sync engine.
    pub fn new(
        classifier: Arc<MeetingClassifier>,
        meetings: Arc<dyn MeetingRepository>,
        calendar: Arc<dyn CalendarSource>,
        publisher: Arc<dyn TriggerPublisher>,
    ) -> Self {
        Self {
            classifier,
            meetings,
            calendar,
            publisher,
            lookahead_days: preppulse_domain::constants::DEFAULT_LOOKAHEAD_DAYS,
            max_results: preppulse_domain::constants::DEFAULT_MAX_EVENTS,
        }
    }

    /// Override the forward-looking fetch window.
    pub fn with_lookahead_days(mut self, days: i64) -> Self {
        self.lookahead_days = days;
        self
    }

    /// Reconcile one user's calendar.
    ///
    /// A calendar fetch failure propagates to the caller; a failure on one
    /// meeting is logged and skipped so the rest of the batch continues.
    #[instrument(skip(self, user), fields(user_id = %user.user_id))]
    pub async fn sync_user(&self, user: &User) -> Result<SyncOutcome> {
        if !user.calendar_connected {
            warn!(user_id = %user.user_id, "skipping user without calendar connected");
            return Ok(SyncOutcome::default());
        }

        let fetched = self
            .calendar
            .fetch_upcoming_meetings(user, self.lookahead_days, self.max_results)
            .await?;
        info!(
            user_id = %user.user_id,
            meetings_found = fetched.len(),
            lookahead_days = self.lookahead_days,
            "fetched calendar meetings"
        );

        let now = Utc::now();
        let mut outcome = SyncOutcome::default();

        for mut meeting in fetched {
            let stored = match self.classify_and_store(&mut meeting, now).await {
                Ok(stored) => stored,
                Err(e) => {
                    error!(
                        user_id = %user.user_id,
                        meeting_id = %meeting.meeting_id,
                        error = %e,
                        "failed to sync meeting, continuing with batch"
                    );
                    continue;
                }
            };
            outcome.meetings_synced += 1;

            match self.maybe_trigger_prep(&stored, now).await {
                Ok(true) => outcome.preps_triggered += 1,
                Ok(false) => {}
                Err(e) => {
                    error!(
                        user_id = %user.user_id,
                        meeting_id = %stored.meeting_id,
                        error = %e,
                        "failed to publish prep trigger"
                    );
                }
            }
        }

        info!(
            user_id = %user.user_id,
            meetings_synced = outcome.meetings_synced,
            preps_triggered = outcome.preps_triggered,
            "user calendar sync completed"
        );
        Ok(outcome)
    }

    /// Classify a fetched meeting and upsert it into the store.
    ///
    /// Dedup is by `(user_id, external_id)`: an existing row keeps its
    /// `meeting_id`, `created_at`, and the fields owned by later pipeline
    /// stages; calendar-derived fields are overwritten.
    async fn classify_and_store(
        &self,
        meeting: &mut Meeting,
        now: DateTime<Utc>,
    ) -> Result<Meeting> {
        meeting.meeting_type = self.classifier.classify(meeting);
        if meeting.status == MeetingStatus::Discovered {
            meeting.status = MeetingStatus::Classified;
        }
        meeting.prep_hours_before = Some(self.classifier.lead_hours(meeting.meeting_type));
        meeting.last_synced_at = Some(now);

        let existing = match &meeting.external_id {
            Some(external_id) => {
                self.meetings.find_by_external_id(&meeting.user_id, external_id).await?
            }
            None => self.meetings.get(&meeting.meeting_id).await?,
        };

        match existing {
            Some(previous) => {
                meeting.meeting_id = previous.meeting_id;
                meeting.created_at = previous.created_at;
                // Fields owned by later pipeline stages survive re-sync.
                meeting.status = previous.status;
                meeting.chat_session_id = previous.chat_session_id;
                meeting.notification_id = previous.notification_id;
                meeting.notification_sent_at = previous.notification_sent_at;
                if meeting.status == MeetingStatus::Discovered {
                    meeting.status = MeetingStatus::Classified;
                }
                debug!(meeting_id = %meeting.meeting_id, "updating existing meeting");
            }
            None => {
                if meeting.meeting_id.is_empty() {
                    meeting.meeting_id = format!("mtg-{}", Uuid::now_v7().simple());
                }
                meeting.created_at = now;
                debug!(meeting_id = %meeting.meeting_id, "creating new meeting");
            }
        }

        meeting.updated_at = now;
        self.meetings.put(meeting).await?;
        Ok(meeting.clone())
    }

    /// Publish a trigger event if the stored meeting just entered its
    /// window and nothing has acted on it yet.
    ///
    /// The status check is the sole defence against re-triggering on every
    /// rescan while the meeting remains in its window; it relies on the
    /// trigger handler advancing the status before the next scan.
    async fn maybe_trigger_prep(&self, meeting: &Meeting, now: DateTime<Utc>) -> Result<bool> {
        if !self.classifier.is_in_window(meeting, now) {
            debug!(meeting_id = %meeting.meeting_id, "meeting not in prep window");
            return Ok(false);
        }
        if !meeting.status.is_awaiting_prep() {
            debug!(
                meeting_id = %meeting.meeting_id,
                status = %meeting.status,
                "skipping prep trigger for already processed meeting"
            );
            return Ok(false);
        }

        self.publisher.publish(&PrepTriggerEvent::for_meeting(meeting)).await?;
        info!(
            meeting_id = %meeting.meeting_id,
            user_id = %meeting.user_id,
            meeting_type = %meeting.meeting_type,
            "published prep trigger event"
        );
        Ok(true)
    }
}
