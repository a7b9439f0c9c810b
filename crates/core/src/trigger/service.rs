//! Trigger handler - one invocation per inbound prep trigger event.
//!
//! The event bus delivers at-least-once, so the handler is written to be
//! idempotent: a duplicate delivery or an overlapping scan finds the
//! meeting already advanced and skips. The guards are check-then-act over
//! the store (best effort, not transactional) - the same contract the
//! status state machine gives the sync engine.

use std::sync::Arc;

use chrono::Utc;
use preppulse_domain::{
    Meeting, MeetingStatus, NotificationResult, PrepPulseError, PrepTriggerEvent, Result,
};
use tracing::{info, instrument, warn};

use crate::notify::{channel_priority, Notifier};
use crate::sync::ports::{MeetingRepository, UserRepository};

/// Outcome of handling one trigger event.
#[derive(Debug, Clone)]
pub enum TriggerOutcome {
    /// A notification attempt was made (it may still have failed on every
    /// channel; see the result's status).
    Notified(NotificationResult),
    /// The event was a duplicate or the meeting had already moved on.
    Skipped(SkipReason),
}

/// Why a trigger event was skipped without a notification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `notification_sent_at` was already set.
    AlreadyNotified,
    /// Status had advanced past `Discovered`/`Classified`.
    AlreadyProcessed,
}

/// Handles prep trigger events end to end.
pub struct TriggerHandler {
    meetings: Arc<dyn MeetingRepository>,
    users: Arc<dyn UserRepository>,
    notifier: Arc<Notifier>,
}

impl TriggerHandler {
    /// Create a new handler.
    pub fn new(
        meetings: Arc<dyn MeetingRepository>,
        users: Arc<dyn UserRepository>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self { meetings, users, notifier }
    }

    /// Handle one trigger event.
    ///
    /// Malformed events and dangling meeting/user references are terminal
    /// validation errors for this invocation; they are not retried here.
    #[instrument(skip(self, event), fields(meeting_id = %event.meeting_id, user_id = %event.user_id))]
    pub async fn handle(&self, event: &PrepTriggerEvent) -> Result<TriggerOutcome> {
        event.validate()?;

        let mut meeting = self.meetings.get(&event.meeting_id).await?.ok_or_else(|| {
            PrepPulseError::NotFound(format!("meeting {} not found", event.meeting_id))
        })?;
        let user = self.users.get(&event.user_id).await?.ok_or_else(|| {
            PrepPulseError::NotFound(format!("user {} not found", event.user_id))
        })?;

        // Guard 1: this event is a duplicate delivery of one already handled.
        if let Some(sent_at) = meeting.notification_sent_at {
            warn!(
                notification_sent_at = %sent_at,
                "notification already sent, skipping duplicate"
            );
            return Ok(TriggerOutcome::Skipped(SkipReason::AlreadyNotified));
        }

        // Guard 2: another invocation or a later pipeline stage already
        // advanced the meeting past the point where notification applies.
        if !meeting.status.is_awaiting_prep() {
            warn!(status = %meeting.status, "meeting not in valid state for prep, skipping");
            return Ok(TriggerOutcome::Skipped(SkipReason::AlreadyProcessed));
        }

        // Persist the transition before attempting delivery so an
        // overlapping invocation sees the advanced status.
        meeting.status = MeetingStatus::PrepScheduled;
        meeting.updated_at = Utc::now();
        self.meetings.put(&meeting).await?;
        info!(status = %meeting.status, "meeting status updated");

        let channels = channel_priority(&user);
        let result = self.notifier.send(&meeting, &user, &channels).await?;

        if let Some(message_id) = &result.message_id {
            meeting.notification_id = Some(message_id.clone());
            meeting.notification_sent_at = Some(Utc::now());
            meeting.updated_at = Utc::now();
            self.meetings.put(&meeting).await?;
            info!(
                notification_status = ?result.status,
                delivered = ?result.delivered_channels,
                "prep notification sent"
            );
        } else {
            // Total failure across channels: the meeting stays
            // PrepScheduled with no send timestamp. Nothing retries this
            // automatically; it surfaces through logs and monitoring.
            warn!(
                failed_channels = result.failed_channels.len(),
                "all notification channels failed"
            );
        }

        Ok(TriggerOutcome::Notified(result))
    }
}
