//! Trigger event published when a meeting enters its prep window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{PrepPulseError, Result};
use crate::types::meeting::{Meeting, MeetingType};

/// Message published by the sync engine and consumed by the trigger handler.
///
/// Delivery is at-least-once, unordered, and possibly duplicated; the event
/// carries no mutable state itself. All idempotency lives in the meeting
/// record it references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepTriggerEvent {
    pub meeting_id: String,
    pub user_id: String,
    pub meeting_type: MeetingType,
    pub start_time: DateTime<Utc>,
    pub title: String,
}

impl PrepTriggerEvent {
    /// Snapshot the identifying fields of a meeting into an event payload.
    pub fn for_meeting(meeting: &Meeting) -> Self {
        Self {
            meeting_id: meeting.meeting_id.clone(),
            user_id: meeting.user_id.clone(),
            meeting_type: meeting.meeting_type,
            start_time: meeting.start_time,
            title: meeting.title.clone(),
        }
    }

    /// Reject events missing either identifier.
    ///
    /// A malformed event is a terminal validation error for the current
    /// invocation, never retried by this pipeline.
    pub fn validate(&self) -> Result<()> {
        if self.meeting_id.is_empty() || self.user_id.is_empty() {
            return Err(PrepPulseError::InvalidInput(
                "trigger event must contain meeting_id and user_id".into(),
            ));
        }
        Ok(())
    }
}
