//! Meeting model and its classification/lifecycle enums.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::PrepPulseError;

/// Semantic meeting type produced by classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingType {
    LeadershipTeam,
    OneOnOne,
    ReliabilityReview,
    #[serde(rename = "qbr")]
    QuarterlyBusinessReview,
    ExecutiveStaff,
    InterviewDebrief,
    VendorMeeting,
    Unknown,
}

impl MeetingType {
    /// Stable string form used in config tables and event payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeadershipTeam => "leadership_team",
            Self::OneOnOne => "one_on_one",
            Self::ReliabilityReview => "reliability_review",
            Self::QuarterlyBusinessReview => "qbr",
            Self::ExecutiveStaff => "executive_staff",
            Self::InterviewDebrief => "interview_debrief",
            Self::VendorMeeting => "vendor_meeting",
            Self::Unknown => "unknown",
        }
    }

    /// Human-readable label for notification copy ("Leadership Team", ...).
    pub fn display_name(&self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::str::FromStr for MeetingType {
    type Err = PrepPulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "leadership_team" => Ok(Self::LeadershipTeam),
            "one_on_one" => Ok(Self::OneOnOne),
            "reliability_review" => Ok(Self::ReliabilityReview),
            "qbr" => Ok(Self::QuarterlyBusinessReview),
            "executive_staff" => Ok(Self::ExecutiveStaff),
            "interview_debrief" => Ok(Self::InterviewDebrief),
            "vendor_meeting" => Ok(Self::VendorMeeting),
            "unknown" => Ok(Self::Unknown),
            other => Err(PrepPulseError::InvalidInput(format!("unknown meeting type: {other}"))),
        }
    }
}

impl std::fmt::Display for MeetingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Meeting preparation lifecycle.
///
/// `Discovered → Classified → PrepScheduled → PrepInProgress →
/// PrepCompleted → Completed`, with `Cancelled` reachable from any
/// non-terminal state. Trigger evaluation only acts on the first two
/// states; everything else short-circuits processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    Discovered,
    Classified,
    PrepScheduled,
    PrepInProgress,
    PrepCompleted,
    Completed,
    Cancelled,
}

impl MeetingStatus {
    /// Stable string form used for persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Classified => "classified",
            Self::PrepScheduled => "prep_scheduled",
            Self::PrepInProgress => "prep_in_progress",
            Self::PrepCompleted => "prep_completed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether this meeting is still eligible for a prep trigger.
    ///
    /// This is the primary defence against duplicate notifications on event
    /// redelivery or overlapping scans.
    pub fn is_awaiting_prep(&self) -> bool {
        matches!(self, Self::Discovered | Self::Classified)
    }
}

impl std::str::FromStr for MeetingStatus {
    type Err = PrepPulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discovered" => Ok(Self::Discovered),
            "classified" => Ok(Self::Classified),
            "prep_scheduled" => Ok(Self::PrepScheduled),
            "prep_in_progress" => Ok(Self::PrepInProgress),
            "prep_completed" => Ok(Self::PrepCompleted),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(PrepPulseError::InvalidInput(format!("unknown meeting status: {other}"))),
        }
    }
}

impl std::fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One upcoming or past calendar event known to the system.
///
/// Invariant: for a given `(user_id, external_id)` pair there is at most one
/// row in the meeting store; re-sync preserves `meeting_id` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    /// System-assigned stable identifier.
    pub meeting_id: String,
    /// Source calendar's event id, used for sync deduplication.
    pub external_id: Option<String>,
    /// Owner of the meeting.
    pub user_id: String,
    /// Where the meeting came from ("google_calendar", "manual", ...).
    pub source: String,

    // Calendar facts
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: Option<String>,
    pub attendees: Vec<String>,
    pub organizer: Option<String>,

    // Derived by classification
    pub meeting_type: MeetingType,
    pub status: MeetingStatus,
    /// Lead time in hours for this meeting's type.
    pub prep_hours_before: Option<i64>,

    // Owned by later pipeline stages; preserved across re-sync
    pub chat_session_id: Option<String>,

    // Notification tracking
    /// Opaque provider message reference from the delivering channel.
    pub notification_id: Option<String>,
    /// Set exactly once; the notification idempotency guard.
    pub notification_sent_at: Option<DateTime<Utc>>,

    // Bookkeeping
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl Meeting {
    /// Create a freshly discovered meeting from calendar facts.
    #[allow(clippy::too_many_arguments)]
    pub fn discovered(
        meeting_id: impl Into<String>,
        external_id: Option<String>,
        user_id: impl Into<String>,
        title: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        attendees: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            meeting_id: meeting_id.into(),
            external_id,
            user_id: user_id.into(),
            source: "google_calendar".into(),
            title: title.into(),
            description: None,
            start_time,
            end_time,
            location: None,
            attendees,
            organizer: None,
            meeting_type: MeetingType::Unknown,
            status: MeetingStatus::Discovered,
            prep_hours_before: None,
            chat_session_id: None,
            notification_id: None,
            notification_sent_at: None,
            created_at: now,
            updated_at: now,
            last_synced_at: None,
        }
    }

    /// Scheduled duration in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}
