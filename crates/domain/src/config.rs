//! Application configuration structures.
//!
//! Loaded once at process start (see the infra config loader); never mutated
//! at runtime by the pipeline.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_LEAD_HOURS, DEFAULT_LOOKAHEAD_DAYS};
use crate::types::meeting::MeetingType;

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub channels: ChannelsConfig,
    #[serde(default)]
    pub classification: ClassificationConfig,
}

/// SQLite database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
    /// Optional SQLCipher key; the database is unencrypted when absent.
    pub encryption_key: Option<String>,
}

/// Calendar scan cadence and reach.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Cron expression for the periodic scan (default: every two hours).
    pub cron_expression: String,
    /// Forward-looking window for calendar fetches, in days.
    pub lookahead_days: i64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            cron_expression: "0 0 */2 * * *".into(),
            lookahead_days: DEFAULT_LOOKAHEAD_DAYS,
        }
    }
}

/// HTTP server settings for the service binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: "127.0.0.1:8085".into() }
    }
}

/// Credentials and endpoints for notification channel providers plus the
/// calendar source and event bus.
///
/// A channel whose credentials are absent is excluded from delivery up
/// front rather than failing at send time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelsConfig {
    pub slack_bot_token: Option<String>,
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_from_number: Option<String>,
    pub email_api_url: Option<String>,
    pub email_api_key: Option<String>,
    pub email_from_address: Option<String>,
    /// Event-bus endpoint trigger events are published to.
    pub event_bus_url: Option<String>,
    /// Calendar API base override (tests point this at a mock server).
    pub calendar_api_url: Option<String>,
}

/// One ordered classification rule.
///
/// A rule matches when at least one keyword is a case-insensitive substring
/// of the meeting title and the attendee count satisfies both bounds when
/// present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub meeting_type: MeetingType,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub min_attendees: Option<usize>,
    #[serde(default)]
    pub max_attendees: Option<usize>,
}

/// Ordered rule table plus the per-type lead-hour table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationConfig {
    /// Evaluated in order; first match wins.
    pub rules: Vec<ClassificationRule>,
    /// Hours of lead time per meeting type, keyed by the type's string form.
    pub lead_hours: Vec<LeadHoursEntry>,
}

/// Lead-time entry for one meeting type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadHoursEntry {
    pub meeting_type: MeetingType,
    pub hours: i64,
}

impl ClassificationConfig {
    /// Configured lead hours for a type, falling back to the `unknown`
    /// entry and finally to the built-in default of 24.
    pub fn lead_hours_for(&self, meeting_type: MeetingType) -> i64 {
        self.lookup(meeting_type)
            .or_else(|| self.lookup(MeetingType::Unknown))
            .unwrap_or(DEFAULT_LEAD_HOURS)
    }

    fn lookup(&self, meeting_type: MeetingType) -> Option<i64> {
        self.lead_hours.iter().find(|e| e.meeting_type == meeting_type).map(|e| e.hours)
    }
}

impl Default for ClassificationConfig {
    /// Built-in rule table mirroring the shipped `agents.yaml` defaults.
    fn default() -> Self {
        let rule = |meeting_type, keywords: &[&str], min, max| ClassificationRule {
            meeting_type,
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
            min_attendees: min,
            max_attendees: max,
        };
        Self {
            rules: vec![
                rule(
                    MeetingType::LeadershipTeam,
                    &["leadership", "lt sync", "leads"],
                    Some(5),
                    None,
                ),
                rule(MeetingType::OneOnOne, &["1-1", "1:1", "one on one"], None, Some(2)),
                rule(
                    MeetingType::ReliabilityReview,
                    &["reliability", "incident review", "postmortem"],
                    None,
                    None,
                ),
                rule(
                    MeetingType::QuarterlyBusinessReview,
                    &["qbr", "quarterly business review"],
                    None,
                    None,
                ),
                rule(MeetingType::ExecutiveStaff, &["exec staff", "e-staff"], None, None),
                rule(
                    MeetingType::InterviewDebrief,
                    &["interview", "debrief"],
                    None,
                    None,
                ),
                rule(MeetingType::VendorMeeting, &["vendor", "partner sync"], None, None),
            ],
            lead_hours: vec![
                LeadHoursEntry { meeting_type: MeetingType::LeadershipTeam, hours: 24 },
                LeadHoursEntry { meeting_type: MeetingType::OneOnOne, hours: 4 },
                LeadHoursEntry { meeting_type: MeetingType::ReliabilityReview, hours: 24 },
                LeadHoursEntry { meeting_type: MeetingType::QuarterlyBusinessReview, hours: 48 },
                LeadHoursEntry { meeting_type: MeetingType::ExecutiveStaff, hours: 24 },
                LeadHoursEntry { meeting_type: MeetingType::InterviewDebrief, hours: 2 },
                LeadHoursEntry { meeting_type: MeetingType::VendorMeeting, hours: 12 },
                LeadHoursEntry { meeting_type: MeetingType::Unknown, hours: 24 },
            ],
        }
    }
}
