//! User account model.
//!
//! Users are owned by account management; this pipeline only reads them to
//! decide whether to scan a calendar and where to deliver notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-category notification opt-ins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPreferences {
    pub prep_reminders: bool,
    pub meeting_updates: bool,
    pub daily_summary: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self { prep_reminders: true, meeting_updates: true, daily_summary: false }
    }
}

/// One calendar-connected person.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub email: String,
    pub name: String,
    /// E.164 number; SMS delivery is skipped when absent.
    pub phone_number: Option<String>,
    /// Whether the user's calendar integration is active.
    pub calendar_connected: bool,
    pub timezone: String,
    #[serde(default)]
    pub notification_preferences: NotificationPreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a connected user with defaults suitable for tests and seeds.
    pub fn connected(
        user_id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            email: email.into(),
            name: name.into(),
            phone_number: None,
            calendar_connected: true,
            timezone: "America/New_York".into(),
            notification_preferences: NotificationPreferences::default(),
            created_at: now,
            updated_at: now,
        }
    }
}
