//! Google Calendar implementation of the CalendarSource port.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use preppulse_core::CalendarSource;
use preppulse_domain::constants::PROVIDER_HTTP_TIMEOUT;
use preppulse_domain::{Meeting, PrepPulseError, Result, User};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::tokens::AccessTokenSource;

const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Google Calendar events client.
///
/// Fetches a user's primary calendar within the lookahead window, following
/// `pageToken` pagination, and maps events into freshly discovered meetings.
/// All-day events and events without a start time are dropped.
pub struct GoogleCalendarSource {
    client: Client,
    api_base: String,
    tokens: Arc<dyn AccessTokenSource>,
}

impl GoogleCalendarSource {
    /// Create a source against the public Google API.
    pub fn new(tokens: Arc<dyn AccessTokenSource>) -> Result<Self> {
        Self::with_api_base(tokens, GOOGLE_CALENDAR_API_BASE)
    }

    /// Create a source against a custom API base (tests point this at a
    /// mock server).
    pub fn with_api_base(
        tokens: Arc<dyn AccessTokenSource>,
        api_base: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(PROVIDER_HTTP_TIMEOUT)
            .build()
            .map_err(|e| PrepPulseError::Network(format!("http client build failed: {e}")))?;

        Ok(Self { client, api_base: api_base.into(), tokens })
    }

    async fn fetch_page(
        &self,
        access_token: &str,
        time_min: &str,
        time_max: &str,
        max_results: usize,
        page_token: Option<&str>,
    ) -> Result<GoogleEventsResponse> {
        let url = format!("{}/calendars/primary/events", self.api_base);

        let mut query: Vec<(&str, String)> = vec![
            ("timeMin", time_min.to_string()),
            ("timeMax", time_max.to_string()),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("maxResults", max_results.to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .query(&query)
            .send()
            .await
            .map_err(crate::errors::InfraError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PrepPulseError::Provider(format!(
                "Google Calendar API error ({status}): {error_text}"
            )));
        }

        response.json().await.map_err(|e| {
            PrepPulseError::InvalidInput(format!("Failed to parse Google response: {e}"))
        })
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendarSource {
    #[instrument(skip(self, user), fields(user_id = %user.user_id))]
    async fn fetch_upcoming_meetings(
        &self,
        user: &User,
        days_ahead: i64,
        max_results: usize,
    ) -> Result<Vec<Meeting>> {
        let access_token = self.tokens.access_token(&user.user_id).await?;

        let now = Utc::now();
        let time_min = now.to_rfc3339();
        let time_max = (now + Duration::days(days_ahead)).to_rfc3339();

        let mut meetings = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let remaining = max_results.saturating_sub(meetings.len());
            if remaining == 0 {
                break;
            }

            let page = self
                .fetch_page(&access_token, &time_min, &time_max, remaining, page_token.as_deref())
                .await?;

            for event in page.items {
                match event_to_meeting(event, &user.user_id) {
                    Some(meeting) => meetings.push(meeting),
                    None => continue,
                }
            }

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        debug!(user_id = %user.user_id, count = meetings.len(), "fetched upcoming meetings");

        Ok(meetings)
    }
}

/// Map one calendar event to a discovered meeting.
///
/// Returns `None` for all-day events and events without a concrete start
/// time; those never need prep notifications.
fn event_to_meeting(event: GoogleCalendarEvent, user_id: &str) -> Option<Meeting> {
    if event.start.date.is_some() {
        return None;
    }

    let start_time = parse_event_time(event.start.date_time.as_deref(), &event.id)?;
    let end_time = parse_event_time(event.end.date_time.as_deref(), &event.id)
        .unwrap_or(start_time + Duration::hours(1));

    let attendees = event
        .attendees
        .unwrap_or_default()
        .into_iter()
        .map(|a| a.email)
        .filter(|email| !email.trim().is_empty())
        .collect();

    let mut meeting = Meeting::discovered(
        format!("mtg-{}", Uuid::now_v7().simple()),
        Some(event.id),
        user_id,
        event.summary.unwrap_or_else(|| "(no title)".to_string()),
        start_time,
        end_time,
        attendees,
    );
    meeting.description = event.description;
    meeting.location = event.location;
    meeting.organizer = event.organizer.map(|o| o.email);

    Some(meeting)
}

fn parse_event_time(value: Option<&str>, event_id: &str) -> Option<DateTime<Utc>> {
    let raw = value?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            warn!(event_id, raw, error = %e, "unparseable event time, dropping event");
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct GoogleEventsResponse {
    #[serde(default)]
    items: Vec<GoogleCalendarEvent>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleCalendarEvent {
    id: String,
    summary: Option<String>,
    description: Option<String>,
    location: Option<String>,
    start: EventDateTime,
    end: EventDateTime,
    organizer: Option<EventOrganizer>,
    attendees: Option<Vec<GoogleAttendee>>,
}

#[derive(Debug, Deserialize)]
struct EventDateTime {
    #[serde(rename = "dateTime")]
    date_time: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventOrganizer {
    email: String,
}

#[derive(Debug, Deserialize)]
struct GoogleAttendee {
    email: String,
}
