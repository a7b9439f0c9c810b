//! Sync engine against a real SQLite store.
//!
//! Covers the dedup invariant end to end: re-syncing the same external
//! event updates calendar facts in place while preserving the stored row's
//! identity and later-stage fields.

#![allow(dead_code)]

#[path = "support.rs"]
mod support;

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use preppulse_core::{
    CalendarSource, MeetingClassifier, MeetingRepository, SyncEngine, TriggerPublisher,
};
use preppulse_domain::{
    ClassificationConfig, Meeting, MeetingStatus, MeetingType, PrepTriggerEvent, Result, User,
};
use preppulse_infra::database::SqliteMeetingRepository;
use support::{sample_meeting, sample_user, TestDatabase};

struct FixedCalendar {
    meetings: Mutex<Vec<Meeting>>,
}

impl FixedCalendar {
    fn new(meetings: Vec<Meeting>) -> Self {
        Self { meetings: Mutex::new(meetings) }
    }
}

#[async_trait]
impl CalendarSource for FixedCalendar {
    async fn fetch_upcoming_meetings(
        &self,
        _user: &User,
        _days_ahead: i64,
        _max_results: usize,
    ) -> Result<Vec<Meeting>> {
        Ok(self.meetings.lock().unwrap().clone())
    }
}

#[derive(Default)]
struct RecordingPublisher {
    events: Mutex<Vec<PrepTriggerEvent>>,
}

#[async_trait]
impl TriggerPublisher for RecordingPublisher {
    async fn publish(&self, event: &PrepTriggerEvent) -> Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

fn engine_with(
    repo: Arc<SqliteMeetingRepository>,
    calendar: Arc<FixedCalendar>,
    publisher: Arc<RecordingPublisher>,
) -> SyncEngine {
    let classifier = Arc::new(MeetingClassifier::new(ClassificationConfig::default()));
    SyncEngine::new(classifier, repo, calendar, publisher)
}

#[tokio::test]
async fn resync_preserves_identity_and_later_stage_fields() {
    let db = TestDatabase::new();
    let repo = Arc::new(SqliteMeetingRepository::new(db.manager.clone()));
    let user = sample_user("user-1");

    // First sync stores the meeting, far outside its prep window.
    let start = Utc::now() + Duration::days(7);
    let fetched = sample_meeting("mtg-first", "ext-1", "user-1", start);
    let calendar = Arc::new(FixedCalendar::new(vec![fetched]));
    let publisher = Arc::new(RecordingPublisher::default());
    let engine = engine_with(repo.clone(), calendar, publisher.clone());

    let outcome = engine.sync_user(&user).await.unwrap();
    assert_eq!(outcome.meetings_synced, 1);
    assert_eq!(outcome.preps_triggered, 0);

    let stored = repo.find_by_external_id("user-1", "ext-1").await.unwrap().unwrap();
    assert_eq!(stored.meeting_id, "mtg-first");
    assert_eq!(stored.meeting_type, MeetingType::LeadershipTeam);
    assert_eq!(stored.status, MeetingStatus::Classified);
    let original_created_at = stored.created_at;

    // Simulate the trigger handler having advanced the stored row.
    let mut advanced = stored.clone();
    advanced.status = MeetingStatus::PrepScheduled;
    advanced.chat_session_id = Some("chat-42".to_string());
    advanced.notification_id = Some("slack-ts-1".to_string());
    advanced.notification_sent_at = Some(Utc::now());
    repo.put(&advanced).await.unwrap();

    // Re-sync delivers the same external event with a changed title and a
    // fresh (different) provisional meeting_id.
    let mut updated = sample_meeting("mtg-second", "ext-1", "user-1", start);
    updated.title = "Leadership Team Sync (moved)".to_string();
    let calendar = Arc::new(FixedCalendar::new(vec![updated]));
    let publisher2 = Arc::new(RecordingPublisher::default());
    let engine = engine_with(repo.clone(), calendar, publisher2.clone());

    let outcome = engine.sync_user(&user).await.unwrap();
    assert_eq!(outcome.meetings_synced, 1);

    let resynced = repo.find_by_external_id("user-1", "ext-1").await.unwrap().unwrap();
    // Identity and bookkeeping preserved.
    assert_eq!(resynced.meeting_id, "mtg-first");
    assert_eq!(resynced.created_at, original_created_at);
    // Later-stage fields preserved.
    assert_eq!(resynced.status, MeetingStatus::PrepScheduled);
    assert_eq!(resynced.chat_session_id.as_deref(), Some("chat-42"));
    assert_eq!(resynced.notification_id.as_deref(), Some("slack-ts-1"));
    assert!(resynced.notification_sent_at.is_some());
    // Calendar facts overwritten.
    assert_eq!(resynced.title, "Leadership Team Sync (moved)");
    assert!(resynced.last_synced_at.is_some());

    // Already past awaiting-prep, so no new trigger even if in window.
    assert!(publisher2.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn in_window_meeting_publishes_one_trigger() {
    let db = TestDatabase::new();
    let repo = Arc::new(SqliteMeetingRepository::new(db.manager.clone()));
    let user = sample_user("user-1");

    // Leadership meetings carry 24h lead time; 12h out is inside the window.
    let start = Utc::now() + Duration::hours(12);
    let fetched = sample_meeting("mtg-1", "ext-1", "user-1", start);
    let calendar = Arc::new(FixedCalendar::new(vec![fetched]));
    let publisher = Arc::new(RecordingPublisher::default());
    let engine = engine_with(repo.clone(), calendar, publisher.clone());

    let outcome = engine.sync_user(&user).await.unwrap();
    assert_eq!(outcome.preps_triggered, 1);

    let events = publisher.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].meeting_id, "mtg-1");
    assert_eq!(events[0].user_id, "user-1");
    assert_eq!(events[0].meeting_type, MeetingType::LeadershipTeam);
}

#[tokio::test]
async fn unique_index_rejects_duplicate_external_rows() {
    let db = TestDatabase::new();
    let repo = Arc::new(SqliteMeetingRepository::new(db.manager.clone()));

    let start = Utc::now() + Duration::days(1);
    repo.put(&sample_meeting("mtg-1", "ext-1", "user-1", start)).await.unwrap();

    // A different meeting_id with the same (user_id, external_id) violates
    // the dedup index.
    let duplicate = sample_meeting("mtg-2", "ext-1", "user-1", start);
    assert!(repo.put(&duplicate).await.is_err());

    // Same external id under another user is a separate row.
    repo.put(&sample_meeting("mtg-3", "ext-1", "user-2", start)).await.unwrap();
}
