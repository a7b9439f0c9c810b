//! Trigger handler end to end: SQLite store, real provider clients, mock
//! HTTP endpoints.

#![allow(dead_code)]

#[path = "support.rs"]
mod support;

use std::sync::Arc;

use chrono::{Duration, Utc};
use preppulse_core::{MeetingRepository, Notifier, TriggerHandler, TriggerOutcome, TriggerPublisher};
use preppulse_domain::{MeetingStatus, NotificationChannel, PrepTriggerEvent};
use preppulse_infra::database::{SqliteMeetingRepository, SqliteUserRepository};
use preppulse_infra::{EmailApiClient, HttpTriggerPublisher, SlackClient, TwilioClient};
use serde_json::json;
use support::{sample_meeting, sample_user, TestDatabase};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Pipeline {
    meetings: Arc<SqliteMeetingRepository>,
    users: Arc<SqliteUserRepository>,
    handler: TriggerHandler,
    _db: TestDatabase,
}

fn pipeline_against(server: &MockServer) -> Pipeline {
    let db = TestDatabase::new();
    let meetings = Arc::new(SqliteMeetingRepository::new(db.manager.clone()));
    let users = Arc::new(SqliteUserRepository::new(db.manager.clone()));

    let notifier = Arc::new(Notifier::new(
        Arc::new(SlackClient::with_api_base(Some("xoxb-test".to_string()), server.uri()).unwrap()),
        Arc::new(TwilioClient::new(None, None, None).unwrap()),
        Arc::new(EmailApiClient::new(None, None, None).unwrap()),
    ));

    let handler = TriggerHandler::new(meetings.clone(), users.clone(), notifier);
    Pipeline { meetings, users, handler, _db: db }
}

fn mount_slack_success(server: &MockServer) -> impl std::future::Future<Output = ()> + '_ {
    Mock::given(method("POST"))
        .and(path("/chat.postMessage"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "ts": "1726000000.1" })),
        )
        .mount(server)
}

#[tokio::test]
async fn trigger_notifies_then_skips_redelivery() {
    let server = MockServer::start().await;
    mount_slack_success(&server).await;

    let pipeline = pipeline_against(&server);
    pipeline.users.put(&sample_user("user-1")).unwrap();
    let meeting =
        sample_meeting("mtg-1", "ext-1", "user-1", Utc::now() + Duration::hours(4));
    pipeline.meetings.put(&meeting).await.unwrap();

    let event = PrepTriggerEvent::for_meeting(&meeting);

    // First delivery notifies and stamps the meeting.
    let outcome = pipeline.handler.handle(&event).await.unwrap();
    match outcome {
        TriggerOutcome::Notified(result) => {
            assert_eq!(result.delivered_channels, vec![NotificationChannel::Slack]);
            assert_eq!(result.message_id.as_deref(), Some("1726000000.1"));
        }
        other => panic!("expected notification, got {other:?}"),
    }

    let stored = pipeline.meetings.get("mtg-1").await.unwrap().unwrap();
    assert_eq!(stored.status, MeetingStatus::PrepScheduled);
    assert_eq!(stored.notification_id.as_deref(), Some("1726000000.1"));
    assert!(stored.notification_sent_at.is_some());

    // Redelivery of the same event is a no-op.
    let outcome = pipeline.handler.handle(&event).await.unwrap();
    assert!(matches!(outcome, TriggerOutcome::Skipped(_)));

    // Exactly one Slack call was made across both deliveries.
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn total_channel_failure_leaves_meeting_unstamped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat.postMessage"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": false, "error": "account_inactive" })),
        )
        .mount(&server)
        .await;

    let pipeline = pipeline_against(&server);
    let mut user = sample_user("user-1");
    user.phone_number = None; // Slack is the only configured channel
    pipeline.users.put(&user).unwrap();
    let meeting =
        sample_meeting("mtg-1", "ext-1", "user-1", Utc::now() + Duration::hours(4));
    pipeline.meetings.put(&meeting).await.unwrap();

    let outcome =
        pipeline.handler.handle(&PrepTriggerEvent::for_meeting(&meeting)).await.unwrap();
    match outcome {
        TriggerOutcome::Notified(result) => {
            assert!(result.delivered_channels.is_empty());
            assert!(result.message_id.is_none());
        }
        other => panic!("expected failed notification attempt, got {other:?}"),
    }

    // The transition persisted, but no send timestamp was stamped.
    let stored = pipeline.meetings.get("mtg-1").await.unwrap().unwrap();
    assert_eq!(stored.status, MeetingStatus::PrepScheduled);
    assert!(stored.notification_sent_at.is_none());
    assert!(stored.notification_id.is_none());
}

#[tokio::test]
async fn missing_meeting_is_a_not_found_error() {
    let server = MockServer::start().await;
    let pipeline = pipeline_against(&server);
    pipeline.users.put(&sample_user("user-1")).unwrap();

    let event = PrepTriggerEvent {
        meeting_id: "mtg-missing".to_string(),
        user_id: "user-1".to_string(),
        meeting_type: preppulse_domain::MeetingType::Unknown,
        start_time: Utc::now(),
        title: "Ghost".to_string(),
    };

    let err = pipeline.handler.handle(&event).await.unwrap_err();
    assert!(matches!(err, preppulse_domain::PrepPulseError::NotFound(_)));
}

#[tokio::test]
async fn publisher_surfaces_failed_entry_count() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "FailedEntryCount": 1 })),
        )
        .mount(&server)
        .await;

    let publisher = HttpTriggerPublisher::new(server.uri()).unwrap();
    let meeting =
        sample_meeting("mtg-1", "ext-1", "user-1", Utc::now() + Duration::hours(4));

    let err = publisher.publish(&PrepTriggerEvent::for_meeting(&meeting)).await.unwrap_err();
    assert!(matches!(err, preppulse_domain::PrepPulseError::EventBus(_)));
}

#[tokio::test]
async fn publisher_accepts_clean_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "FailedEntryCount": 0 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let publisher = HttpTriggerPublisher::new(server.uri()).unwrap();
    let meeting =
        sample_meeting("mtg-1", "ext-1", "user-1", Utc::now() + Duration::hours(4));

    publisher.publish(&PrepTriggerEvent::for_meeting(&meeting)).await.unwrap();
}
