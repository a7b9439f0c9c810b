//! Notifier - multi-channel delivery with fallback.
//!
//! Attempts channels in priority order, stopping at the first success.
//! Channel failures (provider errors, timeouts, missing preconditions) are
//! recorded as data in the result, never raised; the only error this
//! component produces is an empty channel list after filtering.

use std::collections::BTreeMap;
use std::sync::Arc;

use preppulse_domain::{
    Meeting, NotificationChannel, NotificationResult, PrepPulseError, Result, User,
};
use tracing::{info, instrument, warn};

use super::message;
use super::ports::{ChatProvider, EmailProvider, SmsProvider};

/// Default channel priority order for a user.
///
/// Chat DM first, SMS only when the user has a phone number, email as the
/// final fallback.
pub fn channel_priority(user: &User) -> Vec<NotificationChannel> {
    let mut channels = vec![NotificationChannel::Slack];
    if user.phone_number.is_some() {
        channels.push(NotificationChannel::Sms);
    }
    channels.push(NotificationChannel::Email);
    channels
}

/// Multi-channel notification sender.
pub struct Notifier {
    chat: Arc<dyn ChatProvider>,
    sms: Arc<dyn SmsProvider>,
    email: Arc<dyn EmailProvider>,
}

impl Notifier {
    /// Create a notifier over the three channel providers.
    pub fn new(
        chat: Arc<dyn ChatProvider>,
        sms: Arc<dyn SmsProvider>,
        email: Arc<dyn EmailProvider>,
    ) -> Self {
        Self { chat, sms, email }
    }

    /// Send one prep notification, falling back across channels.
    ///
    /// # Errors
    /// Only if `channels`, filtered to configured providers, is empty.
    #[instrument(skip(self, meeting, user), fields(meeting_id = %meeting.meeting_id, user_id = %user.user_id))]
    pub async fn send(
        &self,
        meeting: &Meeting,
        user: &User,
        channels: &[NotificationChannel],
    ) -> Result<NotificationResult> {
        let available: Vec<NotificationChannel> =
            channels.iter().copied().filter(|ch| self.is_channel_enabled(*ch)).collect();

        if available.is_empty() {
            return Err(PrepPulseError::InvalidInput(
                "no notification channels available or enabled".into(),
            ));
        }

        info!(
            channels = ?available.iter().map(NotificationChannel::as_str).collect::<Vec<_>>(),
            "sending prep notification"
        );

        let mut delivered: Vec<NotificationChannel> = Vec::new();
        let mut failed: BTreeMap<NotificationChannel, String> = BTreeMap::new();
        let mut message_id: Option<String> = None;

        for channel in available {
            match self.send_via(channel, meeting, user).await {
                Ok(id) => {
                    delivered.push(channel);
                    message_id = Some(id);
                    info!(channel = %channel, "notification delivered");
                    // Success: no further channels are attempted.
                    break;
                }
                Err(e) => {
                    warn!(channel = %channel, error = %e, "channel failed, trying next");
                    failed.insert(channel, e.to_string());
                }
            }
        }

        let result = NotificationResult::from_attempts(delivered, failed, message_id);
        info!(status = ?result.status, "prep notification completed");
        Ok(result)
    }

    fn is_channel_enabled(&self, channel: NotificationChannel) -> bool {
        match channel {
            NotificationChannel::Slack => self.chat.is_configured(),
            NotificationChannel::Sms => self.sms.is_configured(),
            NotificationChannel::Email => self.email.is_configured(),
        }
    }

    async fn send_via(
        &self,
        channel: NotificationChannel,
        meeting: &Meeting,
        user: &User,
    ) -> Result<String> {
        match channel {
            NotificationChannel::Slack => {
                self.chat.post_message(&user.user_id, &message::chat_message(meeting)).await
            }
            NotificationChannel::Sms => {
                let to_number = user.phone_number.as_deref().ok_or_else(|| {
                    PrepPulseError::InvalidInput(format!(
                        "user {} has no phone number",
                        user.user_id
                    ))
                })?;
                self.sms.send(to_number, &message::sms_body(meeting)).await
            }
            NotificationChannel::Email => {
                self.email.send(&user.email, &message::email_message(meeting)).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use preppulse_domain::NotificationStatus;

    use super::super::message::{ChatMessage, EmailMessage};
    use super::*;

    type FakeOutcome = std::result::Result<String, String>;

    struct FakeChat {
        configured: bool,
        outcome: FakeOutcome,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatProvider for FakeChat {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn post_message(&self, _user_id: &str, _message: &ChatMessage) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone().map_err(PrepPulseError::Provider)
        }
    }

    struct FakeSms {
        configured: bool,
        outcome: FakeOutcome,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SmsProvider for FakeSms {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn send(&self, _to_number: &str, _body: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone().map_err(PrepPulseError::Provider)
        }
    }

    struct FakeEmail {
        configured: bool,
        outcome: FakeOutcome,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmailProvider for FakeEmail {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn send(&self, _to_address: &str, _message: &EmailMessage) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone().map_err(PrepPulseError::Provider)
        }
    }

    fn ok(id: &str) -> FakeOutcome {
        Ok(id.to_string())
    }

    fn provider_err(msg: &str) -> FakeOutcome {
        Err(msg.to_string())
    }

    fn fixtures() -> (Meeting, User) {
        let start = Utc::now() + Duration::hours(4);
        let meeting = Meeting::discovered(
            "m-1",
            Some("ext-1".into()),
            "u-1",
            "1-1 with Alice",
            start,
            start + Duration::minutes(30),
            vec!["a@example.com".into(), "b@example.com".into()],
        );
        let mut user = User::connected("u-1", "u1@example.com", "User One");
        user.phone_number = Some("+15550100".into());
        (meeting, user)
    }

    #[tokio::test]
    async fn first_success_stops_the_fallback_chain() {
        let chat = Arc::new(FakeChat {
            configured: true,
            outcome: ok("1718.001"),
            calls: AtomicUsize::new(0),
        });
        let sms =
            Arc::new(FakeSms { configured: true, outcome: ok("SM1"), calls: AtomicUsize::new(0) });
        let email = Arc::new(FakeEmail {
            configured: true,
            outcome: ok("E1"),
            calls: AtomicUsize::new(0),
        });
        let notifier = Notifier::new(chat.clone(), sms.clone(), email.clone());

        let (meeting, user) = fixtures();
        let result = notifier.send(&meeting, &user, &channel_priority(&user)).await.unwrap();

        assert_eq!(result.status, NotificationStatus::Success);
        assert_eq!(result.delivered_channels, vec![NotificationChannel::Slack]);
        assert_eq!(result.message_id.as_deref(), Some("1718.001"));
        assert_eq!(sms.calls.load(Ordering::SeqCst), 0);
        assert_eq!(email.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn chat_application_error_falls_back_to_sms() {
        // Slack returns HTTP 200 with an application-level error; SMS
        // succeeds with a message id. Email must never be attempted.
        let chat = Arc::new(FakeChat {
            configured: true,
            outcome: provider_err("Slack API error: channel_not_found"),
            calls: AtomicUsize::new(0),
        });
        let sms = Arc::new(FakeSms {
            configured: true,
            outcome: ok("SM123"),
            calls: AtomicUsize::new(0),
        });
        let email = Arc::new(FakeEmail {
            configured: true,
            outcome: ok("E1"),
            calls: AtomicUsize::new(0),
        });
        let notifier = Notifier::new(chat, sms, email.clone());

        let (meeting, user) = fixtures();
        let result = notifier.send(&meeting, &user, &channel_priority(&user)).await.unwrap();

        assert_eq!(result.status, NotificationStatus::Success);
        assert_eq!(result.delivered_channels, vec![NotificationChannel::Sms]);
        assert_eq!(result.message_id.as_deref(), Some("SM123"));
        assert!(result.failed_channels[&NotificationChannel::Slack].contains("channel_not_found"));
        assert_eq!(email.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn all_channels_failing_reports_failed_without_error() {
        let chat = Arc::new(FakeChat {
            configured: true,
            outcome: provider_err("chat down"),
            calls: AtomicUsize::new(0),
        });
        let sms = Arc::new(FakeSms {
            configured: true,
            outcome: provider_err("sms down"),
            calls: AtomicUsize::new(0),
        });
        let email = Arc::new(FakeEmail {
            configured: true,
            outcome: provider_err("email down"),
            calls: AtomicUsize::new(0),
        });
        let notifier = Notifier::new(chat, sms, email);

        let (meeting, user) = fixtures();
        let result = notifier.send(&meeting, &user, &channel_priority(&user)).await.unwrap();

        assert_eq!(result.status, NotificationStatus::Failed);
        assert!(result.delivered_channels.is_empty());
        assert!(result.message_id.is_none());
        assert_eq!(result.failed_channels.len(), 3);
    }

    #[tokio::test]
    async fn unconfigured_channels_are_filtered_up_front() {
        let chat = Arc::new(FakeChat {
            configured: false,
            outcome: ok("never"),
            calls: AtomicUsize::new(0),
        });
        let sms = Arc::new(FakeSms {
            configured: false,
            outcome: ok("never"),
            calls: AtomicUsize::new(0),
        });
        let email = Arc::new(FakeEmail {
            configured: true,
            outcome: ok("E9"),
            calls: AtomicUsize::new(0),
        });
        let notifier = Notifier::new(chat.clone(), sms, email);

        let (meeting, user) = fixtures();
        let result = notifier.send(&meeting, &user, &channel_priority(&user)).await.unwrap();

        assert_eq!(result.delivered_channels, vec![NotificationChannel::Email]);
        assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
        // Unconfigured channels are excluded, not recorded as failures.
        assert!(result.failed_channels.is_empty());
    }

    #[tokio::test]
    async fn empty_filtered_channel_list_is_an_error() {
        let chat = Arc::new(FakeChat {
            configured: false,
            outcome: ok("never"),
            calls: AtomicUsize::new(0),
        });
        let sms = Arc::new(FakeSms {
            configured: false,
            outcome: ok("never"),
            calls: AtomicUsize::new(0),
        });
        let email = Arc::new(FakeEmail {
            configured: false,
            outcome: ok("never"),
            calls: AtomicUsize::new(0),
        });
        let notifier = Notifier::new(chat, sms, email);

        let (meeting, user) = fixtures();
        let err = notifier.send(&meeting, &user, &channel_priority(&user)).await.unwrap_err();
        assert!(matches!(err, PrepPulseError::InvalidInput(_)));
    }

    #[test]
    fn sms_requires_a_phone_number_in_the_priority_list() {
        let user = User::connected("u-1", "u1@example.com", "User One");
        assert_eq!(
            channel_priority(&user),
            vec![NotificationChannel::Slack, NotificationChannel::Email]
        );
    }
}
