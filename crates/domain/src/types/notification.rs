//! Notification delivery types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::PrepPulseError;

/// One notification delivery mechanism with its own provider and failure
/// modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Slack,
    Sms,
    Email,
}

impl NotificationChannel {
    /// Stable string form used in logs and serialized results.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slack => "slack",
            Self::Sms => "sms",
            Self::Email => "email",
        }
    }
}

impl std::fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall delivery status of one notification attempt.
///
/// `Partial` is defined for completeness but is not produced by the current
/// stop-at-first-success fallback algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Success,
    Failed,
    Partial,
}

/// Outcome of one multi-channel delivery attempt.
///
/// Ephemeral: not persisted as its own entity. The trigger handler folds
/// `message_id` into the meeting record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    pub status: NotificationStatus,
    /// Channels that actually delivered, in attempt order.
    pub delivered_channels: Vec<NotificationChannel>,
    /// Channels that failed, with the error recorded against each.
    pub failed_channels: BTreeMap<NotificationChannel, String>,
    /// First successful channel's provider message reference.
    pub message_id: Option<String>,
}

impl NotificationResult {
    /// Build a result from the fallback loop's bookkeeping.
    pub fn from_attempts(
        delivered_channels: Vec<NotificationChannel>,
        failed_channels: BTreeMap<NotificationChannel, String>,
        message_id: Option<String>,
    ) -> Self {
        let status = if delivered_channels.is_empty() {
            NotificationStatus::Failed
        } else {
            NotificationStatus::Success
        };
        Self { status, delivered_channels, failed_channels, message_id }
    }
}

/// Fixed result shape returned by every channel provider integration.
///
/// Provider-specific response parsing stays behind the provider boundary;
/// callers only ever see a message id or a [`PrepPulseError`].
pub type ProviderSendResult = Result<String, PrepPulseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_delivery_is_failed() {
        let result = NotificationResult::from_attempts(vec![], BTreeMap::new(), None);
        assert_eq!(result.status, NotificationStatus::Failed);
        assert!(result.message_id.is_none());
    }

    #[test]
    fn any_delivery_is_success() {
        let mut failed = BTreeMap::new();
        failed.insert(NotificationChannel::Slack, "channel_not_found".to_string());
        let result = NotificationResult::from_attempts(
            vec![NotificationChannel::Sms],
            failed,
            Some("SM123".to_string()),
        );
        assert_eq!(result.status, NotificationStatus::Success);
        assert_eq!(result.message_id.as_deref(), Some("SM123"));
    }
}
