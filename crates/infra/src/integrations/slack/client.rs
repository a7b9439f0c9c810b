//! Slack Web API client for direct-message notifications.

use async_trait::async_trait;
use preppulse_core::{ChatMessage, ChatProvider};
use preppulse_domain::constants::PROVIDER_HTTP_TIMEOUT;
use preppulse_domain::{PrepPulseError, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use crate::errors::InfraError;

const SLACK_API_BASE: &str = "https://slack.com/api";

/// `chat.postMessage` client.
///
/// Slack reports application-level failure with HTTP 200 and
/// `"ok": false`; that is surfaced as a provider error carrying Slack's
/// error code so the notifier can fall back to the next channel.
pub struct SlackClient {
    client: Client,
    api_base: String,
    bot_token: Option<String>,
}

impl SlackClient {
    /// Create a client; a `None` token leaves the channel unconfigured.
    pub fn new(bot_token: Option<String>) -> Result<Self> {
        Self::with_api_base(bot_token, SLACK_API_BASE)
    }

    /// Create a client against a custom API base (tests point this at a
    /// mock server).
    pub fn with_api_base(bot_token: Option<String>, api_base: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(PROVIDER_HTTP_TIMEOUT)
            .build()
            .map_err(|e| PrepPulseError::Network(format!("http client build failed: {e}")))?;

        Ok(Self { client, api_base: api_base.into(), bot_token })
    }
}

#[async_trait]
impl ChatProvider for SlackClient {
    fn is_configured(&self) -> bool {
        self.bot_token.is_some()
    }

    #[instrument(skip(self, message))]
    async fn post_message(&self, user_id: &str, message: &ChatMessage) -> Result<String> {
        let token = self
            .bot_token
            .as_deref()
            .ok_or_else(|| PrepPulseError::Config("slack bot token not configured".into()))?;

        let response = self
            .client
            .post(format!("{}/chat.postMessage", self.api_base))
            .bearer_auth(token)
            .json(&json!({
                "channel": user_id,
                "blocks": message.blocks,
                "text": message.text,
            }))
            .send()
            .await
            .map_err(InfraError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PrepPulseError::Provider(format!(
                "Slack API error ({status}): {error_text}"
            )));
        }

        let body: PostMessageResponse = response.json().await.map_err(|e| {
            PrepPulseError::InvalidInput(format!("Failed to parse Slack response: {e}"))
        })?;

        if !body.ok {
            let error = body.error.unwrap_or_else(|| "unknown_error".to_string());
            return Err(PrepPulseError::Provider(format!("Slack API error: {error}")));
        }

        let ts = body.ts.unwrap_or_default();
        debug!(user_id, message_ts = %ts, "slack notification sent");

        Ok(ts)
    }
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    error: Option<String>,
    ts: Option<String>,
}
