//! REST email API client.

use async_trait::async_trait;
use preppulse_core::{EmailMessage, EmailProvider};
use preppulse_domain::constants::PROVIDER_HTTP_TIMEOUT;
use preppulse_domain::{PrepPulseError, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use crate::errors::InfraError;

/// Transactional email settings.
#[derive(Debug, Clone)]
pub struct EmailSettings {
    pub api_url: String,
    pub api_key: String,
    pub from_address: String,
}

/// Bearer-auth JSON client for a transactional email API, returning the
/// provider message id.
pub struct EmailApiClient {
    client: Client,
    settings: Option<EmailSettings>,
}

impl EmailApiClient {
    /// Create a client from optional setting parts; the channel is
    /// configured only when all three are present.
    pub fn new(
        api_url: Option<String>,
        api_key: Option<String>,
        from_address: Option<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(PROVIDER_HTTP_TIMEOUT)
            .build()
            .map_err(|e| PrepPulseError::Network(format!("http client build failed: {e}")))?;

        let settings = match (api_url, api_key, from_address) {
            (Some(api_url), Some(api_key), Some(from_address)) => {
                Some(EmailSettings { api_url, api_key, from_address })
            }
            _ => None,
        };

        Ok(Self { client, settings })
    }
}

#[async_trait]
impl EmailProvider for EmailApiClient {
    fn is_configured(&self) -> bool {
        self.settings.is_some()
    }

    #[instrument(skip(self, message))]
    async fn send(&self, to_address: &str, message: &EmailMessage) -> Result<String> {
        let settings = self
            .settings
            .as_ref()
            .ok_or_else(|| PrepPulseError::Config("email api not configured".into()))?;

        let response = self
            .client
            .post(&settings.api_url)
            .bearer_auth(&settings.api_key)
            .json(&json!({
                "from": settings.from_address,
                "to": to_address,
                "subject": message.subject,
                "html": message.html,
                "text": message.text,
            }))
            .send()
            .await
            .map_err(InfraError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PrepPulseError::Provider(format!(
                "Email API error ({status}): {error_text}"
            )));
        }

        let body: SendResponse = response.json().await.map_err(|e| {
            PrepPulseError::InvalidInput(format!("Failed to parse email response: {e}"))
        })?;

        debug!(to_address, message_id = %body.message_id, "email notification sent");

        Ok(body.message_id)
    }
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(alias = "id")]
    message_id: String,
}
