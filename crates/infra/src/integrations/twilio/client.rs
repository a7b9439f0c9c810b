//! Twilio Messages API client for SMS notifications.

use async_trait::async_trait;
use preppulse_core::SmsProvider;
use preppulse_domain::constants::PROVIDER_HTTP_TIMEOUT;
use preppulse_domain::{PrepPulseError, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::errors::InfraError;

const TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Credentials for the Twilio Messages API.
#[derive(Debug, Clone)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

/// Messages API client (basic auth, form body), returning the message SID.
pub struct TwilioClient {
    client: Client,
    api_base: String,
    credentials: Option<TwilioCredentials>,
}

impl TwilioClient {
    /// Create a client from optional credential parts; the channel is
    /// configured only when all three are present.
    pub fn new(
        account_sid: Option<String>,
        auth_token: Option<String>,
        from_number: Option<String>,
    ) -> Result<Self> {
        Self::with_api_base(account_sid, auth_token, from_number, TWILIO_API_BASE)
    }

    /// Create a client against a custom API base (tests point this at a
    /// mock server).
    pub fn with_api_base(
        account_sid: Option<String>,
        auth_token: Option<String>,
        from_number: Option<String>,
        api_base: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(PROVIDER_HTTP_TIMEOUT)
            .build()
            .map_err(|e| PrepPulseError::Network(format!("http client build failed: {e}")))?;

        let credentials = match (account_sid, auth_token, from_number) {
            (Some(account_sid), Some(auth_token), Some(from_number)) => {
                Some(TwilioCredentials { account_sid, auth_token, from_number })
            }
            _ => None,
        };

        Ok(Self { client, api_base: api_base.into(), credentials })
    }
}

#[async_trait]
impl SmsProvider for TwilioClient {
    fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    #[instrument(skip(self, body))]
    async fn send(&self, to_number: &str, body: &str) -> Result<String> {
        let creds = self
            .credentials
            .as_ref()
            .ok_or_else(|| PrepPulseError::Config("twilio credentials not configured".into()))?;

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, creds.account_sid
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(&creds.account_sid, Some(&creds.auth_token))
            .form(&[
                ("From", creds.from_number.as_str()),
                ("To", to_number),
                ("Body", body),
            ])
            .send()
            .await
            .map_err(InfraError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PrepPulseError::Provider(format!(
                "Twilio API error ({status}): {error_text}"
            )));
        }

        let body: MessageResponse = response.json().await.map_err(|e| {
            PrepPulseError::InvalidInput(format!("Failed to parse Twilio response: {e}"))
        })?;

        debug!(to_number, message_sid = %body.sid, "sms notification sent");

        Ok(body.sid)
    }
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}
