//! HTTP event-bus implementation of the TriggerPublisher port.

use async_trait::async_trait;
use preppulse_core::TriggerPublisher;
use preppulse_domain::constants::{
    PROVIDER_HTTP_TIMEOUT, TRIGGER_DETAIL_TYPE, TRIGGER_EVENT_SOURCE,
};
use preppulse_domain::{PrepPulseError, PrepTriggerEvent, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use crate::errors::InfraError;

/// Publishes trigger envelopes to an event-bus HTTP endpoint.
///
/// Delivery downstream is at-least-once; a partial-failure count reported
/// by the bus surfaces as an error so the caller never mistakes a dropped
/// event for a published one.
pub struct HttpTriggerPublisher {
    client: Client,
    endpoint: String,
}

impl HttpTriggerPublisher {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(PROVIDER_HTTP_TIMEOUT)
            .build()
            .map_err(|e| PrepPulseError::Network(format!("http client build failed: {e}")))?;

        Ok(Self { client, endpoint: endpoint.into() })
    }
}

#[async_trait]
impl TriggerPublisher for HttpTriggerPublisher {
    #[instrument(skip(self, event), fields(meeting_id = %event.meeting_id))]
    async fn publish(&self, event: &PrepTriggerEvent) -> Result<()> {
        let envelope = json!({
            "source": TRIGGER_EVENT_SOURCE,
            "detail-type": TRIGGER_DETAIL_TYPE,
            "detail": event,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&envelope)
            .send()
            .await
            .map_err(InfraError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PrepPulseError::EventBus(format!(
                "event bus error ({status}): {error_text}"
            )));
        }

        let body: PublishResponse = response.json().await.unwrap_or_default();
        if body.failed_entry_count > 0 {
            return Err(PrepPulseError::EventBus(format!(
                "event bus reported {} failed entries",
                body.failed_entry_count
            )));
        }

        debug!(meeting_id = %event.meeting_id, "published prep trigger event");

        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct PublishResponse {
    #[serde(rename = "FailedEntryCount", alias = "failed_entry_count", default)]
    failed_entry_count: u32,
}
