//! HTTP surface of the service binary.
//!
//! `POST /v1/triggers` is the event-bus delivery endpoint: the bus posts
//! the trigger envelope here at least once, possibly more. `POST /v1/scan`
//! runs one scan on demand; the scheduler drives the same code on its cron
//! cadence.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use preppulse_core::{SkipReason, TriggerOutcome};
use preppulse_domain::{PrepPulseError, PrepTriggerEvent};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, instrument};

use crate::context::AppContext;

/// Build the service router.
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/triggers", post(handle_trigger))
        .route("/v1/scan", post(run_scan))
        .with_state(ctx)
}

/// Event-bus envelope; a bare event body is accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TriggerRequest {
    Envelope {
        #[allow(dead_code)]
        source: Option<String>,
        detail: PrepTriggerEvent,
    },
    Bare(PrepTriggerEvent),
}

impl TriggerRequest {
    fn into_event(self) -> PrepTriggerEvent {
        match self {
            Self::Envelope { detail, .. } => detail,
            Self::Bare(event) => event,
        }
    }
}

async fn health(State(ctx): State<Arc<AppContext>>) -> Response {
    match ctx.db.health_check() {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response(),
        Err(e) => {
            error!(error = %e, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "status": "unavailable" })))
                .into_response()
        }
    }
}

#[instrument(skip(ctx, request))]
async fn handle_trigger(
    State(ctx): State<Arc<AppContext>>,
    Json(request): Json<TriggerRequest>,
) -> Response {
    let event = request.into_event();

    match ctx.trigger_handler.handle(&event).await {
        Ok(TriggerOutcome::Notified(result)) => {
            (StatusCode::OK, Json(json!({ "outcome": "notified", "notification": result })))
                .into_response()
        }
        Ok(TriggerOutcome::Skipped(reason)) => {
            let reason = match reason {
                SkipReason::AlreadyNotified => "already_notified",
                SkipReason::AlreadyProcessed => "already_processed",
            };
            (StatusCode::OK, Json(json!({ "outcome": "skipped", "reason": reason })))
                .into_response()
        }
        Err(e) => error_response(e),
    }
}

#[instrument(skip(ctx))]
async fn run_scan(State(ctx): State<Arc<AppContext>>) -> Response {
    match ctx.coordinator.run_scan().await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Map domain errors onto HTTP statuses.
///
/// Validation failures (malformed events, dangling references) are the
/// caller's fault and must not be retried by the bus; everything else is a
/// server-side 500.
fn error_response(error: PrepPulseError) -> Response {
    let status = match &error {
        PrepPulseError::InvalidInput(_) | PrepPulseError::NotFound(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!(error = %error, "request failed");
    }

    (status, Json(json!({ "error": error.to_string() }))).into_response()
}
