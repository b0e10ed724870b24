//! HTTP handlers for the webhook server.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::signature::{self, SIGNATURE_HEADER};
use super::{Job, JobQueue, PushEvent, WebhookError};

/// Header naming the GitHub event type.
pub const EVENT_HEADER: &str = "x-github-event";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Queue receiving push jobs
    pub queue: Arc<JobQueue>,
    /// Signature secret; empty disables verification
    pub secret: Arc<str>,
}

/// Routes served by the webhook server.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhooks/github", post(github_webhook))
        .route("/jobs/:id", get(get_job))
        .with_state(state)
}

type JsonResponse = (StatusCode, Json<Value>);

fn error(status: StatusCode, message: impl Into<String>) -> JsonResponse {
    (status, Json(json!({ "error": message.into() })))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}

async fn github_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> JsonResponse {
    let provided = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    if !signature::verify(&state.secret, &body, provided) {
        warn!("Rejected webhook with invalid signature");
        return error(StatusCode::UNAUTHORIZED, "invalid signature");
    }

    let event_type = headers
        .get(EVENT_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if event_type != "push" {
        debug!(event = event_type, "Ignoring non-push event");
        return (
            StatusCode::OK,
            Json(json!({ "status": "ignored", "event": event_type })),
        );
    }

    let event: PushEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => return error(StatusCode::BAD_REQUEST, format!("invalid push payload: {e}")),
    };

    match state.queue.enqueue(event).await {
        Ok(id) => (
            StatusCode::ACCEPTED,
            Json(json!({ "status": "queued", "job_id": id })),
        ),
        Err(e @ (WebhookError::QueueFull | WebhookError::NotRunning)) => {
            warn!(error = %e, "Could not queue push");
            error(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
        Err(e) => error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Job>, JsonResponse> {
    state
        .queue
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, format!("job {id} not found")))
}
