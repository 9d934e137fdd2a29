//! API handlers.
//!
//! Relay handlers run the synchronizer in a spawned task: once a request has
//! passed validation, a client disconnect or request timeout cannot abort the
//! write+reload halfway.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use crate::http::request::RequestIdExt;
use crate::http::response::{ApiError, MessageBody, PreviewsBody, StatusBody};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::preview::PreviewPayload;
use crate::relay::{RelayPayload, RelayRequest};

const MISSING_KEYS: &str = "At least one stream key (facebook, youtube, or twitch) is required.";
const START_FAILED: &str = "Failed to update relay config or reload SRS.";
const STOP_FAILED: &str = "Failed to clear relay config or reload SRS.";

/// `GET /`
pub async fn banner(State(state): State<AppState>) -> Json<MessageBody> {
    Json(MessageBody::new(format!(
        "Relay backend live on {} (v{})",
        state.bind_address,
        env!("CARGO_PKG_VERSION")
    )))
}

/// `GET /api/status`
pub async fn status() -> Json<StatusBody> {
    Json(StatusBody {
        status: "Backend is running".to_string(),
    })
}

/// `POST /api/startRelay`
pub async fn start_relay(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<RelayPayload>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let result = start_relay_inner(&state, headers.request_id(), payload).await;
    record("start_relay", &result);
    result
}

async fn start_relay_inner(
    state: &AppState,
    request_id: &str,
    payload: Result<Json<RelayPayload>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let Json(payload) = payload?;

    let request = RelayRequest::from_payload(&payload, state.key_policy)
        .map_err(|e| ApiError::from_relay(&e, START_FAILED))?;
    if request.is_empty() {
        return Err(ApiError::BadRequest(MISSING_KEYS.to_string()));
    }

    tracing::info!(
        request_id = %request_id,
        platforms = ?request.platforms(),
        custom_targets = request.custom().len(),
        "Received startRelay request"
    );

    let synchronizer = state.synchronizer.clone();
    let outcome = tokio::spawn(async move { synchronizer.apply_relay(&request).await })
        .await
        .map_err(|e| {
            tracing::error!(request_id = %request_id, error = %e, "Relay apply task failed");
            ApiError::Internal(START_FAILED.to_string())
        })?
        .map_err(|e| {
            tracing::error!(request_id = %request_id, error = %e, "startRelay failed");
            ApiError::from_relay(&e, START_FAILED)
        })?;

    let message = if outcome.reload.success {
        "Relay config updated and SRS reloaded successfully."
    } else {
        "Relay config updated; SRS reload reported a failure."
    };
    Ok(Json(MessageBody::new(message)))
}

/// `POST /api/stopRelay`
pub async fn stop_relay(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageBody>, ApiError> {
    let request_id = headers.request_id();
    tracing::info!(request_id = %request_id, "Received stopRelay request");

    let synchronizer = state.synchronizer.clone();
    let result = match tokio::spawn(async move { synchronizer.clear_relay().await }).await {
        Ok(Ok(_)) => Ok(Json(MessageBody::new("All streams stopped and relay config cleared."))),
        Ok(Err(e)) => {
            tracing::error!(request_id = %request_id, error = %e, "stopRelay failed");
            Err(ApiError::from_relay(&e, STOP_FAILED))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Relay clear task failed");
            Err(ApiError::Internal(STOP_FAILED.to_string()))
        }
    };

    record("stop_relay", &result);
    result
}

/// `POST /api/previews`
pub async fn previews(
    State(state): State<AppState>,
    payload: Result<Json<PreviewPayload>, JsonRejection>,
) -> Result<Json<PreviewsBody>, ApiError> {
    let result = payload.map_err(ApiError::from).map(|Json(payload)| {
        Json(PreviewsBody {
            previews: state.previews.resolve(&payload),
        })
    });

    record("previews", &result);
    result
}

fn record<T>(route: &'static str, result: &Result<T, ApiError>) {
    let status = match result {
        Ok(_) => StatusCode::OK,
        Err(e) => e.status(),
    };
    metrics::record_request(route, status.as_u16());
}
