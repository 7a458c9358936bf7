//! The `/dispatch` endpoint receiving Alertmanager webhooks.

use std::time::Instant;

use axum::{
    extract::{Query, State, rejection::JsonRejection},
    response::{IntoResponse, Json},
};
use serde::Deserialize;

use super::{ApiError, ApiState, Envelope};
use crate::models::AlertBatch;

const HANDLER: &str = "dispatch";

#[derive(Debug, Deserialize)]
pub struct DispatchParams {
    room_name: Option<String>,
}

/// Accepts a webhook batch and pushes it to the room's provider in the
/// background. The room is the `room_name` query parameter when set, the
/// batch's receiver otherwise.
pub async fn dispatch(
    State(state): State<ApiState>,
    Query(params): Query<DispatchParams>,
    payload: Result<Json<AlertBatch>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let started = Instant::now();
    state.metrics.inc_http_request(HANDLER);

    let Json(batch) = payload.map_err(|e| {
        tracing::error!(error = %e, "Error decoding request body.");
        state.metrics.inc_http_error(HANDLER);
        ApiError::BadRequest("Error decoding payload.".to_string())
    })?;

    let room = params.room_name.filter(|r| !r.is_empty()).unwrap_or(batch.receiver);

    // Resolve the room up front so an unknown room is answered with a 404.
    state.router.provider(&room).map_err(|e| {
        state.metrics.inc_http_error(HANDLER);
        ApiError::from(e)
    })?;

    tracing::info!(room = %room, count = batch.alerts.len(), "Dispatching new alerts.");

    // Delivery runs in the background; the webhook is acknowledged right away.
    let alerts = batch.alerts;
    let router = state.router.clone();
    let metrics = state.metrics.clone();
    tokio::spawn(async move {
        if let Err(e) = router.dispatch(&alerts, &room).await {
            tracing::error!(room = %room, error = %e, "Error dispatching alerts.");
            metrics.inc_http_error(HANDLER);
        }
        metrics.observe_http_duration(HANDLER, started.elapsed());
    });

    Ok(Json(Envelope::success("dispatched")))
}
