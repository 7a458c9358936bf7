//! Index, liveness and metrics endpoints.

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Json},
};

use super::{ApiError, ApiState, Envelope};

pub async fn index(State(state): State<ApiState>) -> impl IntoResponse {
    state.metrics.inc_http_request("index");
    Json(Envelope::success("welcome to alert-relay!"))
}

pub async fn ping(State(state): State<ApiState>) -> impl IntoResponse {
    state.metrics.inc_http_request("ping");
    Json(Envelope::success("pong"))
}

pub async fn metrics(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let body = state.metrics.render().map_err(|e| ApiError::InternalServerError(e.to_string()))?;
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}
