//! HTTP server module

mod dispatch;
mod error;
mod health;

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post},
};
use serde::Serialize;
pub use error::ApiError;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::timeout::TimeoutLayer;

use crate::{metrics::Metrics, router::Router as AlertRouter};

/// The state shared by all handlers.
#[derive(Clone)]
pub struct ApiState {
    /// Routes alert batches to room providers.
    pub router: Arc<AlertRouter>,
    /// The metrics exposed on `/metrics`.
    pub metrics: Arc<Metrics>,
}

/// The JSON envelope every endpoint except `/metrics` answers with.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    /// `success` or `error`.
    pub status: &'static str,
    /// The error message, for errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The payload, for successes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    /// Wraps `data` in a success envelope.
    pub fn success(data: T) -> Self {
        Self { status: "success", message: None, data: Some(data) }
    }
}

/// Builds the application routes. Requests taking longer than
/// `request_timeout` are answered with 408.
pub fn routes(state: ApiState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(health::index))
        .route("/ping", get(health::ping))
        .route("/metrics", get(health::metrics))
        .route("/dispatch", post(dispatch::dispatch))
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

/// Serves the API on `listener` until `cancellation_token` is cancelled.
pub async fn run_server(
    listener: TcpListener,
    state: ApiState,
    request_timeout: Duration,
    cancellation_token: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, ?request_timeout, "HTTP server listening.");
    }

    axum::serve(listener, routes(state, request_timeout))
        .with_graceful_shutdown(async move { cancellation_token.cancelled().await })
        .await
}
