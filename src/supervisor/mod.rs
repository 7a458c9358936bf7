//! The Supervisor owns the router and the HTTP server and manages their
//! lifecycle.
//!
//! It listens for shutdown signals (Ctrl+C or SIGTERM), stops the HTTP server
//! gracefully through a shared cancellation token and then stops the
//! background tasks of every room provider.

mod builder;

use std::{net::SocketAddr, sync::Arc};

pub use builder::SupervisorBuilder;
use thiserror::Error;
use tokio::{net::TcpListener, signal, task::JoinSet};
use tokio_util::sync::CancellationToken;

use crate::{
    config::AppConfig,
    http_server::{self, ApiState},
    metrics::Metrics,
    providers::ProviderError,
    router::Router,
};

/// Errors that can occur while building or running the supervisor.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// A required configuration was not provided to the `SupervisorBuilder`.
    #[error("Missing configuration for Supervisor")]
    MissingConfig,

    /// A room provider could not be created.
    #[error("Provider creation failed: {0}")]
    Provider(#[from] ProviderError),

    /// The metrics registry could not be created.
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// The listen address is invalid.
    #[error("Invalid listen address '{address}': {source}")]
    InvalidListenAddress {
        /// The configured address.
        address: String,
        /// The parse error.
        source: std::net::AddrParseError,
    },

    /// The HTTP server failed.
    #[error("HTTP server error: {0}")]
    Server(#[from] std::io::Error),
}

/// The primary runtime manager for the application.
pub struct Supervisor {
    config: AppConfig,
    router: Arc<Router>,
    metrics: Arc<Metrics>,
    cancellation_token: CancellationToken,
}

impl Supervisor {
    /// Creates a new supervisor over an already built router.
    pub fn new(config: AppConfig, router: Arc<Router>, metrics: Arc<Metrics>) -> Self {
        Self { config, router, metrics, cancellation_token: CancellationToken::new() }
    }

    /// Returns a `SupervisorBuilder`.
    pub fn builder() -> SupervisorBuilder {
        SupervisorBuilder::new()
    }

    /// Returns the router.
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Returns a token that shuts the supervisor down when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Binds the configured listen address and serves until a shutdown signal
    /// arrives.
    pub async fn run(self) -> Result<(), SupervisorError> {
        let address = self.config.server.listen_address.clone();
        let addr: SocketAddr = address
            .parse()
            .map_err(|source| SupervisorError::InvalidListenAddress { address, source })?;
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serves on `listener` until a shutdown signal arrives or the
    /// cancellation token is cancelled.
    pub async fn serve(self, listener: TcpListener) -> Result<(), SupervisorError> {
        let mut join_set = JoinSet::new();

        let signal_token = self.cancellation_token.clone();
        join_set.spawn(async move {
            let ctrl_c = signal::ctrl_c();
            #[cfg(unix)]
            let terminate = async {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        sigterm.recv().await;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to register SIGTERM handler.");
                        std::future::pending::<()>().await;
                    }
                }
            };
            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => tracing::info!("SIGINT (Ctrl+C) received, initiating graceful shutdown."),
                _ = terminate => tracing::info!("SIGTERM received, initiating graceful shutdown."),
                _ = signal_token.cancelled() => return,
            }

            signal_token.cancel();
        });

        let state = ApiState { router: Arc::clone(&self.router), metrics: Arc::clone(&self.metrics) };
        let result = http_server::run_server(
            listener,
            state,
            self.config.server.request_timeout_secs,
            self.cancellation_token.clone(),
        )
        .await;

        // The server only returns on cancellation or failure; either way the
        // signal handler is no longer needed.
        self.cancellation_token.cancel();
        while join_set.join_next().await.is_some() {}

        tracing::info!("HTTP server stopped, shutting down room providers.");
        self.router.shutdown();

        result.map_err(SupervisorError::from)
    }
}
