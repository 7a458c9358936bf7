//! A reusable, thread-safe pool of HTTP clients.
//!
//! Rooms with identical connection and retry settings share one client and
//! therefore one connection pool.

use std::{collections::HashMap, sync::Arc};

use reqwest_middleware::ClientWithMiddleware;
use thiserror::Error;
use tokio::sync::RwLock;

use super::client::{build_base_client, create_retryable_http_client};
use crate::config::{BaseHttpClientConfig, HttpRetryConfig};

/// Errors that can occur within the `HttpClientPool`.
#[derive(Debug, Error)]
pub enum HttpClientPoolError {
    /// An error occurred while building the underlying `reqwest::Client`.
    #[error("Failed to create HTTP client: {0}")]
    HttpClientBuildError(String),
}

/// A pool for managing and reusing HTTP clients.
///
/// Clients are keyed by their `BaseHttpClientConfig` and `HttpRetryConfig`,
/// so different settings result in different, isolated clients.
#[derive(Default)]
pub struct HttpClientPool {
    clients: RwLock<HashMap<(BaseHttpClientConfig, HttpRetryConfig), Arc<ClientWithMiddleware>>>,
}

impl HttpClientPool {
    /// Creates a new, empty `HttpClientPool`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the client for the given settings, creating it on first use.
    ///
    /// Uses double-checked locking so that concurrent callers with the same
    /// settings end up with the same client.
    pub async fn get_or_create(
        &self,
        base_config: &BaseHttpClientConfig,
        retry_policy: &HttpRetryConfig,
    ) -> Result<Arc<ClientWithMiddleware>, HttpClientPoolError> {
        let key = (base_config.clone(), retry_policy.clone());

        if let Some(client) = self.clients.read().await.get(&key) {
            return Ok(client.clone());
        }

        let mut clients = self.clients.write().await;
        // Another task may have created the client while we waited for the lock.
        if let Some(client) = clients.get(&key) {
            return Ok(client.clone());
        }

        retry_policy.validate().map_err(HttpClientPoolError::HttpClientBuildError)?;
        let base_client = build_base_client(base_config)
            .map_err(|e| HttpClientPoolError::HttpClientBuildError(e.to_string()))?;

        let new_client = Arc::new(create_retryable_http_client(retry_policy, base_client));
        clients.insert(key, new_client.clone());

        tracing::debug!(?base_config, ?retry_policy, "Created HTTP client.");
        Ok(new_client)
    }

    /// Returns the number of clients in the pool.
    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Returns whether the pool holds no clients.
    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }
}
