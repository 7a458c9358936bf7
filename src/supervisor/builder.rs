//! This module provides the `SupervisorBuilder` for constructing a `Supervisor`.

use std::sync::Arc;

use super::{Supervisor, SupervisorError};
use crate::{
    config::AppConfig, http_client::HttpClientPool, metrics::Metrics, providers::build_providers,
    router::Router,
};

/// A builder for creating a `Supervisor` instance.
#[derive(Default)]
pub struct SupervisorBuilder {
    config: Option<AppConfig>,
    metrics: Option<Arc<Metrics>>,
    http_client_pool: Option<Arc<HttpClientPool>>,
}

impl SupervisorBuilder {
    /// Creates a new, empty `SupervisorBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the application configuration.
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the metrics registry. A fresh one is created when omitted.
    pub fn metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Sets the HTTP client pool. A fresh one is created when omitted.
    pub fn http_client_pool(mut self, pool: Arc<HttpClientPool>) -> Self {
        self.http_client_pool = Some(pool);
        self
    }

    /// Builds one provider per configured room and the router over them.
    pub async fn build(self) -> Result<Supervisor, SupervisorError> {
        let config = self.config.ok_or(SupervisorError::MissingConfig)?;
        let metrics = match self.metrics {
            Some(metrics) => metrics,
            None => Arc::new(Metrics::new()?),
        };
        let pool = self.http_client_pool.unwrap_or_default();

        tracing::debug!(rooms = config.rooms.len(), "Initializing room providers...");
        let providers = build_providers(&config, &pool, Arc::clone(&metrics)).await?;
        let router = Arc::new(Router::new(providers));
        tracing::info!(rooms = ?router.rooms(), "Router initialized.");

        Ok(Supervisor::new(config, router, metrics))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::{providers::ProviderError, test_helpers::RoomConfigBuilder};

    #[tokio::test]
    async fn test_build_succeeds_with_valid_rooms() {
        let mut template = tempfile::NamedTempFile::new().unwrap();
        template.write_all(b"{{ labels.alertname }}").unwrap();

        let config = AppConfig {
            rooms: vec![
                RoomConfigBuilder::new("ops", "https://chat.example.com/a")
                    .template(template.path())
                    .build(),
                RoomConfigBuilder::new("db", "https://chat.example.com/b")
                    .template(template.path())
                    .build(),
            ],
            ..Default::default()
        };

        let supervisor = SupervisorBuilder::new().config(config).build().await.unwrap();

        assert_eq!(supervisor.router().rooms(), vec!["db".to_string(), "ops".to_string()]);
    }

    #[tokio::test]
    async fn test_build_fails_if_config_is_missing() {
        let result = SupervisorBuilder::new().build().await;
        assert!(matches!(result, Err(SupervisorError::MissingConfig)));
    }

    #[tokio::test]
    async fn test_build_fails_without_rooms() {
        let result = SupervisorBuilder::new().config(AppConfig::default()).build().await;
        assert!(matches!(result, Err(SupervisorError::Provider(ProviderError::NoRooms))));
    }
}
