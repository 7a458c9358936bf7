//! Google Chat incoming-webhook provider.

use std::{sync::Arc, time::Instant};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::{Provider, ProviderError};
use crate::{
    config::{ProviderKind, RoomConfig},
    correlation::{CorrelationStore, ExpirySweeper},
    delivery::ChatWebhookClient,
    http_client::HttpClientPool,
    metrics::{DispatchFailure, Metrics},
    models::Alert,
    template::MessageRenderer,
};

/// Identifier of the Google Chat backend.
pub const GOOGLE_CHAT_ID: &str = "google_chat";

/// Delivers the alerts of one room to a Google Chat space.
///
/// Every fingerprint is mapped to a thread token that lives for the room's
/// thread TTL, so updates of one alert land in the same thread when threaded
/// replies are enabled.
pub struct GoogleChatProvider {
    room: String,
    store: Arc<CorrelationStore>,
    renderer: MessageRenderer,
    client: ChatWebhookClient,
    metrics: Arc<Metrics>,
    cancellation_token: CancellationToken,
}

impl GoogleChatProvider {
    /// Builds the provider for `config` and starts its expiry sweeper.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn new(
        config: &RoomConfig,
        pool: &HttpClientPool,
        metrics: Arc<Metrics>,
    ) -> Result<Self, ProviderError> {
        if config.name.trim().is_empty() {
            return Err(ProviderError::configuration(&config.name, "room name must not be empty"));
        }
        if config.provider != ProviderKind::GoogleChat {
            return Err(ProviderError::configuration(&config.name, "unsupported provider"));
        }
        let endpoint = parse_endpoint(config)?;
        config
            .retry_policy
            .validate()
            .map_err(|message| ProviderError::configuration(&config.name, message))?;

        let renderer = MessageRenderer::from_file(&config.template, config.max_message_size)
            .map_err(|e| ProviderError::configuration(&config.name, e.to_string()))?;

        let http_client = pool.get_or_create(&config.http, &config.retry_policy).await?;
        let client =
            ChatWebhookClient::new(endpoint, http_client, config.threaded_replies, config.dry_run);

        let store = Arc::new(CorrelationStore::new());
        let cancellation_token = CancellationToken::new();
        ExpirySweeper::new(
            Arc::clone(&store),
            Arc::clone(&metrics),
            GOOGLE_CHAT_ID,
            &config.name,
            config.sweep_interval_secs,
            config.thread_ttl_secs,
            cancellation_token.clone(),
        )
        .spawn();

        tracing::info!(
            room = %config.name,
            threaded_replies = config.threaded_replies,
            dry_run = config.dry_run,
            thread_ttl = ?config.thread_ttl_secs,
            "Initialized Google Chat provider."
        );

        Ok(Self {
            room: config.name.clone(),
            store,
            renderer,
            client,
            metrics,
            cancellation_token,
        })
    }

    /// Returns the correlation store of the room.
    pub fn store(&self) -> &Arc<CorrelationStore> {
        &self.store
    }

    async fn push_one(&self, alert: &Alert) {
        self.metrics.inc_dispatched(GOOGLE_CHAT_ID, &self.room);
        let started = Instant::now();

        let thread_key = self.store.get_or_create(&alert.fingerprint, alert.starts_at).await;

        let chunks = match self.renderer.render(alert) {
            Ok(chunks) => chunks,
            Err(e) => {
                tracing::warn!(
                    room = %self.room,
                    fingerprint = %alert.fingerprint,
                    error = %e,
                    "Failed to render alert."
                );
                self.metrics.inc_dispatch_error(GOOGLE_CHAT_ID, &self.room, DispatchFailure::Preparing);
                return;
            }
        };

        for chunk in &chunks {
            if let Err(e) = self.client.send(chunk, Some(&thread_key)).await {
                tracing::error!(
                    room = %self.room,
                    fingerprint = %alert.fingerprint,
                    error = %e,
                    "Failed to deliver alert."
                );
                self.metrics.inc_dispatch_error(GOOGLE_CHAT_ID, &self.room, DispatchFailure::Sending);
            }
        }

        self.metrics.observe_dispatch_duration(GOOGLE_CHAT_ID, &self.room, started.elapsed());
    }
}

fn parse_endpoint(config: &RoomConfig) -> Result<Url, ProviderError> {
    if config.endpoint.trim().is_empty() {
        return Err(ProviderError::configuration(&config.name, "endpoint is required"));
    }
    let endpoint = Url::parse(&config.endpoint).map_err(|e| {
        ProviderError::configuration(&config.name, format!("invalid endpoint: {e}"))
    })?;
    match endpoint.scheme() {
        "http" | "https" => Ok(endpoint),
        scheme => Err(ProviderError::configuration(
            &config.name,
            format!("unsupported endpoint scheme '{scheme}'"),
        )),
    }
}

#[async_trait]
impl Provider for GoogleChatProvider {
    fn id(&self) -> &str {
        GOOGLE_CHAT_ID
    }

    fn room(&self) -> &str {
        &self.room
    }

    async fn push(&self, alerts: &[Alert]) -> Result<(), ProviderError> {
        if self.cancellation_token.is_cancelled() {
            return Err(ProviderError::Push(format!("room {} has been shut down", self.room)));
        }
        tracing::debug!(room = %self.room, count = alerts.len(), "Pushing alerts.");
        for alert in alerts {
            self.push_one(alert).await;
        }
        Ok(())
    }

    fn shutdown(&self) {
        self.cancellation_token.cancel();
    }
}

impl Drop for GoogleChatProvider {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}
