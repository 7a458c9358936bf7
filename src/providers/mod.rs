//! Chat backends and their construction from configuration.

mod error;
mod google_chat;
mod traits;

use std::sync::Arc;

pub use error::ProviderError;
pub use google_chat::{GOOGLE_CHAT_ID, GoogleChatProvider};
pub use traits::Provider;

use crate::{
    config::{AppConfig, ProviderKind},
    http_client::HttpClientPool,
    metrics::Metrics,
};

/// Builds one provider per configured room.
///
/// Fails on the first invalid room, or when no room is configured at all.
pub async fn build_providers(
    config: &AppConfig,
    pool: &HttpClientPool,
    metrics: Arc<Metrics>,
) -> Result<Vec<Arc<dyn Provider>>, ProviderError> {
    if config.rooms.is_empty() {
        return Err(ProviderError::NoRooms);
    }

    let mut providers: Vec<Arc<dyn Provider>> = Vec::with_capacity(config.rooms.len());
    for room in &config.rooms {
        let provider = match room.provider {
            ProviderKind::GoogleChat => {
                GoogleChatProvider::new(room, pool, Arc::clone(&metrics)).await?
            }
        };
        providers.push(Arc::new(provider));
    }

    tracing::info!(count = providers.len(), "Initialized room providers.");
    Ok(providers)
}
