//! Error types for room providers.

use thiserror::Error;

use crate::http_client::HttpClientPoolError;

/// Errors that can occur when building or using a provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The room configuration is invalid.
    #[error("Configuration error for room '{room}': {message}")]
    Configuration {
        /// The room being configured.
        room: String,
        /// What is wrong with it.
        message: String,
    },

    /// The configuration declares no room.
    #[error("no rooms configured")]
    NoRooms,

    /// The HTTP client could not be created.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] HttpClientPoolError),

    /// The provider failed while pushing alerts.
    #[error("Push failed: {0}")]
    Push(String),
}

impl ProviderError {
    pub(crate) fn configuration(room: &str, message: impl Into<String>) -> Self {
        Self::Configuration { room: room.to_string(), message: message.into() }
    }
}
