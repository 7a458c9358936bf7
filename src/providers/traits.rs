//! The capability every chat backend exposes to the router.

use async_trait::async_trait;

use super::ProviderError;
use crate::models::Alert;

/// A chat backend bound to a single room.
#[async_trait]
pub trait Provider: Send + Sync {
    /// The backend identifier, e.g. `google_chat`.
    fn id(&self) -> &str;

    /// The room this provider delivers to.
    fn room(&self) -> &str;

    /// Delivers `alerts` to the room.
    ///
    /// Failures of individual alerts are logged and counted by the provider
    /// and do not abort the remaining alerts.
    async fn push(&self, alerts: &[Alert]) -> Result<(), ProviderError>;

    /// Stops any background work of the provider.
    fn shutdown(&self) {}
}
