//! Routing of alert batches to the provider of their room.

use std::{collections::HashMap, sync::Arc};

use thiserror::Error;

use crate::{
    models::Alert,
    providers::{Provider, ProviderError},
};

const PREFIXED_RECEIVER_HINT: &str = " (hint: the upstream receiver name may be prefixed, e.g. by a Kubernetes AlertmanagerConfig with namespace/config-name; use the room_name query parameter to select the room explicitly)";

/// Errors returned when routing alerts.
#[derive(Debug, Error)]
pub enum RouterError {
    /// No provider is registered for the room.
    #[error("no provider configured for room: {room}, available: [{}]{}", .available.join(", "), hint(.room))]
    UnknownRoom {
        /// The requested room.
        room: String,
        /// Every registered room, sorted.
        available: Vec<String>,
    },

    /// The provider of the room failed.
    #[error("provider for room {room} failed: {source}")]
    Provider {
        /// The requested room.
        room: String,
        /// The provider error.
        source: ProviderError,
    },
}

fn hint(room: &str) -> &'static str {
    if room.contains('/') { PREFIXED_RECEIVER_HINT } else { "" }
}

/// Maps room names to their providers.
///
/// The mapping is fixed at construction, so lookups need no locking.
pub struct Router {
    providers: HashMap<String, Arc<dyn Provider>>,
}

impl Router {
    /// Registers every provider under its room name. When two providers serve
    /// the same room, the later one wins.
    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Self {
        let mut map: HashMap<String, Arc<dyn Provider>> = HashMap::with_capacity(providers.len());
        for provider in providers {
            let room = provider.room().to_string();
            if let Some(previous) = map.insert(room.clone(), provider) {
                tracing::warn!(room = %room, replaced = previous.id(), "Duplicate room, the later provider wins.");
            }
        }
        Self { providers: map }
    }

    /// Returns the provider of `room`.
    pub fn provider(&self, room: &str) -> Result<Arc<dyn Provider>, RouterError> {
        self.providers.get(room).cloned().ok_or_else(|| RouterError::UnknownRoom {
            room: room.to_string(),
            available: self.rooms(),
        })
    }

    /// Returns every registered room, sorted.
    pub fn rooms(&self) -> Vec<String> {
        let mut rooms: Vec<String> = self.providers.keys().cloned().collect();
        rooms.sort();
        rooms
    }

    /// Pushes `alerts` to the provider of `room` and waits for it to finish.
    pub async fn dispatch(&self, alerts: &[Alert], room: &str) -> Result<(), RouterError> {
        let provider = self.provider(room)?;
        tracing::info!(room, provider = provider.id(), count = alerts.len(), "Dispatching alerts.");

        provider
            .push(alerts)
            .await
            .map_err(|source| RouterError::Provider { room: room.to_string(), source })
    }

    /// Stops the background work of every provider.
    pub fn shutdown(&self) {
        for provider in self.providers.values() {
            provider.shutdown();
        }
    }
}
