//! Configuration module for alert-relay.

mod app_config;
mod helpers;
mod http_base;
mod http_retry;
mod room;
mod server;

pub use app_config::{AppConfig, DEFAULT_CONFIG_PATH, ENV_PREFIX};
pub use helpers::{
    deserialize_duration_from_ms, deserialize_duration_from_seconds, deserialize_optional_url,
    serialize_duration_to_ms, serialize_duration_to_seconds,
};
pub use http_base::BaseHttpClientConfig;
pub use http_retry::{HttpRetryConfig, JitterSetting};
pub use room::{ProviderKind, RoomConfig};
pub use server::ServerConfig;
