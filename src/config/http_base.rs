use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::{
    deserialize_duration_from_seconds, deserialize_optional_url, serialize_duration_to_seconds,
};

fn default_idle_per_host() -> usize {
    50
}

fn default_idle_timeout() -> Duration {
    Duration::from_secs(90)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Configuration for the base HTTP client of a room.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub struct BaseHttpClientConfig {
    /// Maximum idle connections per host
    #[serde(default = "default_idle_per_host")]
    pub max_idle_per_host: usize,

    /// Timeout for idle connections
    #[serde(
        default = "default_idle_timeout",
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds"
    )]
    pub idle_timeout_secs: Duration,

    /// Timeout for establishing connections
    #[serde(
        default = "default_connect_timeout",
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds"
    )]
    pub connect_timeout_secs: Duration,

    /// Timeout for a single request attempt, retries excluded
    #[serde(
        default = "default_request_timeout",
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds"
    )]
    pub timeout_secs: Duration,

    /// Optional proxy for all outbound requests
    #[serde(default, deserialize_with = "deserialize_optional_url")]
    pub proxy_url: Option<Url>,
}

impl Default for BaseHttpClientConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: default_idle_per_host(),
            idle_timeout_secs: default_idle_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            timeout_secs: default_request_timeout(),
            proxy_url: None,
        }
    }
}
