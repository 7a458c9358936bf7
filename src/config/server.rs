use std::time::Duration;

use serde::Deserialize;

use super::deserialize_duration_from_seconds;

/// Configuration for the inbound HTTP server.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address and port for the HTTP server to listen on.
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Upper bound on the time spent handling one request, body included.
    #[serde(
        default = "default_request_timeout",
        deserialize_with = "deserialize_duration_from_seconds"
    )]
    pub request_timeout_secs: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Provides the default value for listen_address.
fn default_listen_address() -> String {
    "0.0.0.0:6000".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(5)
}
