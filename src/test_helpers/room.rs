use std::{path::Path, time::Duration};

use crate::config::{HttpRetryConfig, JitterSetting, RoomConfig};

/// A builder for creating `RoomConfig` instances for testing.
///
/// Retries default to a fast, jitter-free policy so tests never wait long.
#[derive(Debug, Clone)]
pub struct RoomConfigBuilder {
    config: RoomConfig,
}

impl RoomConfigBuilder {
    /// Creates a room with the given name and endpoint.
    pub fn new(name: &str, endpoint: &str) -> Self {
        let mut config = RoomConfig::new(name, endpoint);
        config.retry_policy = HttpRetryConfig {
            max_retries: 3,
            initial_backoff_ms: Duration::from_millis(5),
            max_backoff_ms: Duration::from_millis(20),
            jitter: JitterSetting::None,
            ..Default::default()
        };
        Self { config }
    }

    /// Sets the template path.
    pub fn template(mut self, path: &Path) -> Self {
        self.config.template = path.to_path_buf();
        self
    }

    /// Enables or disables threaded replies.
    pub fn threaded_replies(mut self, enabled: bool) -> Self {
        self.config.threaded_replies = enabled;
        self
    }

    /// Enables or disables dry-run mode.
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.config.dry_run = enabled;
        self
    }

    /// Sets the thread TTL.
    pub fn thread_ttl(mut self, ttl: Duration) -> Self {
        self.config.thread_ttl_secs = ttl;
        self
    }

    /// Sets the sweep interval.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.config.sweep_interval_secs = interval;
        self
    }

    /// Sets the maximum number of retries.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.retry_policy.max_retries = max_retries;
        self
    }

    /// Sets the maximum message size.
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.config.max_message_size = size;
        self
    }

    /// Builds the `RoomConfig`.
    pub fn build(self) -> RoomConfig {
        self.config
    }
}
