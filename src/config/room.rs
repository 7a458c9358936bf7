use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use super::{
    BaseHttpClientConfig, HttpRetryConfig, deserialize_duration_from_seconds,
    serialize_duration_to_seconds,
};

fn default_template() -> PathBuf {
    PathBuf::from("configs/templates/message.tmpl")
}

fn default_thread_ttl() -> Duration {
    Duration::from_secs(12 * 60 * 60)
}

fn default_sweep_interval() -> Duration {
    Duration::from_secs(60 * 60)
}

fn default_max_message_size() -> usize {
    4096
}

/// The chat backend a room delivers to.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Google Chat incoming webhooks.
    #[default]
    GoogleChat,
}

/// Configuration of a single room: where its alerts go and how they are
/// rendered, threaded and retried.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RoomConfig {
    /// The logical room name alerts are routed by. In the application
    /// configuration it is taken from the room's key.
    #[serde(default)]
    pub name: String,

    /// The chat backend for this room.
    #[serde(default)]
    pub provider: ProviderKind,

    /// The webhook endpoint, including any credentials carried as query
    /// parameters.
    #[serde(default)]
    pub endpoint: String,

    /// Path to the message template.
    #[serde(default = "default_template")]
    pub template: PathBuf,

    /// How long a fingerprint keeps its chat thread.
    #[serde(
        default = "default_thread_ttl",
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds"
    )]
    pub thread_ttl_secs: Duration,

    /// How often expired threads are swept.
    #[serde(
        default = "default_sweep_interval",
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds"
    )]
    pub sweep_interval_secs: Duration,

    /// Reply into the alert's thread instead of starting a new one per post.
    #[serde(default)]
    pub threaded_replies: bool,

    /// Render messages but never send them.
    #[serde(default)]
    pub dry_run: bool,

    /// Maximum size in bytes of a single outbound message.
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,

    /// Settings of the underlying HTTP client.
    #[serde(default)]
    pub http: BaseHttpClientConfig,

    /// Retry policy for deliveries.
    #[serde(default)]
    pub retry_policy: HttpRetryConfig,
}

impl RoomConfig {
    /// Creates a room configuration with default settings.
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: ProviderKind::default(),
            endpoint: endpoint.into(),
            template: default_template(),
            thread_ttl_secs: default_thread_ttl(),
            sweep_interval_secs: default_sweep_interval(),
            threaded_replies: false,
            dry_run: false,
            max_message_size: default_max_message_size(),
            http: BaseHttpClientConfig::default(),
            retry_policy: HttpRetryConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use config::Config;

    use super::*;

    fn from_yaml(yaml: &str) -> RoomConfig {
        Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_room_config_defaults() {
        let room = from_yaml(
            r#"
            name: ops
            endpoint: "https://chat.example.com/v1/spaces/AAA/messages"
            "#,
        );

        assert_eq!(room.name, "ops");
        assert_eq!(room.provider, ProviderKind::GoogleChat);
        assert_eq!(room.template, PathBuf::from("configs/templates/message.tmpl"));
        assert_eq!(room.thread_ttl_secs, Duration::from_secs(43_200));
        assert_eq!(room.sweep_interval_secs, Duration::from_secs(3_600));
        assert!(!room.threaded_replies);
        assert!(!room.dry_run);
        assert_eq!(room.max_message_size, 4096);
        assert_eq!(room.http, BaseHttpClientConfig::default());
        assert_eq!(room.retry_policy, HttpRetryConfig::default());
    }

    #[test]
    fn test_room_config_overrides() {
        let room = from_yaml(
            r#"
            name: db
            provider: google_chat
            endpoint: "https://chat.example.com/v1/spaces/BBB/messages"
            template: /etc/alert-relay/db.tmpl
            thread_ttl_secs: 600
            sweep_interval_secs: 60
            threaded_replies: true
            dry_run: true
            http:
              timeout_secs: 5
            retry_policy:
              max_retries: 7
            "#,
        );

        assert_eq!(room.template, PathBuf::from("/etc/alert-relay/db.tmpl"));
        assert_eq!(room.thread_ttl_secs, Duration::from_secs(600));
        assert_eq!(room.sweep_interval_secs, Duration::from_secs(60));
        assert!(room.threaded_replies);
        assert!(room.dry_run);
        assert_eq!(room.http.timeout_secs, Duration::from_secs(5));
        assert_eq!(room.retry_policy.max_retries, 7);
    }

    #[test]
    fn test_room_config_new_matches_serde_defaults() {
        let built = RoomConfig::new("ops", "https://chat.example.com/v1/spaces/AAA/messages");
        let parsed = from_yaml(
            r#"
            name: ops
            endpoint: "https://chat.example.com/v1/spaces/AAA/messages"
            "#,
        );
        assert_eq!(built, parsed);
    }
}
