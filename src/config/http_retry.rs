use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{deserialize_duration_from_ms, serialize_duration_to_ms};

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff() -> Duration {
    Duration::from_secs(1)
}

fn default_max_backoff() -> Duration {
    Duration::from_secs(5)
}

fn default_base_for_backoff() -> u32 {
    2
}

/// Serializable setting for jitter in retry policies
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum JitterSetting {
    /// No jitter applied to the backoff duration
    None,
    /// Full jitter applied, randomizing the backoff duration
    #[default]
    Full,
}

/// Retry policy for outbound webhook deliveries.
///
/// Transient failures (connection errors, 5xx, 408) and rate limiting (429)
/// are retried up to `max_retries` times with exponential backoff bounded by
/// `initial_backoff_ms` and `max_backoff_ms`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct HttpRetryConfig {
    /// Maximum number of retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base for the exponential backoff calculation
    #[serde(default = "default_base_for_backoff")]
    pub base_for_backoff: u32,
    /// Lower bound of the wait between two attempts
    #[serde(
        default = "default_initial_backoff",
        deserialize_with = "deserialize_duration_from_ms",
        serialize_with = "serialize_duration_to_ms"
    )]
    pub initial_backoff_ms: Duration,
    /// Upper bound of the wait between two attempts
    #[serde(
        default = "default_max_backoff",
        deserialize_with = "deserialize_duration_from_ms",
        serialize_with = "serialize_duration_to_ms"
    )]
    pub max_backoff_ms: Duration,
    /// Jitter to apply to the backoff duration
    #[serde(default)]
    pub jitter: JitterSetting,
}

impl HttpRetryConfig {
    /// Checks that the backoff bounds are usable by the exponential backoff
    /// policy, which rejects a lower bound above the upper bound.
    pub fn validate(&self) -> Result<(), String> {
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(format!(
                "retry_policy.initial_backoff_ms ({}ms) must not exceed retry_policy.max_backoff_ms ({}ms)",
                self.initial_backoff_ms.as_millis(),
                self.max_backoff_ms.as_millis()
            ));
        }
        if self.base_for_backoff == 0 {
            return Err("retry_policy.base_for_backoff must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for HttpRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_for_backoff: default_base_for_backoff(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
            jitter: JitterSetting::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use config::Config;

    use super::*;

    #[test]
    fn test_http_retry_config_defaults() {
        let config = HttpRetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.base_for_backoff, 2);
        assert_eq!(config.initial_backoff_ms, Duration::from_millis(1000));
        assert_eq!(config.max_backoff_ms, Duration::from_millis(5000));
        assert_eq!(config.jitter, JitterSetting::Full);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_http_retry_config_from_yaml() {
        let yaml = "
            max_retries: 5
            initial_backoff_ms: 10
            max_backoff_ms: 50
            jitter: none
        ";
        let config: HttpRetryConfig = Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.max_retries, 5);
        assert_eq!(config.initial_backoff_ms, Duration::from_millis(10));
        assert_eq!(config.max_backoff_ms, Duration::from_millis(50));
        assert_eq!(config.jitter, JitterSetting::None);
        assert_eq!(config.base_for_backoff, 2);
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let config = HttpRetryConfig {
            initial_backoff_ms: Duration::from_secs(10),
            max_backoff_ms: Duration::from_secs(1),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.contains("must not exceed"));
    }

    #[test]
    fn test_validate_rejects_zero_base() {
        let config = HttpRetryConfig { base_for_backoff: 0, ..Default::default() };
        assert!(config.validate().is_err());
    }
}
