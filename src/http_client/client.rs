//! Construction of HTTP clients with retry middleware for transient errors
//! such as connection failures, server errors and rate limiting.

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{Jitter, RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::config::{BaseHttpClientConfig, HttpRetryConfig, JitterSetting};

/// Builds the plain `reqwest` client with the connection settings of a room.
pub fn build_base_client(config: &BaseHttpClientConfig) -> reqwest::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .pool_max_idle_per_host(config.max_idle_per_host)
        .pool_idle_timeout(Some(config.idle_timeout_secs))
        .connect_timeout(config.connect_timeout_secs)
        .timeout(config.timeout_secs);

    if let Some(proxy_url) = &config.proxy_url {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
    }

    builder.build()
}

/// Wraps `base_client` with a retry middleware following `config`.
///
/// Connection errors, timeouts, 5xx, 408 and 429 responses are treated as
/// transient and retried; every other response is returned to the caller
/// after the first attempt.
///
/// The backoff bounds must be ordered, see [`HttpRetryConfig::validate`].
pub fn create_retryable_http_client(
    config: &HttpRetryConfig,
    base_client: reqwest::Client,
) -> ClientWithMiddleware {
    let policy_builder = match config.jitter {
        JitterSetting::None => ExponentialBackoff::builder().jitter(Jitter::None),
        JitterSetting::Full => ExponentialBackoff::builder().jitter(Jitter::Full),
    };

    let retry_policy = policy_builder
        .base(config.base_for_backoff)
        .retry_bounds(config.initial_backoff_ms, config.max_backoff_ms)
        .build_with_max_retries(config.max_retries);

    ClientBuilder::new(base_client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn fast_retry(max_retries: u32) -> HttpRetryConfig {
        HttpRetryConfig {
            max_retries,
            initial_backoff_ms: Duration::from_millis(1),
            max_backoff_ms: Duration::from_millis(5),
            jitter: JitterSetting::None,
            ..Default::default()
        }
    }

    #[test]
    fn test_build_base_client_with_proxy() {
        let config = BaseHttpClientConfig {
            proxy_url: Some("http://proxy.internal:3128".parse().unwrap()),
            ..Default::default()
        };
        assert!(build_base_client(&config).is_ok());
    }

    #[tokio::test]
    async fn test_retries_rate_limited_requests() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", "/").with_status(429).expect(3).create_async().await;

        let base = build_base_client(&BaseHttpClientConfig::default()).unwrap();
        let client = create_retryable_http_client(&fast_retry(2), base);

        let response = client.post(server.url()).body("{}").send().await.unwrap();

        assert_eq!(response.status(), 429);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_does_not_retry_client_errors() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", "/").with_status(400).expect(1).create_async().await;

        let base = build_base_client(&BaseHttpClientConfig::default()).unwrap();
        let client = create_retryable_http_client(&fast_retry(3), base);

        let response = client.post(server.url()).body("{}").send().await.unwrap();

        assert_eq!(response.status(), 400);
        mock.assert_async().await;
    }
}
