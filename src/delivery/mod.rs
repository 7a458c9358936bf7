//! Delivery of rendered messages to chat webhooks.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::template::MessageChunk;

/// Query parameter carrying the thread key.
pub const THREAD_KEY_PARAM: &str = "threadKey";

/// Query parameter selecting the reply behaviour.
pub const REPLY_OPTION_PARAM: &str = "messageReplyOption";

/// Reply into the keyed thread, or start it if it does not exist yet.
pub const REPLY_FALLBACK_TO_NEW_THREAD: &str = "REPLY_MESSAGE_FALLBACK_TO_NEW_THREAD";

const MAX_ERROR_BODY_LEN: usize = 512;

/// Errors raised while delivering a message.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The request could not be completed, retries included.
    #[error("Webhook request failed: {0}")]
    Request(#[from] reqwest_middleware::Error),

    /// The endpoint answered with something other than 200 OK.
    #[error("Webhook responded with status {status}: {body}")]
    UnexpectedStatus {
        /// The final response status.
        status: StatusCode,
        /// The start of the response body.
        body: String,
    },
}

/// The JSON body of a chat message.
#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    /// The message text.
    pub text: &'a str,
}

/// Posts messages to one chat webhook endpoint.
#[derive(Debug, Clone)]
pub struct ChatWebhookClient {
    endpoint: Url,
    client: Arc<ClientWithMiddleware>,
    threaded_replies: bool,
    dry_run: bool,
}

impl ChatWebhookClient {
    /// Creates a client for `endpoint`.
    pub fn new(
        endpoint: Url,
        client: Arc<ClientWithMiddleware>,
        threaded_replies: bool,
        dry_run: bool,
    ) -> Self {
        Self { endpoint, client, threaded_replies, dry_run }
    }

    /// Returns whether deliveries are only logged.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Builds the URL for one delivery. The thread parameters are only added
    /// when threaded replies are enabled and a key is given.
    pub fn request_url(&self, thread_key: Option<&str>) -> Url {
        let mut url = self.endpoint.clone();
        if let (true, Some(key)) = (self.threaded_replies, thread_key) {
            url.query_pairs_mut()
                .append_pair(THREAD_KEY_PARAM, key)
                .append_pair(REPLY_OPTION_PARAM, REPLY_FALLBACK_TO_NEW_THREAD);
        }
        url
    }

    /// Delivers one chunk. Transient failures are retried by the underlying
    /// client; the final outcome must be 200 OK.
    pub async fn send(&self, chunk: &MessageChunk, thread_key: Option<&str>) -> Result<(), DeliveryError> {
        let url = self.request_url(thread_key);

        if self.dry_run {
            tracing::info!(
                host = url.host_str().unwrap_or_default(),
                thread_key,
                bytes = chunk.len(),
                "Dry run enabled, skipping delivery."
            );
            return Ok(());
        }

        tracing::debug!(
            host = url.host_str().unwrap_or_default(),
            thread_key,
            bytes = chunk.len(),
            "Sending message."
        );

        let response = self.client.post(url).json(&ChatMessage { text: &chunk.text }).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            let mut body = response.text().await.unwrap_or_default();
            truncate_on_char_boundary(&mut body, MAX_ERROR_BODY_LEN);
            return Err(DeliveryError::UnexpectedStatus { status, body });
        }

        Ok(())
    }
}

fn truncate_on_char_boundary(s: &mut String, max: usize) {
    if s.len() > max {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s.truncate(end);
    }
}
