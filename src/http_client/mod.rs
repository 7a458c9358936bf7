//! Retryable HTTP clients and a pool sharing them between rooms.

mod client;
mod pool;

pub use client::{build_base_client, create_retryable_http_client};
pub use pool::{HttpClientPool, HttpClientPoolError};
