use std::{net::SocketAddr, sync::Arc, time::Duration};

use alert_relay::{
    http_server::{self, ApiState},
    metrics::Metrics,
    providers::Provider,
    router::Router,
};
use reqwest::Client;
use tokio::{net::TcpListener, task};
use tokio_util::sync::CancellationToken;

pub struct TestServer {
    pub address: SocketAddr,
    pub metrics: Arc<Metrics>,
    pub client: Client,
    cancellation_token: CancellationToken,
    server_handle: task::JoinHandle<()>,
}

impl TestServer {
    pub async fn new(providers: Vec<Arc<dyn Provider>>) -> Self {
        Self::with_request_timeout(providers, Duration::from_secs(5)).await
    }

    pub async fn with_request_timeout(
        providers: Vec<Arc<dyn Provider>>,
        request_timeout: Duration,
    ) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
        let address = listener.local_addr().expect("Failed to get address");

        let metrics = Arc::new(Metrics::new().unwrap());
        let state = ApiState { router: Arc::new(Router::new(providers)), metrics: metrics.clone() };
        let cancellation_token = CancellationToken::new();

        let token = cancellation_token.clone();
        let server_handle = task::spawn(async move {
            http_server::run_server(listener, state, request_timeout, token).await.expect("Server failed");
        });

        Self { address, metrics, client: Client::new(), cancellation_token, server_handle }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.address, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.expect("Failed to send request")
    }

    pub async fn post_body(&self, path: &str, body: &str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.client.post(self.url(path)).json(body).send().await.expect("Failed to send request")
    }

    pub async fn shutdown(self) {
        self.cancellation_token.cancel();
        tokio::time::timeout(Duration::from_secs(5), self.server_handle)
            .await
            .expect("Server did not shut down")
            .expect("Server task panicked");
    }
}

/// Polls `condition` until it holds or a second has passed.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
