use std::sync::Arc;

use alert_relay::test_helpers::RecordingProvider;

use crate::helpers::*;

#[tokio::test]
async fn test_index_returns_welcome_envelope() {
    let server = TestServer::new(vec![Arc::new(RecordingProvider::new("ops"))]).await;

    let resp = server.get("/").await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"], "welcome to alert-relay!");
    assert!(body.get("message").is_none());
    assert_eq!(server.metrics.http_requests("index"), 1);

    server.shutdown().await;
}

#[tokio::test]
async fn test_ping_returns_pong() {
    let server = TestServer::new(vec![Arc::new(RecordingProvider::new("ops"))]).await;

    let resp = server.get("/ping").await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["data"], "pong");
    assert_eq!(server.metrics.http_requests("ping"), 1);

    server.shutdown().await;
}

#[tokio::test]
async fn test_metrics_exposes_prometheus_text() {
    let server = TestServer::new(vec![Arc::new(RecordingProvider::new("ops"))]).await;
    server.get("/ping").await;

    let resp = server.get("/metrics").await;

    assert_eq!(resp.status(), 200);
    let text = resp.text().await.unwrap();
    assert!(text.contains(r#"alert_relay_http_requests_total{handler="ping"} 1"#));
    assert!(text.contains("alert_relay_start_timestamp_seconds"));

    server.shutdown().await;
}
