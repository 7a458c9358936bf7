use std::{sync::Arc, time::Duration};

use alert_relay::test_helpers::RecordingProvider;
use serde_json::json;

use crate::helpers::*;

fn payload(receiver: &str) -> serde_json::Value {
    json!({
        "version": "4",
        "status": "firing",
        "receiver": receiver,
        "alerts": [
            {
                "status": "firing",
                "labels": {"alertname": "DiskFull", "severity": "high"},
                "annotations": {"summary": "disk at 95%"},
                "startsAt": "2024-03-01T10:00:00Z",
                "fingerprint": "abc123"
            },
            {
                "status": "resolved",
                "labels": {"alertname": "HighLoad"},
                "startsAt": "2024-03-01T09:00:00Z",
                "fingerprint": "def456"
            }
        ]
    })
}

#[tokio::test]
async fn test_dispatch_routes_by_receiver() {
    let ops = Arc::new(RecordingProvider::new("ops"));
    let server = TestServer::new(vec![ops.clone()]).await;

    let resp = server.post_json("/dispatch", &payload("ops")).await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"], "dispatched");

    assert!(eventually(|| !ops.pushed().is_empty()).await);
    let pushed = ops.pushed();
    assert_eq!(pushed.len(), 1);
    assert_eq!(pushed[0].len(), 2);
    assert_eq!(pushed[0][0].fingerprint, "abc123");
    assert_eq!(pushed[0][1].fingerprint, "def456");

    server.shutdown().await;
}

#[tokio::test]
async fn test_dispatch_room_name_overrides_receiver() {
    let ops = Arc::new(RecordingProvider::new("ops"));
    let db = Arc::new(RecordingProvider::new("db"));
    let server = TestServer::new(vec![ops.clone(), db.clone()]).await;

    let resp =
        server.post_json("/dispatch?room_name=db", &payload("monitoring/team-config/ops")).await;

    assert_eq!(resp.status(), 200);
    assert!(eventually(|| !db.pushed().is_empty()).await);
    assert!(ops.pushed().is_empty());

    server.shutdown().await;
}

#[tokio::test]
async fn test_dispatch_unknown_room_returns_not_found() {
    let server = TestServer::new(vec![
        Arc::new(RecordingProvider::new("ops")),
        Arc::new(RecordingProvider::new("db")),
    ])
    .await;

    let resp = server.post_json("/dispatch", &payload("monitoring/team-config/ops")).await;

    assert_eq!(resp.status(), 404);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("available: [db, ops]"));
    assert!(message.contains("room_name"));
    assert_eq!(server.metrics.http_errors("dispatch"), 1);

    server.shutdown().await;
}

#[tokio::test]
async fn test_dispatch_rejects_invalid_payload() {
    let ops = Arc::new(RecordingProvider::new("ops"));
    let server = TestServer::new(vec![ops.clone()]).await;

    let resp = server.post_body("/dispatch", "{not json").await;

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Error decoding payload.");
    assert_eq!(server.metrics.http_requests("dispatch"), 1);
    assert_eq!(server.metrics.http_errors("dispatch"), 1);
    assert!(ops.pushed().is_empty());

    server.shutdown().await;
}

#[tokio::test]
async fn test_dispatch_counts_background_failures() {
    let server = TestServer::new(vec![Arc::new(RecordingProvider::failing("ops"))]).await;

    let resp = server.post_json("/dispatch", &payload("ops")).await;

    assert_eq!(resp.status(), 200);
    let metrics = server.metrics.clone();
    assert!(eventually(|| metrics.http_errors("dispatch") == 1).await);

    server.shutdown().await;
}

#[tokio::test]
async fn test_dispatch_with_stalled_body_times_out() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let ops = Arc::new(RecordingProvider::new("ops"));
    let server =
        TestServer::with_request_timeout(vec![ops.clone()], Duration::from_millis(100)).await;

    // Announce a body that never fully arrives.
    let mut stream = tokio::net::TcpStream::connect(server.address).await.unwrap();
    stream
        .write_all(
            b"POST /dispatch HTTP/1.1\r\nhost: localhost\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n{",
        )
        .await
        .unwrap();

    let mut response = Vec::new();
    let read = tokio::time::timeout(Duration::from_secs(2), async {
        let mut buf = [0u8; 256];
        while !response.windows(2).any(|w| w == b"\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            response.extend_from_slice(&buf[..n]);
        }
    })
    .await;

    assert!(read.is_ok(), "server did not answer the stalled request");
    assert!(String::from_utf8_lossy(&response).starts_with("HTTP/1.1 408"));
    assert!(ops.pushed().is_empty());

    drop(stream);
    server.shutdown().await;
}
