use std::{io::Write, time::Duration};

use alert_relay::{config::AppConfig, supervisor::Supervisor, test_helpers::RoomConfigBuilder};
use tokio::net::TcpListener;

#[tokio::test]
async fn test_supervisor_serves_until_cancelled() {
    let mut template = tempfile::NamedTempFile::new().unwrap();
    template.write_all(b"{{ labels.alertname }}").unwrap();

    let config = AppConfig {
        rooms: vec![
            RoomConfigBuilder::new("ops", "https://chat.example.com/a")
                .template(template.path())
                .build(),
        ],
        ..Default::default()
    };
    let supervisor = Supervisor::builder().config(config).build().await.unwrap();
    let token = supervisor.cancellation_token();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let handle = tokio::spawn(supervisor.serve(listener));

    let resp = reqwest::get(format!("http://{address}/ping")).await.unwrap();
    assert_eq!(resp.status(), 200);

    token.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("Supervisor did not shut down")
        .unwrap();
    assert!(result.is_ok());
}
