use std::{
    collections::{HashMap, VecDeque},
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    Router,
    extract::{Query, State},
    http::{StatusCode, Uri},
};
use tokio::{net::TcpListener, task::JoinHandle};

/// A request received by a [`ScriptedServer`].
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// The request path.
    pub path: String,
    /// The decoded query parameters.
    pub query: HashMap<String, String>,
    /// The raw request body.
    pub body: String,
}

#[derive(Default)]
struct Script {
    statuses: Mutex<VecDeque<u16>>,
    requests: Mutex<Vec<CapturedRequest>>,
}

/// A local HTTP server answering with a scripted sequence of statuses and
/// recording every request. Once the script is exhausted it answers 200.
pub struct ScriptedServer {
    addr: SocketAddr,
    script: Arc<Script>,
    handle: JoinHandle<()>,
}

impl ScriptedServer {
    /// Starts a server that answers 200 to everything.
    pub async fn ok() -> Self {
        Self::start(Vec::new()).await
    }

    /// Starts a server answering the given statuses in order.
    pub async fn start(statuses: Vec<u16>) -> Self {
        let script =
            Arc::new(Script { statuses: Mutex::new(statuses.into()), ..Default::default() });
        let app = Router::new().fallback(handle).with_state(Arc::clone(&script));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, script, handle }
    }

    /// Returns the base URL of the server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Returns every request received so far.
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.script.requests.lock().unwrap().clone()
    }

    /// Returns the number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.script.requests.lock().unwrap().len()
    }
}

impl Drop for ScriptedServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle(
    State(script): State<Arc<Script>>,
    Query(query): Query<HashMap<String, String>>,
    uri: Uri,
    body: String,
) -> StatusCode {
    script.requests.lock().unwrap().push(CapturedRequest {
        path: uri.path().to_string(),
        query,
        body,
    });

    let status = script.statuses.lock().unwrap().pop_front().unwrap_or(200);
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
