use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;

use crate::{
    models::Alert,
    providers::{Provider, ProviderError},
};

/// A provider that records every push instead of delivering it.
#[derive(Debug, Default)]
pub struct RecordingProvider {
    room: String,
    fail: bool,
    pushed: Mutex<Vec<Vec<Alert>>>,
    shut_down: AtomicBool,
}

impl RecordingProvider {
    /// Creates a provider for `room` whose pushes succeed.
    pub fn new(room: &str) -> Self {
        Self { room: room.to_string(), ..Default::default() }
    }

    /// Creates a provider for `room` whose pushes fail.
    pub fn failing(room: &str) -> Self {
        Self { room: room.to_string(), fail: true, ..Default::default() }
    }

    /// Returns every recorded push, oldest first.
    pub fn pushed(&self) -> Vec<Vec<Alert>> {
        self.pushed.lock().unwrap().clone()
    }

    /// Returns whether `shutdown` was called.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for RecordingProvider {
    fn id(&self) -> &str {
        "recording"
    }

    fn room(&self) -> &str {
        &self.room
    }

    async fn push(&self, alerts: &[Alert]) -> Result<(), ProviderError> {
        self.pushed.lock().unwrap().push(alerts.to_vec());
        if self.fail {
            return Err(ProviderError::Push("recording provider configured to fail".to_string()));
        }
        Ok(())
    }

    fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
    }
}
