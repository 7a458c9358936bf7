//! Periodic removal of expired thread entries.

use std::{sync::Arc, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use super::CorrelationStore;
use crate::metrics::Metrics;

/// A background task that prunes a [`CorrelationStore`] at a fixed interval
/// until its cancellation token fires.
pub struct ExpirySweeper {
    store: Arc<CorrelationStore>,
    metrics: Arc<Metrics>,
    provider: String,
    room: String,
    interval: Duration,
    ttl: Duration,
    cancellation_token: CancellationToken,
}

impl ExpirySweeper {
    /// Creates a sweeper for the store of `provider`/`room`.
    pub fn new(
        store: Arc<CorrelationStore>,
        metrics: Arc<Metrics>,
        provider: &str,
        room: &str,
        interval: Duration,
        ttl: Duration,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            store,
            metrics,
            provider: provider.to_string(),
            room: room.to_string(),
            interval,
            ttl,
            cancellation_token,
        }
    }

    /// Spawns the sweep loop onto the current runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Runs the sweep loop. The first sweep happens one interval after start.
    pub async fn run(self) {
        // A zero period would make `interval_at` panic.
        let period = self.interval.max(Duration::from_millis(1));
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = self.cancellation_token.cancelled() => {
                    tracing::debug!(room = %self.room, "Expiry sweeper received cancellation signal.");
                    break;
                }

                _ = ticker.tick() => {
                    self.sweep().await;
                }
            }
        }

        tracing::debug!(room = %self.room, "Expiry sweeper has shut down.");
    }

    /// Performs a single prune cycle.
    pub async fn sweep(&self) -> usize {
        let started = Instant::now();
        tracing::debug!(room = %self.room, ttl = ?self.ttl, "Pruning thread entries based on TTL.");

        let removed = self.store.prune(self.ttl).await;
        let remaining = self.store.len().await;

        self.metrics.observe_prune_duration(&self.provider, &self.room, started.elapsed());
        self.metrics.set_active_threads(&self.provider, &self.room, remaining);

        if removed > 0 {
            tracing::debug!(room = %self.room, removed, remaining, "Pruned expired thread entries.");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};

    use super::*;

    fn sweeper(
        store: Arc<CorrelationStore>,
        interval: Duration,
        token: CancellationToken,
    ) -> ExpirySweeper {
        ExpirySweeper::new(
            store,
            Arc::new(Metrics::new().unwrap()),
            "google_chat",
            "ops",
            interval,
            Duration::from_secs(60 * 60),
            token,
        )
    }

    #[tokio::test]
    async fn test_sweep_prunes_expired_entries() {
        let store = Arc::new(CorrelationStore::new());
        store.get_or_create("old", Utc::now() - TimeDelta::hours(2)).await;
        store.get_or_create("new", Utc::now()).await;

        let sweeper = sweeper(store.clone(), Duration::from_secs(3600), CancellationToken::new());

        assert_eq!(sweeper.sweep().await, 1);
        assert_eq!(store.len().await, 1);
        assert_eq!(sweeper.metrics.active_threads("google_chat", "ops"), 1);
    }

    #[tokio::test]
    async fn test_run_sweeps_on_interval() {
        let store = Arc::new(CorrelationStore::new());
        store.get_or_create("old", Utc::now() - TimeDelta::hours(2)).await;

        let token = CancellationToken::new();
        let handle = sweeper(store.clone(), Duration::from_millis(20), token.clone()).spawn();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(store.is_empty().await);

        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_run_stops_on_cancellation() {
        let store = Arc::new(CorrelationStore::new());
        let token = CancellationToken::new();
        let handle = sweeper(store, Duration::from_secs(3600), token.clone()).spawn();

        token.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper should stop promptly")
            .unwrap();
    }
}
