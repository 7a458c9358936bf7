//! Fingerprint to chat-thread correlation.
//!
//! Alertmanager has no unique ID per alert occurrence; the fingerprint is a
//! hash of the labels and stays the same for every future alert with those
//! labels. To keep the updates of one occurrence in one chat thread, and to
//! start a fresh thread for a later, unrelated occurrence, every fingerprint is
//! mapped to a random token that lives for a bounded TTL. Expired entries are
//! removed by the [`ExpirySweeper`].

mod sweeper;

use std::{collections::HashMap, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

pub use sweeper::ExpirySweeper;

/// The correlation data kept for one fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadEntry {
    /// The token used as the chat thread key.
    pub token: Uuid,
    /// When the entry's alert started; the TTL is measured from here.
    pub created_at: DateTime<Utc>,
}

/// Maps alert fingerprints to chat-thread tokens.
///
/// All access goes through a single read-write lock: lookups share it, while
/// creation, removal and pruning hold it exclusively.
#[derive(Debug, Default)]
pub struct CorrelationStore {
    entries: RwLock<HashMap<String, ThreadEntry>>,
}

impl CorrelationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the token for `fingerprint`, creating an entry stamped with
    /// `started_at` if none is live.
    ///
    /// The existence check and the insert happen under one exclusive lock
    /// acquisition, so concurrent callers with a never-seen fingerprint all
    /// observe the same token.
    pub async fn get_or_create(&self, fingerprint: &str, started_at: DateTime<Utc>) -> String {
        // Fast path: most alerts are updates of an already threaded fingerprint.
        if let Some(entry) = self.entries.read().await.get(fingerprint) {
            return entry.token.to_string();
        }

        let mut entries = self.entries.write().await;
        let entry = entries.entry(fingerprint.to_string()).or_insert_with(|| {
            tracing::debug!(fingerprint, created_at = %started_at, "Creating thread entry.");
            ThreadEntry { token: Uuid::new_v4(), created_at: started_at }
        });
        entry.token.to_string()
    }

    /// Returns the token for `fingerprint` without creating one.
    pub async fn lookup(&self, fingerprint: &str) -> Option<String> {
        self.entries.read().await.get(fingerprint).map(|e| e.token.to_string())
    }

    /// Returns the full entry for `fingerprint`.
    #[cfg(test)]
    pub async fn entry(&self, fingerprint: &str) -> Option<ThreadEntry> {
        self.entries.read().await.get(fingerprint).copied()
    }

    /// Forgets `fingerprint`. Returns whether an entry was removed.
    pub async fn remove(&self, fingerprint: &str) -> bool {
        self.entries.write().await.remove(fingerprint).is_some()
    }

    /// Removes every entry created more than `ttl` ago and returns how many
    /// were removed.
    pub async fn prune(&self, ttl: Duration) -> usize {
        let now = Utc::now();
        let cutoff = TimeDelta::from_std(ttl).ok().and_then(|ttl| now.checked_sub_signed(ttl));

        match cutoff {
            Some(cutoff) => self.prune_before(cutoff).await,
            // A TTL reaching before the representable range expires nothing.
            None => 0,
        }
    }

    /// Removes every entry created strictly before `cutoff`.
    pub async fn prune_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|fingerprint, entry| {
            let keep = entry.created_at >= cutoff;
            if !keep {
                tracing::debug!(
                    fingerprint = %fingerprint,
                    created_at = %entry.created_at,
                    cutoff = %cutoff,
                    "Removing expired thread entry."
                );
            }
            keep
        });
        before - entries.len()
    }

    /// Returns the number of live entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns whether the store has no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
