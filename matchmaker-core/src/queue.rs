//! The queue store (§4.B): a guarded mapping from player identity to a
//! queued entry, serialising all operations on one exclusive lock.

use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;
use tokio::sync::Mutex;

use crate::builder;
use crate::config::EngineConfig;
use crate::delivery::DeliveryBuffer;
use crate::error::EngineError;
use crate::journal::Journal;
use crate::metrics;
use crate::types::{Match, PlayerProfile, QueueEntry, QueueSnapshotEntry, Region};

#[derive(Debug, Default)]
pub struct QueueStore {
    inner: Mutex<IndexMap<String, QueueEntry>>,
}

impl QueueStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(IndexMap::new()),
        }
    }

    /// Insert a new entry with `queued_at = now`. Fails with
    /// `AlreadyQueued` if an entry with the same identity exists, and
    /// `InvalidPlayer` if the identity is empty.
    pub async fn enqueue(&self, profile: PlayerProfile, now: Instant) -> Result<(), EngineError> {
        if profile.id.is_empty() {
            return Err(EngineError::InvalidPlayer {
                reason: "player id must not be empty".to_string(),
            });
        }

        let mut guard = self.inner.lock().await;
        if guard.contains_key(&profile.id) {
            return Err(EngineError::AlreadyQueued { id: profile.id });
        }
        guard.insert(
            profile.id.clone(),
            QueueEntry {
                profile,
                queued_at: now,
            },
        );
        Ok(())
    }

    /// Remove the entry whose identity matches. Returns whether removal
    /// occurred; absence is not an error.
    pub async fn cancel(&self, id: &str) -> bool {
        let mut guard = self.inner.lock().await;
        guard.shift_remove(id).is_some()
    }

    /// An observable copy of all entries with their wait durations, for
    /// metrics/telemetry only (§4.B).
    pub async fn snapshot(&self, now: Instant) -> Vec<QueueSnapshotEntry> {
        let guard = self.inner.lock().await;
        guard
            .values()
            .map(|entry| QueueSnapshotEntry {
                id: entry.profile.id.clone(),
                region: entry.profile.region,
                mmr: entry.profile.mmr,
                ping_na: entry.profile.ping_na,
                ping_eu: entry.profile.ping_eu,
                ping_asia: entry.profile.ping_asia,
                wait_seconds: entry.wait_ms(now) as f64 / 1000.0,
            })
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Attempt to form and commit one match for `region`. The queue lock is
    /// held across the builder's evaluation, the removal of its chosen
    /// entries, the outbox push, the journal append, and the metrics
    /// update — §4.D's four commit steps are one atomic critical section,
    /// not just the removal. `tokio::sync::Mutex`'s guard may be held
    /// across the `.await` points below, so `delivery` and `journal` are
    /// driven to completion before any other task can observe a partial
    /// commit (e.g. entries removed but not yet delivered).
    pub async fn try_form_match(
        &self,
        config: &EngineConfig,
        region: Region,
        now: Instant,
        delivery: &DeliveryBuffer,
        journal: &Journal,
    ) -> Option<Arc<Match>> {
        let mut guard = self.inner.lock().await;
        let snapshot: Vec<QueueEntry> = guard.values().cloned().collect();

        let built = builder::build_match(&snapshot, config, region, now)?;
        for id in &built.removed_ids {
            guard.shift_remove(id);
        }

        let match_ = Arc::new(built.match_);
        for player in &match_.players {
            delivery.push(&player.id, Arc::clone(&match_)).await;
        }
        journal.append_best_effort(&match_).await;
        metrics::record_match(region, &match_.metrics);

        Some(match_)
    }
}
