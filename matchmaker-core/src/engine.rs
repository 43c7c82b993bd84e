//! Ties the queue store, delivery buffer, and journal together behind one
//! engine handle, and runs the tick scheduler (§4.D).

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::delivery::DeliveryBuffer;
use crate::error::EngineError;
use crate::journal::Journal;
use crate::metrics;
use crate::queue::QueueStore;
use crate::shutdown::ShutdownReceiver;
use crate::types::{Match, PlayerProfile, QueueSnapshotEntry, Region};

pub struct Engine {
    config: EngineConfig,
    queue: QueueStore,
    delivery: DeliveryBuffer,
    journal: Journal,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let journal = Journal::new(config.matches_path.clone());
        Self {
            config,
            queue: QueueStore::new(),
            delivery: DeliveryBuffer::new(),
            journal,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub async fn enqueue(&self, profile: PlayerProfile) -> Result<(), EngineError> {
        self.queue.enqueue(profile, Instant::now()).await
    }

    pub async fn cancel(&self, id: &str) -> bool {
        self.queue.cancel(id).await
    }

    pub async fn queue_snapshot(&self) -> Vec<QueueSnapshotEntry> {
        self.queue.snapshot(Instant::now()).await
    }

    /// Drain the player's outbox (`StreamMatches`'s per-poll read).
    pub async fn drain_matches(&self, player_id: &str) -> Vec<Arc<Match>> {
        self.delivery.drain(player_id).await
    }

    /// Run the tick scheduler until `shutdown_rx` fires. Sleeps for
    /// `tick_interval_ms`, then iterates regions in the fixed order
    /// {NA, EU, ASIA}, repeatedly draining matches from each until the
    /// builder fails (§4.D).
    pub async fn run_scheduler(self: Arc<Self>, mut shutdown_rx: ShutdownReceiver) {
        let mut interval = tokio::time::interval(Duration::from_millis(self.config.tick_interval_ms));
        // The first tick fires immediately; that's fine, matches `tokio::time::interval`'s
        // documented behaviour and costs nothing on an empty queue.
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.run_one_tick().await;
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("tick scheduler: shutdown signal received");
                        break;
                    }
                }
            }
        }
    }

    /// Attempt one match-formation pass for `region`: on success, the
    /// queue's removal, the outbox push, the journal append, and the
    /// metrics update all happen under one held queue lock (§4.D's four
    /// commit steps) before this returns. Exposed publicly so tests and
    /// callers that don't want to wait on the scheduler's timer can still
    /// drive match formation directly.
    pub async fn try_drain_one(&self, region: Region) -> Option<Arc<Match>> {
        let now = Instant::now();
        let match_ = self
            .queue
            .try_form_match(&self.config, region, now, &self.delivery, &self.journal)
            .await?;
        debug!(match_id = %match_.id, region = %region, "match formed");
        Some(match_)
    }

    async fn run_one_tick(&self) {
        for region in Region::TICK_ORDER {
            while self.try_drain_one(region).await.is_some() {}
        }

        // Queue-size-per-region metric counts players by home region, since
        // the queue store itself is not partitioned by region (§2 data flow).
        let snapshot = self.queue_snapshot().await;
        for region in Region::TICK_ORDER {
            let size = snapshot.iter().filter(|e| e.region == region).count() as i64;
            metrics::set_queue_size(region, size);
        }
    }
}
