//! The delivery buffer (§4.E): a per-player pending-match outbox drained
//! by the external stream interface. Destructive drain — a client that
//! disconnects mid-stream before reading loses queued matches (Design
//! Notes §9); the journal remains the durable record.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::types::Match;

#[derive(Debug, Default)]
pub struct DeliveryBuffer {
    inner: Mutex<HashMap<String, Vec<Arc<Match>>>>,
}

impl DeliveryBuffer {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub async fn push(&self, player_id: &str, match_: Arc<Match>) {
        let mut guard = self.inner.lock().await;
        guard.entry(player_id.to_string()).or_default().push(match_);
    }

    /// Atomically return-and-clear the pending list for `player_id`; empty
    /// if absent.
    pub async fn drain(&self, player_id: &str) -> Vec<Arc<Match>> {
        let mut guard = self.inner.lock().await;
        guard.remove(player_id).unwrap_or_default()
    }
}
