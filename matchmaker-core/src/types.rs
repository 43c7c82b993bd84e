use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One of the three matchmaking regions. Doubles as a player's home region
/// and as a tick's target region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "NA")]
    Na,
    #[serde(rename = "EU")]
    Eu,
    #[serde(rename = "ASIA")]
    Asia,
}

impl Region {
    /// Fixed iteration order used by the tick scheduler (§4.D).
    pub const TICK_ORDER: [Region; 3] = [Region::Na, Region::Eu, Region::Asia];
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Region::Na => "NA",
            Region::Eu => "EU",
            Region::Asia => "ASIA",
        };
        f.write_str(s)
    }
}

/// Player profile as received on enqueue. Immutable once queued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: String,
    pub mmr: i32,
    pub region: Region,
    pub ping_na: i32,
    pub ping_eu: i32,
    pub ping_asia: i32,
    /// Fallback latency used when the region-specific field above is zero.
    /// Zero here too means the player is unreachable via the fallback.
    #[serde(default)]
    pub ping_fallback_ms: i32,
}

impl PlayerProfile {
    /// The region-specific field if positive, else the legacy fallback.
    pub fn effective_latency(&self, region: Region) -> i32 {
        let specific = match region {
            Region::Na => self.ping_na,
            Region::Eu => self.ping_eu,
            Region::Asia => self.ping_asia,
        };
        if specific > 0 {
            specific
        } else {
            self.ping_fallback_ms
        }
    }
}

/// A queued player plus its arrival timestamp. Ordering within the queue
/// store is insertion order (§3).
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub profile: PlayerProfile,
    pub queued_at: Instant,
}

impl QueueEntry {
    /// Elapsed wait in milliseconds, clamped to zero for clock skew (§4.C).
    pub fn wait_ms(&self, now: Instant) -> i64 {
        now.checked_duration_since(self.queued_at)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
            .max(0)
    }
}

/// A fresh, process-unique match identifier (Design Notes §9).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchId(pub String);

impl MatchId {
    pub fn new() -> Self {
        Self(format!("match-{}", Uuid::new_v4()))
    }
}

impl Default for MatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An immutable, fully-formed match: ten players, first five team A, next
/// five team B (§3).
#[derive(Debug, Clone, Serialize)]
pub struct Match {
    pub id: MatchId,
    pub region: Region,
    pub players: Vec<PlayerProfile>,
    pub metrics: MatchMetrics,
}

impl Match {
    pub fn team_a(&self) -> &[PlayerProfile] {
        &self.players[..5]
    }

    pub fn team_b(&self) -> &[PlayerProfile] {
        &self.players[5..]
    }
}

/// Per-match observability summary (§3).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MatchMetrics {
    pub avg_skill: f64,
    pub min_skill: i32,
    pub max_skill: i32,
    pub avg_wait_ms: f64,
}

/// A single row of the `GetQueue` snapshot (§6).
#[derive(Debug, Clone, Serialize)]
pub struct QueueSnapshotEntry {
    pub id: String,
    pub region: Region,
    pub mmr: i32,
    pub ping_na: i32,
    pub ping_eu: i32,
    pub ping_asia: i32,
    pub wait_seconds: f64,
}
