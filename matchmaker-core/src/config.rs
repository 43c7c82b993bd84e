use serde::{Deserialize, Serialize};

/// Immutable tuning parameters consumed by the queue store and the match
/// builder (§4.A). Missing keys in a loaded file fall back to these
/// defaults; unknown keys are ignored by `serde_json` deserialization into
/// this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Period between match-formation sweeps, in milliseconds.
    pub tick_interval_ms: u64,
    /// Initial upper bound on a candidate's region-specific latency.
    pub max_ping_ms: i32,
    /// Additional allowed latency per second of seed wait beyond
    /// `min_wait_before_match_ms`.
    pub ping_relax_per_second: i32,
    /// Hard upper bound on the relaxed latency.
    pub max_ping_ms_cap: i32,
    /// Seed wait threshold below which no relaxation accrues, in ms.
    pub min_wait_before_match_ms: i64,
    /// Initial +/- skill window around the seed.
    pub base_mmr_window: i32,
    /// Skill-window growth per second past the threshold.
    pub mmr_relax_per_second: i32,
    /// Hard upper bound on the skill window.
    pub max_mmr_window: i32,
    /// Initial allowed spread between the lowest and highest skill in the
    /// chosen ten.
    pub max_allowed_mmr_diff: i32,
    /// Growth of the allowed spread with seed wait.
    pub mmr_diff_relax_per_second: i32,
    /// Hard upper bound on the allowed spread.
    pub max_relaxed_mmr_diff: i32,
    /// Cross-region entry is free when latency to the target region is
    /// strictly below this.
    pub good_region_ping_ms: i32,
    /// Per-rank wait required to cross into a worse region otherwise.
    pub cross_region_step_ms: i64,
    /// Path passed to the journal collaborator.
    pub matches_path: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            max_ping_ms: 80,
            ping_relax_per_second: 5,
            max_ping_ms_cap: 150,
            min_wait_before_match_ms: 5_000,
            base_mmr_window: 50,
            mmr_relax_per_second: 10,
            max_mmr_window: 300,
            max_allowed_mmr_diff: 100,
            mmr_diff_relax_per_second: 10,
            max_relaxed_mmr_diff: 400,
            good_region_ping_ms: 60,
            cross_region_step_ms: 10_000,
            matches_path: "matches.jsonl".to_string(),
        }
    }
}
