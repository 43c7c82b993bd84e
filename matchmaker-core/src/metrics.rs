//! Engine metrics (§3, §9): process-wide counters produced by
//! copy-snapshot under the queue lock, never by exposing raw references.
//! Grounded on the teacher's `common_net::metrics` Prometheus registration
//! pattern.

use once_cell::sync::Lazy;
use prometheus::{
    register_gauge_vec, register_int_counter_vec, register_int_gauge_vec, Encoder, GaugeVec,
    IntCounterVec, IntGaugeVec, TextEncoder,
};

use crate::types::{MatchMetrics, Region};

struct Registered {
    queue_size: IntGaugeVec,
    matches_total: IntCounterVec,
    last_match_avg_skill: GaugeVec,
    last_match_skill_spread: GaugeVec,
    last_match_avg_wait_seconds: GaugeVec,
}

static METRICS: Lazy<Registered> = Lazy::new(|| Registered {
    queue_size: register_int_gauge_vec!(
        "matchmaker_queue_size",
        "Number of players currently queued, labelled by region",
        &["region"]
    )
    .expect("register matchmaker_queue_size"),
    matches_total: register_int_counter_vec!(
        "matchmaker_matches_total",
        "Matches produced, labelled by region",
        &["region"]
    )
    .expect("register matchmaker_matches_total"),
    last_match_avg_skill: register_gauge_vec!(
        "matchmaker_last_match_avg_skill",
        "Average skill of the most recently formed match, by region",
        &["region"]
    )
    .expect("register matchmaker_last_match_avg_skill"),
    last_match_skill_spread: register_gauge_vec!(
        "matchmaker_last_match_skill_spread",
        "Skill spread of the most recently formed match, by region",
        &["region"]
    )
    .expect("register matchmaker_last_match_skill_spread"),
    last_match_avg_wait_seconds: register_gauge_vec!(
        "matchmaker_last_match_avg_wait_seconds",
        "Average wait, in seconds, of the most recently formed match, by region",
        &["region"]
    )
    .expect("register matchmaker_last_match_avg_wait_seconds"),
});

/// Record the current queue size for `region` (called after every
/// snapshot or removal).
pub fn set_queue_size(region: Region, size: i64) {
    METRICS.queue_size.with_label_values(&[&region.to_string()]).set(size);
}

/// Record one match formed in `region`, updating the running counter and
/// the last-match summary.
pub fn record_match(region: Region, metrics: &MatchMetrics) {
    let label = region.to_string();
    METRICS.matches_total.with_label_values(&[&label]).inc();
    METRICS.last_match_avg_skill.with_label_values(&[&label]).set(metrics.avg_skill);
    METRICS
        .last_match_skill_spread
        .with_label_values(&[&label])
        .set((metrics.max_skill - metrics.min_skill) as f64);
    METRICS
        .last_match_avg_wait_seconds
        .with_label_values(&[&label])
        .set(metrics.avg_wait_ms / 1000.0);
}

/// Render the process registry in Prometheus text exposition format, for
/// the `/metrics` HTTP route.
pub fn render() -> Result<String, prometheus::Error> {
    let families = prometheus::gather();
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&families, &mut buffer)?;
    Ok(String::from_utf8(buffer).expect("prometheus text encoder emits utf8"))
}
