//! Core match-formation engine for the multi-region player matchmaker:
//! queue store, match builder, tick scheduler, delivery buffer, journal,
//! and engine metrics. Transport, CLI, and configuration-file parsing live
//! in the `matchmaker-server` crate.

pub mod builder;
pub mod config;
pub mod delivery;
pub mod engine;
pub mod error;
pub mod journal;
pub mod metrics;
pub mod queue;
pub mod shutdown;
pub mod types;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{BoxError, EngineError};
pub use types::{Match, MatchId, MatchMetrics, PlayerProfile, QueueSnapshotEntry, Region};
