use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors the engine can report to a caller (§7). None of these are fatal:
/// the process keeps running in every case.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("player {id} is already queued")]
    AlreadyQueued { id: String },
    #[error("invalid player: {reason}")]
    InvalidPlayer { reason: String },
    #[error("journal append failed: {0}")]
    JournalWrite(#[source] BoxError),
    #[error("configuration load failed: {0}")]
    ConfigLoad(#[source] BoxError),
}
