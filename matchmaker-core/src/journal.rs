//! The journal (§4.F / §6): an append-only, newline-delimited JSON sink for
//! formed matches. One record per line:
//! `{"match_id": "...", "players": [{"id","mmr","ping","region"}, ...]}`.
//! The journal is advisory — append failures are logged and do not abort
//! the tick (§7).

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::EngineError;
use crate::types::Match;

#[derive(Serialize)]
struct JournalPlayer {
    id: String,
    mmr: i32,
    ping: i32,
    region: String,
}

#[derive(Serialize)]
struct JournalRecord {
    match_id: String,
    players: Vec<JournalPlayer>,
}

pub struct Journal {
    path: PathBuf,
    // Single-writer, per §5's shared-resource policy.
    write_lock: Mutex<()>,
}

impl Journal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record for `match_`. Never panics; failures are returned
    /// so the caller can decide whether to log, but by convention callers
    /// treat this as non-fatal.
    pub async fn append(&self, match_: &Match) -> Result<(), EngineError> {
        let record = JournalRecord {
            match_id: match_.id.0.clone(),
            players: match_
                .players
                .iter()
                .map(|p| JournalPlayer {
                    id: p.id.clone(),
                    mmr: p.mmr,
                    ping: p.effective_latency(match_.region),
                    region: p.region.to_string(),
                })
                .collect(),
        };
        let line = serde_json::to_string(&record).map_err(|e| EngineError::JournalWrite(Box::new(e)))?;

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| EngineError::JournalWrite(Box::new(e)))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| EngineError::JournalWrite(Box::new(e)))?;
        file.write_all(b"\n")
            .await
            .map_err(|e| EngineError::JournalWrite(Box::new(e)))?;
        Ok(())
    }

    /// Append and swallow the error, logging a warning (§7's "journal
    /// append failure: logged, tick continues").
    pub async fn append_best_effort(&self, match_: &Match) {
        if let Err(err) = self.append(match_).await {
            warn!(%err, match_id = %match_.id, "journal append failed, match still delivered in memory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MatchId, MatchMetrics, PlayerProfile, Region};

    fn player(id: &str) -> PlayerProfile {
        PlayerProfile {
            id: id.to_string(),
            mmr: 1000,
            region: Region::Na,
            ping_na: 40,
            ping_eu: 120,
            ping_asia: 200,
            ping_fallback_ms: 0,
        }
    }

    #[tokio::test]
    async fn appends_one_ndjson_line_per_match() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matches.jsonl");
        let journal = Journal::new(&path);

        let match_ = Match {
            id: MatchId("match-test".to_string()),
            region: Region::Na,
            players: (0..10).map(|i| player(&format!("p{i}"))).collect(),
            metrics: MatchMetrics {
                avg_skill: 1000.0,
                min_skill: 1000,
                max_skill: 1000,
                avg_wait_ms: 0.0,
            },
        };

        journal.append(&match_).await.unwrap();
        journal.append(&match_).await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["match_id"], "match-test");
        assert_eq!(parsed["players"].as_array().unwrap().len(), 10);
        assert_eq!(parsed["players"][0]["ping"], 40);
    }
}
