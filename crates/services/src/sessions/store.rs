use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use storage::repository::KeyValueStore;
use trainer_core::model::{Report, Snapshot};

use super::quiz::QuizSession;

pub const RESUME_KEY: &str = "trainer:resume";
pub const SESSIONS_KEY: &str = "trainer:sessions";
pub const PRACTICE_COUNT_KEY: &str = "trainer:practiceCount";

/// Resumable snapshot and completed-session history on top of a key-value
/// store.
///
/// Every operation is best-effort. Storage failures and malformed blobs are
/// logged and turned into "nothing stored"; they never reach the caller.
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Overwrite the single resume slot with `session`.
    ///
    /// Does nothing unless `session` is an in-progress practice session.
    pub async fn save_snapshot(&self, session: &QuizSession, at: DateTime<Utc>) {
        let Some(snapshot) = session.snapshot(at) else {
            return;
        };
        let json = match serde_json::to_string(&snapshot) {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "failed to encode snapshot");
                return;
            }
        };
        if let Err(err) = self.kv.set(RESUME_KEY, &json).await {
            warn!(error = %err, "failed to save snapshot");
            return;
        }
        debug!(position = snapshot.position, "snapshot saved");
    }

    pub async fn clear_snapshot(&self) {
        match self.kv.remove(RESUME_KEY).await {
            Ok(()) => debug!("snapshot cleared"),
            Err(err) => warn!(error = %err, "failed to clear snapshot"),
        }
    }

    /// The stored snapshot, if there is a valid one.
    pub async fn load_snapshot(&self) -> Option<Snapshot> {
        let raw = self.read(RESUME_KEY).await?;
        decode_snapshot(&raw)
    }

    pub async fn has_snapshot(&self) -> bool {
        self.load_snapshot().await.is_some()
    }

    /// Append `report` to the history.
    ///
    /// Existing entries are kept as stored, including ones this version can
    /// no longer read. If the stored history is not a JSON array at all, the
    /// append is skipped rather than overwriting it.
    pub async fn append_report(&self, report: &Report) {
        let mut entries: Vec<serde_json::Value> = match self.read(SESSIONS_KEY).await {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(error = %err, "stored history is unreadable; report not saved");
                    return;
                }
            },
        };
        match serde_json::to_value(report) {
            Ok(value) => entries.push(value),
            Err(err) => {
                warn!(error = %err, "failed to encode report");
                return;
            }
        }
        self.write_json(SESSIONS_KEY, &entries).await;
    }

    /// Stored reports, newest first. Unreadable entries are skipped.
    pub async fn list_reports(&self) -> Vec<Report> {
        let Some(raw) = self.read(SESSIONS_KEY).await else {
            return Vec::new();
        };
        let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(error = %err, "stored history is unreadable");
                return Vec::new();
            }
        };
        entries
            .into_iter()
            .rev()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect()
    }

    /// Clear the history.
    pub async fn reset(&self) {
        if let Err(err) = self.kv.remove(SESSIONS_KEY).await {
            warn!(error = %err, "failed to reset history");
        }
    }

    pub async fn save_practice_count(&self, count: usize) {
        if let Err(err) = self.kv.set(PRACTICE_COUNT_KEY, &count.to_string()).await {
            warn!(error = %err, "failed to save practice count");
        }
    }

    pub async fn load_practice_count(&self) -> Option<usize> {
        self.read(PRACTICE_COUNT_KEY).await?.trim().parse().ok()
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.kv.get(key).await {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "storage read failed");
                None
            }
        }
    }

    async fn write_json<T: serde::Serialize + ?Sized>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(err) => {
                warn!(key, error = %err, "failed to encode value");
                return;
            }
        };
        if let Err(err) = self.kv.set(key, &json).await {
            warn!(key, error = %err, "storage write failed");
        }
    }
}

/// Parse and validate a stored snapshot; anything unusable is `None`.
fn decode_snapshot(raw: &str) -> Option<Snapshot> {
    let snapshot: Snapshot = match serde_json::from_str(raw) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            debug!(error = %err, "ignoring malformed snapshot");
            return None;
        }
    };
    match snapshot.validate() {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            debug!(error = %err, "ignoring invalid snapshot");
            None
        }
    }
}
