use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::gcloud::Instance;
use crate::persist::write_atomic;

/// File name of the log inside the gssh directory.
pub const HISTORY_FILE: &str = "history.json";

/// Ranks below this get a `[n]` speed-dial prefix.
pub const SPEED_DIAL_SLOTS: usize = 10;

/// One past connection attempt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Connection {
    pub configuration: String,
    /// Captured by value; the instance may no longer exist.
    pub instance: Instance,
    pub timestamp: DateTime<Local>,

    /// Recency rank assigned by [`HistoryLog::list`]; never persisted.
    #[serde(skip)]
    pub index: usize,
}

impl Connection {
    pub fn new(configuration: impl Into<String>, instance: Instance) -> Self {
        Self {
            configuration: configuration.into(),
            instance,
            timestamp: Local::now(),
            index: 0,
        }
    }

    pub fn has_speed_dial(&self) -> bool {
        self.index < SPEED_DIAL_SLOTS
    }
}

/// Append-only connection log persisted as one JSON file.
///
/// Every operation re-reads the file first so that entries written by
/// other gssh processes are not lost; writes are best-effort.
pub struct HistoryLog {
    path: PathBuf,
    entries: Vec<Connection>,
}

impl HistoryLog {
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let mut log = Self {
            path: path.into(),
            entries: Vec::new(),
        };
        log.reload().await;
        log
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Record a connection with the current time.
    pub async fn append(&mut self, configuration: &str, instance: Instance) -> Connection {
        self.reload().await;
        let conn = Connection::new(configuration, instance);
        self.entries.push(conn.clone());
        self.save().await;
        conn
    }

    /// All entries, most recent first, each carrying its rank as `index`.
    pub async fn list(&mut self) -> Vec<Connection> {
        self.reload().await;
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        for (i, conn) in ranked.iter_mut().enumerate() {
            conn.index = i;
        }
        ranked
    }

    pub async fn clear(&mut self) {
        self.entries.clear();
        self.save().await;
    }

    /// Replace the in-memory mirror with the file; keeps it on read failure.
    async fn reload(&mut self) {
        let content = match fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
            Err(e) => {
                tracing::warn!("Failed to read history {}: {}", self.path.display(), e);
                return;
            }
        };

        match serde_json::from_str::<Vec<Connection>>(&content) {
            Ok(entries) => self.entries = entries,
            Err(e) => tracing::warn!("Ignoring malformed history {}: {}", self.path.display(), e),
        }
    }

    async fn save(&self) {
        let bytes = match serde_json::to_vec_pretty(&self.entries) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("Failed to serialize history: {}", e);
                return;
            }
        };

        if let Err(e) = write_atomic(&self.path, &bytes).await {
            tracing::warn!("Failed to write history {}: {}", self.path.display(), e);
        }
    }

    #[cfg(test)]
    async fn push_at(&mut self, configuration: &str, instance: Instance, at: DateTime<Local>) {
        let mut conn = Connection::new(configuration, instance);
        conn.timestamp = at;
        self.entries.push(conn);
        self.save().await;
    }
}
