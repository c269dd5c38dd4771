//! Append-only JSONL attendance store
//!
//! Each record is one JSON line carrying its dedup key. A single mutex
//! serializes `append_if_absent`, which is what makes the conditional
//! append atomic: the key index is checked and the line written without
//! another appender interleaving.

use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{ServerError, ServerResult};
use crate::traits::{AppendOutcome, AttendanceQuery, AttendanceStore};
use shared::AttendanceRecord;

/// One stored line: the dedup key plus the record fields
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRecord {
    key: String,
    #[serde(flatten)]
    record: AttendanceRecord,
}

/// Attendance log persisted as a JSONL document file
pub struct JsonAttendanceStore {
    path: PathBuf,
    /// Keys already present in the log; `None` until first loaded
    index: Mutex<Option<HashSet<String>>>,
}

impl JsonAttendanceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            index: Mutex::new(None),
        }
    }

    async fn read_lines(&self) -> ServerResult<Vec<StoredRecord>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ServerError::AttendanceRead {
                    message: format!("{}: {e}", self.path.display()),
                })
            }
        };

        let mut records = Vec::new();
        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            let stored: StoredRecord =
                serde_json::from_str(line).map_err(|e| ServerError::AttendanceRead {
                    message: format!("corrupt record line: {e}"),
                })?;
            records.push(stored);
        }
        Ok(records)
    }

    /// Load the key index from disk on first use
    async fn ensure_index(
        &self,
        slot: &mut Option<HashSet<String>>,
    ) -> ServerResult<()> {
        if slot.is_none() {
            let keys = self
                .read_lines()
                .await?
                .into_iter()
                .map(|stored| stored.key)
                .collect();
            *slot = Some(keys);
        }
        Ok(())
    }
}

#[async_trait]
impl AttendanceStore for JsonAttendanceStore {
    async fn append_if_absent(
        &self,
        key: &str,
        record: AttendanceRecord,
    ) -> ServerResult<AppendOutcome> {
        let mut guard = self.index.lock().await;
        self.ensure_index(&mut guard).await?;
        let keys = guard.as_mut().ok_or_else(|| ServerError::AttendanceWrite {
            message: "attendance index unavailable".to_string(),
        })?;

        if keys.contains(key) {
            return Ok(AppendOutcome::Duplicate);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ServerError::AttendanceWrite {
                    message: format!("{}: {e}", parent.display()),
                })?;
        }

        let stored = StoredRecord {
            key: key.to_string(),
            record,
        };
        let mut line = serde_json::to_string(&stored).map_err(|e| ServerError::AttendanceWrite {
            message: format!("serialize record: {e}"),
        })?;
        line.push('\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| ServerError::AttendanceWrite {
                message: format!("{}: {e}", self.path.display()),
            })?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| ServerError::AttendanceWrite {
                message: format!("{}: {e}", self.path.display()),
            })?;

        keys.insert(key.to_string());
        Ok(AppendOutcome::Inserted)
    }

    async fn find(&self, query: AttendanceQuery) -> ServerResult<Vec<AttendanceRecord>> {
        // Hold the lock so a concurrent append cannot be half-read
        let _guard = self.index.lock().await;
        let records = self
            .read_lines()
            .await?
            .into_iter()
            .map(|stored| stored.record)
            .collect();
        Ok(filter_records(records, &query))
    }
}

/// Apply the query filters (uid, module, time range; `to` exclusive)
pub(crate) fn filter_records(
    records: Vec<AttendanceRecord>,
    query: &AttendanceQuery,
) -> Vec<AttendanceRecord> {
    records
        .into_iter()
        .filter(|r| query.uid.as_deref().map(|uid| uid == r.uid).unwrap_or(true))
        .filter(|r| query.module.as_deref().map(|m| m == r.module).unwrap_or(true))
        .filter(|r| query.from.map(|from| r.time_recorded >= from).unwrap_or(true))
        .filter(|r| query.to.map(|to| r.time_recorded < to).unwrap_or(true))
        .collect()
}
