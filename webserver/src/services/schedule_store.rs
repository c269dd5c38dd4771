//! JSON document file backed schedule store
//!
//! Schedules are owned by the external scheduling subsystem, which writes
//! the document file; we re-read it on every fetch rather than caching so
//! schedule edits take effect immediately.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::error::{ServerError, ServerResult};
use crate::traits::ScheduleStore;
use shared::Schedule;

/// Schedule collection stored as one JSON array document
pub struct JsonScheduleStore {
    path: PathBuf,
}

impl JsonScheduleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ScheduleStore for JsonScheduleStore {
    async fn fetch_all(&self) -> ServerResult<Vec<Schedule>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "schedule document missing; treating as empty");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(ServerError::ScheduleRead {
                    message: format!("{}: {e}", self.path.display()),
                })
            }
        };

        serde_json::from_slice(&bytes).map_err(|e| ServerError::ScheduleRead {
            message: format!("{}: {e}", self.path.display()),
        })
    }
}
