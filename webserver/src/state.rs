//! Server-wide configuration and runtime state

use std::time::Instant;

use crate::core::policy::{AcceptPolicy, DedupPolicy};

/// Immutable per-process state shared by every handler.
///
/// Deliberately holds no attendance data: the attendance store is the sole
/// source of truth for duplicate detection, never an in-process cache.
pub struct ServerState {
    started_at: Instant,
    /// Recognition gate applied before any attendance decision
    pub accept: Box<dyn AcceptPolicy>,
    /// Duplicate-detection granularity
    pub dedup: DedupPolicy,
}

impl ServerState {
    pub fn new(accept: Box<dyn AcceptPolicy>, dedup: DedupPolicy) -> Self {
        Self {
            started_at: Instant::now(),
            accept,
            dedup,
        }
    }

    /// Seconds since the server started
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
