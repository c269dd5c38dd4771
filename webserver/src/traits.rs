//! Service trait definitions for dependency injection
//!
//! All I/O operations are abstracted through these traits for testability.
//! The face engine, schedule store and attendance store are external
//! collaborators; the decision engine only sees these narrow interfaces.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::ServerResult;
use shared::{AttendanceRecord, Detection, Schedule};

/// Opaque face detection/recognition engine.
///
/// The engine owns the trained model; this backend never inspects frames
/// beyond decoding the transport encoding.
#[mockall::automock]
#[async_trait]
pub trait FaceEngine: Send + Sync {
    /// Detect and recognize faces in one encoded camera frame.
    ///
    /// Returns one `Detection` per face found, including unrecognized faces
    /// flagged with the `Unknown` uid.
    async fn detect(&self, frame: &[u8]) -> ServerResult<Vec<Detection>>;

    /// Enroll a new identity from a set of captured frames and retrain.
    ///
    /// Returns the number of frames the engine accepted for training.
    async fn enroll(&self, uid: &str, name: &str, frames: &[Vec<u8>]) -> ServerResult<usize>;
}

/// Read-only access to the schedule collection.
#[mockall::automock]
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Fetch every schedule record (full scan; no indexed lookup assumed
    /// at this scale).
    async fn fetch_all(&self) -> ServerResult<Vec<Schedule>>;
}

/// Outcome of a conditional append against the attendance store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// No record existed for the key; the record was persisted
    Inserted,
    /// A record already holds the key; nothing was written
    Duplicate,
}

/// Filter for attendance record queries; `None` fields match everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendanceQuery {
    pub uid: Option<String>,
    pub module: Option<String>,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

/// Append-only attendance record store.
#[mockall::automock]
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Atomically persist `record` under `key` unless a record already
    /// exists for that key.
    ///
    /// This conditional write is the store's duplicate guard: two racing
    /// appends for one key must yield exactly one stored record.
    async fn append_if_absent(
        &self,
        key: &str,
        record: AttendanceRecord,
    ) -> ServerResult<AppendOutcome>;

    /// Point/range query over stored records.
    ///
    /// `query.from` is inclusive, `query.to` exclusive.
    async fn find(&self, query: AttendanceQuery) -> ServerResult<Vec<AttendanceRecord>>;
}
