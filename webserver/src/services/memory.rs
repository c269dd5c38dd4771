//! In-memory store backends
//!
//! Used by tests and standalone demos; same contracts as the JSON-backed
//! stores, including the atomic conditional append.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::ServerResult;
use crate::services::attendance_store::filter_records;
use crate::traits::{AppendOutcome, AttendanceQuery, AttendanceStore, ScheduleStore};
use shared::{AttendanceRecord, Schedule};

/// Fixed schedule collection held in memory
pub struct MemoryScheduleStore {
    schedules: Vec<Schedule>,
}

impl MemoryScheduleStore {
    pub fn new(schedules: Vec<Schedule>) -> Self {
        Self { schedules }
    }
}

#[async_trait]
impl ScheduleStore for MemoryScheduleStore {
    async fn fetch_all(&self) -> ServerResult<Vec<Schedule>> {
        Ok(self.schedules.clone())
    }
}

/// Attendance log held in a mutex-guarded map keyed by dedup key
#[derive(Default)]
pub struct MemoryAttendanceStore {
    records: Mutex<HashMap<String, AttendanceRecord>>,
}

impl MemoryAttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttendanceStore for MemoryAttendanceStore {
    async fn append_if_absent(
        &self,
        key: &str,
        record: AttendanceRecord,
    ) -> ServerResult<AppendOutcome> {
        let mut records = self.records.lock().await;
        if records.contains_key(key) {
            return Ok(AppendOutcome::Duplicate);
        }
        records.insert(key.to_string(), record);
        Ok(AppendOutcome::Inserted)
    }

    async fn find(&self, query: AttendanceQuery) -> ServerResult<Vec<AttendanceRecord>> {
        let records = self.records.lock().await;
        Ok(filter_records(records.values().cloned().collect(), &query))
    }
}
