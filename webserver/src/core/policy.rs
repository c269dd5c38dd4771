//! Pluggable decision policies
//!
//! Two knobs vary across deployments: how strict the recognition gate is,
//! and how wide the duplicate-detection bucket is. Both are policies the
//! rest of the engine treats as opaque.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use shared::Detection;

/// Gate deciding whether a recognition result is trustworthy enough to
/// reach the attendance deduplicator.
pub trait AcceptPolicy: Send + Sync {
    /// Whether this detection's confidence qualifies for attendance
    fn accepts(&self, detection: &Detection) -> bool;

    /// Human-readable policy description for the status endpoint
    fn describe(&self) -> String;
}

/// Fixed distance cutoff.
///
/// The recognizer reports a distance score where lower means a stronger
/// match, so a detection qualifies only when its score is strictly below
/// the threshold; a score exactly at the threshold is rejected.
#[derive(Debug, Clone, Copy)]
pub struct StaticThreshold {
    threshold: f64,
}

impl StaticThreshold {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl AcceptPolicy for StaticThreshold {
    fn accepts(&self, detection: &Detection) -> bool {
        detection.confidence < self.threshold
    }

    fn describe(&self) -> String {
        format!("static distance threshold < {}", self.threshold)
    }
}

/// Granularity of the duplicate-detection bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupScope {
    /// One record per (uid, module) per calendar day
    PerDay,
    /// One record per (uid, module) per schedule window
    PerWindow,
}

impl fmt::Display for DedupScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DedupScope::PerDay => write!(f, "per-day"),
            DedupScope::PerWindow => write!(f, "per-window"),
        }
    }
}

impl FromStr for DedupScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per-day" => Ok(DedupScope::PerDay),
            "per-window" => Ok(DedupScope::PerWindow),
            other => Err(format!(
                "unknown dedup scope '{other}' (expected 'per-day' or 'per-window')"
            )),
        }
    }
}

/// Duplicate-detection policy shared by the deduplicator and the sweep
#[derive(Debug, Clone, Copy)]
pub struct DedupPolicy {
    pub scope: DedupScope,
}

impl DedupPolicy {
    pub fn new(scope: DedupScope) -> Self {
        Self { scope }
    }

    /// Default policy: one mark per (uid, module) per day
    pub fn per_day() -> Self {
        Self::new(DedupScope::PerDay)
    }

    /// Conditional-write key identifying one attendance bucket.
    ///
    /// Racing writers for the same bucket collide on this key inside the
    /// store, which is what makes the duplicate check atomic.
    pub fn bucket_key(
        &self,
        uid: &str,
        module: &str,
        day: NaiveDate,
        window_start: NaiveDateTime,
    ) -> String {
        match self.scope {
            DedupScope::PerDay => format!("{uid}|{module}|{}", day.format("%Y-%m-%d")),
            DedupScope::PerWindow => format!(
                "{uid}|{module}|{}|{}",
                day.format("%Y-%m-%d"),
                window_start.format("%H:%M")
            ),
        }
    }

    /// Time range covering one bucket, for presence queries.
    ///
    /// Returned as [from, to) to match `AttendanceQuery` semantics; the
    /// per-window range is padded by one second so a mark at exactly the
    /// window close is still counted.
    pub fn bucket_range(
        &self,
        day: NaiveDate,
        window_open: NaiveDateTime,
        window_close: NaiveDateTime,
    ) -> (NaiveDateTime, NaiveDateTime) {
        match self.scope {
            DedupScope::PerDay => {
                let midnight = NaiveTime::MIN;
                let from = day.and_time(midnight);
                let to = day
                    .succ_opt()
                    .map(|next| next.and_time(midnight))
                    .unwrap_or(NaiveDateTime::MAX);
                (from, to)
            }
            DedupScope::PerWindow => (window_open, window_close + Duration::seconds(1)),
        }
    }
}
