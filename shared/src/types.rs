//! Core domain types for schedules, attendance records and recognition results

use std::collections::HashSet;
use std::fmt;

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::errors::SharedError;

/// Identity reported by the face engine when no enrolled user matches.
pub const UNKNOWN_UID: &str = "Unknown";

/// Enrollment entry inside a schedule's student list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRef {
    pub uid: String,
    pub name: String,
}

/// A class schedule owned by the external scheduling subsystem.
///
/// The decision engine only ever reads these. Uniqueness of `uid` within
/// `students` is assumed by the upstream owner, not enforced here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// Class/session name this schedule represents
    pub module: String,
    /// Full weekday names, e.g. "Monday"
    pub working_days: HashSet<String>,
    /// Local wall-clock start time as "HH:MM"
    pub start_time: String,
    /// Enrolled students in registration order
    pub students: Vec<StudentRef>,
}

impl Schedule {
    /// Whether `uid` appears in this schedule's student list
    pub fn contains_student(&self, uid: &str) -> bool {
        self.students.iter().any(|s| s.uid == uid)
    }

    /// Best-effort name lookup for an enrolled uid
    pub fn student_name(&self, uid: &str) -> Option<&str> {
        self.students
            .iter()
            .find(|s| s.uid == uid)
            .map(|s| s.name.as_str())
    }

    /// Whether this schedule runs on the given full weekday name
    pub fn runs_on(&self, weekday_name: &str) -> bool {
        self.working_days.contains(weekday_name)
    }

    /// Parse `start_time` as a wall-clock time of day.
    ///
    /// Malformed values are an error, never silently defaulted to midnight;
    /// callers skip the schedule instead of doing window math at 00:00.
    pub fn parsed_start_time(&self) -> Result<NaiveTime, SharedError> {
        NaiveTime::parse_from_str(&self.start_time, "%H:%M").map_err(|_| {
            SharedError::InvalidTimeFormat {
                value: self.start_time.clone(),
            }
        })
    }
}

/// Attendance status for a persisted record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttendanceStatus::Present => write!(f, "Present"),
            AttendanceStatus::Absent => write!(f, "Absent"),
        }
    }
}

/// Append-only attendance record persisted to the attendance store.
///
/// Under correct operation exactly one record exists per
/// (uid, module, dedup bucket); the store's conditional append enforces it.
/// Timestamps are local wall-clock, matching the schedule's clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub uid: String,
    pub module: String,
    pub name: String,
    pub status: AttendanceStatus,
    pub time_recorded: NaiveDateTime,
}

/// One recognized face in a submitted frame; transient, never persisted.
///
/// `confidence` is a distance score from the recognizer: lower means a
/// stronger match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub uid: String,
    pub confidence: f64,
}

impl Detection {
    /// Whether the engine flagged this face as unrecognized
    pub fn is_unknown(&self) -> bool {
        self.uid == UNKNOWN_UID
    }
}
