//! Absentee sweep
//!
//! Batch companion to the deduplicator: once a schedule window has closed,
//! every enrolled identity without an attendance record for the bucket is
//! marked Absent. Per-identity failures never abort the rest of the sweep.

use std::collections::HashSet;

use chrono::{Duration, NaiveDateTime};

use crate::core::policy::DedupPolicy;
use crate::core::resolver::GRACE_MINUTES;
use crate::error::ServerResult;
use crate::traits::{AppendOutcome, AttendanceQuery, AttendanceStore, ScheduleStore};
use shared::{AttendanceRecord, AttendanceStatus};

/// Mark absentees for every schedule whose window has closed by `now`.
///
/// Absent writes go through the same conditional append as Present marks,
/// so a sweep can run repeatedly without producing duplicates, and a
/// Present record always wins its bucket over a later Absent one.
/// Returns the number of Absent records written.
pub async fn sweep<S, A>(
    schedules: &S,
    attendance: &A,
    policy: &DedupPolicy,
    now: NaiveDateTime,
) -> ServerResult<usize>
where
    S: ScheduleStore + ?Sized,
    A: AttendanceStore + ?Sized,
{
    let all = schedules.fetch_all().await?;
    let weekday = now.format("%A").to_string();
    let grace = Duration::minutes(GRACE_MINUTES);
    let mut marked = 0usize;

    for schedule in all.iter().filter(|s| s.runs_on(&weekday)) {
        let start_time = match schedule.parsed_start_time() {
            Ok(time) => time,
            Err(error) => {
                tracing::warn!(
                    module = %schedule.module,
                    %error,
                    "skipping schedule with malformed start time in sweep"
                );
                continue;
            }
        };

        let start = now.date().and_time(start_time);
        let window_open = start - grace;
        let window_close = start + grace;
        if now < window_close {
            // Window still open; late arrivals can still be marked Present
            continue;
        }

        let (from, to) = policy.bucket_range(now.date(), window_open, window_close);
        let query = AttendanceQuery {
            module: Some(schedule.module.clone()),
            from: Some(from),
            to: Some(to),
            ..Default::default()
        };
        let present: HashSet<String> = match attendance.find(query).await {
            Ok(records) => records.into_iter().map(|r| r.uid).collect(),
            Err(error) => {
                tracing::warn!(
                    module = %schedule.module,
                    %error,
                    "attendance lookup failed; skipping module in sweep"
                );
                continue;
            }
        };

        for student in &schedule.students {
            if present.contains(&student.uid) {
                continue;
            }

            let key = policy.bucket_key(&student.uid, &schedule.module, now.date(), start);
            let record = AttendanceRecord {
                uid: student.uid.clone(),
                module: schedule.module.clone(),
                name: student.name.clone(),
                status: AttendanceStatus::Absent,
                time_recorded: now,
            };

            match attendance.append_if_absent(&key, record).await {
                Ok(AppendOutcome::Inserted) => {
                    tracing::info!(uid = %student.uid, module = %schedule.module, "marked absent");
                    marked += 1;
                }
                Ok(AppendOutcome::Duplicate) => {
                    // Raced with a late Present mark or a previous sweep
                }
                Err(error) => {
                    tracing::warn!(
                        uid = %student.uid,
                        module = %schedule.module,
                        %error,
                        "failed to persist absent record; continuing sweep"
                    );
                }
            }
        }
    }

    Ok(marked)
}
