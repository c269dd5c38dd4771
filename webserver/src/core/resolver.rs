//! Schedule resolver
//!
//! Decides which class module, if any, a recognized identity can be marked
//! into at a given instant. All times are local wall-clock, matching the
//! schedule's own clock.

use chrono::{Duration, NaiveDateTime};

use shared::Schedule;

/// Grace period around a schedule's start time during which attendance may
/// be marked, applied on both sides of the start instant.
pub const GRACE_MINUTES: i64 = 30;

/// A schedule match for one identity at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModule {
    pub module: String,
    /// Enrolled name from the schedule's student list
    pub student_name: String,
    /// Today's absolute start instant
    pub start: NaiveDateTime,
    /// Earliest instant a mark is accepted (start - grace)
    pub window_open: NaiveDateTime,
    /// Latest instant a mark is accepted (start + grace)
    pub window_close: NaiveDateTime,
}

/// Find the schedule window `uid` can currently be marked into.
///
/// A schedule qualifies when it enrolls `uid`, runs on `now`'s weekday and
/// `now` lies within [start - grace, start + grace], both ends inclusive.
/// Schedules with malformed start times are skipped with a warning, never
/// defaulted to midnight. When several qualify, the earliest start wins;
/// exact start ties break on module name so the choice is deterministic.
pub fn resolve(schedules: &[Schedule], uid: &str, now: NaiveDateTime) -> Option<ResolvedModule> {
    let weekday = now.format("%A").to_string();
    let grace = Duration::minutes(GRACE_MINUTES);
    let mut best: Option<ResolvedModule> = None;

    for schedule in schedules
        .iter()
        .filter(|s| s.contains_student(uid))
        .filter(|s| s.runs_on(&weekday))
    {
        let start_time = match schedule.parsed_start_time() {
            Ok(time) => time,
            Err(error) => {
                tracing::warn!(
                    module = %schedule.module,
                    %error,
                    "skipping schedule with malformed start time"
                );
                continue;
            }
        };

        let start = now.date().and_time(start_time);
        let window_open = start - grace;
        let window_close = start + grace;
        if now < window_open || now > window_close {
            continue;
        }

        let candidate = ResolvedModule {
            module: schedule.module.clone(),
            student_name: schedule.student_name(uid).unwrap_or_default().to_string(),
            start,
            window_open,
            window_close,
        };

        best = match best.take() {
            None => Some(candidate),
            Some(current) => {
                if (candidate.start, candidate.module.as_str())
                    < (current.start, current.module.as_str())
                {
                    Some(candidate)
                } else {
                    Some(current)
                }
            }
        };
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use shared::StudentRef;

    const ALL_DAYS: [&str; 7] = [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ];

    fn schedule(module: &str, start_time: &str, days: &[&str], uids: &[&str]) -> Schedule {
        Schedule {
            module: module.to_string(),
            working_days: days.iter().map(|d| d.to_string()).collect(),
            start_time: start_time.to_string(),
            students: uids
                .iter()
                .map(|uid| StudentRef {
                    uid: uid.to_string(),
                    name: format!("Student {uid}"),
                })
                .collect(),
        }
    }

    // 2025-03-03 is a Monday
    fn monday(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn unenrolled_uid_resolves_to_none() {
        let schedules = vec![schedule("CS101", "09:00", &ALL_DAYS, &["1", "2"])];
        assert_eq!(resolve(&schedules, "99", monday(9, 0, 0)), None);
    }

    #[test]
    fn off_day_schedule_is_excluded_regardless_of_time() {
        let schedules = vec![schedule("CS101", "09:00", &["Tuesday"], &["1"])];
        assert_eq!(resolve(&schedules, "1", monday(9, 0, 0)), None);
    }

    #[test]
    fn earliest_start_wins_when_both_windows_are_open() {
        let schedules = vec![
            schedule("LATE", "09:15", &ALL_DAYS, &["1"]),
            schedule("EARLY", "09:00", &ALL_DAYS, &["1"]),
        ];
        let resolved = resolve(&schedules, "1", monday(9, 10, 0)).unwrap();
        assert_eq!(resolved.module, "EARLY");
        assert_eq!(resolved.start, monday(9, 0, 0));
    }

    #[test]
    fn exact_start_tie_breaks_on_module_name() {
        let schedules = vec![
            schedule("PHYS", "09:00", &ALL_DAYS, &["1"]),
            schedule("CHEM", "09:00", &ALL_DAYS, &["1"]),
        ];
        let resolved = resolve(&schedules, "1", monday(9, 0, 0)).unwrap();
        assert_eq!(resolved.module, "CHEM");
    }

    #[test]
    fn grace_window_bounds_are_inclusive() {
        let schedules = vec![schedule("CS101", "09:00", &ALL_DAYS, &["1"])];
        assert!(resolve(&schedules, "1", monday(8, 30, 0)).is_some());
        assert!(resolve(&schedules, "1", monday(9, 30, 0)).is_some());
        assert_eq!(resolve(&schedules, "1", monday(8, 29, 59)), None);
        assert_eq!(resolve(&schedules, "1", monday(9, 30, 1)), None);
    }

    #[test]
    fn malformed_start_time_is_skipped_not_midnight() {
        let schedules = vec![schedule("BROKEN", "not-a-time", &ALL_DAYS, &["1"])];
        // A midnight default would make this match just after 00:00
        assert_eq!(resolve(&schedules, "1", monday(0, 10, 0)), None);
    }

    #[test]
    fn malformed_schedule_does_not_mask_a_valid_one() {
        let schedules = vec![
            schedule("BROKEN", "soon", &ALL_DAYS, &["1"]),
            schedule("CS101", "09:00", &ALL_DAYS, &["1"]),
        ];
        let resolved = resolve(&schedules, "1", monday(9, 5, 0)).unwrap();
        assert_eq!(resolved.module, "CS101");
    }

    #[test]
    fn resolved_module_carries_window_and_name() {
        let schedules = vec![schedule("CS101", "09:00", &ALL_DAYS, &["7"])];
        let resolved = resolve(&schedules, "7", monday(9, 10, 0)).unwrap();
        assert_eq!(resolved.window_open, monday(8, 30, 0));
        assert_eq!(resolved.window_close, monday(9, 30, 0));
        assert_eq!(resolved.student_name, "Student 7");
    }
}
