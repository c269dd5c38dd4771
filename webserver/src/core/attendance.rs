//! Attendance deduplicator
//!
//! Persists a Present record for a resolved module unless the bucket is
//! already taken. The duplicate check is delegated to the store's atomic
//! conditional append, so two racing requests for the same identity and
//! bucket cannot both write.

use chrono::NaiveDateTime;

use crate::core::policy::DedupPolicy;
use crate::core::resolver::ResolvedModule;
use crate::error::ServerResult;
use crate::traits::{AppendOutcome, AttendanceStore};
use shared::{AttendanceRecord, AttendanceStatus};

/// Why a mark attempt did or did not write a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkReason {
    Marked,
    Duplicate,
}

/// Result of one mark attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkOutcome {
    pub marked: bool,
    pub reason: MarkReason,
}

/// Attempt to mark `uid` Present for the resolved module at `now`.
///
/// At most one record can exist per (uid, module, bucket); a second attempt
/// reports `Duplicate` without touching the store's contents.
pub async fn try_mark_present<A>(
    store: &A,
    policy: &DedupPolicy,
    uid: &str,
    resolved: &ResolvedModule,
    now: NaiveDateTime,
) -> ServerResult<MarkOutcome>
where
    A: AttendanceStore + ?Sized,
{
    let key = policy.bucket_key(uid, &resolved.module, now.date(), resolved.start);
    let record = AttendanceRecord {
        uid: uid.to_string(),
        module: resolved.module.clone(),
        name: resolved.student_name.clone(),
        status: AttendanceStatus::Present,
        time_recorded: now,
    };

    match store.append_if_absent(&key, record).await? {
        AppendOutcome::Inserted => {
            tracing::info!(uid, module = %resolved.module, %now, "attendance marked");
            Ok(MarkOutcome {
                marked: true,
                reason: MarkReason::Marked,
            })
        }
        AppendOutcome::Duplicate => {
            tracing::debug!(uid, module = %resolved.module, "attendance already marked for bucket");
            Ok(MarkOutcome {
                marked: false,
                reason: MarkReason::Duplicate,
            })
        }
    }
}
