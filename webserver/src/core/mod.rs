//! Core decision engine modules
//!
//! Pure schedule/attendance logic with no I/O of its own; stores are
//! reached only through the service traits passed in by callers.

pub mod attendance;
pub mod policy;
pub mod resolver;
pub mod sweep;

// Re-export commonly used types
pub use attendance::{try_mark_present, MarkOutcome, MarkReason};
pub use policy::{AcceptPolicy, DedupPolicy, DedupScope, StaticThreshold};
pub use resolver::{resolve, ResolvedModule, GRACE_MINUTES};
pub use sweep::sweep;
