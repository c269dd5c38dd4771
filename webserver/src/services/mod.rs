//! Service implementations
//!
//! Real implementations of all service traits for production use, plus
//! in-memory store backends for tests and standalone demos.

pub mod attendance_store;
pub mod face_engine;
pub mod memory;
pub mod schedule_store;

// Re-export service implementations
pub use attendance_store::JsonAttendanceStore;
pub use face_engine::HttpFaceEngine;
pub use memory::{MemoryAttendanceStore, MemoryScheduleStore};
pub use schedule_store::JsonScheduleStore;
