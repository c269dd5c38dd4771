//! Attendance backend webserver
//!
//! Accepts webcam frames over HTTP, runs recognition through an external
//! face engine, and conditionally writes attendance records according to
//! each identity's class schedule.

pub mod core;
pub mod error;
pub mod server_impl;
pub mod services;
pub mod state;
pub mod traits;
pub mod types;
pub mod web;

// Re-export main types
pub use error::{ServerError, ServerResult};
pub use server_impl::AttendanceServer;
pub use state::ServerState;
pub use types::*;

// Re-export trait definitions
pub use traits::{AppendOutcome, AttendanceQuery, AttendanceStore, FaceEngine, ScheduleStore};

// Re-export service implementations
pub use services::{
    HttpFaceEngine, JsonAttendanceStore, JsonScheduleStore, MemoryAttendanceStore,
    MemoryScheduleStore,
};
