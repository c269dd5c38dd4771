//! Shared types for the attendance backend
//!
//! Contains the domain model that the decision engine and the external
//! stores agree on, plus the tracing setup used by every binary.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
