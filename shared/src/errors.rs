//! Shared error types for the attendance backend

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Invalid start time: {value} (expected HH:MM)")]
    InvalidTimeFormat { value: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
