//! WebServer-specific error types

use shared::SharedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {details}")]
    InvalidRequest { details: String },

    #[error("Image decode failed: {details}")]
    ImageDecode { details: String },

    #[error("Recognition model not trained; register users first")]
    ModelUnavailable,

    #[error("Face engine request failed: {message}")]
    FaceEngine { message: String },

    #[error("Schedule store read failed: {message}")]
    ScheduleRead { message: String },

    #[error("Attendance store query failed: {message}")]
    AttendanceRead { message: String },

    #[error("Attendance store write failed: {message}")]
    AttendanceWrite { message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Server startup error: {0}")]
    ServerStartup(String),

    #[error("Shared component error")]
    Shared(#[from] SharedError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ServerError {
    /// Convenience constructor for configuration errors
    pub fn config(message: impl Into<String>) -> Self {
        ServerError::Config(message.into())
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
