//! Wire types for the HTTP surface
//!
//! Request/response bodies match what the browser frontend sends: a single
//! base64 frame for recognition, a batch of frames for registration.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Body of `POST /recognize`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizeRequest {
    /// Base64-encoded frame, optionally with a `data:image/...;base64,` prefix
    pub image: Option<String>,
}

/// One recognized face reported back to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedUser {
    pub uid: String,
    pub confidence: f64,
}

/// One attendance record created by this request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkedAttendance {
    pub uid: String,
    pub module: String,
    pub time: NaiveDateTime,
}

/// Body of the `POST /recognize` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecognizeResponse {
    /// Every face the engine saw, including "Unknown"
    pub recognized_users: Vec<RecognizedUser>,
    /// Records actually persisted by the decision engine
    pub attendance_marked: Vec<MarkedAttendance>,
}

/// Body of `POST /register`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub id: Option<String>,
    pub name: Option<String>,
    pub images: Option<Vec<String>>,
}

/// Body of the `POST /register` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub saved_count: usize,
}

/// Body of the `POST /api/sweep` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepResponse {
    pub absentees_marked: usize,
}
