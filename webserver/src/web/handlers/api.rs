//! REST API handlers
//!
//! Thin axum wrappers around the server's `handle_*` methods: they read
//! the wall clock, delegate, and translate errors to HTTP statuses.

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::error::ServerError;
use crate::server_impl::AttendanceServer;
use crate::traits::{AttendanceStore, FaceEngine, ScheduleStore};
use crate::types::{RecognizeRequest, RecognizeResponse, RegisterRequest, RegisterResponse, SweepResponse};

type ApiError = (StatusCode, Json<Value>);

/// Map a pipeline error to an HTTP status plus a message body
fn error_response(error: ServerError) -> ApiError {
    let status = match &error {
        ServerError::InvalidRequest { .. } | ServerError::ImageDecode { .. } => {
            StatusCode::BAD_REQUEST
        }
        ServerError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ServerError::FaceEngine { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "message": error.to_string() })))
}

/// Recognize faces and conditionally mark attendance - `POST /recognize`
pub async fn recognize<F, S, A>(
    State(server): State<AttendanceServer<F, S, A>>,
    Json(request): Json<RecognizeRequest>,
) -> Result<Json<RecognizeResponse>, ApiError>
where
    F: FaceEngine + Send + Sync + 'static,
    S: ScheduleStore + Send + Sync + 'static,
    A: AttendanceStore + Send + Sync + 'static,
{
    let now = chrono::Local::now().naive_local();
    server
        .handle_recognize(request, now)
        .await
        .map(Json)
        .map_err(error_response)
}

/// Register a new user and retrain the model - `POST /register`
pub async fn register<F, S, A>(
    State(server): State<AttendanceServer<F, S, A>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError>
where
    F: FaceEngine + Send + Sync + 'static,
    S: ScheduleStore + Send + Sync + 'static,
    A: AttendanceStore + Send + Sync + 'static,
{
    server
        .handle_register(request)
        .await
        .map(Json)
        .map_err(error_response)
}

/// Manually trigger the absentee sweep - `POST /api/sweep`
pub async fn trigger_sweep<F, S, A>(
    State(server): State<AttendanceServer<F, S, A>>,
) -> Result<Json<SweepResponse>, ApiError>
where
    F: FaceEngine + Send + Sync + 'static,
    S: ScheduleStore + Send + Sync + 'static,
    A: AttendanceStore + Send + Sync + 'static,
{
    let now = chrono::Local::now().naive_local();
    server
        .run_sweep(now)
        .await
        .map(|absentees_marked| Json(SweepResponse { absentees_marked }))
        .map_err(error_response)
}

/// Get server status - `GET /api/status`
pub async fn get_status<F, S, A>(
    State(server): State<AttendanceServer<F, S, A>>,
) -> Json<Value>
where
    F: FaceEngine + Send + Sync + 'static,
    S: ScheduleStore + Send + Sync + 'static,
    A: AttendanceStore + Send + Sync + 'static,
{
    let state = server.state();
    Json(json!({
        "status": "ok",
        "data": {
            "version": env!("CARGO_PKG_VERSION"),
            "uptime_seconds": state.uptime_seconds(),
            "accept_policy": state.accept.describe(),
            "dedup_scope": state.dedup.scope.to_string(),
        }
    }))
}

/// Liveness check - `GET /health`
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
