//! Main attendance server implementation
//!
//! The `AttendanceServer` struct wires the decision engine to its external
//! collaborators through dependency injection; handlers stay thin and call
//! the `handle_*` methods here, which take `now` as a parameter so tests
//! can pin the clock.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::NaiveDateTime;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::core::{resolve, sweep, try_mark_present};
use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use crate::traits::{AttendanceStore, FaceEngine, ScheduleStore};
use crate::types::{
    MarkedAttendance, RecognizeRequest, RecognizeResponse, RecognizedUser, RegisterRequest,
    RegisterResponse,
};
use crate::web::handlers;

/// Main server struct with dependency injection
pub struct AttendanceServer<F, S, A>
where
    F: FaceEngine,
    S: ScheduleStore,
    A: AttendanceStore,
{
    state: Arc<ServerState>,
    face_engine: Arc<F>,
    schedules: Arc<S>,
    attendance: Arc<A>,
}

// Manual impl: the services live behind Arcs, so no Clone bound is needed
impl<F, S, A> Clone for AttendanceServer<F, S, A>
where
    F: FaceEngine,
    S: ScheduleStore,
    A: AttendanceStore,
{
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            face_engine: self.face_engine.clone(),
            schedules: self.schedules.clone(),
            attendance: self.attendance.clone(),
        }
    }
}

impl<F, S, A> AttendanceServer<F, S, A>
where
    F: FaceEngine + Send + Sync + 'static,
    S: ScheduleStore + Send + Sync + 'static,
    A: AttendanceStore + Send + Sync + 'static,
{
    /// Create a new server with injected dependencies
    pub fn new(state: ServerState, face_engine: F, schedules: S, attendance: A) -> Self {
        Self {
            state: Arc::new(state),
            face_engine: Arc::new(face_engine),
            schedules: Arc::new(schedules),
            attendance: Arc::new(attendance),
        }
    }

    /// Server configuration and uptime state
    pub fn state(&self) -> &ServerState {
        &self.state
    }

    /// Build the Axum router with all routes
    pub fn build_router(&self) -> Router {
        Router::new()
            .route("/recognize", post(handlers::api::recognize::<F, S, A>))
            .route("/register", post(handlers::api::register::<F, S, A>))
            .route("/api/sweep", post(handlers::api::trigger_sweep::<F, S, A>))
            .route("/api/status", get(handlers::api::get_status::<F, S, A>))
            .route("/health", get(handlers::api::health_check))
            .layer(
                ServiceBuilder::new()
                    // Browser frontend may be served from any origin
                    .layer(CorsLayer::permissive())
                    .into_inner(),
            )
            .with_state(self.clone())
    }

    /// Run the HTTP server plus the periodic absentee sweep until Ctrl+C
    pub async fn run(&self, addr: SocketAddr, sweep_interval: Duration) -> ServerResult<()> {
        let router = self.build_router();

        let sweep_task = {
            let server = self.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(sweep_interval);
                // The first tick completes immediately; consume it so the
                // first sweep runs one full interval after startup.
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    let now = chrono::Local::now().naive_local();
                    match server.run_sweep(now).await {
                        Ok(0) => {}
                        Ok(marked) => tracing::info!(marked, "periodic absentee sweep finished"),
                        Err(error) => tracing::warn!(%error, "periodic absentee sweep failed"),
                    }
                }
            })
        };

        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            ServerError::ServerStartup(format!("Failed to bind to {addr}: {e}"))
        })?;
        tracing::info!(%addr, "attendance server listening");

        let server_task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!(error = %e, "HTTP server error");
            }
        });

        tokio::select! {
            _ = server_task => {
                tracing::info!("HTTP server task completed");
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received shutdown signal");
            }
        }

        sweep_task.abort();
        Ok(())
    }

    /// Recognition pipeline: decode, detect, gate, resolve, mark.
    ///
    /// Store failures after detection succeed are per-identity: they are
    /// logged and skip only the affected identity, never the whole batch.
    pub async fn handle_recognize(
        &self,
        request: RecognizeRequest,
        now: NaiveDateTime,
    ) -> ServerResult<RecognizeResponse> {
        let payload = request
            .image
            .as_deref()
            .filter(|image| !image.trim().is_empty())
            .ok_or_else(|| ServerError::InvalidRequest {
                details: "No image received".to_string(),
            })?;
        let frame = decode_frame(payload)?;

        let detections = self.face_engine.detect(&frame).await?;
        let mut response = RecognizeResponse::default();
        if detections.is_empty() {
            return Ok(response);
        }

        // One full scan per request; a failed read skips attendance but
        // still reports recognitions (partial-failure isolation)
        let schedules = match self.schedules.fetch_all().await {
            Ok(schedules) => schedules,
            Err(error) => {
                tracing::warn!(%error, "schedule fetch failed; returning recognitions without attendance");
                Vec::new()
            }
        };

        for detection in detections {
            response.recognized_users.push(RecognizedUser {
                uid: detection.uid.clone(),
                confidence: detection.confidence,
            });

            if detection.is_unknown() {
                tracing::debug!(confidence = detection.confidence, "unrecognized face discarded");
                continue;
            }
            if !self.state.accept.accepts(&detection) {
                tracing::debug!(
                    uid = %detection.uid,
                    confidence = detection.confidence,
                    "detection rejected by accept policy"
                );
                continue;
            }

            let Some(resolved) = resolve(&schedules, &detection.uid, now) else {
                tracing::debug!(uid = %detection.uid, "no schedule window open");
                continue;
            };

            match try_mark_present(
                self.attendance.as_ref(),
                &self.state.dedup,
                &detection.uid,
                &resolved,
                now,
            )
            .await
            {
                Ok(outcome) if outcome.marked => {
                    response.attendance_marked.push(MarkedAttendance {
                        uid: detection.uid.clone(),
                        module: resolved.module,
                        time: now,
                    });
                }
                Ok(_) => {}
                Err(error) => {
                    tracing::warn!(
                        uid = %detection.uid,
                        %error,
                        "attendance write failed; continuing with remaining identities"
                    );
                }
            }
        }

        Ok(response)
    }

    /// Enroll a new identity: decode the frame batch and hand it to the
    /// face engine, which owns training. Undecodable frames are skipped.
    pub async fn handle_register(&self, request: RegisterRequest) -> ServerResult<RegisterResponse> {
        let uid = non_empty(request.id.as_deref());
        let name = non_empty(request.name.as_deref());
        let images = request.images.as_deref().filter(|images| !images.is_empty());
        let (Some(uid), Some(name), Some(images)) = (uid, name, images) else {
            return Err(ServerError::InvalidRequest {
                details: "ID, name, and images are required.".to_string(),
            });
        };

        let mut frames = Vec::with_capacity(images.len());
        for (index, image) in images.iter().enumerate() {
            match decode_frame(image) {
                Ok(frame) => frames.push(frame),
                Err(error) => {
                    tracing::warn!(index, %error, "skipping undecodable enrollment image");
                }
            }
        }
        if frames.is_empty() {
            return Err(ServerError::ImageDecode {
                details: "no decodable images in payload".to_string(),
            });
        }

        let saved_count = self.face_engine.enroll(uid, name, &frames).await?;
        tracing::info!(uid, name, saved_count, "user registered");
        Ok(RegisterResponse {
            message: format!("{saved_count} images processed, user saved, and model trained!"),
            saved_count,
        })
    }

    /// Run the absentee sweep once; returns how many Absent records were written
    pub async fn run_sweep(&self, now: NaiveDateTime) -> ServerResult<usize> {
        sweep(
            self.schedules.as_ref(),
            self.attendance.as_ref(),
            &self.state.dedup,
            now,
        )
        .await
    }
}

/// Decode a base64 frame payload, tolerating a `data:image/...;base64,`
/// prefix from browser canvas captures.
fn decode_frame(payload: &str) -> ServerResult<Vec<u8>> {
    let data = payload
        .rsplit_once(',')
        .map(|(_, data)| data)
        .unwrap_or(payload);

    let bytes = BASE64
        .decode(data.trim())
        .map_err(|e| ServerError::ImageDecode {
            details: format!("invalid base64 image data: {e}"),
        })?;

    if bytes.is_empty() {
        return Err(ServerError::ImageDecode {
            details: "empty image payload".to_string(),
        });
    }
    Ok(bytes)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
