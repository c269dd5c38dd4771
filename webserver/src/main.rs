//! Attendance webserver entry point

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use webserver::core::{DedupPolicy, DedupScope, StaticThreshold};
use webserver::services::{HttpFaceEngine, JsonAttendanceStore, JsonScheduleStore};
use webserver::{AttendanceServer, ServerError, ServerResult, ServerState};

#[derive(Parser, Debug)]
#[command(name = "webserver")]
#[command(about = "Face-recognition attendance backend")]
struct Args {
    /// Port for HTTP server (browser connections)
    #[arg(long, default_value = "5000")]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Directory holding the schedule document and attendance log
    #[arg(long, default_value = "./data")]
    data_dir: PathBuf,

    /// Base URL of the face engine sidecar
    #[arg(long, default_value = "http://127.0.0.1:5001")]
    face_engine_url: String,

    /// Recognition distance threshold; detections at or above are rejected
    #[arg(long, default_value = "65.0")]
    threshold: f64,

    /// Duplicate-detection granularity: per-day or per-window
    #[arg(long, default_value = "per-day")]
    dedup_scope: DedupScope,

    /// Seconds between periodic absentee sweeps
    #[arg(long, default_value = "300")]
    sweep_interval_secs: u64,
}

#[tokio::main]
async fn main() -> ServerResult<()> {
    let args = Args::parse();
    shared::logging::init_tracing("webserver", Some(&args.log_level));

    if args.threshold <= 0.0 {
        return Err(ServerError::config(format!(
            "threshold must be positive, got {}",
            args.threshold
        )));
    }
    if args.sweep_interval_secs == 0 {
        return Err(ServerError::config("sweep interval must be at least 1 second"));
    }

    let addr: SocketAddr = format!("0.0.0.0:{}", args.port)
        .parse()
        .map_err(|e| ServerError::config(format!("Invalid port: {e}")))?;

    let face_engine = HttpFaceEngine::new(args.face_engine_url.clone());
    let schedules = JsonScheduleStore::new(args.data_dir.join("schedules.json"));
    let attendance = JsonAttendanceStore::new(args.data_dir.join("attendance.jsonl"));

    let state = ServerState::new(
        Box::new(StaticThreshold::new(args.threshold)),
        DedupPolicy::new(args.dedup_scope),
    );
    let server = AttendanceServer::new(state, face_engine, schedules, attendance);

    tracing::info!(
        port = args.port,
        face_engine = %args.face_engine_url,
        data_dir = %args.data_dir.display(),
        threshold = args.threshold,
        dedup_scope = %args.dedup_scope,
        "attendance webserver starting"
    );

    server
        .run(addr, Duration::from_secs(args.sweep_interval_secs))
        .await?;

    tracing::info!("attendance webserver stopped gracefully");
    Ok(())
}
