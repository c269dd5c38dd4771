//! End-to-end recognition pipeline tests
//!
//! Drive `handle_recognize` with a mocked face engine and in-memory
//! stores; the clock is pinned so schedule windows are deterministic.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{NaiveDate, NaiveDateTime};

use shared::{Detection, Schedule, StudentRef, UNKNOWN_UID};
use webserver::core::{DedupPolicy, StaticThreshold};
use webserver::traits::{MockFaceEngine, MockScheduleStore};
use webserver::{
    AttendanceServer, MemoryAttendanceStore, MemoryScheduleStore, RecognizeRequest, ServerError,
    ServerState,
};

const ALL_DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

fn schedule(module: &str, start_time: &str, uids: &[&str]) -> Schedule {
    Schedule {
        module: module.to_string(),
        working_days: ALL_DAYS.iter().map(|d| d.to_string()).collect(),
        start_time: start_time.to_string(),
        students: uids
            .iter()
            .map(|uid| StudentRef {
                uid: uid.to_string(),
                name: format!("Student {uid}"),
            })
            .collect(),
    }
}

// 2025-03-03 is a Monday
fn monday(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 3)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn frame_request() -> RecognizeRequest {
    RecognizeRequest {
        image: Some(BASE64.encode(b"jpeg-frame-bytes")),
    }
}

fn engine_returning(detections: Vec<Detection>) -> MockFaceEngine {
    let mut engine = MockFaceEngine::new();
    engine
        .expect_detect()
        .returning(move |_| Ok(detections.clone()));
    engine
}

fn server(
    engine: MockFaceEngine,
    schedules: Vec<Schedule>,
) -> AttendanceServer<MockFaceEngine, MemoryScheduleStore, MemoryAttendanceStore> {
    let state = ServerState::new(
        Box::new(StaticThreshold::new(65.0)),
        DedupPolicy::per_day(),
    );
    AttendanceServer::new(
        state,
        engine,
        MemoryScheduleStore::new(schedules),
        MemoryAttendanceStore::new(),
    )
}

#[tokio::test]
async fn recognized_identity_in_open_window_is_marked() {
    let engine = engine_returning(vec![Detection {
        uid: "42".to_string(),
        confidence: 30.5,
    }]);
    let server = server(engine, vec![schedule("CS101", "09:00", &["42"])]);

    let response = server
        .handle_recognize(frame_request(), monday(9, 10))
        .await
        .unwrap();

    assert_eq!(response.recognized_users.len(), 1);
    assert_eq!(response.recognized_users[0].uid, "42");
    assert_eq!(response.attendance_marked.len(), 1);
    assert_eq!(response.attendance_marked[0].module, "CS101");
    assert_eq!(response.attendance_marked[0].time, monday(9, 10));
}

#[tokio::test]
async fn second_request_reports_recognition_but_no_duplicate_mark() {
    let engine = engine_returning(vec![Detection {
        uid: "42".to_string(),
        confidence: 30.5,
    }]);
    let server = server(engine, vec![schedule("CS101", "09:00", &["42"])]);

    let first = server
        .handle_recognize(frame_request(), monday(9, 5))
        .await
        .unwrap();
    let second = server
        .handle_recognize(frame_request(), monday(9, 10))
        .await
        .unwrap();

    assert_eq!(first.attendance_marked.len(), 1);
    assert_eq!(second.recognized_users.len(), 1);
    assert!(second.attendance_marked.is_empty());
}

#[tokio::test]
async fn threshold_boundary_is_strict() {
    let engine = engine_returning(vec![
        Detection {
            uid: "42".to_string(),
            confidence: 65.0, // exactly at threshold: rejected
        },
        Detection {
            uid: "43".to_string(),
            confidence: 64.0, // below threshold: accepted
        },
    ]);
    let server = server(engine, vec![schedule("CS101", "09:00", &["42", "43"])]);

    let response = server
        .handle_recognize(frame_request(), monday(9, 0))
        .await
        .unwrap();

    assert_eq!(response.recognized_users.len(), 2);
    assert_eq!(response.attendance_marked.len(), 1);
    assert_eq!(response.attendance_marked[0].uid, "43");
}

#[tokio::test]
async fn unknown_and_unenrolled_identities_are_never_marked() {
    let engine = engine_returning(vec![
        Detection {
            uid: UNKNOWN_UID.to_string(),
            confidence: 80.0,
        },
        Detection {
            uid: "99".to_string(), // strong match but not on any schedule
            confidence: 20.0,
        },
    ]);
    let server = server(engine, vec![schedule("CS101", "09:00", &["42"])]);

    let response = server
        .handle_recognize(frame_request(), monday(9, 0))
        .await
        .unwrap();

    assert_eq!(response.recognized_users.len(), 2);
    assert!(response.attendance_marked.is_empty());
}

#[tokio::test]
async fn closed_window_yields_recognition_without_mark() {
    let engine = engine_returning(vec![Detection {
        uid: "42".to_string(),
        confidence: 30.0,
    }]);
    let server = server(engine, vec![schedule("CS101", "09:00", &["42"])]);

    let response = server
        .handle_recognize(frame_request(), monday(10, 0))
        .await
        .unwrap();

    assert_eq!(response.recognized_users.len(), 1);
    assert!(response.attendance_marked.is_empty());
}

#[tokio::test]
async fn missing_image_is_rejected_before_detection() {
    // No detect expectation: reaching the engine would fail the test
    let engine = MockFaceEngine::new();
    let missing_server = server(engine, vec![]);

    let missing = missing_server
        .handle_recognize(RecognizeRequest { image: None }, monday(9, 0))
        .await;
    assert!(matches!(missing, Err(ServerError::InvalidRequest { .. })));

    let engine = MockFaceEngine::new();
    let server = server(engine, vec![]);
    let blank = server
        .handle_recognize(
            RecognizeRequest {
                image: Some("   ".to_string()),
            },
            monday(9, 0),
        )
        .await;
    assert!(matches!(blank, Err(ServerError::InvalidRequest { .. })));
}

#[tokio::test]
async fn corrupt_image_payload_is_rejected() {
    let engine = MockFaceEngine::new();
    let server = server(engine, vec![]);

    let result = server
        .handle_recognize(
            RecognizeRequest {
                image: Some("%%%definitely-not-base64%%%".to_string()),
            },
            monday(9, 0),
        )
        .await;
    assert!(matches!(result, Err(ServerError::ImageDecode { .. })));
}

#[tokio::test]
async fn untrained_model_error_propagates() {
    let mut engine = MockFaceEngine::new();
    engine
        .expect_detect()
        .returning(|_| Err(ServerError::ModelUnavailable));
    let server = server(engine, vec![]);

    let result = server.handle_recognize(frame_request(), monday(9, 0)).await;
    assert!(matches!(result, Err(ServerError::ModelUnavailable)));
}

#[tokio::test]
async fn schedule_store_failure_still_reports_recognitions() {
    let engine = engine_returning(vec![Detection {
        uid: "42".to_string(),
        confidence: 30.0,
    }]);
    let mut schedules = MockScheduleStore::new();
    schedules.expect_fetch_all().returning(|| {
        Err(ServerError::ScheduleRead {
            message: "store offline".to_string(),
        })
    });

    let state = ServerState::new(
        Box::new(StaticThreshold::new(65.0)),
        DedupPolicy::per_day(),
    );
    let server = AttendanceServer::new(state, engine, schedules, MemoryAttendanceStore::new());

    let response = server
        .handle_recognize(frame_request(), monday(9, 0))
        .await
        .unwrap();

    assert_eq!(response.recognized_users.len(), 1);
    assert!(response.attendance_marked.is_empty());
}
