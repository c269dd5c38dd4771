//! HTTP client for the face engine sidecar
//!
//! The recognizer runs as a separate process owning the trained model;
//! this backend only ships frames to it and reads detections back.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;

use crate::error::{ServerError, ServerResult};
use crate::traits::FaceEngine;
use shared::Detection;

/// Face engine reached over HTTP.
///
/// Expected sidecar surface: `POST /detect` with `{"image": <base64>}`
/// returning `{"faces": [{"uid", "confidence"}]}`, and `POST /enroll` with
/// `{"id", "name", "images": [<base64>]}` returning `{"saved": <count>}`.
/// A 409 or 503 reply means the model is not trained yet.
pub struct HttpFaceEngine {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFaceEngine {
    /// Create a new client for the sidecar at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn map_status(status: u16) -> ServerError {
        match status {
            409 | 503 => ServerError::ModelUnavailable,
            other => ServerError::FaceEngine {
                message: format!("sidecar returned status {other}"),
            },
        }
    }
}

/// Pull the detection list out of a sidecar `/detect` reply
fn parse_detections(payload: &Value) -> ServerResult<Vec<Detection>> {
    if let Some("model_not_trained") = payload.get("error").and_then(Value::as_str) {
        return Err(ServerError::ModelUnavailable);
    }

    let faces = payload
        .get("faces")
        .cloned()
        .ok_or_else(|| ServerError::FaceEngine {
            message: "no 'faces' field in sidecar response".to_string(),
        })?;

    serde_json::from_value(faces).map_err(|e| ServerError::FaceEngine {
        message: format!("malformed detection list: {e}"),
    })
}

#[async_trait]
impl FaceEngine for HttpFaceEngine {
    async fn detect(&self, frame: &[u8]) -> ServerResult<Vec<Detection>> {
        let body = serde_json::json!({ "image": BASE64.encode(frame) });

        let response = self
            .client
            .post(self.endpoint("detect"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ServerError::FaceEngine {
                message: format!("detect request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(Self::map_status(response.status().as_u16()));
        }

        let payload: Value = response.json().await.map_err(|e| ServerError::FaceEngine {
            message: format!("failed to parse detect response: {e}"),
        })?;

        parse_detections(&payload)
    }

    async fn enroll(&self, uid: &str, name: &str, frames: &[Vec<u8>]) -> ServerResult<usize> {
        let images: Vec<String> = frames.iter().map(|f| BASE64.encode(f)).collect();
        let body = serde_json::json!({ "id": uid, "name": name, "images": images });

        let response = self
            .client
            .post(self.endpoint("enroll"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ServerError::FaceEngine {
                message: format!("enroll request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(Self::map_status(response.status().as_u16()));
        }

        let payload: Value = response.json().await.map_err(|e| ServerError::FaceEngine {
            message: format!("failed to parse enroll response: {e}"),
        })?;

        payload
            .get("saved")
            .and_then(Value::as_u64)
            .map(|n| n as usize)
            .ok_or_else(|| ServerError::FaceEngine {
                message: "no 'saved' count in enroll response".to_string(),
            })
    }
}
