//! API request and response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    engine::{CountdownSnapshot, CountdownState},
    state::SequenceStatus,
    utils::{format_duration, format_remaining},
};

/// One timer as shown to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerView {
    pub id: String,
    pub label: String,
    pub duration_ms: u64,
    /// Configured duration as `MM:SS`
    pub duration: String,
    pub remaining_ms: u64,
    /// Remaining time as `MM:SS`, partial seconds rounded up
    pub remaining: String,
    pub state: CountdownState,
    pub active: bool,
}

impl TimerView {
    pub fn new(snapshot: CountdownSnapshot, active: bool) -> Self {
        Self {
            duration: format_duration(snapshot.duration_ms),
            remaining: format_remaining(snapshot.remaining_ms),
            id: snapshot.id,
            label: snapshot.label,
            duration_ms: snapshot.duration_ms,
            remaining_ms: snapshot.remaining_ms,
            state: snapshot.state,
            active,
        }
    }
}

/// Playback state returned by the control endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackView {
    pub active: Option<TimerView>,
    pub running: bool,
    pub completed: bool,
    pub warning_active: bool,
    pub count: usize,
}

impl From<SequenceStatus> for PlaybackView {
    fn from(status: SequenceStatus) -> Self {
        Self {
            active: status.active.map(|snapshot| TimerView::new(snapshot, true)),
            running: status.running,
            completed: status.completed,
            warning_active: status.warning_active,
            count: status.count,
        }
    }
}

/// API response structure for control endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub playback: PlaybackView,
}

impl ApiResponse {
    /// Create a successful response
    pub fn ok(message: impl Into<String>, playback: PlaybackView) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            playback,
        }
    }
}

/// Status response with server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub playback: PlaybackView,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Ordered timer listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerListResponse {
    pub timers: Vec<TimerView>,
    pub active_id: Option<String>,
}

/// Body of `POST /timers`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddTimerRequest {
    pub id: Option<String>,
    pub label: Option<String>,
    pub duration_ms: Option<u64>,
    /// Alternative to `duration_ms`, as `MM:SS`
    pub duration: Option<String>,
}

/// Body of `PATCH /timers/:id`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditTimerRequest {
    pub label: Option<String>,
    pub duration_ms: Option<u64>,
    pub duration: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Error body sent with every non-2xx response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Errors returned by the HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<String> for ApiError {
    fn from(message: String) -> Self {
        Self::Internal(message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorResponse {
            status: "error".to_string(),
            message: self.to_string(),
            timestamp: Utc::now(),
        };
        (status, Json(body)).into_response()
    }
}
