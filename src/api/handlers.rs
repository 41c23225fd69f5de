//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info};

use crate::{
    state::{AppState, Settings},
    utils::parse_duration,
};
use super::responses::{
    AddTimerRequest, ApiError, ApiResponse, EditTimerRequest, HealthResponse, PlaybackView,
    StatusResponse, TimerListResponse, TimerView,
};

/// Duration given to timers added without one
const DEFAULT_DURATION_MS: u64 = 5 * 60 * 1000;

type ApiResult<T> = Result<Json<T>, ApiError>;

fn playback(state: &AppState) -> Result<PlaybackView, ApiError> {
    state.get_status().map(PlaybackView::from).map_err(|e| {
        error!("Failed to read playback status: {}", e);
        ApiError::Internal(e)
    })
}

/// Resolve a requested duration from either field, rejecting zero or
/// unparseable values before they reach the engine
fn requested_duration(duration_ms: Option<u64>, duration: Option<&str>) -> Result<Option<u64>, ApiError> {
    match (duration_ms, duration) {
        (Some(0), _) => Err(ApiError::BadRequest("duration_ms must be at least 1".to_string())),
        (Some(ms), _) => Ok(Some(ms)),
        (None, Some(text)) => parse_duration(text)
            .map(Some)
            .ok_or_else(|| ApiError::BadRequest(format!("invalid duration: {:?}", text))),
        (None, None) => Ok(None),
    }
}

fn clean_label(label: &str) -> String {
    let label = label.trim();
    if label.is_empty() {
        "Untitled".to_string()
    } else {
        label.to_string()
    }
}

/// Handle POST /start - Start or resume the active timer
pub async fn start_handler(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse> {
    state.start()?;
    info!("Start endpoint called");
    Ok(Json(ApiResponse::ok("Sequence started", playback(&state)?)))
}

/// Handle POST /pause - Pause the active timer
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse> {
    state.pause()?;
    info!("Pause endpoint called");
    Ok(Json(ApiResponse::ok("Sequence paused", playback(&state)?)))
}

/// Handle POST /skip - Move on to the next timer
pub async fn skip_handler(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse> {
    state.skip()?;
    info!("Skip endpoint called");
    Ok(Json(ApiResponse::ok("Skipped to the next timer", playback(&state)?)))
}

/// Handle POST /reset - Reset every timer and rewind to the first
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse> {
    state.reset()?;
    info!("Reset endpoint called");
    Ok(Json(ApiResponse::ok("Sequence reset", playback(&state)?)))
}

/// Handle GET /timers - List timers in playback order
pub async fn list_timers_handler(State(state): State<Arc<AppState>>) -> ApiResult<TimerListResponse> {
    let (timers, active_id) = state.list_timers()?;
    let timers = timers
        .into_iter()
        .map(|snapshot| {
            let active = active_id.as_deref() == Some(snapshot.id.as_str());
            TimerView::new(snapshot, active)
        })
        .collect();
    Ok(Json(TimerListResponse { timers, active_id }))
}

/// Handle POST /timers - Append a timer to the queue
pub async fn add_timer_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddTimerRequest>,
) -> Result<(StatusCode, Json<TimerView>), ApiError> {
    let duration_ms = requested_duration(request.duration_ms, request.duration.as_deref())?
        .unwrap_or(DEFAULT_DURATION_MS);
    let label = request.label.as_deref().map(clean_label);
    let requested_id = request.id.clone();

    let Some(snapshot) = state.add_timer(request.id, label, duration_ms)? else {
        let id = requested_id.unwrap_or_default();
        return Err(ApiError::Conflict(format!("timer {} already exists", id)));
    };
    let active = state.list_timers()?.1.as_deref() == Some(snapshot.id.as_str());
    Ok((StatusCode::CREATED, Json(TimerView::new(snapshot, active))))
}

/// Handle PATCH /timers/:id - Edit label and/or duration
pub async fn edit_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<EditTimerRequest>,
) -> ApiResult<TimerView> {
    let duration_ms = requested_duration(request.duration_ms, request.duration.as_deref())?;
    let label = request.label.as_deref().map(clean_label);

    match state.edit_timer(&id, label, duration_ms)? {
        Some(snapshot) => {
            info!("Edited timer {}", id);
            let active = state.list_timers()?.1.as_deref() == Some(id.as_str());
            Ok(Json(TimerView::new(snapshot, active)))
        }
        None => Err(ApiError::NotFound(format!("no timer with id {}", id))),
    }
}

/// Handle DELETE /timers/:id - Remove a timer
pub async fn remove_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse> {
    if !state.remove_timer(&id)? {
        return Err(ApiError::NotFound(format!("no timer with id {}", id)));
    }
    Ok(Json(ApiResponse::ok(format!("Removed timer {}", id), playback(&state)?)))
}

/// Handle GET /settings - Return current settings
pub async fn get_settings_handler(State(state): State<Arc<AppState>>) -> ApiResult<Settings> {
    Ok(Json(state.get_settings()?))
}

/// Handle PUT /settings - Replace settings
pub async fn put_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<Settings>,
) -> ApiResult<Settings> {
    settings.validate().map_err(ApiError::BadRequest)?;
    Ok(Json(state.update_settings(settings)?))
}

/// Handle GET /status - Return current playback status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> ApiResult<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        playback: playback(&state)?,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
