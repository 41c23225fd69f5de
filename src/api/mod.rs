//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Playback control
        .route("/start", post(start_handler))
        .route("/pause", post(pause_handler))
        .route("/skip", post(skip_handler))
        .route("/reset", post(reset_handler))
        // Queue management
        .route("/timers", get(list_timers_handler).post(add_timer_handler))
        .route("/timers/:id", patch(edit_timer_handler).delete(remove_timer_handler))
        .route("/settings", get(get_settings_handler).put(put_settings_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
