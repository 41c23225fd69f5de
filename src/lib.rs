//! Relay Timer - A sequencing countdown-timer service
//!
//! This library provides an engine that plays an ordered list of countdowns
//! one after another, with pause/skip/reset control and notifications at
//! each transition, plus the HTTP host that drives and persists it.

pub mod config;
pub mod engine;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use engine::{Countdown, CountdownState, NotificationSink, Sequence};
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
