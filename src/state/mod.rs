//! State management module
//!
//! This module contains the host-side state wrapped around the sequencing
//! engine: settings, the warning monitor and the shared application state.

pub mod app_state;
pub mod settings;
pub mod warning;

// Re-export main types
pub use app_state::{default_queue, AppState, Progress, SequenceStatus};
pub use settings::{Settings, Theme, MAX_WARNING_SECONDS};
pub use warning::WarningMonitor;
