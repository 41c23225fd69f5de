//! Utility functions module
//!
//! This module contains utility functions used throughout the application.

pub mod clock;
pub mod signals;

// Re-export main functions
pub use clock::{format_duration, format_remaining, parse_duration};
pub use signals::shutdown_signal;
