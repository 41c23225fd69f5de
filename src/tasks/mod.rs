//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod announcements;
pub mod ticker;

// Re-export main functions
pub use announcements::announcement_task;
pub use ticker::ticker_task;
