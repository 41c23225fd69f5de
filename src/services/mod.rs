//! Host-side collaborators of the engine
//!
//! This module contains the notification sink adapter that produces audio
//! cues and speech, and the persistence store for the queue and settings.

pub mod announcer;
pub mod store;

// Re-export main types
pub use announcer::{Announcement, AnnouncementKind, Announcer, Cue, Language};
pub use store::{JsonFileStore, MemoryStore, Store, StoreError, TimerRecord};
