//! Sequencing engine
//!
//! A [`Sequence`] owns an ordered list of [`Countdown`]s, starts the one under
//! its cursor and advances to the next when it runs out, reporting
//! transitions to a [`NotificationSink`]. The engine is synchronous: the host
//! drives it by calling [`Sequence::tick`] with monotonic instants.

pub mod countdown;
pub mod sequence;
pub mod sink;

// Re-export main types
pub use countdown::{ceil_millis, Countdown, CountdownState};
pub use sequence::{CountdownSnapshot, Key, Sequence};
pub use sink::{NotificationSink, NullSink};
