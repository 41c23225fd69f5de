//! Single countdown timer and its state machine

use std::{
    fmt,
    time::{Duration, Instant},
};
use serde::{Deserialize, Serialize};

/// Listener invoked with the countdown id and its new remaining time
pub type ProgressListener = Box<dyn FnMut(&str, Duration) + Send>;
/// Listener invoked with the countdown id when it reaches zero
pub type CompletionListener = Box<dyn FnMut(&str) + Send>;

/// Lifecycle state of a countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CountdownState {
    Idle,
    Running,
    Paused,
    Completed,
}

impl fmt::Display for CountdownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "IDLE",
            Self::Running => "RUNNING",
            Self::Paused => "PAUSED",
            Self::Completed => "COMPLETED",
        };
        f.write_str(name)
    }
}

/// A single timer that counts its remaining time down to zero.
///
/// The countdown does not own a clock loop of its own: whoever drives it
/// calls [`Countdown::tick`] at its display cadence with the current
/// monotonic instant, and the elapsed delta since the previous sample is
/// subtracted from `remaining`.
pub struct Countdown {
    id: String,
    label: String,
    duration: Duration,
    remaining: Duration,
    state: CountdownState,
    /// Clock reference for the next delta, present only while running
    last_tick: Option<Instant>,
    progress_listeners: Vec<ProgressListener>,
    completion_listeners: Vec<CompletionListener>,
}

impl Countdown {
    /// Create an idle countdown with its full duration remaining
    pub fn new(id: impl Into<String>, label: impl Into<String>, duration_ms: u64) -> Self {
        let duration = Duration::from_millis(duration_ms);
        Self {
            id: id.into(),
            label: label.into(),
            duration,
            remaining: duration,
            state: CountdownState::Idle,
            last_tick: None,
            progress_listeners: Vec::new(),
            completion_listeners: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn duration_ms(&self) -> u64 {
        duration_to_ms(self.duration)
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Remaining time in whole milliseconds, rounded up so that only an
    /// exhausted countdown reads zero
    pub fn remaining_ms(&self) -> u64 {
        ceil_millis(self.remaining)
    }

    pub fn is_running(&self) -> bool {
        self.state == CountdownState::Running
    }

    /// Subscribe to remaining-time changes
    pub fn on_progress<F>(&mut self, listener: F)
    where
        F: FnMut(&str, Duration) + Send + 'static,
    {
        self.progress_listeners.push(Box::new(listener));
    }

    /// Subscribe to the countdown reaching zero
    pub fn on_complete<F>(&mut self, listener: F)
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.completion_listeners.push(Box::new(listener));
    }

    /// Start or resume the countdown, using `now` as the clock reference.
    ///
    /// Returns `true` if the countdown transitioned into `Running`.
    pub fn start(&mut self, now: Instant) -> bool {
        match self.state {
            CountdownState::Running | CountdownState::Completed => false,
            CountdownState::Idle | CountdownState::Paused => {
                self.state = CountdownState::Running;
                self.last_tick = Some(now);
                true
            }
        }
    }

    /// Pause a running countdown, keeping the last sampled remaining time
    pub fn pause(&mut self) -> bool {
        if self.state != CountdownState::Running {
            return false;
        }
        self.state = CountdownState::Paused;
        self.last_tick = None;
        true
    }

    /// Stop the countdown and restore its full duration
    pub fn reset(&mut self) {
        self.last_tick = None;
        self.state = CountdownState::Idle;
        self.remaining = self.duration;
        self.emit_progress();
    }

    /// Replace the duration. Always resets, even mid-run.
    pub fn set_duration(&mut self, duration_ms: u64) {
        self.duration = Duration::from_millis(duration_ms);
        self.reset();
    }

    /// Sample the clock and advance the countdown.
    ///
    /// A no-op unless running. Returns `true` if this tick completed it.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.state != CountdownState::Running {
            return false;
        }
        let last = self.last_tick.unwrap_or(now);
        let delta = now.saturating_duration_since(last);
        self.last_tick = Some(now);
        self.remaining = self.remaining.saturating_sub(delta);
        self.emit_progress();

        if self.remaining.is_zero() {
            self.complete();
            true
        } else {
            false
        }
    }

    fn complete(&mut self) {
        self.state = CountdownState::Completed;
        self.last_tick = None;
        let id = self.id.clone();
        for listener in self.completion_listeners.iter_mut() {
            listener(&id);
        }
    }

    fn emit_progress(&mut self) {
        let remaining = self.remaining;
        let id = self.id.clone();
        for listener in self.progress_listeners.iter_mut() {
            listener(&id, remaining);
        }
    }
}

impl fmt::Debug for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Countdown")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("duration", &self.duration)
            .field("remaining", &self.remaining)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn duration_to_ms(duration: Duration) -> u64 {
    duration.as_millis() as u64
}

/// Whole milliseconds in `duration`, rounding any fraction up
pub fn ceil_millis(duration: Duration) -> u64 {
    let ms = duration.as_millis() as u64;
    if duration.subsec_nanos() % 1_000_000 != 0 {
        ms + 1
    } else {
        ms
    }
}
