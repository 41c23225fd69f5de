//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    engine::{ceil_millis, Countdown, CountdownSnapshot, NotificationSink, Sequence},
    services::{Announcer, Store, TimerRecord},
};
use super::{Settings, WarningMonitor};

/// Remaining-time update of one countdown, fanned out to display subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub id: String,
    pub remaining_ms: u64,
}

/// Playback summary used by the status endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceStatus {
    pub active: Option<CountdownSnapshot>,
    pub running: bool,
    pub completed: bool,
    pub warning_active: bool,
    pub count: usize,
}

/// Queue used when nothing is stored yet or the stored queue is unreadable
pub fn default_queue() -> Vec<TimerRecord> {
    vec![
        TimerRecord {
            id: Uuid::new_v4().to_string(),
            label: "Introduction".to_string(),
            duration: 10 * 1000,
        },
        TimerRecord {
            id: Uuid::new_v4().to_string(),
            label: "Main Topic".to_string(),
            duration: 20 * 1000,
        },
    ]
}

/// Main application state that owns the sequence and its collaborators
pub struct AppState {
    /// The sequencing engine; every mutation goes through this lock
    pub sequence: Arc<Mutex<Sequence>>,
    pub settings: Arc<Mutex<Settings>>,
    pub warning_monitor: Arc<Mutex<WarningMonitor>>,
    pub announcer: Arc<Announcer>,
    pub store: Arc<dyn Store>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Channel for countdown progress notifications
    pub progress_tx: broadcast::Sender<Progress>,
}

impl AppState {
    /// Create the state, restoring settings and queue from `store`
    pub fn new(port: u16, host: String, store: Arc<dyn Store>) -> Self {
        let settings = match store.load_settings() {
            Ok(Some(settings)) => settings,
            Ok(None) => Settings::default(),
            Err(e) => {
                warn!("Failed to load settings, using defaults: {}", e);
                Settings::default()
            }
        };

        let records = match store.load_queue() {
            Ok(Some(records)) if !records.is_empty() => records,
            Ok(_) => {
                info!("No saved queue, starting with the default timers");
                default_queue()
            }
            Err(e) => {
                warn!("Failed to load saved queue, starting with the default timers: {}", e);
                default_queue()
            }
        };

        let announcer = Arc::new(Announcer::new(&settings));
        let sink: Arc<dyn NotificationSink> = announcer.clone();
        let (progress_tx, _) = broadcast::channel(256);

        let state = Self {
            sequence: Arc::new(Mutex::new(Sequence::new(sink))),
            warning_monitor: Arc::new(Mutex::new(WarningMonitor::new(settings.warning_seconds))),
            settings: Arc::new(Mutex::new(settings)),
            announcer,
            store,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            progress_tx,
        };

        if let Ok(mut sequence) = state.sequence.lock() {
            for record in records {
                if sequence.get(&record.id).is_some() {
                    warn!("Skipping saved timer with duplicate id {}", record.id);
                    continue;
                }
                sequence.append(state.countdown_for(record.id, record.label, record.duration));
            }
            info!("Loaded {} timers", sequence.len());
        }

        state
    }

    /// Build a countdown wired to the progress channel
    fn countdown_for(&self, id: String, label: String, duration_ms: u64) -> Countdown {
        let mut countdown = Countdown::new(id, label, duration_ms);
        let tx = self.progress_tx.clone();
        countdown.on_progress(move |id, remaining| {
            // Nobody listening is fine
            let _ = tx.send(Progress {
                id: id.to_string(),
                remaining_ms: ceil_millis(remaining),
            });
        });
        countdown
    }

    /// Apply `operation` to the sequence under its lock and record the action.
    ///
    /// When `persist` is set the queue is saved afterwards.
    pub fn update_sequence<F, R>(&self, action: &str, persist: bool, operation: F) -> Result<R, String>
    where
        F: FnOnce(&mut Sequence) -> R,
    {
        let mut sequence = self.sequence.lock()
            .map_err(|e| format!("Failed to lock sequence: {}", e))?;

        let result = operation(&mut *sequence);
        let records: Option<Vec<TimerRecord>> = persist.then(|| {
            sequence.get_all().iter().map(TimerRecord::from).collect()
        });
        drop(sequence); // Release the lock before touching the store

        if let Some(records) = records {
            if let Err(e) = self.store.save_queue(&records) {
                error!("Failed to save queue: {}", e);
            }
        }

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok(result)
    }

    /// Read from the sequence without recording an action
    pub fn read_sequence<F, R>(&self, reader: F) -> Result<R, String>
    where
        F: FnOnce(&Sequence) -> R,
    {
        self.sequence.lock()
            .map(|sequence| reader(&*sequence))
            .map_err(|e| format!("Failed to lock sequence: {}", e))
    }

    pub fn start(&self) -> Result<(), String> {
        let now = Instant::now();
        let restarted = self.update_sequence("start", false, |sequence| {
            let restarting = sequence.is_completed();
            sequence.start(now);
            restarting
        })?;
        if restarted {
            self.rearm_warning();
        }
        Ok(())
    }

    pub fn pause(&self) -> Result<(), String> {
        self.update_sequence("pause", false, Sequence::pause)
    }

    pub fn skip(&self) -> Result<(), String> {
        let now = Instant::now();
        self.update_sequence("skip", false, |sequence| sequence.skip(now))
    }

    pub fn reset(&self) -> Result<(), String> {
        self.update_sequence("reset", false, Sequence::reset_all)?;
        self.rearm_warning();
        Ok(())
    }

    fn rearm_warning(&self) {
        match self.warning_monitor.lock() {
            Ok(mut monitor) => monitor.rearm(),
            Err(e) => warn!("Failed to lock warning monitor: {}", e),
        }
    }

    /// Append a new timer. A missing id gets a fresh uuid and a missing
    /// label becomes `Timer N`.
    ///
    /// Returns `None` without appending if `id` is already taken.
    pub fn add_timer(
        &self,
        id: Option<String>,
        label: Option<String>,
        duration_ms: u64,
    ) -> Result<Option<CountdownSnapshot>, String> {
        let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());

        let added = self.update_sequence("add", true, |sequence| {
            if sequence.get(&id).is_some() {
                return None;
            }
            let label = label.unwrap_or_else(|| format!("Timer {}", sequence.len() + 1));
            info!("Adding timer {} ({}, {}ms)", id, label, duration_ms);
            sequence.append(self.countdown_for(id.clone(), label, duration_ms));
            sequence.get_all().pop()
        })?;

        if added.is_none() {
            warn!("Rejected timer with duplicate id {}", id);
        }
        Ok(added)
    }

    /// Remove a timer, returning `false` if no timer has that id
    pub fn remove_timer(&self, id: &str) -> Result<bool, String> {
        let removed = self.update_sequence("remove", true, |sequence| sequence.remove(id))?;
        if removed {
            info!("Removed timer {}", id);
        } else {
            warn!("Remove requested for unknown timer {}", id);
        }
        Ok(removed)
    }

    /// Edit label and/or duration of a timer. A duration change resets it.
    pub fn edit_timer(
        &self,
        id: &str,
        label: Option<String>,
        duration_ms: Option<u64>,
    ) -> Result<Option<CountdownSnapshot>, String> {
        let resets = duration_ms.is_some();
        let edited = self.update_sequence("edit", true, |sequence| {
            if sequence.get(id).is_none() {
                return None;
            }
            if let Some(label) = label {
                sequence.set_label(id, label);
            }
            if let Some(duration_ms) = duration_ms {
                sequence.set_duration(id, duration_ms);
            }
            sequence.get(id)
        })?;
        if resets && edited.is_some() {
            self.rearm_warning();
        }
        Ok(edited)
    }

    /// All timers in playback order plus the active id
    pub fn list_timers(&self) -> Result<(Vec<CountdownSnapshot>, Option<String>), String> {
        self.read_sequence(|sequence| {
            (sequence.get_all(), sequence.active_id().map(str::to_string))
        })
    }

    /// Advance the engine to `now` and run the warning check on the result
    pub fn tick(&self, now: Instant) -> Result<(), String> {
        let active = {
            let mut sequence = self.sequence.lock()
                .map_err(|e| format!("Failed to lock sequence: {}", e))?;
            sequence.tick(now);
            sequence.active()
        };

        let fire = self.warning_monitor.lock()
            .map(|mut monitor| monitor.observe(active.as_ref()))
            .map_err(|e| format!("Failed to lock warning monitor: {}", e))?;

        if let Some(seconds) = fire {
            info!("Warning threshold reached: {}s remaining", seconds);
            self.announcer.warning(seconds);
        }
        Ok(())
    }

    pub fn get_status(&self) -> Result<SequenceStatus, String> {
        let warning_active = self.warning_monitor.lock()
            .map(|monitor| monitor.is_warning_active())
            .map_err(|e| format!("Failed to lock warning monitor: {}", e))?;

        self.read_sequence(|sequence| SequenceStatus {
            active: sequence.active(),
            running: sequence.is_running(),
            completed: sequence.is_completed(),
            warning_active,
            count: sequence.len(),
        })
    }

    pub fn get_settings(&self) -> Result<Settings, String> {
        self.settings.lock()
            .map(|settings| settings.clone())
            .map_err(|e| format!("Failed to lock settings: {}", e))
    }

    /// Validate, apply and persist new settings
    pub fn update_settings(&self, new_settings: Settings) -> Result<Settings, String> {
        new_settings.validate()?;

        let mut settings = self.settings.lock()
            .map_err(|e| format!("Failed to lock settings: {}", e))?;
        *settings = new_settings.clone();
        drop(settings);

        self.announcer.apply_settings(&new_settings);
        if let Ok(mut monitor) = self.warning_monitor.lock() {
            monitor.set_threshold(new_settings.warning_seconds);
        }
        if let Err(e) = self.store.save_settings(&new_settings) {
            error!("Failed to save settings: {}", e);
        }

        info!("Settings updated: {:?}", new_settings);
        Ok(new_settings)
    }

    /// Receive progress updates of every countdown from now on
    pub fn subscribe_progress(&self) -> broadcast::Receiver<Progress> {
        self.progress_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::HashSet, time::Duration};
    use crate::services::MemoryStore;

    fn empty_state() -> AppState {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(0, "127.0.0.1".to_string(), store);
        state.update_sequence("clear", false, |sequence| {
            for snapshot in sequence.get_all() {
                sequence.remove(&snapshot.id);
            }
        })
        .unwrap();
        state
    }

    #[test]
    fn progress_rounds_sub_millisecond_remaining_up() {
        let state = empty_state();
        let mut rx = state.subscribe_progress();

        let mut countdown = state.countdown_for("a".to_string(), "A".to_string(), 1000);
        let t0 = Instant::now();
        countdown.start(t0);
        countdown.tick(t0 + Duration::from_micros(999_500));

        let progress = rx.try_recv().unwrap();
        assert_eq!(progress, Progress { id: "a".to_string(), remaining_ms: 1 });
        assert_eq!(countdown.state(), crate::engine::CountdownState::Running);
    }

    #[test]
    fn duplicate_id_is_rejected_without_appending() {
        let state = empty_state();
        assert!(state.add_timer(Some("a".to_string()), None, 1000).unwrap().is_some());
        assert!(state.add_timer(Some("a".to_string()), Some("Dup".to_string()), 1000).unwrap().is_none());

        let (timers, active) = state.list_timers().unwrap();
        assert_eq!(timers.len(), 1);
        assert_eq!(timers[0].label, "Timer 1");
        assert_eq!(active.as_deref(), Some("a"));
    }

    #[test]
    fn concurrent_adds_get_distinct_default_labels() {
        let state = empty_state();
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..4 {
                        state.add_timer(None, None, 1000).unwrap();
                    }
                });
            }
        });

        let (timers, _) = state.list_timers().unwrap();
        let labels: HashSet<_> = timers.iter().map(|t| t.label.clone()).collect();
        assert_eq!(timers.len(), 32);
        assert_eq!(labels.len(), 32);
        assert!(labels.contains("Timer 32"));
    }
}
