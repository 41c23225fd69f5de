//! Ordered sequence of countdowns with a single active cursor

use std::{fmt, sync::Arc, time::Instant};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::{Countdown, CountdownState, NotificationSink, NullSink};

/// Stable identity the sequence assigns to each member it owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key(u64);

/// Read-only copy of one member at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownSnapshot {
    pub id: String,
    pub label: String,
    pub duration_ms: u64,
    pub remaining_ms: u64,
    pub state: CountdownState,
}

impl From<&Countdown> for CountdownSnapshot {
    fn from(countdown: &Countdown) -> Self {
        Self {
            id: countdown.id().to_string(),
            label: countdown.label().to_string(),
            duration_ms: countdown.duration_ms(),
            remaining_ms: countdown.remaining_ms(),
            state: countdown.state(),
        }
    }
}

struct Entry {
    key: Key,
    countdown: Countdown,
}

/// Plays its countdowns one after another in append order.
///
/// Only the member under the cursor is ever started, so at most one
/// countdown is running at a time. Members signal completion over a
/// channel carrying their [`Key`]; [`Sequence::tick`] drains it and
/// advances the cursor.
pub struct Sequence {
    entries: Vec<Entry>,
    active: Option<Key>,
    completed: bool,
    next_key: u64,
    sink: Arc<dyn NotificationSink>,
    completions_tx: mpsc::UnboundedSender<Key>,
    completions_rx: mpsc::UnboundedReceiver<Key>,
}

impl Sequence {
    /// Create an empty sequence reporting to `sink`
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            entries: Vec::new(),
            active: None,
            completed: false,
            next_key: 0,
            sink,
            completions_tx,
            completions_rx,
        }
    }

    /// Add a countdown at the tail. The first member becomes active.
    pub fn append(&mut self, mut countdown: Countdown) -> Key {
        let key = Key(self.next_key);
        self.next_key += 1;

        let tx = self.completions_tx.clone();
        countdown.on_complete(move |_| {
            // The receiver lives as long as the sequence that owns this countdown
            let _ = tx.send(key);
        });

        if self.entries.is_empty() {
            self.active = Some(key);
        }
        debug!("Appended countdown {} ({})", countdown.id(), countdown.label());
        self.entries.push(Entry { key, countdown });
        key
    }

    /// Remove the first member with `id`.
    ///
    /// Removing the active member pauses it and moves the cursor to its
    /// successor, else its predecessor, else nowhere. Returns `false` if no
    /// member has that id.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(pos) = self.position_of_id(id) else {
            return false;
        };
        let key = self.entries[pos].key;

        if self.active == Some(key) {
            self.entries[pos].countdown.pause();
            let successor = self.entries.get(pos + 1);
            let predecessor = pos.checked_sub(1).and_then(|p| self.entries.get(p));
            self.active = successor.or(predecessor).map(|entry| entry.key);
        }

        let removed = self.entries.remove(pos);
        debug!("Removed countdown {} ({})", removed.countdown.id(), removed.countdown.label());
        true
    }

    /// Start the active member. After a full run-out the whole sequence is
    /// reset first so playback restarts from the first member.
    pub fn start(&mut self, now: Instant) {
        if self.completed {
            info!("Sequence completed earlier, restarting from the first countdown");
            self.reset_all();
        }

        let Some(pos) = self.active_position() else {
            return;
        };
        let countdown = &mut self.entries[pos].countdown;
        if countdown.start(now) {
            info!("Started countdown {} ({})", countdown.id(), countdown.label());
            self.sink.started(countdown.label());
        }
    }

    pub fn pause(&mut self) {
        if let Some(pos) = self.active_position() {
            let countdown = &mut self.entries[pos].countdown;
            if countdown.pause() {
                info!("Paused countdown {} ({})", countdown.id(), countdown.label());
            }
        }
    }

    /// Pause the active member and start its successor. On the last member
    /// the cursor stays put and the sink is told the sequence finished.
    pub fn skip(&mut self, now: Instant) {
        let Some(pos) = self.active_position() else {
            return;
        };
        self.entries[pos].countdown.pause();

        match self.entries.get_mut(pos + 1) {
            Some(next) => {
                info!("Skipping to countdown {} ({})", next.countdown.id(), next.countdown.label());
                self.active = Some(next.key);
                if next.countdown.start(now) {
                    self.sink.started(next.countdown.label());
                }
            }
            None => {
                info!("Skipped past the last countdown");
                self.sink.finished();
            }
        }
    }

    /// Reset every member, rewind the cursor and clear the completed flag
    pub fn reset_all(&mut self) {
        for entry in self.entries.iter_mut() {
            entry.countdown.reset();
        }
        self.active = self.entries.first().map(|entry| entry.key);
        self.completed = false;
        debug!("Reset all {} countdowns", self.entries.len());
    }

    /// Relabel the first member with `id`
    pub fn set_label(&mut self, id: &str, label: impl Into<String>) -> bool {
        match self.position_of_id(id) {
            Some(pos) => {
                self.entries[pos].countdown.set_label(label);
                true
            }
            None => false,
        }
    }

    /// Change the duration of the first member with `id`, forcing it back
    /// to idle. A running member is not restarted.
    pub fn set_duration(&mut self, id: &str, duration_ms: u64) -> bool {
        match self.position_of_id(id) {
            Some(pos) => {
                self.entries[pos].countdown.set_duration(duration_ms);
                true
            }
            None => false,
        }
    }

    /// Advance the active member's clock and react to any completion
    pub fn tick(&mut self, now: Instant) {
        if let Some(pos) = self.active_position() {
            self.entries[pos].countdown.tick(now);
        }
        while let Ok(key) = self.completions_rx.try_recv() {
            self.handle_completion(key, now);
        }
    }

    fn handle_completion(&mut self, key: Key, now: Instant) {
        if self.active != Some(key) {
            debug!("Ignoring completion from inactive countdown {:?}", key);
            return;
        }
        let Some(pos) = self.position_of_key(key) else {
            return;
        };
        if self.entries[pos].countdown.state() != CountdownState::Completed {
            debug!("Ignoring stale completion from countdown {:?}", key);
            return;
        }

        match self.entries.get_mut(pos + 1) {
            Some(next) => {
                info!("Advancing to countdown {} ({})", next.countdown.id(), next.countdown.label());
                self.sink.transition(next.countdown.label());
                self.active = Some(next.key);
                next.countdown.start(now);
            }
            None => {
                info!("All countdowns finished");
                self.completed = true;
                self.sink.finished();
            }
        }
    }

    /// Snapshot of every member in playback order
    pub fn get_all(&self) -> Vec<CountdownSnapshot> {
        self.entries
            .iter()
            .map(|entry| CountdownSnapshot::from(&entry.countdown))
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<CountdownSnapshot> {
        self.position_of_id(id)
            .map(|pos| CountdownSnapshot::from(&self.entries[pos].countdown))
    }

    /// Snapshot of the member under the cursor
    pub fn active(&self) -> Option<CountdownSnapshot> {
        self.active_position()
            .map(|pos| CountdownSnapshot::from(&self.entries[pos].countdown))
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_position().map(|pos| self.entries[pos].countdown.id())
    }

    /// True once the last member ran out, until the next reset
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_running(&self) -> bool {
        self.active_position()
            .is_some_and(|pos| self.entries[pos].countdown.is_running())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn active_position(&self) -> Option<usize> {
        self.active.and_then(|key| self.position_of_key(key))
    }

    fn position_of_key(&self, key: Key) -> Option<usize> {
        self.entries.iter().position(|entry| entry.key == key)
    }

    fn position_of_id(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.countdown.id() == id)
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new(Arc::new(NullSink))
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("entries", &self.get_all())
            .field("active", &self.active_id())
            .field("completed", &self.completed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Mutex, time::Duration};

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Transition(String),
        Finished,
        Started(String),
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Event>>);

    impl Recorder {
        fn events(&self) -> Vec<Event> {
            self.0.lock().unwrap().clone()
        }
    }

    impl NotificationSink for Recorder {
        fn transition(&self, next_label: &str) {
            self.0.lock().unwrap().push(Event::Transition(next_label.to_string()));
        }
        fn finished(&self) {
            self.0.lock().unwrap().push(Event::Finished);
        }
        fn started(&self, label: &str) {
            self.0.lock().unwrap().push(Event::Started(label.to_string()));
        }
        fn warning(&self, _seconds_remaining: u64) {}
    }

    fn sequence(items: &[(&str, u64)]) -> (Sequence, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let mut seq = Sequence::new(recorder.clone());
        for (label, duration) in items {
            seq.append(Countdown::new(label.to_lowercase(), *label, *duration));
        }
        (seq, recorder)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn first_appended_item_becomes_active() {
        let (mut seq, _) = sequence(&[]);
        assert_eq!(seq.active_id(), None);
        seq.append(Countdown::new("a", "A", 1000));
        seq.append(Countdown::new("b", "B", 1000));
        assert_eq!(seq.active_id(), Some("a"));
    }

    #[test]
    fn empty_sequence_operations_are_noops() {
        let (mut seq, recorder) = sequence(&[]);
        let t0 = Instant::now();
        seq.start(t0);
        seq.pause();
        seq.skip(t0);
        seq.tick(t0 + ms(100));
        assert!(seq.get_all().is_empty());
        assert!(recorder.events().is_empty());
        assert!(!seq.remove("missing"));
    }

    #[test]
    fn auto_advance_then_finish_then_restart() {
        let (mut seq, recorder) = sequence(&[("A", 3000), ("B", 2000)]);
        let t0 = Instant::now();

        seq.start(t0);
        seq.tick(t0 + ms(1500));
        seq.tick(t0 + ms(3000));
        assert_eq!(seq.active_id(), Some("b"));
        assert!(seq.is_running());
        assert_eq!(seq.get("a").unwrap().state, CountdownState::Completed);

        seq.tick(t0 + ms(4000));
        seq.tick(t0 + ms(5000));
        assert!(seq.is_completed());
        assert_eq!(
            recorder.events(),
            vec![
                Event::Started("A".into()),
                Event::Transition("B".into()),
                Event::Finished,
            ]
        );

        seq.start(t0 + ms(6000));
        let active = seq.active().unwrap();
        assert_eq!(active.id, "a");
        assert_eq!(active.state, CountdownState::Running);
        assert_eq!(active.remaining_ms, 3000);
        assert!(!seq.is_completed());
    }

    #[test]
    fn skip_visits_every_item_once_then_finishes() {
        let (mut seq, recorder) = sequence(&[("A", 1000), ("B", 1000), ("C", 1000)]);
        let t0 = Instant::now();
        let mut visited = vec![seq.active_id().unwrap().to_string()];

        for _ in 0..2 {
            seq.skip(t0);
            visited.push(seq.active_id().unwrap().to_string());
        }
        assert_eq!(visited, vec!["a", "b", "c"]);
        assert_eq!(seq.active().unwrap().state, CountdownState::Running);

        seq.skip(t0);
        assert_eq!(seq.active_id(), Some("c"));
        assert_eq!(seq.active().unwrap().state, CountdownState::Paused);
        assert_eq!(recorder.events().last(), Some(&Event::Finished));
    }

    #[test]
    fn skip_pauses_without_resetting_the_skipped_item() {
        let (mut seq, _) = sequence(&[("A", 3000), ("B", 2000)]);
        let t0 = Instant::now();
        seq.start(t0);
        seq.tick(t0 + ms(1000));
        seq.skip(t0 + ms(1000));

        let a = seq.get("a").unwrap();
        assert_eq!(a.state, CountdownState::Paused);
        assert_eq!(a.remaining_ms, 2000);
    }

    #[test]
    fn reset_all_is_idempotent() {
        let (mut seq, _) = sequence(&[("A", 3000), ("B", 2000)]);
        let t0 = Instant::now();
        seq.start(t0);
        seq.tick(t0 + ms(3500));

        seq.reset_all();
        let once = (seq.get_all(), seq.active_id().map(str::to_string), seq.is_completed());
        seq.reset_all();
        let twice = (seq.get_all(), seq.active_id().map(str::to_string), seq.is_completed());

        assert_eq!(once, twice);
        assert_eq!(once.1.as_deref(), Some("a"));
        assert!(once.0.iter().all(|c| c.remaining_ms == c.duration_ms));
        assert!(once.0.iter().all(|c| c.state == CountdownState::Idle));
    }

    #[test]
    fn removing_active_moves_to_successor() {
        let (mut seq, _) = sequence(&[("A", 3000), ("B", 2000)]);
        let t0 = Instant::now();
        seq.start(t0);
        assert!(seq.remove("a"));
        assert_eq!(seq.active_id(), Some("b"));
        assert!(!seq.is_completed());
        // The successor is not started by the removal
        assert_eq!(seq.active().unwrap().state, CountdownState::Idle);
    }

    #[test]
    fn removing_active_last_item_moves_to_predecessor() {
        let (mut seq, _) = sequence(&[("A", 3000), ("B", 2000)]);
        let t0 = Instant::now();
        seq.skip(t0);
        assert!(seq.remove("b"));
        assert_eq!(seq.active_id(), Some("a"));
    }

    #[test]
    fn removing_sole_item_clears_cursor_until_append() {
        let (mut seq, _) = sequence(&[("A", 3000)]);
        let t0 = Instant::now();
        seq.start(t0);
        assert!(seq.remove("a"));
        assert_eq!(seq.active_id(), None);
        seq.start(t0);
        assert!(!seq.is_running());

        seq.append(Countdown::new("z", "Z", 1000));
        assert_eq!(seq.active_id(), Some("z"));
    }

    #[test]
    fn removing_inactive_item_keeps_cursor() {
        let (mut seq, _) = sequence(&[("A", 3000), ("B", 2000), ("C", 1000)]);
        assert!(seq.remove("b"));
        assert_eq!(seq.active_id(), Some("a"));
        let ids: Vec<_> = seq.get_all().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn completion_of_removed_item_is_ignored() {
        let (mut seq, recorder) = sequence(&[("A", 1000), ("B", 1000)]);
        let t0 = Instant::now();
        seq.start(t0);
        // Queue a completion as if A fired, then remove A before draining
        let stale = seq.active.unwrap();
        seq.completions_tx.send(stale).unwrap();
        seq.remove("a");
        seq.tick(t0 + ms(10));

        assert_eq!(seq.active_id(), Some("b"));
        assert!(!recorder.events().contains(&Event::Transition("B".into())));
    }

    #[test]
    fn editing_active_duration_forces_idle() {
        let (mut seq, _) = sequence(&[("A", 3000)]);
        let t0 = Instant::now();
        seq.start(t0);
        seq.tick(t0 + ms(1000));
        assert!(seq.set_duration("a", 6000));

        let a = seq.active().unwrap();
        assert_eq!(a.state, CountdownState::Idle);
        assert_eq!(a.remaining_ms, 6000);
        assert!(!seq.set_duration("missing", 10));
    }

    #[test]
    fn get_all_is_a_detached_copy() {
        let (seq, _) = sequence(&[("A", 3000)]);
        let mut snapshot = seq.get_all();
        snapshot[0].label = "changed".into();
        snapshot.clear();
        assert_eq!(seq.get_all()[0].label, "A");
    }

    #[test]
    fn start_only_announces_an_actual_transition() {
        let (mut seq, recorder) = sequence(&[("A", 3000)]);
        let t0 = Instant::now();
        seq.start(t0);
        seq.start(t0 + ms(5));
        assert_eq!(recorder.events(), vec![Event::Started("A".into())]);
    }
}
