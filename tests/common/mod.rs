#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use relay_timer::{Countdown, NotificationSink, Sequence};

/// Sequence-level event captured by [`RecordingSink`]
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Transition(String),
    Finished,
    Started(String),
    Warning(u64),
}

/// Sink that records every event it receives
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl NotificationSink for RecordingSink {
    fn transition(&self, next_label: &str) {
        self.push(Event::Transition(next_label.to_string()));
    }

    fn finished(&self) {
        self.push(Event::Finished);
    }

    fn started(&self, label: &str) {
        self.push(Event::Started(label.to_string()));
    }

    fn warning(&self, seconds_remaining: u64) {
        self.push(Event::Warning(seconds_remaining));
    }
}

/// Build a sequence of `(label, duration_ms)` items, ids being the
/// lowercased labels
pub fn sequence_of(items: &[(&str, u64)]) -> (Sequence, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let mut sequence = Sequence::new(sink.clone());
    for (label, duration_ms) in items {
        sequence.append(Countdown::new(label.to_lowercase(), *label, *duration_ms));
    }
    (sequence, sink)
}
