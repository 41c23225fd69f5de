//! Notification sink contract between the sequence and its host

/// Receiver of sequence-level events.
///
/// `transition`, `finished` and `started` are emitted by the
/// [`Sequence`](super::Sequence). `warning` is never called by the engine;
/// the host invokes it from its own observation of countdown progress.
pub trait NotificationSink: Send + Sync {
    /// The sequence auto-advanced to the item labelled `next_label`
    fn transition(&self, next_label: &str);

    /// The last item completed, or was skipped past
    fn finished(&self);

    /// The host explicitly started the item labelled `label`
    fn started(&self, label: &str);

    /// The active item crossed the configured warning threshold
    fn warning(&self, seconds_remaining: u64);
}

/// Sink that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn transition(&self, _next_label: &str) {}
    fn finished(&self) {}
    fn started(&self, _label: &str) {}
    fn warning(&self, _seconds_remaining: u64) {}
}
