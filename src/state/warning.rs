//! Warning-threshold tracking for the active countdown

use crate::engine::{CountdownSnapshot, CountdownState};

/// Watches the active countdown and reports when it enters the final
/// `threshold_seconds` of its run.
///
/// The announcement fires once per run; it is re-armed when the active
/// countdown changes, goes back to idle or completes, climbs above the
/// threshold again, or when the host calls [`WarningMonitor::rearm`].
#[derive(Debug, Clone, Default)]
pub struct WarningMonitor {
    threshold_seconds: u32,
    fired_for: Option<String>,
    warning_active: bool,
}

impl WarningMonitor {
    pub fn new(threshold_seconds: u32) -> Self {
        Self {
            threshold_seconds,
            fired_for: None,
            warning_active: false,
        }
    }

    pub fn threshold_seconds(&self) -> u32 {
        self.threshold_seconds
    }

    pub fn set_threshold(&mut self, threshold_seconds: u32) {
        self.threshold_seconds = threshold_seconds;
    }

    /// Allow the next crossing to fire again, e.g. after a reset
    pub fn rearm(&mut self) {
        self.fired_for = None;
    }

    /// Whether the visual warning should currently be shown
    pub fn is_warning_active(&self) -> bool {
        self.warning_active
    }

    /// Feed the latest snapshot of the active countdown.
    ///
    /// Returns the whole seconds remaining when the warning announcement
    /// should fire.
    pub fn observe(&mut self, active: Option<&CountdownSnapshot>) -> Option<u64> {
        let Some(countdown) = active else {
            self.fired_for = None;
            self.warning_active = false;
            return None;
        };

        let threshold = u64::from(self.threshold_seconds);
        let seconds = countdown.remaining_ms.div_ceil(1000);

        let rearm = matches!(countdown.state, CountdownState::Idle | CountdownState::Completed)
            || seconds > threshold
            || self.fired_for.as_deref().is_some_and(|id| id != countdown.id);
        if rearm {
            self.fired_for = None;
        }

        self.warning_active = countdown.state == CountdownState::Running
            && threshold > 0
            && seconds > 0
            && seconds <= threshold;

        if self.warning_active && self.fired_for.is_none() {
            self.fired_for = Some(countdown.id.clone());
            return Some(seconds);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: &str, remaining_ms: u64, state: CountdownState) -> CountdownSnapshot {
        CountdownSnapshot {
            id: id.to_string(),
            label: id.to_uppercase(),
            duration_ms: 30_000,
            remaining_ms,
            state,
        }
    }

    #[test]
    fn fires_once_when_crossing_threshold() {
        let mut monitor = WarningMonitor::new(5);
        assert_eq!(monitor.observe(Some(&snapshot("a", 6_000, CountdownState::Running))), None);
        assert!(!monitor.is_warning_active());

        assert_eq!(monitor.observe(Some(&snapshot("a", 4_999, CountdownState::Running))), Some(5));
        assert!(monitor.is_warning_active());
        assert_eq!(monitor.observe(Some(&snapshot("a", 3_000, CountdownState::Running))), None);
        assert!(monitor.is_warning_active());
    }

    #[test]
    fn paused_or_finished_items_show_no_warning() {
        let mut monitor = WarningMonitor::new(5);
        monitor.observe(Some(&snapshot("a", 2_000, CountdownState::Paused)));
        assert!(!monitor.is_warning_active());
        monitor.observe(Some(&snapshot("a", 0, CountdownState::Completed)));
        assert!(!monitor.is_warning_active());
    }

    #[test]
    fn rearms_for_the_next_item_and_after_reset() {
        let mut monitor = WarningMonitor::new(5);
        assert!(monitor.observe(Some(&snapshot("a", 4_000, CountdownState::Running))).is_some());
        assert!(monitor.observe(Some(&snapshot("b", 4_000, CountdownState::Running))).is_some());

        monitor.observe(Some(&snapshot("b", 30_000, CountdownState::Idle)));
        assert!(monitor.observe(Some(&snapshot("b", 2_000, CountdownState::Running))).is_some());
    }

    #[test]
    fn rearms_once_the_item_completes() {
        let mut monitor = WarningMonitor::new(5);
        assert!(monitor.observe(Some(&snapshot("a", 3_000, CountdownState::Running))).is_some());
        monitor.observe(Some(&snapshot("a", 0, CountdownState::Completed)));
        // Restarted run of the same item, never observed as idle
        assert_eq!(monitor.observe(Some(&snapshot("a", 2_900, CountdownState::Running))), Some(3));
    }

    #[test]
    fn explicit_rearm_allows_a_second_warning() {
        let mut monitor = WarningMonitor::new(5);
        assert!(monitor.observe(Some(&snapshot("a", 4_000, CountdownState::Running))).is_some());
        assert!(monitor.observe(Some(&snapshot("a", 3_500, CountdownState::Running))).is_none());
        monitor.rearm();
        assert_eq!(monitor.observe(Some(&snapshot("a", 3_000, CountdownState::Running))), Some(3));
    }

    #[test]
    fn zero_threshold_disables_warning() {
        let mut monitor = WarningMonitor::new(0);
        assert_eq!(monitor.observe(Some(&snapshot("a", 500, CountdownState::Running))), None);
        assert!(!monitor.is_warning_active());
    }
}
