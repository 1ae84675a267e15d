//! Output sink
//!
//! The core pushes typed events through this trait; rendering, persistence,
//! and transport live entirely on the other side of it. Only geometry-free
//! data crosses: alerts, log entries, and state notifications.

use crate::types::{
    AlertEvent, AlertKind, ConfidenceLevel, GazeDirection, HeadDirection, LogEntry, Presence,
    SessionState,
};

/// Receiver for everything the monitoring core emits. All methods default
/// to no-ops so implementations subscribe only to what they need.
pub trait EventSink {
    /// A threshold-crossing or pattern alert fired.
    fn alert(&mut self, _event: &AlertEvent) {}

    /// A behavior log entry was produced (alerts are mirrored here too).
    fn log(&mut self, _entry: &LogEntry) {}

    /// The session state machine moved.
    fn state_changed(&mut self, _state: SessionState) {}

    /// The confidence band moved (not called for same-band score drift).
    fn confidence_changed(&mut self, _level: ConfidenceLevel, _score: f64) {}

    /// The debounced gaze direction changed.
    fn gaze_changed(&mut self, _direction: GazeDirection) {}

    /// The debounced head direction changed.
    fn head_changed(&mut self, _direction: HeadDirection) {}

    /// The subject appeared in or vanished from the frame.
    fn presence_changed(&mut self, _presence: Presence) {}
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {}

/// Sink that records everything it receives, in arrival order. Backs the
/// replay CLI and most tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub alerts: Vec<AlertEvent>,
    pub log: Vec<LogEntry>,
    pub states: Vec<SessionState>,
    pub confidence_changes: Vec<(ConfidenceLevel, f64)>,
    pub gaze_changes: Vec<GazeDirection>,
    pub head_changes: Vec<HeadDirection>,
    pub presence_changes: Vec<Presence>,
}

impl RecordingSink {
    pub fn alert_count(&self, kind: AlertKind) -> usize {
        self.alerts.iter().filter(|a| a.kind == kind).count()
    }
}

impl EventSink for RecordingSink {
    fn alert(&mut self, event: &AlertEvent) {
        self.alerts.push(event.clone());
    }

    fn log(&mut self, entry: &LogEntry) {
        self.log.push(entry.clone());
    }

    fn state_changed(&mut self, state: SessionState) {
        self.states.push(state);
    }

    fn confidence_changed(&mut self, level: ConfidenceLevel, score: f64) {
        self.confidence_changes.push((level, score));
    }

    fn gaze_changed(&mut self, direction: GazeDirection) {
        self.gaze_changes.push(direction);
    }

    fn head_changed(&mut self, direction: HeadDirection) {
        self.head_changes.push(direction);
    }

    fn presence_changed(&mut self, presence: Presence) {
        self.presence_changes.push(presence);
    }
}
