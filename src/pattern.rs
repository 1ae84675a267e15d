//! Pattern detection and confidence fusion
//!
//! Maintains a rolling window of direction history per signal, detects
//! rate-of-change patterns, and aggregates them into a decaying confidence
//! score. This layer is purely additive on top of the debounced trackers:
//! it raises its own alerts but never suppresses theirs.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::profile::SensitivityProfile;
use crate::types::{ConfidenceLevel, GazeDirection, HeadDirection};

/// Cooldown between pattern alerts (ms). Shared across all pattern kinds
/// rather than tracked per kind, trading granularity for flood protection.
pub const EVENT_COOLDOWN_MS: i64 = 2_000;

/// Confidence added per detected pattern.
pub const CONFIDENCE_INCREMENT: f64 = 15.0;

/// Confidence removed per engine update.
pub const CONFIDENCE_DECAY: f64 = 0.5;

/// One direction sample in the rolling history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry<D> {
    pub at: DateTime<Utc>,
    pub direction: D,
}

/// A rapid-gaze-switching detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternAlert {
    /// Direction changes observed within the rapid-switch window.
    pub change_count: u32,
}

/// Outcome of feeding one frame's classifications to the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PatternUpdate {
    pub rapid_gaze_switching: Option<PatternAlert>,
    /// Present only when the confidence band actually moved.
    pub band_change: Option<ConfidenceLevel>,
}

/// Rolling-window pattern detector with decaying confidence.
#[derive(Debug, Clone)]
pub struct PatternEngine {
    gaze_history: VecDeque<HistoryEntry<GazeDirection>>,
    head_history: VecDeque<HistoryEntry<HeadDirection>>,
    last_pattern_alert: Option<DateTime<Utc>>,
    confidence: f64,
    level: ConfidenceLevel,
}

impl Default for PatternEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternEngine {
    pub fn new() -> Self {
        Self {
            gaze_history: VecDeque::new(),
            head_history: VecDeque::new(),
            last_pattern_alert: None,
            confidence: 0.0,
            level: ConfidenceLevel::Low,
        }
    }

    pub fn confidence_score(&self) -> f64 {
        self.confidence
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        self.level
    }

    pub fn gaze_history_len(&self) -> usize {
        self.gaze_history.len()
    }

    /// Drop all history and zero the confidence score.
    pub fn clear(&mut self) {
        self.gaze_history.clear();
        self.head_history.clear();
        self.last_pattern_alert = None;
        self.confidence = 0.0;
        self.level = ConfidenceLevel::Low;
    }

    /// Feed one frame's classifications. Appends to the histories, prunes
    /// entries that fell out of the fusion window, runs the pattern rules,
    /// then applies the per-update decay.
    pub fn update(
        &mut self,
        gaze: GazeDirection,
        head: HeadDirection,
        profile: &SensitivityProfile,
        now: DateTime<Utc>,
    ) -> PatternUpdate {
        self.gaze_history.push_back(HistoryEntry {
            at: now,
            direction: gaze,
        });
        self.head_history.push_back(HistoryEntry {
            at: now,
            direction: head,
        });
        prune(&mut self.gaze_history, profile.fusion_window_ms, now);
        prune(&mut self.head_history, profile.fusion_window_ms, now);

        let mut update = PatternUpdate::default();

        let changes =
            count_direction_changes(&self.gaze_history, profile.rapid_switch_window_ms, now);
        if changes >= profile.rapid_switch_count_threshold && self.cooldown_elapsed(now) {
            self.last_pattern_alert = Some(now);
            self.confidence = (self.confidence + CONFIDENCE_INCREMENT).min(100.0);
            update.rapid_gaze_switching = Some(PatternAlert {
                change_count: changes,
            });
        }

        self.confidence = (self.confidence - CONFIDENCE_DECAY).max(0.0);

        let level = ConfidenceLevel::from_score(self.confidence);
        if level != self.level {
            self.level = level;
            update.band_change = Some(level);
        }

        update
    }

    fn cooldown_elapsed(&self, now: DateTime<Utc>) -> bool {
        match self.last_pattern_alert {
            None => true,
            Some(last) => (now - last).num_milliseconds() >= EVENT_COOLDOWN_MS,
        }
    }
}

/// Count adjacent direction inequalities within the most recent
/// `sub_window_ms` slice of the buffer.
pub fn count_direction_changes<D: Copy + PartialEq>(
    history: &VecDeque<HistoryEntry<D>>,
    sub_window_ms: i64,
    now: DateTime<Utc>,
) -> u32 {
    if history.len() < 2 {
        return 0;
    }

    let cutoff = now - Duration::milliseconds(sub_window_ms);
    let mut changes = 0;
    let mut prev: Option<D> = None;
    for entry in history.iter().filter(|entry| entry.at > cutoff) {
        if let Some(prev) = prev {
            if entry.direction != prev {
                changes += 1;
            }
        }
        prev = Some(entry.direction);
    }
    changes
}

fn prune<D>(history: &mut VecDeque<HistoryEntry<D>>, window_ms: i64, now: DateTime<Utc>) {
    let cutoff = now - Duration::milliseconds(window_ms);
    while history.front().map_or(false, |entry| entry.at <= cutoff) {
        history.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{STANDARD, TOLERANT};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap() + Duration::seconds(secs)
    }

    /// Alternate CENTER/LEFT starting at `start`, one frame per second.
    fn feed_alternating(engine: &mut PatternEngine, start: i64, frames: i64) -> Vec<PatternUpdate> {
        (0..frames)
            .map(|i| {
                let gaze = if i % 2 == 0 {
                    GazeDirection::Center
                } else {
                    GazeDirection::Left
                };
                engine.update(gaze, HeadDirection::FaceCenter, &STANDARD, t(start + i))
            })
            .collect()
    }

    #[test]
    fn test_steady_gaze_never_patterns() {
        let mut engine = PatternEngine::new();
        for i in 0..60 {
            let update = engine.update(
                GazeDirection::Center,
                HeadDirection::FaceCenter,
                &STANDARD,
                t(i),
            );
            assert_eq!(update.rapid_gaze_switching, None);
        }
        assert_eq!(engine.confidence_score(), 0.0);
    }

    #[test]
    fn test_rapid_switching_fires_at_count_threshold() {
        let mut engine = PatternEngine::new();
        let updates = feed_alternating(&mut engine, 0, 6);

        // Five adjacent changes accumulate by the sixth frame.
        let fired: Vec<_> = updates
            .iter()
            .filter_map(|u| u.rapid_gaze_switching)
            .collect();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].change_count, 5);
    }

    #[test]
    fn test_confidence_increment_then_decay() {
        let mut engine = PatternEngine::new();
        feed_alternating(&mut engine, 0, 6);

        // +15 on the alert frame, then the same frame's decay.
        assert_eq!(engine.confidence_score(), 14.5);

        // A quiet frame only decays.
        engine.update(
            GazeDirection::Center,
            HeadDirection::FaceCenter,
            &STANDARD,
            t(6),
        );
        assert_eq!(engine.confidence_score(), 14.0);
    }

    #[test]
    fn test_cooldown_suppresses_back_to_back_alerts() {
        let mut engine = PatternEngine::new();
        // Continuous alternation: the count threshold stays satisfied
        // every frame, so only the cooldown limits the alert rate.
        let updates = feed_alternating(&mut engine, 0, 10);

        let fired_at: Vec<i64> = updates
            .iter()
            .enumerate()
            .filter(|(_, u)| u.rapid_gaze_switching.is_some())
            .map(|(i, _)| i as i64)
            .collect();

        // First alert on frame 5, then one every 2 seconds.
        assert_eq!(fired_at, vec![5, 7, 9]);
    }

    #[test]
    fn test_bursts_one_second_apart_yield_one_alert() {
        let mut engine = PatternEngine::new();
        let first = feed_alternating(&mut engine, 0, 6);
        assert!(first.last().unwrap().rapid_gaze_switching.is_some());

        // A qualifying burst one second later is still inside the cooldown.
        let update = engine.update(
            GazeDirection::Right,
            HeadDirection::FaceCenter,
            &STANDARD,
            t(6),
        );
        assert_eq!(update.rapid_gaze_switching, None);

        // Three seconds after the first alert the cooldown has elapsed.
        let update = engine.update(
            GazeDirection::Left,
            HeadDirection::FaceCenter,
            &STANDARD,
            t(8),
        );
        assert!(update.rapid_gaze_switching.is_some());
    }

    #[test]
    fn test_history_pruned_to_fusion_window() {
        let mut engine = PatternEngine::new();
        for i in 0..120 {
            engine.update(
                GazeDirection::Center,
                HeadDirection::FaceCenter,
                &STANDARD,
                t(i),
            );
        }
        // One entry per second, 60s window: the oldest half is gone.
        assert!(engine.gaze_history_len() <= 60);
    }

    #[test]
    fn test_changes_outside_sub_window_ignored() {
        let mut engine = PatternEngine::new();
        // Five changes early on.
        feed_alternating(&mut engine, 0, 6);
        // Settle on CENTER far past the 30s sub-window but within the
        // fusion window; the early churn no longer counts.
        let update = engine.update(
            GazeDirection::Center,
            HeadDirection::FaceCenter,
            &STANDARD,
            t(40),
        );
        assert_eq!(update.rapid_gaze_switching, None);
        assert_eq!(
            count_direction_changes(&engine.gaze_history, STANDARD.rapid_switch_window_ms, t(40)),
            0
        );
    }

    #[test]
    fn test_tolerant_profile_disables_pattern_detection() {
        let mut engine = PatternEngine::new();
        for i in 0..30 {
            let gaze = if i % 2 == 0 {
                GazeDirection::Center
            } else {
                GazeDirection::Left
            };
            let update = engine.update(gaze, HeadDirection::FaceCenter, &TOLERANT, t(i));
            assert_eq!(update.rapid_gaze_switching, None);
        }
    }

    #[test]
    fn test_confidence_bounded_and_band_notifications() {
        let mut engine = PatternEngine::new();
        let mut band_changes = Vec::new();

        // Sustained alternation: alerts every 2s push confidence up by a
        // net +14 per two-frame cycle until the cap.
        for i in 0..60 {
            let gaze = if i % 2 == 0 {
                GazeDirection::Center
            } else {
                GazeDirection::Left
            };
            let update = engine.update(gaze, HeadDirection::FaceCenter, &STANDARD, t(i));
            if let Some(level) = update.band_change {
                band_changes.push(level);
            }
            assert!(engine.confidence_score() >= 0.0);
            assert!(engine.confidence_score() <= 100.0);
        }

        // Bands were crossed upward exactly once each.
        assert_eq!(
            band_changes,
            vec![ConfidenceLevel::Medium, ConfidenceLevel::High]
        );
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut engine = PatternEngine::new();
        feed_alternating(&mut engine, 0, 10);
        assert!(engine.confidence_score() > 0.0);

        engine.clear();
        assert_eq!(engine.confidence_score(), 0.0);
        assert_eq!(engine.confidence_level(), ConfidenceLevel::Low);
        assert_eq!(engine.gaze_history_len(), 0);

        // Cooldown state is gone too: a fresh burst alerts immediately.
        let updates = feed_alternating(&mut engine, 100, 6);
        assert!(updates.last().unwrap().rapid_gaze_switching.is_some());
    }
}
