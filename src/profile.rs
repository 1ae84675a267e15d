//! Sensitivity profiles
//!
//! All detection thresholds live in one value type so that switching modes
//! is a single pure lookup instead of conditionals scattered through the
//! pipeline. Exactly one of the two built-in profiles is active at a time;
//! switching takes effect on the next processed frame and never resets
//! accumulated history.

use serde::{Deserialize, Serialize};

/// Built-in profile selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    Standard,
    Tolerant,
}

impl ProfileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProfileKind::Standard => "standard",
            ProfileKind::Tolerant => "tolerant",
        }
    }

    /// Resolve the selector to its threshold table.
    pub fn profile(self) -> &'static SensitivityProfile {
        match self {
            ProfileKind::Standard => &STANDARD,
            ProfileKind::Tolerant => &TOLERANT,
        }
    }
}

/// Named threshold configuration consumed by the classifier, the debounced
/// trackers, and the pattern engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityProfile {
    /// Normalized iris offset beyond which gaze reads as non-centered.
    pub gaze_offset_threshold: f64,
    /// Normalized nose displacement beyond which head pose reads as
    /// non-centered.
    pub head_offset_threshold: f64,
    /// Seconds of sustained off-center gaze before a looking-away alert.
    pub looking_away_time_threshold: f64,
    /// Seconds of sustained head turn before a face-movement alert.
    pub head_movement_time_threshold: f64,
    /// Seconds without a face before an absence alert.
    pub absence_time_threshold: f64,
    /// Gaze direction changes within the rapid-switch window that qualify
    /// as a distraction pattern.
    pub rapid_switch_count_threshold: u32,
    /// Sub-window scanned for rapid gaze switching (ms).
    pub rapid_switch_window_ms: i64,
    /// Rolling history window retained by the pattern engine (ms).
    pub fusion_window_ms: i64,
    /// Reserved confidence floor for combined-signal decisions.
    pub fusion_confidence_threshold: f64,
}

/// Default detection parameters.
pub const STANDARD: SensitivityProfile = SensitivityProfile {
    gaze_offset_threshold: 0.08,
    head_offset_threshold: 0.15,
    looking_away_time_threshold: 3.0,
    head_movement_time_threshold: 3.0,
    absence_time_threshold: 3.0,
    rapid_switch_count_threshold: 5,
    rapid_switch_window_ms: 30_000,
    fusion_window_ms: 60_000,
    fusion_confidence_threshold: 0.7,
};

/// Increased tolerance for subjects with tremors or involuntary movement.
/// Offset thresholds are relaxed, time thresholds lengthened, and rapid
/// switch detection is effectively disabled to avoid false positives.
pub const TOLERANT: SensitivityProfile = SensitivityProfile {
    gaze_offset_threshold: 0.20,
    head_offset_threshold: 0.30,
    looking_away_time_threshold: 8.0,
    head_movement_time_threshold: 8.0,
    absence_time_threshold: 12.0,
    rapid_switch_count_threshold: 999,
    rapid_switch_window_ms: 30_000,
    fusion_window_ms: 60_000,
    fusion_confidence_threshold: 0.85,
};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_profile_lookup_is_stable() {
        assert_eq!(ProfileKind::Standard.profile(), &STANDARD);
        assert_eq!(ProfileKind::Tolerant.profile(), &TOLERANT);
    }

    #[test]
    fn test_tolerant_is_everywhere_more_permissive() {
        assert!(TOLERANT.gaze_offset_threshold > STANDARD.gaze_offset_threshold);
        assert!(TOLERANT.head_offset_threshold > STANDARD.head_offset_threshold);
        assert!(TOLERANT.looking_away_time_threshold > STANDARD.looking_away_time_threshold);
        assert!(TOLERANT.head_movement_time_threshold > STANDARD.head_movement_time_threshold);
        assert!(TOLERANT.absence_time_threshold > STANDARD.absence_time_threshold);
        assert!(TOLERANT.rapid_switch_count_threshold > STANDARD.rapid_switch_count_threshold);
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ProfileKind::Tolerant).unwrap();
        assert_eq!(json, "\"tolerant\"");
        let parsed: ProfileKind = serde_json::from_str("\"standard\"").unwrap();
        assert_eq!(parsed, ProfileKind::Standard);
    }
}
