//! Core types for the Vigil monitoring pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: landmark frames, direction classifications, alerts, log entries,
//! and session-level aggregates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of points in the base face landmark set (no iris refinement).
pub const BASE_LANDMARK_COUNT: usize = 468;

/// Number of points when the iris refinement block is present.
pub const EXTENDED_LANDMARK_COUNT: usize = 478;

/// A single facial landmark in normalized [0,1] image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f64,
    pub y: f64,
}

impl LandmarkPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One frame's worth of facial landmarks, as produced by the external
/// landmark model. Ordered and fixed-count; the iris block is present only
/// when the model ran with refined landmarks enabled.
///
/// No pixel data ever enters this type. Frames are transient values owned
/// by the pipeline call that processes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkFrame {
    points: Vec<LandmarkPoint>,
}

impl LandmarkFrame {
    pub fn new(points: Vec<LandmarkPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the iris refinement block is available, enabling eye-gaze
    /// estimation in addition to head pose.
    pub fn extended_set_available(&self) -> bool {
        self.points.len() > BASE_LANDMARK_COUNT
    }

    pub fn point(&self, index: usize) -> Option<LandmarkPoint> {
        self.points.get(index).copied()
    }
}

/// Eye gaze direction relative to the eye socket, independent of head
/// orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GazeDirection {
    Center,
    Left,
    Right,
    Up,
    Down,
}

impl GazeDirection {
    pub fn is_centered(self) -> bool {
        self == GazeDirection::Center
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GazeDirection::Center => "CENTER",
            GazeDirection::Left => "LEFT",
            GazeDirection::Right => "RIGHT",
            GazeDirection::Up => "UP",
            GazeDirection::Down => "DOWN",
        }
    }
}

/// Head-pose direction derived from nose displacement relative to the face
/// bounding box. An upward tilt is deliberately unmodeled; it reads as
/// centered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadDirection {
    FaceCenter,
    FaceLeft,
    FaceRight,
    FaceDown,
}

impl HeadDirection {
    pub fn is_centered(self) -> bool {
        self == HeadDirection::FaceCenter
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HeadDirection::FaceCenter => "CENTER",
            HeadDirection::FaceLeft => "LEFT",
            HeadDirection::FaceRight => "RIGHT",
            HeadDirection::FaceDown => "DOWN",
        }
    }
}

/// Whether a face was found in the frame at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Present,
    Absent,
}

/// Alert categories emitted by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    LookingAway,
    FaceMovement,
    FaceNotDetected,
    Pattern,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::LookingAway => "looking_away",
            AlertKind::FaceMovement => "face_movement",
            AlertKind::FaceNotDetected => "face_not_detected",
            AlertKind::Pattern => "pattern",
        }
    }
}

/// A typed alert delivered to the output sink. Never stored by the core
/// beyond what the sink retains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub kind: AlertKind,
    pub message: String,
    /// How long the triggering condition had persisted, in seconds. Zero
    /// for pattern alerts, which are count-based rather than duration-based.
    pub duration_seconds: f64,
    pub timestamp: DateTime<Utc>,
}

/// Behavior log entry categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Info,
    Alert,
    Pattern,
    Error,
}

impl LogKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LogKind::Info => "info",
            LogKind::Alert => "alert",
            LogKind::Pattern => "pattern",
            LogKind::Error => "error",
        }
    }
}

/// Privacy-safe behavior log entry: timestamps and event descriptions only,
/// no coordinates, no imagery, no biometric data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub kind: LogKind,
    pub message: String,
    pub details: String,
}

/// Aggregate suspicion level derived from the confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// Band boundaries: LOW up to and including 30, MEDIUM up to and
    /// including 60, HIGH above.
    pub fn from_score(score: f64) -> Self {
        if score <= 30.0 {
            ConfidenceLevel::Low
        } else if score <= 60.0 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::High
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "LOW",
            ConfidenceLevel::Medium => "MEDIUM",
            ConfidenceLevel::High => "HIGH",
        }
    }
}

/// Top-level session state. Exactly one value at a time for the duration of
/// a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Calibrating,
    Monitoring,
    Paused,
    FaceNotDetected,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Idle => "IDLE",
            SessionState::Calibrating => "CALIBRATING",
            SessionState::Monitoring => "MONITORING",
            SessionState::Paused => "PAUSED",
            SessionState::FaceNotDetected => "FACE_NOT_DETECTED",
        }
    }
}

/// Running alert counters for the current session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningCounters {
    pub total: u32,
    pub looking_away: u32,
    pub face_movement: u32,
    pub face_not_detected: u32,
}

impl WarningCounters {
    /// Record one alert of the given kind. Pattern alerts feed the
    /// confidence score instead of the warning counters.
    pub fn record(&mut self, kind: AlertKind) {
        match kind {
            AlertKind::LookingAway => {
                self.total += 1;
                self.looking_away += 1;
            }
            AlertKind::FaceMovement => {
                self.total += 1;
                self.face_movement += 1;
            }
            AlertKind::FaceNotDetected => {
                self.total += 1;
                self.face_not_detected += 1;
            }
            AlertKind::Pattern => {}
        }
    }
}

/// Summary record produced when a session stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    /// Monitored wall-clock seconds, excluding paused time.
    pub duration_seconds: f64,
    pub total_alerts: u32,
    pub gaze_alerts: u32,
    pub head_alerts: u32,
    pub absence_alerts: u32,
    pub final_confidence_level: ConfidenceLevel,
    pub profile_name: String,
}
