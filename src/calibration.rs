//! Baseline calibration
//!
//! Before monitoring starts, an 8 second gathering phase watches for fully
//! centered frames and records the most recent centered iris and nose
//! positions. The sample is last-write-wins rather than averaged, and the
//! classifier keeps using absolute thresholds; the baseline is retained as
//! session context only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::LandmarkPoint;

/// Seconds of baseline gathering before monitoring starts.
pub const CALIBRATION_DURATION_SECS: f64 = 8.0;

/// Calibration lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationPhase {
    NotStarted,
    Running,
    Done,
}

/// Most recent fully centered positions observed during calibration. Either
/// field stays `None` if no qualifying frame was seen (or, for the gaze
/// center, if the iris block was never available).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineSample {
    pub gaze_center: Option<LandmarkPoint>,
    pub face_center: Option<LandmarkPoint>,
}

/// Timed baseline-collection phase gating the rest of the pipeline.
#[derive(Debug, Clone)]
pub struct CalibrationController {
    phase: CalibrationPhase,
    started_at: Option<DateTime<Utc>>,
    baseline: BaselineSample,
}

impl Default for CalibrationController {
    fn default() -> Self {
        Self::new()
    }
}

impl CalibrationController {
    pub fn new() -> Self {
        Self {
            phase: CalibrationPhase::NotStarted,
            started_at: None,
            baseline: BaselineSample::default(),
        }
    }

    pub fn phase(&self) -> CalibrationPhase {
        self.phase
    }

    pub fn baseline(&self) -> BaselineSample {
        self.baseline
    }

    /// Begin a fresh gathering window, discarding any prior baseline.
    pub fn begin(&mut self, now: DateTime<Utc>) {
        self.phase = CalibrationPhase::Running;
        self.started_at = Some(now);
        self.baseline = BaselineSample::default();
    }

    pub fn remaining_secs(&self, now: DateTime<Utc>) -> f64 {
        match self.started_at {
            Some(started) if self.phase == CalibrationPhase::Running => {
                let elapsed = (now - started).num_milliseconds() as f64 / 1000.0;
                (CALIBRATION_DURATION_SECS - elapsed).max(0.0)
            }
            _ => 0.0,
        }
    }

    /// Record a fully centered frame. The newest sample overwrites the
    /// previous one; a missing gaze center (no iris block) keeps whatever
    /// was captured before.
    pub fn record_centered_sample(
        &mut self,
        gaze_center: Option<LandmarkPoint>,
        face_center: LandmarkPoint,
    ) {
        if self.phase != CalibrationPhase::Running {
            return;
        }
        if let Some(gaze_center) = gaze_center {
            self.baseline.gaze_center = Some(gaze_center);
        }
        self.baseline.face_center = Some(face_center);
    }

    /// Advance the phase clock. Returns true exactly once, on the tick
    /// where the gathering duration has elapsed. Runs on every delivered
    /// frame, face or not, so a subject who never centers (or never
    /// appears) still hands over to monitoring on time.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        if self.phase != CalibrationPhase::Running {
            return false;
        }
        let started = match self.started_at {
            Some(started) => started,
            None => return false,
        };
        let elapsed = (now - started).num_milliseconds() as f64 / 1000.0;
        if elapsed >= CALIBRATION_DURATION_SECS {
            self.phase = CalibrationPhase::Done;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
