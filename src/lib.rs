//! Synheart Vigil - On-device behavioral analysis engine for privacy-first
//! attention monitoring
//!
//! Vigil turns per-frame facial landmark sets into calibrated direction
//! classifications, debounces them into durable away intervals, aggregates
//! them in a rolling pattern window with a decaying confidence score, and
//! emits rate-limited alerts through a typed sink. Landmark detection,
//! camera acquisition, and rendering are external collaborators; only
//! geometry flows in and only events flow out, never imagery.
//!
//! ## Pipeline
//!
//! raw landmarks → geometry → classification → debounced trackers →
//! pattern engine → alert sink, supervised by a session state machine
//! (idle → calibrating → monitoring ⇄ paused, with face-loss tracking).

pub mod calibration;
pub mod classifier;
pub mod error;
pub mod export;
pub mod geometry;
pub mod pattern;
pub mod profile;
pub mod session;
pub mod sink;
pub mod tracker;
pub mod types;

pub use calibration::{BaselineSample, CalibrationController, CALIBRATION_DURATION_SECS};
pub use error::{MonitorError, RetryPolicy};
pub use profile::{ProfileKind, SensitivityProfile};
pub use session::{FrameDisposition, SessionMonitor, FRAME_INTERVAL_MS};
pub use sink::{EventSink, NullSink, RecordingSink};
pub use types::{
    AlertEvent, AlertKind, ConfidenceLevel, GazeDirection, HeadDirection, LandmarkFrame,
    LandmarkPoint, LogEntry, LogKind, Presence, SessionState, SessionSummary, WarningCounters,
};

/// Vigil version embedded in exports and the CLI banner.
pub const VIGIL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for exported artifacts.
pub const PRODUCER_NAME: &str = "synheart-vigil";
