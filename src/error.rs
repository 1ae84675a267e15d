//! Error types for Synheart Vigil

use thiserror::Error;

/// Errors surfaced by the monitoring core and its external collaborators.
///
/// Camera and model acquisition happen outside the core, but their failure
/// modes flow through this taxonomy so the orchestrator can return to idle
/// with an instructive message.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("No camera device found")]
    DeviceNotFound,

    #[error("Camera device is already in use")]
    DeviceBusy,

    #[error("Landmark model failed to load: {0}")]
    ModelLoadFailure(String),

    #[error("Video stream not ready within {0} seconds")]
    VideoReadyTimeout(u64),

    #[error("Unclassifiable frame: {0}")]
    UnclassifiableFrame(String),

    #[error("Encoding error: {0}")]
    EncodingError(#[from] serde_json::Error),
}

/// Seconds to wait for the external video stream before giving up.
pub const VIDEO_READY_TIMEOUT_SECS: u64 = 10;

impl MonitorError {
    /// Terminal errors end the session attempt; the user must retry
    /// manually. Model-load failures are retried automatically first, and
    /// unclassifiable frames are recovered locally without ever reaching
    /// the orchestrator as failures.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            MonitorError::ModelLoadFailure(_) | MonitorError::UnclassifiableFrame(_)
        )
    }

    /// Instructive message suitable for direct display to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            MonitorError::PermissionDenied => {
                "Please allow camera access and try again. Check your settings if the permission prompt does not appear."
            }
            MonitorError::DeviceNotFound => "Please connect a webcam and try again.",
            MonitorError::DeviceBusy => {
                "Please close other applications using the camera and try again."
            }
            MonitorError::ModelLoadFailure(_) => {
                "The landmark model failed to load. Check your connection; loading is retried automatically."
            }
            MonitorError::VideoReadyTimeout(_) => {
                "The video stream did not become ready in time. Please try again."
            }
            MonitorError::UnclassifiableFrame(_) => {
                "A frame could not be classified and was skipped."
            }
            MonitorError::EncodingError(_) => "A session export could not be serialized.",
        }
    }
}

/// Bounded automatic retry for model-load failures. All other errors are
/// terminal for the attempt and never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: std::time::Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: std::time::Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Whether the acquisition adapter should retry after `attempts_made`
    /// failed attempts ending in `error`.
    pub fn should_retry(&self, error: &MonitorError, attempts_made: u32) -> bool {
        matches!(error, MonitorError::ModelLoadFailure(_)) && attempts_made < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_classification() {
        assert!(MonitorError::PermissionDenied.is_terminal());
        assert!(MonitorError::DeviceNotFound.is_terminal());
        assert!(MonitorError::DeviceBusy.is_terminal());
        assert!(MonitorError::VideoReadyTimeout(VIDEO_READY_TIMEOUT_SECS).is_terminal());
        assert!(!MonitorError::ModelLoadFailure("timeout".into()).is_terminal());
        assert!(!MonitorError::UnclassifiableFrame("missing index 454".into()).is_terminal());
    }

    #[test]
    fn test_retry_policy_only_retries_model_load() {
        let policy = RetryPolicy::default();
        let model_err = MonitorError::ModelLoadFailure("fetch failed".into());

        assert!(policy.should_retry(&model_err, 0));
        assert!(policy.should_retry(&model_err, 2));
        assert!(!policy.should_retry(&model_err, 3));

        assert!(!policy.should_retry(&MonitorError::PermissionDenied, 0));
        assert!(!policy.should_retry(&MonitorError::DeviceBusy, 0));
    }

    #[test]
    fn test_messages_are_instructive() {
        assert!(MonitorError::DeviceBusy.user_message().contains("close other applications"));
        assert!(MonitorError::DeviceNotFound.user_message().contains("connect a webcam"));
    }
}
