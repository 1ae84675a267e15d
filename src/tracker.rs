//! Debounced state tracking
//!
//! Turns noisy per-frame direction labels into durable "away since"
//! intervals. A condition must persist past the profile's time threshold
//! before it produces an alert, and the interval restarts on every alert
//! so a sustained condition keeps alerting once per threshold period
//! instead of only once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Open interval during which a signal has been away from its centered
/// value. At most one open interval exists per signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AwayInterval {
    pub started_at: DateTime<Utc>,
    pub last_alert_at: Option<DateTime<Utc>>,
}

/// What a single observation produced.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Observation {
    /// The observed direction differs from the previous one.
    pub changed: bool,
    /// An away interval closed on return to center; elapsed seconds.
    pub returned_after_secs: Option<f64>,
    /// The open away interval crossed the time threshold; seconds away.
    pub crossed_after_secs: Option<f64>,
}

/// Per-signal debounced state machine. One instance each for gaze, head
/// pose, and presence; presence is driven by "no landmarks this frame"
/// rather than a classified direction.
#[derive(Debug, Clone)]
pub struct DebouncedTracker<D> {
    centered: D,
    current: D,
    away: Option<AwayInterval>,
}

impl<D: Copy + PartialEq> DebouncedTracker<D> {
    pub fn new(centered: D) -> Self {
        Self {
            centered,
            current: centered,
            away: None,
        }
    }

    pub fn current(&self) -> D {
        self.current
    }

    pub fn away_since(&self) -> Option<DateTime<Utc>> {
        self.away.map(|interval| interval.started_at)
    }

    /// Snap back to centered and drop any open interval. Used when
    /// monitoring resumes after a pause and when calibration hands over,
    /// so stale time never counts toward an alert.
    pub fn reset(&mut self) {
        self.current = self.centered;
        self.away = None;
    }

    /// Feed one classification. `time_threshold_secs` comes from the
    /// active profile at call time, so profile switches apply immediately.
    pub fn observe(
        &mut self,
        direction: D,
        time_threshold_secs: f64,
        now: DateTime<Utc>,
    ) -> Observation {
        let mut obs = Observation::default();

        if direction != self.current {
            obs.changed = true;
            self.current = direction;

            if direction == self.centered {
                if let Some(interval) = self.away.take() {
                    obs.returned_after_secs = Some(elapsed_secs(interval.started_at, now));
                }
            }
        }

        if direction != self.centered {
            let interval = self.away.get_or_insert(AwayInterval {
                started_at: now,
                last_alert_at: None,
            });
            let away_secs = elapsed_secs(interval.started_at, now);
            if away_secs > time_threshold_secs {
                obs.crossed_after_secs = Some(away_secs);
                interval.started_at = now;
                interval.last_alert_at = Some(now);
            }
        } else {
            self.away = None;
        }

        obs
    }
}

fn elapsed_secs(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}
