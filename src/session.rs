//! Session orchestration
//!
//! The top-level state machine sequencing calibration, the debounced
//! trackers, and the pattern engine. One `SessionMonitor` owns all mutable
//! session state; frames and control actions arrive on a single logical
//! thread, each carrying an explicit timestamp so the core never reads a
//! wall clock of its own.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::calibration::{BaselineSample, CalibrationController, CALIBRATION_DURATION_SECS};
use crate::classifier::{classify_gaze, classify_head_pose};
use crate::error::MonitorError;
use crate::geometry;
use crate::pattern::{PatternAlert, PatternEngine};
use crate::profile::{ProfileKind, SensitivityProfile};
use crate::sink::EventSink;
use crate::tracker::DebouncedTracker;
use crate::types::{
    AlertEvent, AlertKind, ConfidenceLevel, GazeDirection, HeadDirection, LandmarkFrame,
    LandmarkPoint, LogEntry, LogKind, Presence, SessionState, SessionSummary, WarningCounters,
};

/// Minimum milliseconds between processed frames (soft cap of roughly 15
/// processed frames per second). Frames delivered earlier are dropped,
/// never queued.
pub const FRAME_INTERVAL_MS: i64 = 66;

/// What happened to a delivered frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDisposition {
    /// The session does not process frames in its current state.
    Ignored,
    /// Delivered before the minimum inter-processing interval elapsed.
    Dropped,
    /// Ran the calibration path.
    Calibrated,
    /// Ran the full monitoring pipeline.
    Processed,
}

/// Top-level monitor owning the whole per-session pipeline.
pub struct SessionMonitor<S: EventSink> {
    sink: S,
    state: SessionState,
    profile: ProfileKind,
    debug: bool,

    calibration: CalibrationController,
    gaze_tracker: DebouncedTracker<GazeDirection>,
    head_tracker: DebouncedTracker<HeadDirection>,
    presence_tracker: DebouncedTracker<Presence>,
    pattern: PatternEngine,
    counters: WarningCounters,

    session_id: Option<Uuid>,
    session_started_at: Option<DateTime<Utc>>,
    paused_at: Option<DateTime<Utc>>,
    last_processed_at: Option<DateTime<Utc>>,
    frames_processed: u64,
}

impl<S: EventSink> SessionMonitor<S> {
    pub fn new(sink: S) -> Self {
        Self::with_profile(sink, ProfileKind::Standard)
    }

    pub fn with_profile(sink: S, profile: ProfileKind) -> Self {
        Self {
            sink,
            state: SessionState::Idle,
            profile,
            debug: false,
            calibration: CalibrationController::new(),
            gaze_tracker: DebouncedTracker::new(GazeDirection::Center),
            head_tracker: DebouncedTracker::new(HeadDirection::FaceCenter),
            presence_tracker: DebouncedTracker::new(Presence::Present),
            pattern: PatternEngine::new(),
            counters: WarningCounters::default(),
            session_id: None,
            session_started_at: None,
            paused_at: None,
            last_processed_at: None,
            frames_processed: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn profile(&self) -> ProfileKind {
        self.profile
    }

    pub fn counters(&self) -> WarningCounters {
        self.counters
    }

    pub fn confidence_score(&self) -> f64 {
        self.pattern.confidence_score()
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        self.pattern.confidence_level()
    }

    pub fn baseline(&self) -> BaselineSample {
        self.calibration.baseline()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Begin a session: enter the calibration phase with fresh counters,
    /// trackers, and histories. Ignored unless idle.
    pub fn start(&mut self, now: DateTime<Utc>) {
        if self.state != SessionState::Idle {
            log::warn!("start ignored in state {}", self.state.as_str());
            return;
        }

        self.session_id = Some(Uuid::new_v4());
        self.session_started_at = Some(now);
        self.paused_at = None;
        self.last_processed_at = None;
        self.frames_processed = 0;
        self.counters = WarningCounters::default();
        self.reset_trackers();
        self.pattern.clear();
        self.calibration.begin(now);

        self.set_state(SessionState::Calibrating);
        self.log_event(
            LogKind::Info,
            "Calibration phase started",
            format!("Duration: {}s", CALIBRATION_DURATION_SECS),
            now,
        );
    }

    /// End the session from any state. Emits a summary for the session that
    /// ran and clears every counter and history; safe to call repeatedly
    /// (subsequent calls return `None`).
    pub fn stop(&mut self, now: DateTime<Utc>) -> Option<SessionSummary> {
        if self.session_started_at.is_none() {
            return None;
        }

        let summary = self.make_summary(now);
        self.log_event(LogKind::Info, "Monitoring stopped", "Session ended", now);
        self.set_state(SessionState::Idle);

        self.session_id = None;
        self.session_started_at = None;
        self.paused_at = None;
        self.last_processed_at = None;
        self.frames_processed = 0;
        self.counters = WarningCounters::default();
        self.reset_trackers();
        self.pattern.clear();
        self.calibration.reset();

        Some(summary)
    }

    /// Suspend frame processing. Frames delivered while paused are ignored
    /// entirely and the paused span is excluded from the session duration.
    pub fn pause(&mut self, now: DateTime<Utc>) {
        if !matches!(
            self.state,
            SessionState::Monitoring | SessionState::FaceNotDetected
        ) {
            return;
        }
        self.paused_at = Some(now);
        self.set_state(SessionState::Paused);
        self.log_event(LogKind::Info, "Monitoring paused", "", now);
    }

    /// Resume after a pause. Open away intervals are discarded so time
    /// accumulated across the pause can never fire an alert on the first
    /// frame back.
    pub fn resume(&mut self, now: DateTime<Utc>) {
        if self.state != SessionState::Paused {
            return;
        }
        if let (Some(paused_at), Some(started)) = (self.paused_at.take(), self.session_started_at)
        {
            self.session_started_at = Some(started + (now - paused_at));
        }
        self.reset_trackers();
        self.set_state(SessionState::Monitoring);
        self.log_event(LogKind::Info, "Monitoring resumed", "", now);
    }

    /// Switch the active sensitivity profile. Takes effect on the next
    /// processed frame; accumulated history and confidence are preserved.
    pub fn set_profile(&mut self, profile: ProfileKind, now: DateTime<Utc>) {
        if profile == self.profile {
            return;
        }
        self.profile = profile;
        if self.session_started_at.is_some() {
            self.log_event(
                LogKind::Info,
                &format!("Switched to {} profile", profile.as_str()),
                "",
                now,
            );
        }
    }

    pub fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
    }

    /// Surface a terminal collaborator failure (camera, model, video
    /// readiness). Logs the error, notifies the sink, and returns the
    /// orchestrator to idle. Never called for locally recovered conditions.
    pub fn fail(&mut self, error: &MonitorError, now: DateTime<Utc>) {
        log::warn!("session failure: {}", error);
        self.log_event(
            LogKind::Error,
            &error.to_string(),
            error.user_message().to_string(),
            now,
        );
        self.session_id = None;
        self.session_started_at = None;
        self.paused_at = None;
        self.set_state(SessionState::Idle);
    }

    /// Feed one frame from the inference collaborator. `None` means no
    /// face was found this tick. All work completes synchronously before
    /// the call returns.
    pub fn process_frame(
        &mut self,
        frame: Option<&LandmarkFrame>,
        now: DateTime<Utc>,
    ) -> FrameDisposition {
        if matches!(self.state, SessionState::Idle | SessionState::Paused) {
            return FrameDisposition::Ignored;
        }

        if let Some(last) = self.last_processed_at {
            if (now - last).num_milliseconds() < FRAME_INTERVAL_MS {
                return FrameDisposition::Dropped;
            }
        }
        self.last_processed_at = Some(now);
        self.frames_processed += 1;

        if self.state == SessionState::Calibrating {
            self.calibration_frame(frame, now);
            return FrameDisposition::Calibrated;
        }

        let profile = self.profile.profile();
        match frame {
            Some(frame) => match geometry::head_pose_offsets(frame) {
                Ok(head_offsets) => self.present_frame(frame, head_offsets, profile, now),
                Err(error) => {
                    // Recovered locally: a frame we cannot classify is
                    // treated as if no face was found.
                    log::debug!("unclassifiable frame treated as absence: {}", error);
                    self.absent_frame(profile, now);
                }
            },
            None => self.absent_frame(profile, now),
        }
        FrameDisposition::Processed
    }

    fn calibration_frame(&mut self, frame: Option<&LandmarkFrame>, now: DateTime<Utc>) {
        let profile = self.profile.profile();

        if let Some(frame) = frame {
            if let Ok(head_offsets) = geometry::head_pose_offsets(frame) {
                let gaze_offsets = geometry::gaze_offsets(frame);
                let gaze = classify_gaze(gaze_offsets, profile);
                let head = classify_head_pose(head_offsets, profile);

                if gaze.is_centered() && head.is_centered() {
                    let gaze_center = iris_midpoint(frame);
                    if let Some(nose) = frame.point(geometry::NOSE_TIP) {
                        self.calibration.record_centered_sample(gaze_center, nose);
                    }
                }
            }
        }

        if self.calibration.tick(now) {
            self.complete_calibration(now);
        }
    }

    fn complete_calibration(&mut self, now: DateTime<Utc>) {
        self.reset_trackers();
        self.pattern.clear();

        let baseline = self.calibration.baseline();
        log::debug!(
            "calibration complete: gaze_center={:?} face_center={:?}",
            baseline.gaze_center,
            baseline.face_center
        );

        let details = if baseline.face_center.is_some() {
            "Calibration complete - Baseline established"
        } else {
            "Calibration complete - No centered baseline captured"
        };
        self.set_state(SessionState::Monitoring);
        self.log_event(LogKind::Info, "Monitoring started", details, now);
    }

    fn present_frame(
        &mut self,
        frame: &LandmarkFrame,
        head_offsets: geometry::HeadPoseOffsets,
        profile: &SensitivityProfile,
        now: DateTime<Utc>,
    ) {
        let presence_obs =
            self.presence_tracker
                .observe(Presence::Present, profile.absence_time_threshold, now);
        if presence_obs.changed {
            self.sink.presence_changed(Presence::Present);
        }
        if let Some(secs) = presence_obs.returned_after_secs {
            self.log_event(
                LogKind::Info,
                "Face redetected",
                format!("Duration: {:.1}s", secs),
                now,
            );
        }
        if self.state == SessionState::FaceNotDetected {
            self.set_state(SessionState::Monitoring);
        }

        let gaze = classify_gaze(geometry::gaze_offsets(frame), profile);
        let head = classify_head_pose(head_offsets, profile);

        let gaze_obs = self
            .gaze_tracker
            .observe(gaze, profile.looking_away_time_threshold, now);
        if gaze_obs.changed {
            self.sink.gaze_changed(gaze);
        }
        if let Some(secs) = gaze_obs.returned_after_secs {
            self.log_event(
                LogKind::Info,
                "Eyes returned to center",
                format!("Duration: {:.1}s", secs),
                now,
            );
        }
        if let Some(secs) = gaze_obs.crossed_after_secs {
            self.emit_alert(
                AlertKind::LookingAway,
                format!("Eye gaze {} for extended period", gaze.as_str()),
                secs,
                now,
            );
        }

        let head_obs = self
            .head_tracker
            .observe(head, profile.head_movement_time_threshold, now);
        if head_obs.changed {
            self.sink.head_changed(head);
        }
        if let Some(secs) = head_obs.returned_after_secs {
            self.log_event(
                LogKind::Info,
                "Head returned to center",
                format!("Duration: {:.1}s", secs),
                now,
            );
        }
        if let Some(secs) = head_obs.crossed_after_secs {
            self.emit_alert(
                AlertKind::FaceMovement,
                format!("Head turned {} for extended period", head.as_str()),
                secs,
                now,
            );
        }

        let update = self.pattern.update(gaze, head, profile, now);
        if let Some(alert) = update.rapid_gaze_switching {
            self.emit_pattern_alert(alert, now);
        }
        if let Some(level) = update.band_change {
            self.sink
                .confidence_changed(level, self.pattern.confidence_score());
        }

        if self.debug {
            log::debug!(
                "frame {}: gaze={} head={} confidence={:.1}",
                self.frames_processed,
                gaze.as_str(),
                head.as_str(),
                self.pattern.confidence_score()
            );
        }
    }

    fn absent_frame(&mut self, profile: &SensitivityProfile, now: DateTime<Utc>) {
        if self.state == SessionState::Monitoring {
            self.set_state(SessionState::FaceNotDetected);
        }

        let obs =
            self.presence_tracker
                .observe(Presence::Absent, profile.absence_time_threshold, now);
        if obs.changed {
            log::debug!("face lost");
            self.sink.presence_changed(Presence::Absent);
        }
        if let Some(secs) = obs.crossed_after_secs {
            self.emit_alert(
                AlertKind::FaceNotDetected,
                "Face not detected".to_string(),
                secs,
                now,
            );
        }
    }

    fn emit_alert(&mut self, kind: AlertKind, message: String, duration_secs: f64, now: DateTime<Utc>) {
        self.counters.record(kind);
        log::warn!("alert: {} ({:.1}s)", message, duration_secs);

        let event = AlertEvent {
            kind,
            message,
            duration_seconds: duration_secs,
            timestamp: now,
        };
        self.sink.alert(&event);
        self.sink.log(&LogEntry {
            timestamp: now,
            kind: LogKind::Alert,
            message: event.message.clone(),
            details: format!("Duration: {:.1}s", duration_secs),
        });
    }

    fn emit_pattern_alert(&mut self, alert: PatternAlert, now: DateTime<Utc>) {
        log::warn!(
            "pattern: rapid gaze switching ({} changes)",
            alert.change_count
        );

        let event = AlertEvent {
            kind: AlertKind::Pattern,
            message: "Rapid gaze switching detected".to_string(),
            duration_seconds: 0.0,
            timestamp: now,
        };
        self.sink.alert(&event);
        self.sink.log(&LogEntry {
            timestamp: now,
            kind: LogKind::Pattern,
            message: event.message.clone(),
            details: format!("Changes: {}", alert.change_count),
        });
    }

    fn make_summary(&self, now: DateTime<Utc>) -> SessionSummary {
        let duration_seconds = match self.session_started_at {
            Some(started) => {
                // A session stopped while paused excludes the open pause.
                let end = self.paused_at.unwrap_or(now);
                ((end - started).num_milliseconds() as f64 / 1000.0).max(0.0)
            }
            None => 0.0,
        };

        SessionSummary {
            session_id: self.session_id.unwrap_or_else(Uuid::nil),
            duration_seconds,
            total_alerts: self.counters.total,
            gaze_alerts: self.counters.looking_away,
            head_alerts: self.counters.face_movement,
            absence_alerts: self.counters.face_not_detected,
            final_confidence_level: self.pattern.confidence_level(),
            profile_name: self.profile.as_str().to_string(),
        }
    }

    fn reset_trackers(&mut self) {
        self.gaze_tracker.reset();
        self.head_tracker.reset();
        self.presence_tracker.reset();
    }

    fn set_state(&mut self, state: SessionState) {
        if state != self.state {
            self.state = state;
            self.sink.state_changed(state);
        }
    }

    fn log_event(
        &mut self,
        kind: LogKind,
        message: &str,
        details: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        self.sink.log(&LogEntry {
            timestamp: now,
            kind,
            message: message.to_string(),
            details: details.into(),
        });
    }
}

/// Midpoint of the two iris centroids, used as the gaze baseline sample.
/// `None` when the iris block is unavailable.
fn iris_midpoint(frame: &LandmarkFrame) -> Option<LandmarkPoint> {
    if !frame.extended_set_available() {
        return None;
    }
    let left = geometry::centroid(frame, &geometry::LEFT_IRIS)?;
    let right = geometry::centroid(frame, &geometry::RIGHT_IRIS)?;
    Some(LandmarkPoint::new(
        (left.x + right.x) / 2.0,
        (left.y + right.y) / 2.0,
    ))
}
