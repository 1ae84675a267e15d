//! Landmark geometry
//!
//! Pure functions turning a landmark frame into normalized gaze and
//! head-pose offsets. Eye gaze compares the iris centroid against the eye
//! centroid, scaled by eye width so the result is independent of face size
//! and camera distance. Head pose compares the nose tip against the face
//! bounding-box center, scaled by face width and height.

use serde::{Deserialize, Serialize};

use crate::error::MonitorError;
use crate::types::{LandmarkFrame, LandmarkPoint};

// Face mesh landmark indices (468-point base set, iris block at 468+).
pub const LEFT_EYE_OUTER: usize = 33;
pub const LEFT_EYE_INNER: usize = 133;
pub const RIGHT_EYE_INNER: usize = 362;
pub const RIGHT_EYE_OUTER: usize = 263;
pub const LEFT_EYE_CONTOUR: [usize; 6] = [33, 160, 158, 133, 153, 144];
pub const RIGHT_EYE_CONTOUR: [usize; 6] = [362, 385, 387, 263, 373, 380];
pub const LEFT_IRIS: [usize; 5] = [468, 469, 470, 471, 472];
pub const RIGHT_IRIS: [usize; 5] = [473, 474, 475, 476, 477];
pub const NOSE_TIP: usize = 1;
pub const FACE_LEFT_SIDE: usize = 234;
pub const FACE_RIGHT_SIDE: usize = 454;
pub const FOREHEAD: usize = 10;
pub const CHIN: usize = 152;

/// Normalized iris displacement from the eye center, averaged across both
/// eyes. Negative horizontal values point left, positive vertical values
/// point down (image coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazeOffsets {
    pub horizontal: f64,
    pub vertical: f64,
}

/// Normalized nose-tip displacement from the face bounding-box center.
/// Same sign conventions as [`GazeOffsets`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadPoseOffsets {
    pub horizontal: f64,
    pub vertical: f64,
}

/// Mean position of the given landmark indices, or `None` if any index is
/// missing from the frame.
pub fn centroid(frame: &LandmarkFrame, indices: &[usize]) -> Option<LandmarkPoint> {
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    for &idx in indices {
        let p = frame.point(idx)?;
        sum_x += p.x;
        sum_y += p.y;
    }
    let n = indices.len() as f64;
    Some(LandmarkPoint::new(sum_x / n, sum_y / n))
}

/// Eye gaze offsets for the frame.
///
/// Returns `None` when the iris block is unavailable or any eye landmark is
/// missing; the classifier falls back to centered in that case. Each eye's
/// offset is `(iris centroid - eye centroid) / eye width`, then both eyes
/// are averaged.
pub fn gaze_offsets(frame: &LandmarkFrame) -> Option<GazeOffsets> {
    if !frame.extended_set_available() {
        return None;
    }

    let left_outer = frame.point(LEFT_EYE_OUTER)?;
    let left_inner = frame.point(LEFT_EYE_INNER)?;
    let right_outer = frame.point(RIGHT_EYE_OUTER)?;
    let right_inner = frame.point(RIGHT_EYE_INNER)?;

    let left_eye_width = (left_outer.x - left_inner.x).abs();
    let right_eye_width = (right_outer.x - right_inner.x).abs();
    if left_eye_width == 0.0 || right_eye_width == 0.0 {
        return None;
    }

    let left_eye_center = centroid(frame, &LEFT_EYE_CONTOUR)?;
    let right_eye_center = centroid(frame, &RIGHT_EYE_CONTOUR)?;
    let left_iris_center = centroid(frame, &LEFT_IRIS)?;
    let right_iris_center = centroid(frame, &RIGHT_IRIS)?;

    let left_horizontal = (left_iris_center.x - left_eye_center.x) / left_eye_width;
    let right_horizontal = (right_iris_center.x - right_eye_center.x) / right_eye_width;
    let left_vertical = (left_iris_center.y - left_eye_center.y) / left_eye_width;
    let right_vertical = (right_iris_center.y - right_eye_center.y) / right_eye_width;

    Some(GazeOffsets {
        horizontal: (left_horizontal + right_horizontal) / 2.0,
        vertical: (left_vertical + right_vertical) / 2.0,
    })
}

/// Head-pose offsets for the frame.
///
/// Fails with [`MonitorError::UnclassifiableFrame`] when the frame lacks
/// the base landmark indices or the face bounding box is degenerate; the
/// caller recovers by treating the frame as face-absent.
pub fn head_pose_offsets(frame: &LandmarkFrame) -> Result<HeadPoseOffsets, MonitorError> {
    let nose = require(frame, NOSE_TIP)?;
    let left = require(frame, FACE_LEFT_SIDE)?;
    let right = require(frame, FACE_RIGHT_SIDE)?;
    let forehead = require(frame, FOREHEAD)?;
    let chin = require(frame, CHIN)?;

    let face_width = (right.x - left.x).abs();
    let face_height = (chin.y - forehead.y).abs();
    if face_width == 0.0 || face_height == 0.0 {
        return Err(MonitorError::UnclassifiableFrame(
            "degenerate face bounding box".to_string(),
        ));
    }

    let face_center_x = (left.x + right.x) / 2.0;
    let face_center_y = (forehead.y + chin.y) / 2.0;

    Ok(HeadPoseOffsets {
        horizontal: (nose.x - face_center_x) / face_width,
        vertical: (nose.y - face_center_y) / face_height,
    })
}

fn require(frame: &LandmarkFrame, index: usize) -> Result<LandmarkPoint, MonitorError> {
    frame.point(index).ok_or_else(|| {
        MonitorError::UnclassifiableFrame(format!(
            "missing landmark index {} (frame has {})",
            index,
            frame.len()
        ))
    })
}

/// Test fixture: synthetic frames with exact, known offsets.
#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::types::{EXTENDED_LANDMARK_COUNT, BASE_LANDMARK_COUNT};

    const LEFT_EYE_CENTER: (f64, f64) = (0.40, 0.45);
    const RIGHT_EYE_CENTER: (f64, f64) = (0.60, 0.45);
    const EYE_WIDTH: f64 = 0.1;
    const FACE_WIDTH: f64 = 0.4;
    const FACE_HEIGHT: f64 = 0.4;

    /// Build an extended frame whose gaze and head-pose offsets come out to
    /// exactly the requested values.
    pub(crate) fn frame_with(
        gaze_h: f64,
        gaze_v: f64,
        head_h: f64,
        head_v: f64,
    ) -> LandmarkFrame {
        let mut pts = vec![LandmarkPoint::new(0.5, 0.5); EXTENDED_LANDMARK_COUNT];

        // Face bounding box: width 0.4 centered at x=0.5, height 0.4
        // centered at y=0.5.
        pts[FACE_LEFT_SIDE] = LandmarkPoint::new(0.3, 0.5);
        pts[FACE_RIGHT_SIDE] = LandmarkPoint::new(0.7, 0.5);
        pts[FOREHEAD] = LandmarkPoint::new(0.5, 0.3);
        pts[CHIN] = LandmarkPoint::new(0.5, 0.7);
        pts[NOSE_TIP] =
            LandmarkPoint::new(0.5 + head_h * FACE_WIDTH, 0.5 + head_v * FACE_HEIGHT);

        // Left eye: corners at 0.35/0.45, six-point contour whose centroid
        // is the eye center.
        pts[LEFT_EYE_OUTER] = LandmarkPoint::new(0.35, 0.45);
        pts[160] = LandmarkPoint::new(0.38, 0.44);
        pts[158] = LandmarkPoint::new(0.42, 0.44);
        pts[LEFT_EYE_INNER] = LandmarkPoint::new(0.45, 0.45);
        pts[153] = LandmarkPoint::new(0.42, 0.46);
        pts[144] = LandmarkPoint::new(0.38, 0.46);

        // Right eye mirrored.
        pts[RIGHT_EYE_INNER] = LandmarkPoint::new(0.55, 0.45);
        pts[385] = LandmarkPoint::new(0.58, 0.44);
        pts[387] = LandmarkPoint::new(0.62, 0.44);
        pts[RIGHT_EYE_OUTER] = LandmarkPoint::new(0.65, 0.45);
        pts[373] = LandmarkPoint::new(0.62, 0.46);
        pts[380] = LandmarkPoint::new(0.58, 0.46);

        // Iris blocks collapsed onto the displaced iris center.
        let left_iris = LandmarkPoint::new(
            LEFT_EYE_CENTER.0 + gaze_h * EYE_WIDTH,
            LEFT_EYE_CENTER.1 + gaze_v * EYE_WIDTH,
        );
        let right_iris = LandmarkPoint::new(
            RIGHT_EYE_CENTER.0 + gaze_h * EYE_WIDTH,
            RIGHT_EYE_CENTER.1 + gaze_v * EYE_WIDTH,
        );
        for idx in LEFT_IRIS {
            pts[idx] = left_iris;
        }
        for idx in RIGHT_IRIS {
            pts[idx] = right_iris;
        }

        LandmarkFrame::new(pts)
    }

    /// Neutral frame: everything centered.
    pub(crate) fn centered_frame() -> LandmarkFrame {
        frame_with(0.0, 0.0, 0.0, 0.0)
    }

    /// Same face but truncated to the base set (no iris block).
    pub(crate) fn base_frame() -> LandmarkFrame {
        let extended = centered_frame();
        let pts = (0..BASE_LANDMARK_COUNT)
            .map(|i| extended.point(i).unwrap())
            .collect();
        LandmarkFrame::new(pts)
    }

    /// Frame too short to classify at all.
    pub(crate) fn short_frame() -> LandmarkFrame {
        LandmarkFrame::new(vec![LandmarkPoint::new(0.5, 0.5); 100])
    }
}
