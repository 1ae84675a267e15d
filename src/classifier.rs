//! Direction classification
//!
//! Maps normalized offsets to discrete direction labels using the active
//! sensitivity profile. The vertical axis is evaluated before the
//! horizontal one, and comparisons are strict: an offset exactly at the
//! threshold still classifies as centered.

use crate::geometry::{GazeOffsets, HeadPoseOffsets};
use crate::profile::SensitivityProfile;
use crate::types::{GazeDirection, HeadDirection};

/// Classify eye gaze. Missing offsets (iris block unavailable) fall back
/// to centered.
pub fn classify_gaze(
    offsets: Option<GazeOffsets>,
    profile: &SensitivityProfile,
) -> GazeDirection {
    let offsets = match offsets {
        Some(offsets) => offsets,
        None => return GazeDirection::Center,
    };
    let threshold = profile.gaze_offset_threshold;

    if offsets.vertical.abs() > threshold {
        if offsets.vertical > 0.0 {
            GazeDirection::Down
        } else {
            GazeDirection::Up
        }
    } else if offsets.horizontal.abs() > threshold {
        if offsets.horizontal < 0.0 {
            GazeDirection::Left
        } else {
            GazeDirection::Right
        }
    } else {
        GazeDirection::Center
    }
}

/// Classify head pose. A downward tilt is the only vertical label; an
/// upward tilt past the threshold reads as centered and does not fall
/// through to the horizontal check.
pub fn classify_head_pose(
    offsets: HeadPoseOffsets,
    profile: &SensitivityProfile,
) -> HeadDirection {
    let threshold = profile.head_offset_threshold;

    if offsets.vertical.abs() > threshold {
        if offsets.vertical > 0.0 {
            HeadDirection::FaceDown
        } else {
            HeadDirection::FaceCenter
        }
    } else if offsets.horizontal.abs() > threshold {
        if offsets.horizontal > 0.0 {
            HeadDirection::FaceRight
        } else {
            HeadDirection::FaceLeft
        }
    } else {
        HeadDirection::FaceCenter
    }
}
