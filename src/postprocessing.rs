// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Post-processing for pose landmark model outputs.
//!
//! The landmark model produces a flat landmark tensor (stride 5: x, y, z,
//! visibility, presence, in model input pixels) and a single presence logit.
//! Extra outputs such as segmentation masks, heatmaps or world landmarks are
//! ignored.

#![allow(clippy::cast_precision_loss)]

use crate::error::{PoseError, Result};
use crate::landmark::{Landmark, NUM_LANDMARKS, PoseLandmarks};
use crate::preprocessing::LetterboxTransform;

/// Values per landmark in the landmark tensor.
pub const LANDMARK_STRIDE: usize = 5;

/// Logistic sigmoid.
#[must_use]
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Locate the landmark tensor among the model outputs.
///
/// The first output holding at least 33 landmarks at stride 5 wins.
#[must_use]
pub fn find_landmark_output(outputs: &[(Vec<f32>, Vec<usize>)]) -> Option<usize> {
    outputs.iter().position(|(data, shape)| {
        data.len() >= NUM_LANDMARKS * LANDMARK_STRIDE
            && data.len() % LANDMARK_STRIDE == 0
            && shape.len() <= 3
    })
}

/// Locate the single-value presence output.
#[must_use]
pub fn find_presence_output(outputs: &[(Vec<f32>, Vec<usize>)]) -> Option<usize> {
    outputs.iter().position(|(data, _)| data.len() == 1)
}

/// Decode raw model outputs into normalized frame landmarks.
///
/// # Arguments
///
/// * `outputs` - Raw model outputs as (data, shape) pairs.
/// * `transform` - Letterbox transform recorded during preprocessing.
///
/// # Returns
///
/// The 33 pose landmarks with sigmoid-activated visibility and the pose presence score.
///
/// # Errors
///
/// Returns [`PoseError::PostProcessingError`] if no output looks like a landmark tensor.
pub fn decode_landmarks(
    outputs: &[(Vec<f32>, Vec<usize>)],
    transform: &LetterboxTransform,
) -> Result<PoseLandmarks> {
    let landmark_idx = find_landmark_output(outputs).ok_or_else(|| {
        let shapes: Vec<_> = outputs.iter().map(|(_, shape)| shape.clone()).collect();
        PoseError::PostProcessingError(format!(
            "No landmark output with at least {} values found (output shapes: {shapes:?})",
            NUM_LANDMARKS * LANDMARK_STRIDE
        ))
    })?;
    let raw = &outputs[landmark_idx].0;

    let frame_width = transform.frame_size.0.max(1) as f32;
    let landmarks: Vec<Landmark> = raw
        .chunks_exact(LANDMARK_STRIDE)
        .take(NUM_LANDMARKS)
        .map(|v| {
            let (x, y) = transform.to_normalized(v[0], v[1]);
            Landmark {
                x,
                y,
                // Depth shares the x axis scale.
                z: v[2] / transform.scale / frame_width,
                visibility: sigmoid(v[3]),
            }
        })
        .collect();

    let presence = match find_presence_output(outputs) {
        Some(idx) => sigmoid(outputs[idx].0[0]),
        None => {
            // Models without a pose flag: average per-landmark presence.
            let sum: f32 = raw
                .chunks_exact(LANDMARK_STRIDE)
                .take(NUM_LANDMARKS)
                .map(|v| sigmoid(v[4]))
                .sum();
            sum / NUM_LANDMARKS as f32
        }
    };

    Ok(PoseLandmarks::new(landmarks, presence))
}
