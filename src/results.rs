// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Result types returned by the pose model.

use crate::landmark::{LandmarkPoint, PoseLandmarks};

/// Timing information for inference operations (in milliseconds).
#[derive(Debug, Clone, Copy, Default)]
pub struct Speed {
    /// Time spent on preprocessing.
    pub preprocess: Option<f64>,
    /// Time spent on model inference.
    pub inference: Option<f64>,
    /// Time spent on postprocessing.
    pub postprocess: Option<f64>,
}

impl Speed {
    /// Create a new Speed instance with all timings.
    ///
    /// # Arguments
    ///
    /// * `preprocess` - Time in milliseconds.
    /// * `inference` - Time in milliseconds.
    /// * `postprocess` - Time in milliseconds.
    #[must_use]
    pub const fn new(preprocess: f64, inference: f64, postprocess: f64) -> Self {
        Self {
            preprocess: Some(preprocess),
            inference: Some(inference),
            postprocess: Some(postprocess),
        }
    }

    /// Sum of preprocess, inference, and postprocess times in milliseconds.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.preprocess.unwrap_or(0.0)
            + self.inference.unwrap_or(0.0)
            + self.postprocess.unwrap_or(0.0)
    }
}

/// Output of one pose model call.
#[derive(Debug, Clone, Default)]
pub struct PoseResults {
    /// Detected pose, or `None` when no person passed the confidence threshold.
    pub landmarks: Option<PoseLandmarks>,
    /// Timing of the call.
    pub speed: Speed,
    /// Frame shape (height, width).
    pub orig_shape: (u32, u32),
}

impl PoseResults {
    /// Results for a frame with no detected pose.
    #[must_use]
    pub const fn empty(orig_shape: (u32, u32)) -> Self {
        Self {
            landmarks: None,
            speed: Speed {
                preprocess: None,
                inference: None,
                postprocess: None,
            },
            orig_shape,
        }
    }

    /// Whether a pose was detected.
    #[must_use]
    pub const fn has_pose(&self) -> bool {
        self.landmarks.is_some()
    }

    /// Pixel positions of the detected landmarks (empty without a pose).
    #[must_use]
    pub fn points(&self) -> Vec<LandmarkPoint> {
        let (height, width) = self.orig_shape;
        self.landmarks
            .as_ref()
            .map(|pose| pose.to_points(width, height))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::Landmark;

    #[test]
    fn test_speed_total() {
        let speed = Speed::new(1.5, 10.0, 0.5);
        assert!((speed.total() - 12.0).abs() < 1e-9);
        assert!(Speed::default().total().abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_results() {
        let results = PoseResults::empty((480, 640));
        assert!(!results.has_pose());
        assert!(results.points().is_empty());
    }

    #[test]
    fn test_points_use_frame_size() {
        let pose = PoseLandmarks::new(vec![Landmark::new(0.5, 0.5)], 0.9);
        let results = PoseResults {
            landmarks: Some(pose),
            speed: Speed::default(),
            orig_shape: (480, 640),
        };
        let points = results.points();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].xy(), (320, 240));
    }
}
