// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Frame-to-frame pose tracking.
//!
//! In video mode the pose accepted on one frame selects the region searched on
//! the next. A tracked region only has to clear the tracking threshold; when it
//! fails (or nothing is tracked yet) the whole frame is searched against the
//! detection threshold.

use crate::config::PoseConfig;
use crate::error::Result;
use crate::landmark::PoseLandmarks;
use crate::preprocessing::Roi;

/// Chooses the region to search on each frame and keeps the last accepted pose.
#[derive(Debug, Clone, Default)]
pub struct PoseTracker {
    static_image_mode: bool,
    detection_confidence: f32,
    tracking_confidence: f32,
    previous: Option<PoseLandmarks>,
}

impl PoseTracker {
    /// Create a tracker with the thresholds and mode of `config`.
    #[must_use]
    pub const fn new(config: &PoseConfig) -> Self {
        Self {
            static_image_mode: config.static_image_mode,
            detection_confidence: config.min_detection_confidence,
            tracking_confidence: config.min_tracking_confidence,
            previous: None,
        }
    }

    /// Whether a pose from the previous frame is being tracked.
    #[must_use]
    pub const fn is_tracking(&self) -> bool {
        self.previous.is_some()
    }

    /// Drop the tracked pose.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Region to try first on a `width`x`height` frame, if any.
    #[must_use]
    pub fn tracking_roi(&self, width: u32, height: u32) -> Option<Roi> {
        if self.static_image_mode {
            return None;
        }
        self.previous
            .as_ref()
            .and_then(|pose| Roi::around(pose, width, height))
    }

    /// Search one frame, calling `run` for each region tried.
    ///
    /// Returns the accepted pose, or `None` when no region cleared its threshold.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `run`.
    pub fn select<F>(&mut self, width: u32, height: u32, mut run: F) -> Result<Option<PoseLandmarks>>
    where
        F: FnMut(Roi) -> Result<PoseLandmarks>,
    {
        let mut accepted = None;

        if let Some(roi) = self.tracking_roi(width, height) {
            let pose = run(roi)?;
            if pose.presence >= self.tracking_confidence {
                accepted = Some(pose);
            }
        }

        if accepted.is_none() {
            let pose = run(Roi::full(width, height))?;
            if pose.presence >= self.detection_confidence {
                accepted = Some(pose);
            }
        }

        self.previous = if self.static_image_mode {
            None
        } else {
            accepted.clone()
        };

        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PoseError;
    use crate::landmark::{Landmark, NUM_LANDMARKS};

    const W: u32 = 200;
    const H: u32 = 200;

    /// A pose filling the centre of the frame.
    fn pose(presence: f32) -> PoseLandmarks {
        let landmarks = (0..NUM_LANDMARKS)
            .map(|i| {
                let t = i as f32 / (NUM_LANDMARKS - 1) as f32;
                Landmark::new(0.4 + 0.2 * t, 0.3 + 0.4 * t)
            })
            .collect();
        PoseLandmarks::new(landmarks, presence)
    }

    fn tracker(static_image_mode: bool) -> PoseTracker {
        PoseTracker::new(
            &PoseConfig::new()
                .with_static_image_mode(static_image_mode)
                .with_detection_confidence(0.7)
                .with_tracking_confidence(0.5),
        )
    }

    #[test]
    fn test_first_frame_searches_full_frame() {
        let mut t = tracker(false);
        let mut tried = Vec::new();

        let found = t
            .select(W, H, |roi| {
                tried.push(roi);
                Ok(pose(0.9))
            })
            .unwrap();

        assert!(found.is_some());
        assert_eq!(tried, vec![Roi::full(W, H)]);
        assert!(t.is_tracking());
    }

    #[test]
    fn test_tracked_region_uses_tracking_threshold() {
        let mut t = tracker(false);
        t.select(W, H, |_| Ok(pose(0.9))).unwrap();
        let expected = Roi::around(&pose(0.9), W, H).unwrap();
        assert_ne!(expected, Roi::full(W, H));

        // 0.6 is below detection (0.7) but above tracking (0.5).
        let mut tried = Vec::new();
        let found = t
            .select(W, H, |roi| {
                tried.push(roi);
                Ok(pose(0.6))
            })
            .unwrap();

        assert_eq!(tried, vec![expected]);
        assert!((found.unwrap().presence - 0.6).abs() < f32::EPSILON);
    }

    #[test]
    fn test_lost_track_falls_back_to_detection_threshold() {
        let mut t = tracker(false);
        t.select(W, H, |_| Ok(pose(0.9))).unwrap();

        // Tracked region fails; full frame at 0.6 is still below detection.
        let mut tried = Vec::new();
        let found = t
            .select(W, H, |roi| {
                tried.push(roi);
                Ok(pose(if roi == Roi::full(W, H) { 0.6 } else { 0.4 }))
            })
            .unwrap();

        assert_eq!(tried.len(), 2);
        assert_eq!(tried[1], Roi::full(W, H));
        assert!(found.is_none());
        assert!(!t.is_tracking());

        // Full frame clears detection on the retry.
        let found = t.select(W, H, |_| Ok(pose(0.8))).unwrap();
        assert!(found.is_some());
        assert!(t.is_tracking());
    }

    #[test]
    fn test_static_mode_never_crops() {
        let mut t = tracker(true);
        let mut tried = Vec::new();

        for _ in 0..3 {
            let found = t
                .select(W, H, |roi| {
                    tried.push(roi);
                    Ok(pose(0.9))
                })
                .unwrap();
            assert!(found.is_some());
            assert!(!t.is_tracking());
        }

        assert_eq!(tried, vec![Roi::full(W, H); 3]);
    }

    #[test]
    fn test_reset_drops_track() {
        let mut t = tracker(false);
        t.select(W, H, |_| Ok(pose(0.9))).unwrap();
        assert!(t.tracking_roi(W, H).is_some());

        t.reset();
        assert!(t.tracking_roi(W, H).is_none());
    }

    #[test]
    fn test_runner_error_propagates() {
        let mut t = tracker(false);
        let err = t
            .select(W, H, |_| Err(PoseError::InferenceError("boom".to_string())))
            .unwrap_err();
        assert!(matches!(err, PoseError::InferenceError(_)));
    }
}
