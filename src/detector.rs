// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! High-level pose detector.
//!
//! [`PoseDetector`] wraps a [`PoseModel`] and keeps the last frame's result so
//! that pose detection, landmark extraction and angle measurement can be
//! called one after another on the same frame:
//!
//! ```no_run
//! use pose_detector::{PoseConfig, PoseDetector};
//!
//! let mut detector = PoseDetector::new("pose_landmark_full.onnx", PoseConfig::default())?;
//! let mut frame = image::open("squat.jpg")?.to_rgb8();
//!
//! if detector.find_pose(&mut frame, true)? {
//!     let points = detector.find_position(&mut frame, false);
//!     println!("{} landmarks", points.len());
//!     let knee = detector.find_angle(&mut frame, 23, 25, 27, true);
//!     println!("left knee: {knee:.1}");
//! }
//! # Ok::<(), pose_detector::PoseError>(())
//! ```

use std::path::Path;

use image::RgbImage;

use crate::annotate::{Annotator, POINT_COLOR, POINT_RADIUS};
use crate::config::PoseConfig;
use crate::error::Result;
use crate::geometry::three_point_angle;
use crate::landmark::LandmarkPoint;
use crate::model::{OnnxPoseModel, PoseModel};
use crate::preprocessing::to_rgb;
use crate::results::PoseResults;

/// Pose detector with drawing helpers.
///
/// Frames are annotated in place in the channel order given by
/// [`PoseConfig::channel_order`].
#[derive(Debug)]
pub struct PoseDetector<M: PoseModel = OnnxPoseModel> {
    model: M,
    config: PoseConfig,
    annotator: Option<Annotator>,
    /// Model output for the last frame passed to `find_pose`.
    results: Option<PoseResults>,
    /// Landmark pixel positions from the last `find_position` call.
    positions: Vec<LandmarkPoint>,
}

impl PoseDetector<OnnxPoseModel> {
    /// Load an ONNX pose model and build a detector around it.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be loaded.
    pub fn new<P: AsRef<Path>>(model_path: P, config: PoseConfig) -> Result<Self> {
        let model = OnnxPoseModel::load_with_config(model_path, config.clone())?;
        Ok(Self::with_model(model, config))
    }
}

impl<M: PoseModel> PoseDetector<M> {
    /// Build a detector around an existing model.
    ///
    /// The model is expected to honor the thresholds in `config`.
    pub const fn with_model(model: M, config: PoseConfig) -> Self {
        Self {
            model,
            config,
            annotator: None,
            results: None,
            positions: Vec::new(),
        }
    }

    /// Use a specific annotator instead of loading the configured font on first draw.
    #[must_use]
    pub fn with_annotator(mut self, annotator: Annotator) -> Self {
        self.annotator = Some(annotator);
        self
    }

    /// Detect a pose on `frame`, optionally drawing the skeleton and joint angles on it.
    ///
    /// The frame is converted to RGB for the model when the configured channel
    /// order is BGR. With `draw`, landmark dots (except face and finger points),
    /// body bones and joint-angle labels are drawn, in that order.
    ///
    /// Returns whether a pose was found. The result is kept for
    /// [`find_position`](Self::find_position).
    ///
    /// # Errors
    ///
    /// Returns an error if the model fails on this frame.
    pub fn find_pose(&mut self, frame: &mut RgbImage, draw: bool) -> Result<bool> {
        let results = {
            let rgb = to_rgb(frame, self.config.channel_order);
            self.model.process(&rgb)?
        };

        let found = results.has_pose();
        if found && draw {
            let points = results.points();
            let annotator = annotator_for(&mut self.annotator, &self.config);
            annotator.draw_skeleton(frame, &points);
            annotator.draw_angle_overlays(frame, &points);
        }

        self.results = Some(results);
        Ok(found)
    }

    /// Pixel positions `[id, x, y]` of all landmarks found by the last [`find_pose`](Self::find_pose).
    ///
    /// Coordinates are scaled to `frame` and truncated. Returns an empty list if no
    /// pose was found or `find_pose` has not been called. With `draw`, every landmark
    /// gets a dot.
    pub fn find_position(&mut self, frame: &mut RgbImage, draw: bool) -> &[LandmarkPoint] {
        self.positions.clear();

        let pose = self.results.as_ref().and_then(|r| r.landmarks.as_ref());
        if let Some(pose) = pose {
            self.positions = pose.to_points(frame.width(), frame.height());

            if draw {
                let annotator = annotator_for(&mut self.annotator, &self.config);
                for p in &self.positions {
                    annotator.point(frame, p.xy(), POINT_RADIUS, POINT_COLOR);
                }
            }
        }

        &self.positions
    }

    /// Angle in degrees at `p2` between the landmarks `p1`, `p2` and `p3`, in `[0, 360)`.
    ///
    /// Indices refer to the list returned by the last [`find_position`](Self::find_position).
    /// With `draw`, both arms are drawn, the three joints are highlighted and the
    /// whole-degree value is written below the vertex.
    ///
    /// # Panics
    ///
    /// Panics if any index is outside the landmark list, including when no pose was found.
    pub fn find_angle(
        &mut self,
        frame: &mut RgbImage,
        p1: usize,
        p2: usize,
        p3: usize,
        draw: bool,
    ) -> f64 {
        let a = self.positions[p1].xy();
        let b = self.positions[p2].xy();
        let c = self.positions[p3].xy();

        let angle = three_point_angle(a, b, c);
        if draw {
            annotator_for(&mut self.annotator, &self.config).draw_angle_marker(frame, a, b, c, angle);
        }
        angle
    }

    /// Landmark list from the last [`find_position`](Self::find_position).
    #[must_use]
    pub fn positions(&self) -> &[LandmarkPoint] {
        &self.positions
    }

    /// Model output for the last frame passed to [`find_pose`](Self::find_pose).
    #[must_use]
    pub const fn last_results(&self) -> Option<&PoseResults> {
        self.results.as_ref()
    }

    /// Annotator used for drawing, loading the configured font if needed.
    pub fn annotator(&mut self) -> &Annotator {
        annotator_for(&mut self.annotator, &self.config)
    }

    /// Detector configuration.
    #[must_use]
    pub const fn config(&self) -> &PoseConfig {
        &self.config
    }

    /// Underlying model.
    #[must_use]
    pub const fn model(&self) -> &M {
        &self.model
    }

    /// Forget the cached result and any tracking state, e.g. when switching sources.
    pub fn reset(&mut self) {
        self.results = None;
        self.positions.clear();
        self.model.reset();
    }
}

fn annotator_for<'a>(slot: &'a mut Option<Annotator>, config: &PoseConfig) -> &'a Annotator {
    slot.get_or_insert_with(|| Annotator::for_config(config))
}

#[cfg(test)]
mod tests {
    use image::Rgb;

    use super::*;
    use crate::landmark::{Landmark, NUM_LANDMARKS, PoseLandmarks};
    use crate::preprocessing::ChannelOrder;

    /// Model returning a fixed pose and recording the top-left pixel it was given.
    struct StubModel {
        pose: Option<PoseLandmarks>,
        seen: Vec<Rgb<u8>>,
    }

    impl PoseModel for StubModel {
        fn process(&mut self, rgb: &RgbImage) -> Result<PoseResults> {
            self.seen.push(*rgb.get_pixel(0, 0));
            let (width, height) = rgb.dimensions();
            Ok(PoseResults {
                landmarks: self.pose.clone(),
                ..PoseResults::empty((height, width))
            })
        }
    }

    /// Left arm bent at a right angle at the elbow, everything else at the center.
    fn arm_pose() -> PoseLandmarks {
        let mut landmarks = vec![Landmark::new(0.5, 0.5); NUM_LANDMARKS];
        landmarks[11] = Landmark::new(0.25, 0.5);
        landmarks[13] = Landmark::new(0.5, 0.5);
        landmarks[15] = Landmark::new(0.5, 0.25);
        PoseLandmarks::new(landmarks, 0.95)
    }

    fn detector(pose: Option<PoseLandmarks>, order: ChannelOrder) -> PoseDetector<StubModel> {
        let model = StubModel {
            pose,
            seen: Vec::new(),
        };
        let config = PoseConfig::default().with_channel_order(order);
        PoseDetector::with_model(model, config).with_annotator(Annotator::shapes_only(order))
    }

    #[test]
    fn test_no_pose() {
        let mut det = detector(None, ChannelOrder::Rgb);
        let mut frame = RgbImage::new(64, 48);

        assert!(!det.find_pose(&mut frame, true).unwrap());
        assert!(frame.pixels().all(|p| p == &Rgb([0, 0, 0])));
        assert!(det.find_position(&mut frame, true).is_empty());
    }

    #[test]
    fn test_find_position_before_find_pose() {
        let mut det = detector(Some(arm_pose()), ChannelOrder::Rgb);
        let mut frame = RgbImage::new(64, 48);
        assert!(det.find_position(&mut frame, false).is_empty());
    }

    #[test]
    fn test_find_pose_draws_only_when_asked() {
        let mut det = detector(Some(arm_pose()), ChannelOrder::Rgb);

        let mut frame = RgbImage::new(400, 400);
        assert!(det.find_pose(&mut frame, false).unwrap());
        assert!(frame.pixels().all(|p| p == &Rgb([0, 0, 0])));

        assert!(det.find_pose(&mut frame, true).unwrap());
        // Shoulder dot is drawn blue, below the bones leaving it.
        assert_eq!(frame.get_pixel(100, 204), &Rgb([0, 0, 255]));
    }

    #[test]
    fn test_find_position_pixels() {
        let mut det = detector(Some(arm_pose()), ChannelOrder::Rgb);
        let mut frame = RgbImage::new(640, 480);
        det.find_pose(&mut frame, false).unwrap();

        let points = det.find_position(&mut frame, false).to_vec();
        assert_eq!(points.len(), NUM_LANDMARKS);
        assert_eq!(points[0].id, 0);
        assert_eq!(points[0].xy(), (320, 240));
        assert_eq!(points[11].xy(), (160, 240));
        assert_eq!(det.positions(), points.as_slice());
    }

    #[test]
    fn test_find_angle() {
        let mut det = detector(Some(arm_pose()), ChannelOrder::Rgb);
        let mut frame = RgbImage::new(400, 400);
        det.find_pose(&mut frame, false).unwrap();
        det.find_position(&mut frame, false);

        let angle = det.find_angle(&mut frame, 11, 13, 15, false);
        assert!((angle - 90.0).abs() < 1e-9);
        assert!(frame.pixels().all(|p| p == &Rgb([0, 0, 0])));

        let reverse = det.find_angle(&mut frame, 15, 13, 11, true);
        assert!((reverse - 270.0).abs() < 1e-9);
        assert_eq!(frame.get_pixel(200, 200), &Rgb([255, 0, 0]));
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn test_find_angle_out_of_range() {
        let mut det = detector(Some(arm_pose()), ChannelOrder::Rgb);
        let mut frame = RgbImage::new(100, 100);
        det.find_pose(&mut frame, false).unwrap();
        det.find_position(&mut frame, false);
        let _ = det.find_angle(&mut frame, 11, 13, 40, false);
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn test_find_angle_without_pose() {
        let mut det = detector(None, ChannelOrder::Rgb);
        let mut frame = RgbImage::new(100, 100);
        det.find_pose(&mut frame, false).unwrap();
        det.find_position(&mut frame, false);
        let _ = det.find_angle(&mut frame, 11, 13, 15, false);
    }

    #[test]
    fn test_bgr_frames_are_converted() {
        let mut det = detector(Some(arm_pose()), ChannelOrder::Bgr);
        let mut frame = RgbImage::from_pixel(400, 400, Rgb([1, 2, 3]));
        det.find_pose(&mut frame, true).unwrap();

        assert_eq!(det.model().seen, vec![Rgb([3, 2, 1])]);
        // Blue dots land as BGR.
        assert_eq!(frame.get_pixel(100, 204), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_reset_clears_cache() {
        let mut det = detector(Some(arm_pose()), ChannelOrder::Rgb);
        let mut frame = RgbImage::new(100, 100);
        det.find_pose(&mut frame, false).unwrap();
        assert!(det.last_results().is_some());

        det.reset();
        assert!(det.last_results().is_none());
        assert!(det.find_position(&mut frame, false).is_empty());
    }
}
