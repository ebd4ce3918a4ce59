// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Pose Detector
//!
//! Human pose landmark detection on top of ONNX Runtime, with the drawing and
//! measurement helpers needed for fitness and movement analysis: a filtered
//! body skeleton, joint-angle overlays, landmark pixel positions and the angle
//! between any three landmarks.
//!
//! ## Features
//!
//! - **33-point landmarks** - Nose, eyes, ears, mouth, shoulders, elbows, wrists,
//!   hands, hips, knees, ankles, heels and feet
//! - **Tracking** - In video mode the next frame is cropped around the last pose
//! - **Annotation** - Skeleton without face and finger clutter, joint angles at
//!   shoulders, elbows, wrists, knees and ankles
//! - **BGR or RGB frames** - Frames are converted for the model and drawn in their own order
//! - **Multiple Backends** - CPU, CUDA, `TensorRT`, `CoreML` and `DirectML`
//! - **Multiple Sources** - Images, directories, video files and webcams
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use pose_detector::{PoseConfig, PoseDetector, PoseLandmark};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PoseConfig::new()
//!         .with_detection_confidence(0.7)
//!         .with_tracking_confidence(0.7);
//!     let mut detector = PoseDetector::new("pose_landmark_full.onnx", config)?;
//!
//!     let mut frame = image::open("pushup.jpg")?.to_rgb8();
//!     if detector.find_pose(&mut frame, true)? {
//!         let points = detector.find_position(&mut frame, false);
//!         println!("{}", points[PoseLandmark::RightWrist.index()]);
//!
//!         let elbow = detector.find_angle(&mut frame, 12, 14, 16, true);
//!         println!("right elbow: {elbow:.0} degrees");
//!     }
//!     frame.save("pushup_annotated.jpg")?;
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Track a video, printing the right index finger each frame
//! pose-detector run --model pose_landmark_full.onnx --source dance.mp4 --show
//!
//! # Webcam 0 with lower thresholds
//! pose-detector run -m pose_landmark_full.onnx -s 0 --conf 0.5 --track-conf 0.5
//!
//! # Every image in a directory, no tracking between them
//! pose-detector run -m pose_landmark_full.onnx -s photos/ --static-image-mode
//! ```
//!
//! ## Custom Models
//!
//! Any model implementing [`PoseModel`] can drive the detector:
//!
//! ```rust
//! use image::RgbImage;
//! use pose_detector::{PoseConfig, PoseDetector, PoseModel, PoseResults, Result};
//!
//! struct NoPose;
//!
//! impl PoseModel for NoPose {
//!     fn process(&mut self, rgb: &RgbImage) -> Result<PoseResults> {
//!         Ok(PoseResults::empty((rgb.height(), rgb.width())))
//!     }
//! }
//!
//! let mut detector = PoseDetector::with_model(NoPose, PoseConfig::default());
//! let mut frame = RgbImage::new(64, 48);
//! assert!(!detector.find_pose(&mut frame, false).unwrap());
//! assert!(detector.find_position(&mut frame, false).is_empty());
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`detector`] | [`PoseDetector`]: find pose, positions and angles |
//! | [`model`] | [`PoseModel`] trait and the ONNX Runtime [`OnnxPoseModel`] |
//! | [`tracking`] | [`PoseTracker`]: region selection between video frames |
//! | [`landmark`] | Landmark schema, connections and pixel conversion |
//! | [`geometry`] | Three-point joint angles |
//! | [`annotate`] | Skeleton, angle and text drawing |
//! | [`config`] | [`PoseConfig`] builder |
//! | [`source`] | Input sources ([`Source`], [`SourceIterator`]) |
//! | [`preprocessing`] | Channel order, cropping and letterboxing |
//! | [`postprocessing`] | Landmark tensor decoding |
//! | [`error`] | Error types ([`PoseError`], [`Result`]) |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `annotate` | Download the overlay font on first use (default) |
//! | `visualize` | Real-time window display (default) |
//! | `video` | Video file and webcam support |
//! | `cuda` | NVIDIA CUDA acceleration |
//! | `tensorrt` | NVIDIA `TensorRT` optimization |
//! | `coreml` | Apple `CoreML` (macOS/iOS) |
//! | `directml` | `DirectML` (Windows) |

// Modules
pub mod annotate;
pub mod cli;
pub mod config;
pub mod detector;
pub mod device;
pub mod error;
pub mod fps;
pub mod geometry;
pub mod landmark;
pub mod model;
pub mod postprocessing;
pub mod preprocessing;
pub mod results;
pub mod source;
pub mod tracking;
pub mod visualizer;

// Re-export main types for convenience
pub use annotate::Annotator;
pub use config::PoseConfig;
pub use detector::PoseDetector;
pub use device::Device;
pub use error::{PoseError, Result};
pub use fps::FpsCounter;
pub use geometry::{overlay_angle, three_point_angle};
pub use landmark::{
    Landmark, LandmarkPoint, NUM_LANDMARKS, POSE_CONNECTIONS, PoseLandmark, PoseLandmarks,
    denormalize,
};
pub use model::{OnnxPoseModel, PoseModel};
pub use preprocessing::ChannelOrder;
pub use results::{PoseResults, Speed};
pub use source::{Source, SourceIterator, SourceMeta};
pub use tracking::PoseTracker;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "pose-detector");
    }
}
