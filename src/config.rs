// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Detector configuration.
//!
//! This module defines the [`PoseConfig`] struct, which carries the pose model's
//! detection/tracking thresholds and the runtime options used to build the ONNX
//! Runtime session. Values are passed through to the model unchecked.

use std::path::PathBuf;

use crate::device::Device;
use crate::preprocessing::ChannelOrder;

/// Default minimum presence score for a fresh detection.
pub const DEFAULT_DETECTION_CONFIDENCE: f32 = 0.7;

/// Default minimum presence score to keep tracking the previous pose.
pub const DEFAULT_TRACKING_CONFIDENCE: f32 = 0.7;

/// Configuration for [`PoseDetector`](crate::PoseDetector) and the pose model.
///
/// # Example
///
/// ```rust
/// use pose_detector::{ChannelOrder, PoseConfig};
///
/// let config = PoseConfig::new()
///     .with_static_image_mode(false)
///     .with_detection_confidence(0.5)
///     .with_tracking_confidence(0.5)
///     .with_channel_order(ChannelOrder::Bgr);
/// ```
#[derive(Debug, Clone)]
pub struct PoseConfig {
    /// Treat every frame as an unrelated image (no tracking between frames).
    pub static_image_mode: bool,
    /// Minimum presence score (0.0 to 1.0) for a pose detected from scratch.
    pub min_detection_confidence: f32,
    /// Minimum presence score (0.0 to 1.0) for a pose tracked from the previous frame.
    /// Below it, the next frame falls back to a fresh detection.
    pub min_tracking_confidence: f32,
    /// Channel order of the frames handed to the detector.
    pub channel_order: ChannelOrder,
    /// Explicit model input size (height, width). `None` reads it from the model.
    pub input_size: Option<(usize, usize)>,
    /// Number of intra-op threads for ONNX Runtime (`0` lets ONNX Runtime decide).
    pub num_threads: usize,
    /// Feed the model FP16 input.
    pub half: bool,
    /// Execution device.
    pub device: Device,
    /// TrueType font used for overlay text. `None` uses the cached default font.
    pub font: Option<PathBuf>,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            static_image_mode: false,
            min_detection_confidence: DEFAULT_DETECTION_CONFIDENCE,
            min_tracking_confidence: DEFAULT_TRACKING_CONFIDENCE,
            channel_order: ChannelOrder::Rgb,
            input_size: None,
            num_threads: 0,
            half: false,
            device: Device::Cpu,
            font: None,
        }
    }
}

impl PoseConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable static image mode.
    #[must_use]
    pub const fn with_static_image_mode(mut self, static_image_mode: bool) -> Self {
        self.static_image_mode = static_image_mode;
        self
    }

    /// Set the minimum detection confidence.
    #[must_use]
    pub const fn with_detection_confidence(mut self, threshold: f32) -> Self {
        self.min_detection_confidence = threshold;
        self
    }

    /// Set the minimum tracking confidence.
    #[must_use]
    pub const fn with_tracking_confidence(mut self, threshold: f32) -> Self {
        self.min_tracking_confidence = threshold;
        self
    }

    /// Set the channel order of incoming frames.
    ///
    /// Frames decoded by OpenCV-style capture stacks are BGR; frames produced by
    /// [`SourceIterator`](crate::SourceIterator) are RGB.
    #[must_use]
    pub const fn with_channel_order(mut self, order: ChannelOrder) -> Self {
        self.channel_order = order;
        self
    }

    /// Override the model input size.
    #[must_use]
    pub const fn with_input_size(mut self, height: usize, width: usize) -> Self {
        self.input_size = Some((height, width));
        self
    }

    /// Set the number of threads for inference.
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Enable or disable FP16 input.
    #[must_use]
    pub const fn with_half(mut self, half: bool) -> Self {
        self.half = half;
        self
    }

    /// Set the execution device.
    #[must_use]
    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Use a specific font file for overlay text.
    #[must_use]
    pub fn with_font<P: Into<PathBuf>>(mut self, font: P) -> Self {
        self.font = Some(font.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = PoseConfig::default();
        assert!(!config.static_image_mode);
        assert!((config.min_detection_confidence - 0.7).abs() < f32::EPSILON);
        assert!((config.min_tracking_confidence - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.channel_order, ChannelOrder::Rgb);
        assert_eq!(config.device, Device::Cpu);
        assert!(config.input_size.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = PoseConfig::new()
            .with_static_image_mode(true)
            .with_detection_confidence(0.5)
            .with_tracking_confidence(0.3)
            .with_channel_order(ChannelOrder::Bgr)
            .with_input_size(256, 256)
            .with_threads(4)
            .with_device(Device::Cuda(1))
            .with_font("fonts/DejaVuSans.ttf");

        assert!(config.static_image_mode);
        assert!((config.min_detection_confidence - 0.5).abs() < f32::EPSILON);
        assert!((config.min_tracking_confidence - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.channel_order, ChannelOrder::Bgr);
        assert_eq!(config.input_size, Some((256, 256)));
        assert_eq!(config.num_threads, 4);
        assert_eq!(config.device, Device::Cuda(1));
        assert_eq!(config.font, Some(PathBuf::from("fonts/DejaVuSans.ttf")));
    }

    #[test]
    fn test_thresholds_pass_through_unchecked() {
        let config = PoseConfig::new().with_detection_confidence(1.5);
        assert!((config.min_detection_confidence - 1.5).abs() < f32::EPSILON);
    }
}
