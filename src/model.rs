// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Pose landmark model loading and inference.
//!
//! [`PoseModel`] is the seam between the detector and the network that
//! predicts landmarks. [`OnnxPoseModel`] implements it on top of an ONNX
//! Runtime session running a 33-point landmark model, and carries the
//! frame-to-frame tracking state used in video mode.

use std::fmt;
use std::path::Path;
use std::time::Instant;

use half::f16;
use image::RgbImage;
use ndarray::Array4;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::tensor::TensorElementType;
use ort::value::TensorRef;

use crate::config::PoseConfig;
use crate::error::{PoseError, Result};
use crate::landmark::PoseLandmarks;
use crate::postprocessing::decode_landmarks;
use crate::preprocessing::{Roi, TensorData, TensorLayout, preprocess_frame};
use crate::results::{PoseResults, Speed};
use crate::tracking::PoseTracker;

/// Input size (height, width) used when neither the model nor the config states one.
pub const DEFAULT_INPUT_SIZE: (usize, usize) = (256, 256);

/// A model that predicts pose landmarks for RGB frames.
pub trait PoseModel {
    /// Process one RGB frame.
    ///
    /// # Errors
    ///
    /// Returns an error if preprocessing, inference, or decoding fails.
    fn process(&mut self, rgb: &RgbImage) -> Result<PoseResults>;

    /// Forget any state carried over from previous frames.
    fn reset(&mut self) {}
}

/// ONNX Runtime pose landmark model.
///
/// # Example
///
/// ```no_run
/// use pose_detector::{OnnxPoseModel, PoseModel};
///
/// let mut model = OnnxPoseModel::load("pose_landmark_full.onnx")?;
/// let frame = image::open("person.jpg")?.to_rgb8();
/// let results = model.process(&frame)?;
/// println!("pose found: {}", results.has_pose());
/// # Ok::<(), pose_detector::PoseError>(())
/// ```
pub struct OnnxPoseModel {
    /// ONNX Runtime session.
    session: Session,
    /// Input tensor name.
    input_name: String,
    /// Output tensor names.
    output_names: Vec<String>,
    /// Model input size (height, width).
    input_size: (usize, usize),
    /// Model input layout.
    layout: TensorLayout,
    /// Whether the model is fed FP16 input.
    half: bool,
    /// Detector configuration.
    config: PoseConfig,
    /// Region selection between frames.
    tracker: PoseTracker,
    /// Whether model has been warmed up.
    warmed_up: bool,
}

impl OnnxPoseModel {
    /// Load a pose model from an ONNX file with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file doesn't exist or can't be loaded.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_config(path, PoseConfig::default())
    }

    /// Load a pose model with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the ONNX model file.
    /// * `config` - Detector configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file doesn't exist, the execution provider
    /// is unavailable, or ONNX Runtime rejects the model.
    pub fn load_with_config<P: AsRef<Path>>(path: P, config: PoseConfig) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(PoseError::ModelLoadError(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        let builder = Session::builder().map_err(|e| {
            PoseError::ModelLoadError(format!("Failed to create session builder: {e}"))
        })?;
        let builder = config.device.register(builder)?;

        let session = builder
            // Level3 enables all optimizations including extended graph optimizations
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| {
                PoseError::ModelLoadError(format!("Failed to set optimization level: {e}"))
            })?
            .with_intra_threads(config.num_threads)
            .map_err(|e| {
                PoseError::ModelLoadError(format!("Failed to set intra-thread count: {e}"))
            })?
            .commit_from_file(path)
            .map_err(|e| PoseError::ModelLoadError(format!("Failed to load model: {e}")))?;

        let input = session
            .inputs
            .first()
            .ok_or_else(|| PoseError::ModelLoadError("Model has no inputs".to_string()))?;
        let input_name = input.name.clone();
        let input_shape: Option<Vec<i64>> = input
            .input_type
            .tensor_shape()
            .map(|shape| shape.iter().copied().collect());
        let fp16_input = input.input_type.tensor_type() == Some(TensorElementType::Float16);

        let layout = input_shape
            .as_deref()
            .and_then(TensorLayout::from_shape)
            .unwrap_or_default();
        let input_size = config
            .input_size
            .or_else(|| input_shape.as_deref().and_then(|s| spatial_size(s, layout)))
            .unwrap_or(DEFAULT_INPUT_SIZE);
        let half = config.half || fp16_input;

        let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();

        Ok(Self {
            session,
            input_name,
            output_names,
            input_size,
            layout,
            half,
            tracker: PoseTracker::new(&config),
            config,
            warmed_up: false,
        })
    }

    /// Warm up the model by running inference with a dummy input.
    ///
    /// Warmup is automatically called on the first processed frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the dummy inference fails.
    pub fn warmup(&mut self) -> Result<()> {
        if self.warmed_up {
            return Ok(());
        }

        let shape = self.layout.shape(self.input_size.0, self.input_size.1);
        let dummy = if self.half {
            TensorData::Float16(Array4::from_elem(shape, f16::ZERO))
        } else {
            TensorData::Float32(Array4::zeros(shape))
        };
        let _ = self.run_inference(&dummy)?;

        self.warmed_up = true;
        Ok(())
    }

    /// Model input size (height, width).
    #[must_use]
    pub const fn input_size(&self) -> (usize, usize) {
        self.input_size
    }

    /// Model input layout.
    #[must_use]
    pub const fn layout(&self) -> TensorLayout {
        self.layout
    }

    /// Model input tensor name.
    #[must_use]
    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    /// Detector configuration the model was loaded with.
    #[must_use]
    pub const fn config(&self) -> &PoseConfig {
        &self.config
    }

    /// Preprocess, infer and decode one region of the frame.
    ///
    /// Returns the decoded pose and the (preprocess, inference, postprocess) times in ms.
    fn run_region(&mut self, rgb: &RgbImage, roi: Roi) -> Result<(PoseLandmarks, [f64; 3])> {
        let start = Instant::now();
        let prep = preprocess_frame(rgb, roi, self.input_size, self.layout, self.half)?;
        let preprocess_time = start.elapsed().as_secs_f64() * 1000.0;

        let start = Instant::now();
        let outputs = self.run_inference(&prep.tensor)?;
        let inference_time = start.elapsed().as_secs_f64() * 1000.0;

        let start = Instant::now();
        let pose = decode_landmarks(&outputs, &prep.transform)?;
        let postprocess_time = start.elapsed().as_secs_f64() * 1000.0;

        Ok((pose, [preprocess_time, inference_time, postprocess_time]))
    }

    /// Run the ONNX session and collect every output as (data, shape).
    fn run_inference(&mut self, tensor: &TensorData) -> Result<Vec<(Vec<f32>, Vec<usize>)>> {
        let inputs = match tensor {
            TensorData::Float32(t) => {
                let input_tensor = TensorRef::from_array_view(t).map_err(|e| {
                    PoseError::InferenceError(format!("Failed to create input tensor: {e}"))
                })?;
                ort::inputs![&self.input_name => input_tensor]
            }
            TensorData::Float16(t) => {
                let input_tensor = TensorRef::from_array_view(t).map_err(|e| {
                    PoseError::InferenceError(format!("Failed to create input tensor: {e}"))
                })?;
                ort::inputs![&self.input_name => input_tensor]
            }
        };

        let outputs = self
            .session
            .run(inputs)
            .map_err(|e| PoseError::InferenceError(format!("Inference failed: {e}")))?;

        let mut collected = Vec::with_capacity(self.output_names.len());
        for name in &self.output_names {
            let output = outputs.get(name.as_str()).ok_or_else(|| {
                PoseError::InferenceError(format!("Output '{name}' not found"))
            })?;

            #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
            let entry = if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
                (data.to_vec(), shape.iter().map(|&d| d as usize).collect())
            } else {
                let (shape, data) = output.try_extract_tensor::<f16>().map_err(|e| {
                    PoseError::InferenceError(format!("Failed to extract output '{name}': {e}"))
                })?;
                (
                    data.iter().map(|v| v.to_f32()).collect(),
                    shape.iter().map(|&d| d as usize).collect(),
                )
            };
            collected.push(entry);
        }

        Ok(collected)
    }
}

impl PoseModel for OnnxPoseModel {
    fn process(&mut self, rgb: &RgbImage) -> Result<PoseResults> {
        self.warmup()?;

        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Ok(PoseResults::empty((height, width)));
        }

        let mut times = [0.0; 3];
        let mut tracker = std::mem::take(&mut self.tracker);
        let selected = tracker.select(width, height, |roi| {
            let (pose, t) = self.run_region(rgb, roi)?;
            for (total, t) in times.iter_mut().zip(t) {
                *total += t;
            }
            Ok(pose)
        });
        self.tracker = tracker;
        let landmarks = selected?;

        Ok(PoseResults {
            landmarks,
            speed: Speed::new(times[0], times[1], times[2]),
            orig_shape: (height, width),
        })
    }

    fn reset(&mut self) {
        self.tracker.reset();
    }
}

impl fmt::Debug for OnnxPoseModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnnxPoseModel")
            .field("input_name", &self.input_name)
            .field("output_names", &self.output_names)
            .field("input_size", &self.input_size)
            .field("layout", &self.layout)
            .field("half", &self.half)
            .field("tracking", &self.tracker.is_tracking())
            .finish_non_exhaustive()
    }
}

/// Spatial (height, width) of a 4-D input shape; `None` for dynamic dimensions.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
fn spatial_size(shape: &[i64], layout: TensorLayout) -> Option<(usize, usize)> {
    let (h, w) = match (layout, shape) {
        (TensorLayout::Nhwc, [_, h, w, _]) | (TensorLayout::Nchw, [_, _, h, w]) => (*h, *w),
        _ => return None,
    };
    (h > 0 && w > 0).then_some((h as usize, w as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_model() {
        let err = OnnxPoseModel::load("does/not/exist.onnx").unwrap_err();
        assert!(matches!(err, PoseError::ModelLoadError(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_spatial_size() {
        assert_eq!(
            spatial_size(&[1, 256, 256, 3], TensorLayout::Nhwc),
            Some((256, 256))
        );
        assert_eq!(
            spatial_size(&[1, 3, 224, 192], TensorLayout::Nchw),
            Some((224, 192))
        );
        assert_eq!(spatial_size(&[1, -1, -1, 3], TensorLayout::Nhwc), None);
        assert_eq!(spatial_size(&[1, 195], TensorLayout::Nhwc), None);
    }
}
