// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Frame preprocessing for pose inference.
//!
//! This module handles everything between a captured frame and the model input
//! tensor: channel-order conversion, region-of-interest cropping, letterbox
//! resizing and normalization. The [`LetterboxTransform`] recorded on the way in
//! maps model-space coordinates back onto the frame.

#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use std::borrow::Cow;

use fast_image_resize::images::{Image, ImageRef};
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use half::f16;
use image::{Rgb, RgbImage};
use ndarray::Array4;
use rayon::prelude::*;

use crate::error::{PoseError, Result};
use crate::landmark::PoseLandmarks;

/// Letterbox padding color (black, as the landmark model was trained with).
pub const LETTERBOX_COLOR: [u8; 3] = [0, 0, 0];

/// Reciprocal of 255 for normalization.
const INV_255: f32 = 1.0 / 255.0;

/// Growth applied to the previous pose's bounding box when tracking.
pub const ROI_SCALE: f32 = 1.25;

/// Channel order of an 8-bit, 3-channel frame buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ChannelOrder {
    /// Red, green, blue.
    #[default]
    Rgb,
    /// Blue, green, red (OpenCV-style capture buffers).
    Bgr,
}

/// Memory layout of the model's image input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TensorLayout {
    /// `[batch, height, width, channels]` (TFLite-converted models).
    #[default]
    Nhwc,
    /// `[batch, channels, height, width]`.
    Nchw,
}

impl TensorLayout {
    /// Infer the layout from a 4-D input shape, if the channel axis is recognizable.
    #[must_use]
    pub fn from_shape(shape: &[i64]) -> Option<Self> {
        match shape {
            [_, _, _, 3] => Some(Self::Nhwc),
            [_, 3, _, _] => Some(Self::Nchw),
            _ => None,
        }
    }

    /// Tensor shape for an input of the given size.
    #[must_use]
    pub const fn shape(self, height: usize, width: usize) -> (usize, usize, usize, usize) {
        match self {
            Self::Nhwc => (1, height, width, 3),
            Self::Nchw => (1, 3, height, width),
        }
    }
}

/// Tensor data that can be either FP32 or FP16.
#[derive(Debug, Clone)]
pub enum TensorData {
    /// 32-bit floating point tensor.
    Float32(Array4<f32>),
    /// 16-bit floating point tensor.
    Float16(Array4<f16>),
}

impl TensorData {
    /// Get the shape of the tensor.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::Float32(t) => t.shape(),
            Self::Float16(t) => t.shape(),
        }
    }
}

/// Convert a frame to RGB order.
///
/// RGB frames are borrowed as-is; BGR frames are copied with red and blue swapped.
#[must_use]
pub fn to_rgb(frame: &RgbImage, order: ChannelOrder) -> Cow<'_, RgbImage> {
    match order {
        ChannelOrder::Rgb => Cow::Borrowed(frame),
        ChannelOrder::Bgr => {
            let mut rgb = frame.clone();
            swap_red_blue(&mut rgb);
            Cow::Owned(rgb)
        }
    }
}

/// Swap the first and third channel of every pixel in place.
pub fn swap_red_blue(image: &mut RgbImage) {
    let raw: &mut [u8] = image;
    raw.par_chunks_exact_mut(3).for_each(|px| px.swap(0, 2));
}

/// Axis-aligned region of a frame, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl Roi {
    /// The whole frame.
    #[must_use]
    pub const fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Square region around a previous pose, grown by [`ROI_SCALE`] and clipped to the frame.
    ///
    /// Returns `None` when the clipped region is too small to resize from.
    #[must_use]
    pub fn around(pose: &PoseLandmarks, width: u32, height: u32) -> Option<Self> {
        if pose.is_empty() || width == 0 || height == 0 {
            return None;
        }

        let (w, h) = (width as f32, height as f32);
        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        for lm in pose {
            min_x = min_x.min(lm.x * w);
            min_y = min_y.min(lm.y * h);
            max_x = max_x.max(lm.x * w);
            max_y = max_y.max(lm.y * h);
        }

        let side = (max_x - min_x).max(max_y - min_y) * ROI_SCALE;
        let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);

        let x0 = (cx - side / 2.0).clamp(0.0, w);
        let y0 = (cy - side / 2.0).clamp(0.0, h);
        let x1 = (cx + side / 2.0).clamp(0.0, w);
        let y1 = (cy + side / 2.0).clamp(0.0, h);

        let roi = Self {
            x: x0.floor() as u32,
            y: y0.floor() as u32,
            width: (x1.ceil() - x0.floor()) as u32,
            height: (y1.ceil() - y0.floor()) as u32,
        };
        // Never reach past the frame after rounding.
        let roi = Self {
            width: roi.width.min(width - roi.x),
            height: roi.height.min(height - roi.y),
            ..roi
        };

        (roi.width >= 2 && roi.height >= 2).then_some(roi)
    }
}

/// Mapping from model input pixels back to normalized frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxTransform {
    /// Uniform resize factor from ROI pixels to model pixels.
    pub scale: f32,
    /// Padding (`pad_top`, `pad_left`) in model pixels.
    pub padding: (f32, f32),
    /// Region of the frame that was fed to the model.
    pub roi: Roi,
    /// Frame size (width, height).
    pub frame_size: (u32, u32),
}

impl LetterboxTransform {
    /// Map a model-space point to normalized frame coordinates.
    #[must_use]
    pub fn to_normalized(&self, x: f32, y: f32) -> (f32, f32) {
        let (pad_top, pad_left) = self.padding;
        let frame_x = (x - pad_left) / self.scale + self.roi.x as f32;
        let frame_y = (y - pad_top) / self.scale + self.roi.y as f32;
        (
            frame_x / self.frame_size.0 as f32,
            frame_y / self.frame_size.1 as f32,
        )
    }
}

/// Result of preprocessing a frame.
#[derive(Debug, Clone)]
pub struct PreprocessResult {
    /// Model input tensor, normalized to [0, 1].
    pub tensor: TensorData,
    /// Coordinate transform for post-processing.
    pub transform: LetterboxTransform,
}

/// Compute letterbox parameters: resized size, padding and scale.
///
/// Returns `(new_width, new_height, pad_left, pad_top, scale)`.
#[must_use]
pub fn letterbox_params(
    src_width: u32,
    src_height: u32,
    target_size: (usize, usize),
) -> (u32, u32, u32, u32, f32) {
    let (target_h, target_w) = (target_size.0 as f32, target_size.1 as f32);
    let scale = (target_h / src_height as f32).min(target_w / src_width as f32);

    let new_w = ((src_width as f32 * scale).round() as u32).max(1);
    let new_h = ((src_height as f32 * scale).round() as u32).max(1);

    let pad_left = (target_size.1 as u32).saturating_sub(new_w) / 2;
    let pad_top = (target_size.0 as u32).saturating_sub(new_h) / 2;

    (new_w, new_h, pad_left, pad_top, scale)
}

/// Crop, letterbox and normalize an RGB frame for the pose model.
///
/// # Arguments
///
/// * `frame` - RGB frame.
/// * `roi` - Region of the frame to feed to the model.
/// * `target_size` - Model input size as (height, width).
/// * `layout` - Model input layout.
/// * `half` - Produce an FP16 tensor.
///
/// # Errors
///
/// Returns an error if the frame buffer cannot be wrapped or resized.
pub fn preprocess_frame(
    frame: &RgbImage,
    roi: Roi,
    target_size: (usize, usize),
    layout: TensorLayout,
    half: bool,
) -> Result<PreprocessResult> {
    let letterboxed_and_transform = letterbox(frame, roi, target_size)?;
    let (letterboxed, transform) = letterboxed_and_transform;

    let raw = letterboxed.as_raw();
    let data: Vec<f32> = match layout {
        TensorLayout::Nhwc => raw.par_iter().map(|&v| f32::from(v) * INV_255).collect(),
        TensorLayout::Nchw => (0..3usize)
            .into_par_iter()
            .flat_map_iter(|c| {
                raw.iter()
                    .skip(c)
                    .step_by(3)
                    .map(|&v| f32::from(v) * INV_255)
            })
            .collect(),
    };

    let tensor = Array4::from_shape_vec(layout.shape(target_size.0, target_size.1), data)
        .map_err(|e| PoseError::ImageError(format!("Failed to build input tensor: {e}")))?;

    let tensor = if half {
        TensorData::Float16(tensor.mapv(f16::from_f32))
    } else {
        TensorData::Float32(tensor)
    };

    Ok(PreprocessResult { tensor, transform })
}

/// Resize a frame region into a padded canvas of `target_size`, keeping aspect ratio.
///
/// # Errors
///
/// Returns an error if the frame buffer cannot be wrapped or resized.
pub fn letterbox(
    frame: &RgbImage,
    roi: Roi,
    target_size: (usize, usize),
) -> Result<(RgbImage, LetterboxTransform)> {
    let (frame_w, frame_h) = frame.dimensions();
    let (new_w, new_h, pad_left, pad_top, scale) =
        letterbox_params(roi.width, roi.height, target_size);

    let src = ImageRef::new(frame_w, frame_h, frame.as_raw(), PixelType::U8x3)
        .map_err(|e| PoseError::ImageError(format!("Invalid frame buffer: {e}")))?;
    let mut dst = Image::new(new_w, new_h, PixelType::U8x3);

    let options = ResizeOptions::new()
        .resize_alg(ResizeAlg::Convolution(FilterType::Bilinear))
        .crop(
            f64::from(roi.x),
            f64::from(roi.y),
            f64::from(roi.width),
            f64::from(roi.height),
        );
    Resizer::new()
        .resize(&src, &mut dst, &options)
        .map_err(|e| PoseError::ImageError(format!("Failed to resize frame: {e}")))?;

    let resized = RgbImage::from_raw(new_w, new_h, dst.into_vec())
        .ok_or_else(|| PoseError::ImageError("Resized buffer has wrong size".to_string()))?;

    let mut canvas = RgbImage::from_pixel(
        target_size.1 as u32,
        target_size.0 as u32,
        Rgb(LETTERBOX_COLOR),
    );
    image::imageops::replace(
        &mut canvas,
        &resized,
        i64::from(pad_left),
        i64::from(pad_top),
    );

    let transform = LetterboxTransform {
        scale,
        padding: (pad_top as f32, pad_left as f32),
        roi,
        frame_size: (frame_w, frame_h),
    };
    Ok((canvas, transform))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::Landmark;

    #[test]
    fn test_bgr_to_rgb() {
        let mut frame = RgbImage::new(2, 1);
        frame.put_pixel(0, 0, Rgb([10, 20, 30]));
        frame.put_pixel(1, 0, Rgb([255, 0, 1]));

        let rgb = to_rgb(&frame, ChannelOrder::Bgr);
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([30, 20, 10]));
        assert_eq!(rgb.get_pixel(1, 0), &Rgb([1, 0, 255]));

        let same = to_rgb(&frame, ChannelOrder::Rgb);
        assert!(matches!(same, Cow::Borrowed(_)));
        assert_eq!(same.get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_letterbox_params_landscape() {
        let (w, h, pad_left, pad_top, scale) = letterbox_params(640, 480, (256, 256));
        assert_eq!((w, h), (256, 192));
        assert_eq!((pad_left, pad_top), (0, 32));
        assert!((scale - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_transform_round_trip() {
        let (_, _, pad_left, pad_top, scale) = letterbox_params(640, 480, (256, 256));
        let transform = LetterboxTransform {
            scale,
            padding: (pad_top as f32, pad_left as f32),
            roi: Roi::full(640, 480),
            frame_size: (640, 480),
        };

        // Center of the model input is the center of the frame.
        let (x, y) = transform.to_normalized(128.0, 128.0);
        assert!((x - 0.5).abs() < 1e-6);
        assert!((y - 0.5).abs() < 1e-6);

        // Top of the image content sits below the padding band.
        let (_, y) = transform.to_normalized(0.0, 32.0);
        assert!(y.abs() < 1e-6);
    }

    #[test]
    fn test_transform_with_roi() {
        let transform = LetterboxTransform {
            scale: 2.0,
            padding: (0.0, 0.0),
            roi: Roi {
                x: 100,
                y: 50,
                width: 128,
                height: 128,
            },
            frame_size: (400, 200),
        };
        let (x, y) = transform.to_normalized(20.0, 100.0);
        assert!((x - 110.0 / 400.0).abs() < 1e-6);
        assert!((y - 100.0 / 200.0).abs() < 1e-6);
    }

    #[test]
    fn test_letterbox_canvas() {
        let frame = RgbImage::from_pixel(64, 32, Rgb([200, 100, 50]));
        let (canvas, transform) = letterbox(&frame, Roi::full(64, 32), (32, 32)).unwrap();

        assert_eq!(canvas.dimensions(), (32, 32));
        assert_eq!(transform.padding, (8.0, 0.0));
        assert_eq!(canvas.get_pixel(16, 0), &Rgb(LETTERBOX_COLOR));
        assert_eq!(canvas.get_pixel(16, 16), &Rgb([200, 100, 50]));
        assert_eq!(canvas.get_pixel(16, 31), &Rgb(LETTERBOX_COLOR));
    }

    #[test]
    fn test_preprocess_layouts() {
        let frame = RgbImage::from_pixel(8, 8, Rgb([255, 0, 51]));

        let nhwc = preprocess_frame(&frame, Roi::full(8, 8), (4, 4), TensorLayout::Nhwc, false)
            .unwrap();
        let TensorData::Float32(t) = nhwc.tensor else {
            panic!("expected FP32 tensor");
        };
        assert_eq!(t.shape(), &[1, 4, 4, 3]);
        assert!((t[[0, 1, 1, 0]] - 1.0).abs() < 1e-6);
        assert!(t[[0, 1, 1, 1]].abs() < 1e-6);
        assert!((t[[0, 1, 1, 2]] - 0.2).abs() < 1e-6);

        let nchw = preprocess_frame(&frame, Roi::full(8, 8), (4, 4), TensorLayout::Nchw, true)
            .unwrap();
        assert_eq!(nchw.tensor.shape(), &[1, 3, 4, 4]);
        let TensorData::Float16(t) = nchw.tensor else {
            panic!("expected FP16 tensor");
        };
        assert!((t[[0, 0, 2, 2]].to_f32() - 1.0).abs() < 1e-3);
        assert!((t[[0, 2, 2, 2]].to_f32() - 0.2).abs() < 1e-3);
    }

    #[test]
    fn test_layout_from_shape() {
        assert_eq!(TensorLayout::from_shape(&[1, 256, 256, 3]), Some(TensorLayout::Nhwc));
        assert_eq!(TensorLayout::from_shape(&[1, 3, 256, 256]), Some(TensorLayout::Nchw));
        assert_eq!(TensorLayout::from_shape(&[1, 195]), None);
    }

    #[test]
    fn test_roi_around_pose() {
        let landmarks = vec![Landmark::new(0.25, 0.25), Landmark::new(0.75, 0.5)];
        let pose = PoseLandmarks::new(landmarks, 1.0);

        let roi = Roi::around(&pose, 400, 400).unwrap();
        // Box is 200x100 centred at (200, 150); side grows to 250.
        assert_eq!(roi.x, 75);
        assert_eq!(roi.y, 25);
        assert_eq!(roi.width, 250);
        assert_eq!(roi.height, 250);
    }

    #[test]
    fn test_roi_clipped_to_frame() {
        let landmarks = vec![Landmark::new(0.0, 0.0), Landmark::new(1.0, 1.0)];
        let pose = PoseLandmarks::new(landmarks, 1.0);

        let roi = Roi::around(&pose, 100, 50).unwrap();
        assert_eq!(roi, Roi::full(100, 50));
    }

    #[test]
    fn test_roi_degenerate() {
        let pose = PoseLandmarks::new(vec![Landmark::new(0.5, 0.5)], 1.0);
        assert!(Roi::around(&pose, 100, 100).is_none());
        assert!(Roi::around(&PoseLandmarks::new(Vec::new(), 1.0), 100, 100).is_none());
    }
}
