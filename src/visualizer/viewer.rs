// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Window for displaying annotated frames.

use std::time::{Duration, Instant};

use image::RgbImage;
use minifb::{Key, Window, WindowOptions};
use rayon::prelude::*;

use crate::error::{PoseError, Result};
use crate::preprocessing::ChannelOrder;

/// Roughly 60 Hz.
const UPDATE_INTERVAL: Duration = Duration::from_micros(16600);

/// A frame viewer backed by minifb.
///
/// The window closes on Esc or Q.
pub struct Viewer {
    window: Window,
    width: usize,
    height: usize,
    order: ChannelOrder,
    buffer: Vec<u32>,
}

impl Viewer {
    /// Create a new viewer window for frames in the given channel order.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::VisualizerError`] if the window cannot be created.
    pub fn new(title: &str, width: usize, height: usize, order: ChannelOrder) -> Result<Self> {
        let mut window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| PoseError::VisualizerError(format!("Failed to create window: {e}")))?;

        window.limit_update_rate(Some(UPDATE_INTERVAL));

        Ok(Self {
            window,
            width,
            height,
            order,
            buffer: Vec::new(),
        })
    }

    /// Whether the window is still open and no close key is held.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.window.is_open()
            && !self.window.is_key_down(Key::Escape)
            && !self.window.is_key_down(Key::Q)
    }

    /// Show a frame. Returns `false` once the user has closed the window.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::VisualizerError`] if the window rejects the buffer.
    pub fn show(&mut self, frame: &RgbImage) -> Result<bool> {
        if !self.is_open() {
            return Ok(false);
        }

        let (width, height) = (frame.width() as usize, frame.height() as usize);
        self.buffer.resize(width * height, 0);
        self.width = width;
        self.height = height;

        // minifb expects 0x00RRGGBB
        let (r, b) = match self.order {
            ChannelOrder::Rgb => (0, 2),
            ChannelOrder::Bgr => (2, 0),
        };
        self.buffer
            .par_iter_mut()
            .zip(frame.as_raw().par_chunks_exact(3))
            .for_each(|(dst, px)| {
                *dst = (u32::from(px[r]) << 16) | (u32::from(px[1]) << 8) | u32::from(px[b]);
            });

        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
            .map_err(|e| PoseError::VisualizerError(format!("Failed to update window: {e}")))?;

        Ok(true)
    }

    /// Keep the last frame on screen for `duration`, returning `false` if the window closes.
    pub fn wait(&mut self, duration: Duration) -> bool {
        if self.buffer.is_empty() {
            return self.is_open();
        }

        let start = Instant::now();
        while start.elapsed() < duration {
            if !self.is_open() {
                return false;
            }
            let _ = self
                .window
                .update_with_buffer(&self.buffer, self.width, self.height);
        }
        true
    }
}
