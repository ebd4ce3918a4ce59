// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Frame annotation: skeleton, joint angles and text overlays.
//!
//! All drawing happens in place on the caller's frame. Colors are given in RGB
//! and written in the frame's [`ChannelOrder`], so BGR frames get the same
//! on-screen colors as RGB ones. Text needs a TrueType font; without one the
//! shapes are still drawn and text is skipped.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut, draw_polygon_mut,
    draw_text_mut,
};
use imageproc::point::Point;

use crate::config::PoseConfig;
use crate::error::{PoseError, Result};
use crate::geometry::overlay_angle;
use crate::landmark::{ANGLE_JOINTS, LandmarkPoint, POSE_CONNECTIONS, is_body_connection, is_drawn};
use crate::preprocessing::ChannelOrder;
use crate::visualizer::Color;

/// Assets URL for downloading fonts.
#[cfg(feature = "annotate")]
const ASSETS_URL: &str = "https://github.com/ultralytics/assets/releases/download/v0.0.0";

/// Font used for overlay text when none is configured.
pub const DEFAULT_FONT: &str = "Arial.ttf";

/// Landmark dot color.
pub const POINT_COLOR: Color = Color::BLUE;
/// Skeleton bone color.
pub const BONE_COLOR: Color = Color::WHITE;
/// Joint angle overlay text color.
pub const OVERLAY_TEXT_COLOR: Color = Color::CYAN;
/// Highlight color for measured angles and selected landmarks.
pub const HIGHLIGHT_COLOR: Color = Color::RED;
/// Frame-rate text color.
pub const FPS_COLOR: Color = Color::BLUE;

/// Landmark dot radius.
pub const POINT_RADIUS: i32 = 5;
/// Skeleton bone thickness.
pub const BONE_THICKNESS: u32 = 3;

/// Text heights in pixels.
const OVERLAY_TEXT_PX: f32 = 14.0;
const ANGLE_TEXT_PX: f32 = 28.0;
const FPS_TEXT_PX: f32 = 40.0;

/// Find a cached font in the user config directory, downloading it on first use.
///
/// Returns `None` if the font is neither cached nor downloadable.
#[cfg(feature = "annotate")]
pub fn check_font(font: &str) -> Option<PathBuf> {
    use std::fs::File;
    use std::io;

    let font_name = Path::new(font).file_name()?.to_string_lossy().into_owned();
    let config_dir = dirs::config_dir()?.join(crate::NAME);
    let font_path = config_dir.join(&font_name);

    if font_path.exists() {
        return Some(font_path);
    }

    if let Err(e) = fs::create_dir_all(&config_dir) {
        crate::warn!("Failed to create config directory: {e}");
        return None;
    }

    let url = format!("{ASSETS_URL}/{font_name}");
    crate::info!("Downloading {url} to {}", font_path.display());

    let response = match ureq::get(&url).call() {
        Ok(response) => response,
        Err(e) => {
            crate::warn!("Failed to download font from {url}: {e}");
            return None;
        }
    };

    let mut file = match File::create(&font_path) {
        Ok(f) => f,
        Err(e) => {
            crate::warn!("Failed to create font file: {e}");
            return None;
        }
    };

    let mut reader = response.into_body().into_reader();
    if let Err(e) = io::copy(&mut reader, &mut file) {
        crate::warn!("Failed to download font: {e}");
        let _ = fs::remove_file(&font_path);
        return None;
    }

    Some(font_path)
}

/// Without the `annotate` feature only fonts given by path are used.
#[cfg(not(feature = "annotate"))]
pub fn check_font(_font: &str) -> Option<PathBuf> {
    None
}

/// Draws pose overlays onto frames.
pub struct Annotator {
    font: Option<FontVec>,
    order: ChannelOrder,
}

impl Annotator {
    /// Create an annotator with an optional font.
    #[must_use]
    pub const fn new(font: Option<FontVec>, order: ChannelOrder) -> Self {
        Self { font, order }
    }

    /// Annotator that draws shapes but no text.
    #[must_use]
    pub const fn shapes_only(order: ChannelOrder) -> Self {
        Self::new(None, order)
    }

    /// Load the font from a TrueType/OpenType file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid font.
    pub fn from_font_file<P: AsRef<Path>>(path: P, order: ChannelOrder) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let font = FontVec::try_from_vec(data).map_err(|e| {
            PoseError::VisualizerError(format!("Invalid font {}: {e}", path.display()))
        })?;
        Ok(Self::new(Some(font), order))
    }

    /// Build the annotator for a detector configuration.
    ///
    /// Uses `config.font` when set, otherwise the cached default font. Falls back
    /// to shapes only, with a warning, when no font can be loaded.
    #[must_use]
    pub fn for_config(config: &PoseConfig) -> Self {
        let path = config.font.clone().or_else(|| check_font(DEFAULT_FONT));
        let Some(path) = path else {
            crate::warn!("No font available, overlay text disabled");
            return Self::shapes_only(config.channel_order);
        };

        match Self::from_font_file(&path, config.channel_order) {
            Ok(annotator) => annotator,
            Err(e) => {
                crate::warn!("{e}, overlay text disabled");
                Self::shapes_only(config.channel_order)
            }
        }
    }

    /// Whether text can be drawn.
    #[must_use]
    pub const fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Channel order colors are written in.
    #[must_use]
    pub const fn channel_order(&self) -> ChannelOrder {
        self.order
    }

    fn pixel(&self, color: Color) -> Rgb<u8> {
        color.to_pixel(self.order)
    }

    /// Filled circle.
    pub fn point(&self, img: &mut RgbImage, center: (i32, i32), radius: i32, color: Color) {
        draw_filled_circle_mut(img, center, radius, self.pixel(color));
    }

    /// Circle outline of the given thickness, centred on `radius`.
    pub fn ring(
        &self,
        img: &mut RgbImage,
        center: (i32, i32),
        radius: i32,
        thickness: u32,
        color: Color,
    ) {
        let thickness = thickness.max(1) as i32;
        for i in 0..thickness {
            let r = radius + i - thickness / 2;
            if r > 0 {
                draw_hollow_circle_mut(img, center, r, self.pixel(color));
            }
        }
    }

    /// Line segment with round caps.
    pub fn line(
        &self,
        img: &mut RgbImage,
        start: (i32, i32),
        end: (i32, i32),
        thickness: u32,
        color: Color,
    ) {
        let pixel = self.pixel(color);
        if thickness <= 1 {
            draw_line_segment_mut(
                img,
                (start.0 as f32, start.1 as f32),
                (end.0 as f32, end.1 as f32),
                pixel,
            );
            return;
        }

        let half = thickness as f32 / 2.0;
        let cap = (thickness / 2) as i32;
        let (dx, dy) = ((end.0 - start.0) as f32, (end.1 - start.1) as f32);
        let len = dx.hypot(dy);
        if len >= 1.0 {
            let (nx, ny) = (-dy / len * half, dx / len * half);
            let corner = |(x, y): (i32, i32), sign: f32| {
                Point::new(
                    (x as f32 + sign * nx).round() as i32,
                    (y as f32 + sign * ny).round() as i32,
                )
            };
            let quad = [
                corner(start, 1.0),
                corner(end, 1.0),
                corner(end, -1.0),
                corner(start, -1.0),
            ];
            draw_polygon_mut(img, &quad, pixel);
        }
        draw_filled_circle_mut(img, start, cap, pixel);
        draw_filled_circle_mut(img, end, cap, pixel);
    }

    /// Text whose bottom-left corner sits at `origin`. No-op without a font.
    pub fn text(
        &self,
        img: &mut RgbImage,
        text: &str,
        origin: (i32, i32),
        height_px: f32,
        color: Color,
    ) {
        let Some(font) = &self.font else {
            return;
        };
        let top = origin.1 - height_px.round() as i32;
        draw_text_mut(
            img,
            self.pixel(color),
            origin.0,
            top,
            PxScale::from(height_px),
            font,
            text,
        );
    }

    /// Landmark dots (except face and finger points), then body bones.
    ///
    /// `points` is indexed by landmark id.
    pub fn draw_skeleton(&self, img: &mut RgbImage, points: &[LandmarkPoint]) {
        for p in points.iter().filter(|p| is_drawn(p.id)) {
            self.point(img, p.xy(), POINT_RADIUS, POINT_COLOR);
        }

        for [a, b] in POSE_CONNECTIONS
            .into_iter()
            .filter(|&c| is_body_connection(c))
        {
            if let (Some(pa), Some(pb)) = (points.get(a), points.get(b)) {
                self.line(img, pa.xy(), pb.xy(), BONE_THICKNESS, BONE_COLOR);
            }
        }
    }

    /// `"{angle}*"` labels for the tracked joints, placed near each joint triple's centroid.
    pub fn draw_angle_overlays(&self, img: &mut RgbImage, points: &[LandmarkPoint]) {
        for [a, b, c] in ANGLE_JOINTS {
            let (Some(pa), Some(pb), Some(pc)) = (points.get(a), points.get(b), points.get(c))
            else {
                continue;
            };

            let angle = overlay_angle(pa.xy(), pb.xy(), pc.xy());
            self.text(
                img,
                &format!("{angle}*"),
                overlay_label_origin(pa.xy(), pb.xy(), pc.xy()),
                OVERLAY_TEXT_PX,
                OVERLAY_TEXT_COLOR,
            );
        }
    }

    /// Highlight a measured angle: both arms, marked joints and the value below the vertex.
    pub fn draw_angle_marker(
        &self,
        img: &mut RgbImage,
        p1: (i32, i32),
        p2: (i32, i32),
        p3: (i32, i32),
        angle: f64,
    ) {
        self.line(img, p1, p2, BONE_THICKNESS, BONE_COLOR);
        self.line(img, p3, p2, BONE_THICKNESS, BONE_COLOR);
        for p in [p1, p2, p3] {
            self.point(img, p, 10, HIGHLIGHT_COLOR);
            self.ring(img, p, 15, 2, HIGHLIGHT_COLOR);
        }
        self.text(
            img,
            &(angle as i64).to_string(),
            angle_label_origin(p2),
            ANGLE_TEXT_PX,
            HIGHLIGHT_COLOR,
        );
    }

    /// Mark one selected landmark.
    pub fn draw_selected(&self, img: &mut RgbImage, point: &LandmarkPoint) {
        self.point(img, point.xy(), 15, HIGHLIGHT_COLOR);
    }

    /// `"FPS: n"` in the top-left corner.
    pub fn draw_fps(&self, img: &mut RgbImage, fps: f64) {
        self.text(
            img,
            &format!("FPS: {}", fps as i64),
            (70, 50),
            FPS_TEXT_PX,
            FPS_COLOR,
        );
    }
}

/// Text origin for a joint overlay: the floored centroid of the triple, shifted left and down by 10.
#[must_use]
pub const fn overlay_label_origin(a: (i32, i32), b: (i32, i32), c: (i32, i32)) -> (i32, i32) {
    let cx = (a.0 + b.0 + c.0).div_euclid(3);
    let cy = (a.1 + b.1 + c.1).div_euclid(3);
    (cx - 10, cy + 10)
}

/// Text origin for a measured angle, 50 px left of and below the vertex.
#[must_use]
pub const fn angle_label_origin(vertex: (i32, i32)) -> (i32, i32) {
    (vertex.0 - 50, vertex.1 + 50)
}

impl std::fmt::Debug for Annotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Annotator")
            .field("has_font", &self.has_font())
            .field("order", &self.order)
            .finish()
    }
}
