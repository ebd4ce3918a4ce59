// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Frame sources.
//!
//! A [`Source`] names where frames come from: a still image, a directory of
//! images, a video file or a webcam. [`SourceIterator`] turns it into a stream
//! of RGB frames that ends cleanly when the input runs out.

use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::error::{PoseError, Result};

/// Image file extensions picked up from directories.
const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "bmp", "gif", "webp", "tiff", "tif"];

/// File extensions treated as video.
const VIDEO_EXTENSIONS: [&str; 10] = [
    "mp4", "avi", "mov", "mkv", "wmv", "flv", "webm", "m4v", "mpeg", "mpg",
];

/// Where frames come from.
#[derive(Debug, Clone)]
pub enum Source {
    /// Path to an image file.
    Image(PathBuf),
    /// In-memory frame.
    Frame(RgbImage),
    /// Directory containing images, visited in name order.
    Directory(PathBuf),
    /// Path to a video file.
    Video(PathBuf),
    /// Webcam device index.
    Webcam(u32),
}

impl Source {
    /// Check if this source yields a single image.
    #[must_use]
    pub const fn is_image(&self) -> bool {
        matches!(self, Self::Image(_) | Self::Frame(_))
    }

    /// Check if this source is a video or camera.
    #[must_use]
    pub const fn is_video(&self) -> bool {
        matches!(self, Self::Video(_) | Self::Webcam(_))
    }

    /// Get the path if this source has one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Image(p) | Self::Video(p) | Self::Directory(p) => Some(p),
            _ => None,
        }
    }

    /// Human-readable name for logs and frame metadata.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Self::Frame(_) => "frame".to_string(),
            Self::Webcam(idx) => webcam_device(*idx).to_string_lossy().into_owned(),
            other => other
                .path()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

/// Classify a command-line source: numeric is a webcam, then directory, video
/// extension, and finally image.
impl From<&str> for Source {
    fn from(s: &str) -> Self {
        if let Ok(idx) = s.parse::<u32>() {
            return Self::Webcam(idx);
        }

        let path = PathBuf::from(s);
        if path.is_dir() {
            return Self::Directory(path);
        }

        if has_extension(&path, &VIDEO_EXTENSIONS) {
            return Self::Video(path);
        }

        Self::Image(path)
    }
}

impl From<String> for Source {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Self::from(path.to_string_lossy().as_ref())
    }
}

impl From<RgbImage> for Source {
    fn from(frame: RgbImage) -> Self {
        Self::Frame(frame)
    }
}

impl From<u32> for Source {
    fn from(idx: u32) -> Self {
        Self::Webcam(idx)
    }
}

/// Metadata about a source frame.
#[derive(Debug, Clone)]
pub struct SourceMeta {
    /// Frame index (0 for single images).
    pub frame_idx: usize,
    /// Total frames (1 for single images, unknown for cameras).
    pub total_frames: Option<usize>,
    /// Source path or identifier.
    pub path: String,
    /// Frames per second (for video sources).
    pub fps: Option<f32>,
}

impl Default for SourceMeta {
    fn default() -> Self {
        Self {
            frame_idx: 0,
            total_frames: Some(1),
            path: String::new(),
            fps: None,
        }
    }
}

/// Iterator over RGB frames from a source.
pub struct SourceIterator {
    source: Source,
    current_frame: usize,
    image_paths: Vec<PathBuf>,
    finished: bool,
    #[cfg(feature = "video")]
    decoder: Option<video_rs::decode::Decoder>,
    #[cfg(feature = "video")]
    total_frames: Option<usize>,
}

impl SourceIterator {
    /// Create a new source iterator.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory source cannot be listed.
    pub fn new(source: Source) -> Result<Self> {
        let image_paths = match &source {
            Source::Directory(path) => collect_images_from_dir(path)?,
            Source::Image(path) => vec![path.clone()],
            _ => Vec::new(),
        };

        Ok(Self {
            source,
            current_frame: 0,
            image_paths,
            finished: false,
            #[cfg(feature = "video")]
            decoder: None,
            #[cfg(feature = "video")]
            total_frames: None,
        })
    }

    /// The source being iterated.
    #[must_use]
    pub const fn source(&self) -> &Source {
        &self.source
    }

    fn next_image(&mut self) -> Option<Result<(RgbImage, SourceMeta)>> {
        let path = self.image_paths.get(self.current_frame)?;
        let meta = SourceMeta {
            frame_idx: self.current_frame,
            total_frames: Some(self.image_paths.len()),
            path: path.to_string_lossy().into_owned(),
            fps: None,
        };
        self.current_frame += 1;

        Some(
            image::open(path)
                .map(|img| (img.to_rgb8(), meta))
                .map_err(|e| PoseError::ImageError(format!("Failed to load {}: {e}", path.display()))),
        )
    }

    #[cfg(feature = "video")]
    fn open_decoder(&mut self) -> Result<()> {
        let location = match &self.source {
            Source::Video(path) => path.clone(),
            Source::Webcam(idx) => webcam_device(*idx),
            _ => return Ok(()),
        };

        video_rs::init()
            .map_err(|e| PoseError::VideoError(format!("Failed to initialize video backend: {e}")))?;
        let decoder = video_rs::decode::Decoder::new(location.as_path()).map_err(|e| {
            PoseError::VideoError(format!("Failed to open {}: {e}", location.display()))
        })?;

        if matches!(self.source, Source::Video(_))
            && let Ok(duration) = decoder.duration()
        {
            let frames = duration.as_secs_f64() * f64::from(decoder.frame_rate());
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                self.total_frames = Some(frames as usize);
            }
        }

        self.decoder = Some(decoder);
        Ok(())
    }

    #[cfg(feature = "video")]
    fn next_video_frame(&mut self) -> Option<Result<(RgbImage, SourceMeta)>> {
        if self.decoder.is_none()
            && let Err(e) = self.open_decoder()
        {
            self.finished = true;
            return Some(Err(e));
        }

        let decoder = self.decoder.as_mut()?;
        let frame = match decoder.decode() {
            Ok((_ts, frame)) => frame,
            Err(video_rs::Error::DecodeExhausted | video_rs::Error::ReadExhausted) => {
                self.finished = true;
                return None;
            }
            Err(e) => {
                self.finished = true;
                return Some(Err(PoseError::VideoError(format!("Failed to decode frame: {e}"))));
            }
        };

        let meta = SourceMeta {
            frame_idx: self.current_frame,
            total_frames: self.total_frames,
            path: self.source.display_name(),
            fps: Some(decoder.frame_rate()),
        };
        self.current_frame += 1;

        Some(video_frame_to_image(&frame).map(|img| (img, meta)))
    }

    #[cfg(not(feature = "video"))]
    fn next_video_frame(&mut self) -> Option<Result<(RgbImage, SourceMeta)>> {
        self.finished = true;
        Some(Err(PoseError::FeatureNotEnabled(
            "Video support requires 'video' feature".to_string(),
        )))
    }
}

impl Iterator for SourceIterator {
    type Item = Result<(RgbImage, SourceMeta)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match &self.source {
            Source::Image(_) | Source::Directory(_) => self.next_image(),
            Source::Frame(frame) => {
                self.finished = true;
                Some(Ok((frame.clone(), SourceMeta::default())))
            }
            Source::Video(_) | Source::Webcam(_) => self.next_video_frame(),
        }
    }
}

/// Device path for a webcam index.
fn webcam_device(idx: u32) -> PathBuf {
    PathBuf::from(format!("/dev/video{idx}"))
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension().is_some_and(|ext| {
        let ext = ext.to_string_lossy().to_lowercase();
        extensions.contains(&ext.as_str())
    })
}

/// Collect image paths from a directory, sorted by name.
fn collect_images_from_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(PoseError::ImageError(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| has_extension(path, &IMAGE_EXTENSIONS))
        .collect();

    paths.sort();
    Ok(paths)
}

/// Convert a decoded HWC video frame to an `RgbImage`.
#[cfg(feature = "video")]
fn video_frame_to_image(frame: &video_rs::Frame) -> Result<RgbImage> {
    let shape = frame.shape();
    let height = u32::try_from(shape[0])
        .map_err(|_| PoseError::VideoError("Frame height exceeds u32::MAX".to_string()))?;
    let width = u32::try_from(shape[1])
        .map_err(|_| PoseError::VideoError("Frame width exceeds u32::MAX".to_string()))?;

    let data = frame
        .as_slice()
        .map_or_else(|| frame.iter().copied().collect(), <[u8]>::to_vec);

    RgbImage::from_raw(width, height, data)
        .ok_or_else(|| PoseError::VideoError("Failed to create image from video frame".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pose_detector_{name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_source_from_string() {
        assert!(matches!(Source::from("image.jpg"), Source::Image(_)));
        assert!(matches!(Source::from("dance.MP4"), Source::Video(_)));
        assert!(matches!(Source::from("0"), Source::Webcam(0)));
        assert!(matches!(Source::from("2"), Source::Webcam(2)));
        assert!(matches!(
            Source::from(std::env::temp_dir().to_string_lossy().as_ref()),
            Source::Directory(_)
        ));
    }

    #[test]
    fn test_source_checks() {
        let img = Source::Image(PathBuf::from("test.jpg"));
        assert!(img.is_image());
        assert!(!img.is_video());

        let cam = Source::Webcam(1);
        assert!(cam.is_video());
        assert_eq!(cam.display_name(), "/dev/video1");
    }

    #[test]
    fn test_frame_source_yields_once() {
        let frame = RgbImage::new(4, 3);
        let mut iter = SourceIterator::new(Source::from(frame)).unwrap();
        let (img, meta) = iter.next().unwrap().unwrap();
        assert_eq!(img.dimensions(), (4, 3));
        assert_eq!(meta.frame_idx, 0);
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_directory_source() {
        let dir = temp_dir("dir_source");
        RgbImage::new(8, 6).save(dir.join("b.png")).unwrap();
        RgbImage::new(8, 6).save(dir.join("a.png")).unwrap();
        std::fs::write(dir.join("notes.txt"), "skip me").unwrap();

        let iter = SourceIterator::new(Source::from(dir.clone())).unwrap();
        let frames: Vec<_> = iter.map(|r| r.unwrap()).collect();
        assert_eq!(frames.len(), 2);
        assert!(frames[0].1.path.ends_with("a.png"));
        assert_eq!(frames[1].1.frame_idx, 1);
        assert_eq!(frames[1].1.total_frames, Some(2));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_image_is_error() {
        let mut iter = SourceIterator::new(Source::from("missing/frame.jpg")).unwrap();
        assert!(matches!(iter.next(), Some(Err(PoseError::ImageError(_)))));
        assert!(iter.next().is_none());
    }

    #[cfg(not(feature = "video"))]
    #[test]
    fn test_video_requires_feature() {
        let mut iter = SourceIterator::new(Source::from("clip.mp4")).unwrap();
        assert!(matches!(iter.next(), Some(Err(PoseError::FeatureNotEnabled(_)))));
        assert!(iter.next().is_none());
    }
}
