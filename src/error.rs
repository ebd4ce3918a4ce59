// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the pose detection library.

use std::fmt;

/// Result type alias for pose detection operations.
pub type Result<T> = std::result::Result<T, PoseError>;

/// Main error type for the pose detection library.
#[derive(Debug)]
pub enum PoseError {
    /// Error loading the ONNX pose model.
    ModelLoadError(String),
    /// Error during model inference.
    InferenceError(String),
    /// Error processing images or frames.
    ImageError(String),
    /// Invalid configuration provided.
    ConfigError(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
    /// Model output could not be decoded into landmarks.
    PostProcessingError(String),
    /// Visualizer error.
    VisualizerError(String),
    /// Video/webcam processing error.
    VideoError(String),
    /// Feature not enabled.
    FeatureNotEnabled(String),
}

impl fmt::Display for PoseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelLoadError(msg) => write!(f, "Model load error: {msg}"),
            Self::InferenceError(msg) => write!(f, "Inference error: {msg}"),
            Self::ImageError(msg) => write!(f, "Image error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::PostProcessingError(msg) => write!(f, "Post-processing error: {msg}"),
            Self::VisualizerError(msg) => write!(f, "Visualizer error: {msg}"),
            Self::VideoError(msg) => write!(f, "Video error: {msg}"),
            Self::FeatureNotEnabled(msg) => write!(f, "Feature not enabled: {msg}"),
        }
    }
}

impl std::error::Error for PoseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PoseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for PoseError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PoseError::ModelLoadError("test".to_string());
        assert_eq!(err.to_string(), "Model load error: test");

        let err = PoseError::FeatureNotEnabled("video".to_string());
        assert_eq!(err.to_string(), "Feature not enabled: video");
    }

    #[test]
    fn test_io_error_source() {
        use std::error::Error;

        let err = PoseError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("IO error:"));
        assert!(PoseError::ConfigError("x".to_string()).source().is_none());
    }
}
