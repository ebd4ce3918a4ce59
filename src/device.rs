// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Hardware device selection for the pose model.
use std::fmt;
use std::str::FromStr;

use ort::session::builder::SessionBuilder;

use crate::error::{PoseError, Result};

/// Hardware device for inference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Device {
    /// CPU (default ONNX Runtime provider).
    #[default]
    Cpu,
    /// CUDA for NVIDIA GPUs, with device index.
    Cuda(usize),
    /// `TensorRT` for NVIDIA GPUs, with device index.
    TensorRt(usize),
    /// `CoreML` (macOS/iOS).
    CoreMl,
    /// `DirectML` for Windows, with device index.
    DirectMl(usize),
}

impl Device {
    /// Register this device's execution provider on a session builder.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::FeatureNotEnabled`] when the crate was built without the
    /// matching execution-provider feature, or [`PoseError::ModelLoadError`] when
    /// ONNX Runtime rejects the provider.
    #[allow(clippy::needless_pass_by_value, clippy::unnecessary_wraps)]
    pub fn register(&self, builder: SessionBuilder) -> Result<SessionBuilder> {
        match self {
            Self::Cpu => Ok(builder),
            #[cfg(feature = "cuda")]
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            Self::Cuda(index) => builder
                .with_execution_providers([
                    ort::execution_providers::CUDAExecutionProvider::default()
                        .with_device_id(*index as i32)
                        .build(),
                ])
                .map_err(|e| PoseError::ModelLoadError(format!("Failed to register CUDA EP: {e}"))),
            #[cfg(feature = "tensorrt")]
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            Self::TensorRt(index) => builder
                .with_execution_providers([
                    ort::execution_providers::TensorRTExecutionProvider::default()
                        .with_device_id(*index as i32)
                        .build(),
                ])
                .map_err(|e| {
                    PoseError::ModelLoadError(format!("Failed to register TensorRT EP: {e}"))
                }),
            #[cfg(feature = "coreml")]
            Self::CoreMl => builder
                .with_execution_providers([
                    ort::execution_providers::CoreMLExecutionProvider::default()
                        .with_subgraphs(true)
                        .build(),
                ])
                .map_err(|e| {
                    PoseError::ModelLoadError(format!("Failed to register CoreML EP: {e}"))
                }),
            #[cfg(feature = "directml")]
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            Self::DirectMl(index) => builder
                .with_execution_providers([
                    ort::execution_providers::DirectMLExecutionProvider::default()
                        .with_device_id(*index as i32)
                        .build(),
                ])
                .map_err(|e| {
                    PoseError::ModelLoadError(format!("Failed to register DirectML EP: {e}"))
                }),
            #[allow(unreachable_patterns)]
            other => Err(PoseError::FeatureNotEnabled(format!(
                "Device '{other}' requires building with the matching execution-provider feature"
            ))),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda(i) => write!(f, "cuda:{i}"),
            Self::TensorRt(i) => write!(f, "tensorrt:{i}"),
            Self::CoreMl => write!(f, "coreml"),
            Self::DirectMl(i) => write!(f, "directml:{i}"),
        }
    }
}

impl FromStr for Device {
    type Err = PoseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.to_lowercase();
        match s.as_str() {
            "cpu" => Ok(Self::Cpu),
            "coreml" | "mps" => Ok(Self::CoreMl),
            _ => {
                if let Some(rest) = s.strip_prefix("cuda") {
                    Ok(Self::Cuda(parse_device_index(rest, &s)?))
                } else if let Some(rest) = s.strip_prefix("tensorrt") {
                    Ok(Self::TensorRt(parse_device_index(rest, &s)?))
                } else if let Some(rest) = s.strip_prefix("directml") {
                    Ok(Self::DirectMl(parse_device_index(rest, &s)?))
                } else {
                    Err(PoseError::ConfigError(format!("Unknown device: {s}")))
                }
            }
        }
    }
}

/// Parse a device index suffix such as ":1". An empty suffix means device 0.
fn parse_device_index(suffix: &str, device: &str) -> Result<usize> {
    if suffix.is_empty() {
        return Ok(0);
    }
    suffix
        .strip_prefix(':')
        .and_then(|index| index.parse::<usize>().ok())
        .ok_or_else(|| PoseError::ConfigError(format!("Invalid device index in '{device}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_device() {
        assert_eq!(Device::from_str("cpu").unwrap(), Device::Cpu);
        assert_eq!(Device::from_str("CPU").unwrap(), Device::Cpu);
        assert_eq!(Device::from_str("cuda").unwrap(), Device::Cuda(0));
        assert_eq!(Device::from_str("cuda:1").unwrap(), Device::Cuda(1));
        assert_eq!(Device::from_str("tensorrt:2").unwrap(), Device::TensorRt(2));
        assert_eq!(Device::from_str("mps").unwrap(), Device::CoreMl);
        assert_eq!(Device::from_str("directml").unwrap(), Device::DirectMl(0));
    }

    #[test]
    fn test_parse_unknown_device() {
        assert!(matches!(
            Device::from_str("tpu"),
            Err(PoseError::ConfigError(_))
        ));
    }

    #[test]
    fn test_parse_bad_device_index() {
        for bad in ["cuda:abc", "cuda:", "tensorrt:-1", "directml0", "cuda:1:2"] {
            assert!(
                matches!(Device::from_str(bad), Err(PoseError::ConfigError(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_display_round_trip() {
        for device in [Device::Cpu, Device::Cuda(3), Device::CoreMl, Device::DirectMl(1)] {
            assert_eq!(device.to_string().parse::<Device>().unwrap(), device);
        }
    }
}
