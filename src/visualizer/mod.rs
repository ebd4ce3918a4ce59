// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Colors and on-screen display for annotated frames.

/// Color definitions.
pub mod color;

#[cfg(feature = "visualize")]
pub mod viewer;

pub use color::Color;

#[cfg(feature = "visualize")]
pub use viewer::Viewer;
