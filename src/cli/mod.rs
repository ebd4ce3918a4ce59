// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Command-line interface.
//!
//! This module contains argument parsing, console logging and the `run`
//! command that drives the detector over a frame source.

/// CLI arguments.
pub mod args;

/// Console logging macros.
pub mod logging;

/// Frame loop for the `run` command.
pub mod run;
