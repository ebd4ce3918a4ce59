// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#[cfg(feature = "visualize")]
use std::time::Duration;

use crate::cli::args::RunArgs;
use crate::cli::logging::set_verbose;
use crate::device::Device;
use crate::error::{PoseError, Result};
use crate::fps::FpsCounter;
use crate::landmark::{NUM_LANDMARKS, PoseLandmark};
use crate::source::{Source, SourceIterator};
#[cfg(feature = "visualize")]
use crate::visualizer::Viewer;
use crate::{NAME, PoseConfig, PoseDetector, VERSION};
use crate::{info, section, verbose};

/// Track a pose through every frame of a source.
///
/// Per frame: detect and draw the skeleton, print the selected landmark and
/// mark it, then draw the current frame rate. Ends when the source is exhausted
/// or the window is closed.
///
/// # Errors
///
/// Returns an error if the arguments are invalid, the model or source cannot
/// be opened, or a frame fails to decode or process.
#[allow(clippy::cast_precision_loss)]
pub fn run(args: &RunArgs) -> Result<()> {
    set_verbose(args.verbose);

    let landmark = PoseLandmark::from_index(args.landmark).ok_or_else(|| {
        PoseError::ConfigError(format!(
            "Landmark {} is outside the pose schema (0-{})",
            args.landmark,
            NUM_LANDMARKS - 1
        ))
    })?;
    let config = config_from_args(args)?;
    let device = config.device.clone();

    let mut detector = PoseDetector::new(&args.model, config)?;

    info!("{NAME} {VERSION} 🚀 ONNX Runtime {device}");
    let (input_h, input_w) = detector.model().input_size();
    verbose!(
        "{}: input {}x{} ({:?}), conf={}, track_conf={}, static_image_mode={}",
        args.model,
        input_h,
        input_w,
        detector.model().layout(),
        args.conf,
        args.track_conf,
        args.static_image_mode
    );

    let source = Source::from(args.source.as_str());
    let is_video = source.is_video();
    let source_name = source.display_name();
    section!("Tracking {landmark} ({}) in {source_name}", landmark.index());

    #[cfg(not(feature = "visualize"))]
    if args.show {
        crate::warn!("--show requires the 'visualize' feature. Compile with --features visualize to enable it.");
    }
    #[cfg(feature = "visualize")]
    let mut viewer: Option<Viewer> = None;

    let mut fps = FpsCounter::new();
    let mut frames = 0usize;
    let mut total_inference = 0.0;

    for item in SourceIterator::new(source)? {
        let (mut frame, meta) = item?;

        let found = detector.find_pose(&mut frame, true)?;
        let selected = detector
            .find_position(&mut frame, false)
            .get(landmark.index())
            .copied();

        if let Some(point) = selected {
            info!("{point}");
            detector.annotator().draw_selected(&mut frame, &point);
        }

        let rate = fps.tick();
        detector.annotator().draw_fps(&mut frame, rate);

        let inference = detector
            .last_results()
            .and_then(|r| r.speed.inference)
            .unwrap_or(0.0);
        total_inference += inference;
        frames += 1;

        let total = meta
            .total_frames
            .map_or_else(|| "?".to_string(), |n| n.to_string());
        let kind = if is_video { "frame" } else { "image" };
        verbose!(
            "{kind} {}/{total} {}: {}, {inference:.1}ms, {rate:.1} FPS",
            meta.frame_idx + 1,
            meta.path,
            if found { "1 pose" } else { "no pose" }
        );

        #[cfg(feature = "visualize")]
        if args.show {
            let (width, height) = (frame.width() as usize, frame.height() as usize);
            if viewer.is_none() {
                viewer = Some(Viewer::new(
                    "Image",
                    width,
                    height,
                    detector.config().channel_order,
                )?);
            }

            if let Some(v) = viewer.as_mut() {
                if !v.show(&frame)? {
                    break;
                }
                if !is_video && !v.wait(Duration::from_millis(200)) {
                    break;
                }
            }
        }
    }

    verbose!(
        "Speed: {:.1}ms inference per frame over {frames} frames",
        total_inference / frames.max(1) as f64
    );

    // Keep a still image on screen until the window is closed.
    #[cfg(feature = "visualize")]
    if !is_video && let Some(v) = viewer.as_mut() {
        let _ = v.wait(Duration::MAX);
    }

    Ok(())
}

/// Detector configuration from the run arguments.
///
/// # Errors
///
/// Returns [`PoseError::ConfigError`] for an unknown `--device`.
pub fn config_from_args(args: &RunArgs) -> Result<PoseConfig> {
    let device: Device = args
        .device
        .as_deref()
        .map(str::parse)
        .transpose()?
        .unwrap_or_default();

    let mut config = PoseConfig::new()
        .with_static_image_mode(args.static_image_mode)
        .with_detection_confidence(args.conf)
        .with_tracking_confidence(args.track_conf)
        .with_threads(args.threads)
        .with_half(args.half)
        .with_device(device);
    if let Some(font) = &args.font {
        config = config.with_font(font);
    }
    Ok(config)
}
