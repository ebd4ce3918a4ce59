// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Example script annotating a single image with the library.
//!
//! This example covers:
//! 1. Finding a pose and drawing the skeleton with joint-angle overlays.
//! 2. Reading landmark positions and measuring both elbow angles.
//!
//! Run with `cargo run --example annotate_image -- <model.onnx> <image>`.

use std::path::Path;

use pose_detector::{PoseConfig, PoseDetector, PoseLandmark, Result};

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let model_path = args
        .next()
        .unwrap_or_else(|| "pose_landmark_full.onnx".to_string());
    let image_path = args.next().unwrap_or_else(|| "pushup.jpg".to_string());

    if !Path::new(&image_path).exists() {
        println!("Skipping: '{image_path}' not found.");
        return Ok(());
    }

    // 1. Load the model, one image at a time so no tracking is carried over
    println!("Loading model...");
    let config = PoseConfig::new().with_static_image_mode(true);
    let mut detector = PoseDetector::new(&model_path, config)?;

    let mut frame = image::open(&image_path)?.to_rgb8();
    if !detector.find_pose(&mut frame, true)? {
        println!("No pose found in {image_path}");
        return Ok(());
    }

    // 2. Positions and angles
    let points = detector.find_position(&mut frame, false).to_vec();
    for landmark in [PoseLandmark::LeftWrist, PoseLandmark::RightWrist] {
        println!("{landmark}: {}", points[landmark.index()]);
    }

    let left = detector.find_angle(&mut frame, 11, 13, 15, true);
    let right = detector.find_angle(&mut frame, 12, 14, 16, true);
    println!("Elbows: left {left:.0}, right {right:.0}");

    let output = Path::new(&image_path).with_extension("annotated.jpg");
    frame.save(&output)?;
    println!("Saved annotated image to {}", output.display());
    Ok(())
}
