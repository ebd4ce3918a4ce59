// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_DETECTION_CONFIDENCE, DEFAULT_TRACKING_CONFIDENCE};
use crate::landmark::PoseLandmark;

/// Landmark printed and highlighted every frame (right index finger).
pub const DEFAULT_LANDMARK: usize = PoseLandmark::RightIndex.index();

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Run Options:
    --model, -m <MODEL>        Path to ONNX pose landmark model
    --source, -s <SOURCE>      Input source (image, directory, video, or webcam index)
    --conf <CONF>              Minimum detection confidence [default: 0.7]
    --track-conf <TRACK_CONF>  Minimum tracking confidence [default: 0.7]
    --static-image-mode        Detect from scratch on every frame
    --landmark <ID>            Landmark to print and highlight [default: 20]
    --show                     Display annotated frames in a window
    --device <DEVICE>          Device (cpu, cuda:0, mps, coreml, directml:0, tensorrt:0)
    --verbose                  Show verbose output

Examples:
    pose-detector run --model pose_landmark_full.onnx --source dance.mp4 --show
    pose-detector run -m pose_landmark_full.onnx -s 0 --conf 0.5 --track-conf 0.5
    pose-detector run -m pose_landmark_full.onnx -s photos/ --static-image-mode --landmark 0"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Track a pose through an image, video, or webcam feed
    Run(RunArgs),
}

/// Arguments for the run command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to ONNX pose landmark model
    #[arg(short, long)]
    pub model: String,

    /// Input source (image, directory, video, or webcam index)
    #[arg(short, long)]
    pub source: String,

    /// Minimum detection confidence
    #[arg(long, default_value_t = DEFAULT_DETECTION_CONFIDENCE)]
    pub conf: f32,

    /// Minimum tracking confidence
    #[arg(long, default_value_t = DEFAULT_TRACKING_CONFIDENCE)]
    pub track_conf: f32,

    /// Detect from scratch on every frame
    #[arg(long, default_value_t = false)]
    pub static_image_mode: bool,

    /// Landmark id to print and highlight each frame
    #[arg(long, default_value_t = DEFAULT_LANDMARK)]
    pub landmark: usize,

    /// Device to use (cpu, cuda:0, mps, coreml, directml:0, tensorrt:0)
    #[arg(long)]
    pub device: Option<String>,

    /// Number of intra-op threads (0 lets ONNX Runtime decide)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,

    /// Use FP16 model input
    #[arg(long, default_value_t = false)]
    pub half: bool,

    /// Overlay text font (TrueType); defaults to the cached Arial.ttf
    #[arg(long)]
    pub font: Option<String>,

    /// Display annotated frames in a window
    #[arg(long, default_value_t = false)]
    pub show: bool,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_args_defaults() {
        let args = Cli::parse_from(["app", "run", "--model", "pose.onnx", "--source", "0"]);
        match args.command {
            Commands::Run(run) => {
                assert_eq!(run.model, "pose.onnx");
                assert_eq!(run.source, "0");
                assert!((run.conf - 0.7).abs() < f32::EPSILON);
                assert!((run.track_conf - 0.7).abs() < f32::EPSILON);
                assert!(!run.static_image_mode);
                assert_eq!(run.landmark, 20);
                assert_eq!(run.threads, 0);
                assert!(run.device.is_none());
                assert!(!run.half);
                assert!(!run.show);
                assert!(run.verbose);
            }
        }
    }

    #[test]
    fn test_run_args_custom() {
        let args = Cli::parse_from([
            "app",
            "run",
            "-m",
            "custom.onnx",
            "-s",
            "dance.mp4",
            "--conf",
            "0.5",
            "--track-conf",
            "0.3",
            "--static-image-mode",
            "--landmark",
            "0",
            "--device",
            "cuda:1",
            "--half",
            "--show",
            "--verbose",
            "false",
        ]);
        match args.command {
            Commands::Run(run) => {
                assert_eq!(run.model, "custom.onnx");
                assert_eq!(run.source, "dance.mp4");
                assert!((run.conf - 0.5).abs() < f32::EPSILON);
                assert!((run.track_conf - 0.3).abs() < f32::EPSILON);
                assert!(run.static_image_mode);
                assert_eq!(run.landmark, 0);
                assert_eq!(run.device.as_deref(), Some("cuda:1"));
                assert!(run.half);
                assert!(run.show);
                assert!(!run.verbose);
            }
        }
    }

    #[test]
    fn test_model_and_source_required() {
        assert!(Cli::try_parse_from(["app", "run", "--source", "0"]).is_err());
        assert!(Cli::try_parse_from(["app", "run", "--model", "pose.onnx"]).is_err());
    }
}
