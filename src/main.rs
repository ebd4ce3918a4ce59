// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::process;

use clap::Parser;

use pose_detector::cli::args::{Cli, Commands};
use pose_detector::cli::run::run;
use pose_detector::error;

fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Run(args) => run(args),
    };

    if let Err(e) = result {
        error!("{e}");
        process::exit(1);
    }
}
