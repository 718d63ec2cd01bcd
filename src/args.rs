use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::media::Ffmpeg;
use crate::workflow::WorkflowConfig;

/// Interactively attach a thumbnail to a video file
#[derive(Debug, Parser)]
#[command(name = "thumbned", version)]
pub struct Args {
    /// ffmpeg binary used to capture frames and embed the thumbnail
    #[arg(long, value_name = "PATH", default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,

    /// ffprobe binary used to read the video duration
    #[arg(long, value_name = "PATH", default_value = "ffprobe")]
    pub ffprobe: PathBuf,

    /// Stop offering random frames after this many attempts
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_random_attempts: Option<u32>,

    /// Don't show the busy indicator
    #[arg(long)]
    pub no_progress: bool,

    /// Log external tool invocations (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn media_tool(&self) -> Ffmpeg {
        Ffmpeg::new(&self.ffmpeg, &self.ffprobe)
    }

    pub fn workflow_config(&self) -> WorkflowConfig {
        WorkflowConfig {
            max_random_attempts: self.max_random_attempts,
            show_progress: !self.no_progress,
        }
    }

    /// Filter used when `RUST_LOG` isn't set
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}
