use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::paths::format_path_for_log;

/// Failures that end the run. Cancellation is not one of them.
#[derive(Debug, Error)]
pub enum ThumbnedError {
    #[error("There's no videos on {} folder.", format_path_for_log(.0))]
    NoVideos(PathBuf),

    #[error("`{0}` not found in PATH")]
    MissingBinary(String),

    #[error("Failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} failed with status {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Cannot parse the video duration reported by ffprobe: {0:?}")]
    InvalidDuration(String),

    #[error("No frame was captured at {timestamp}, it may be past the end of the video.")]
    EmptyFrame { timestamp: String },

    #[error("The video {} is shorter than one second, no frame can be picked.", format_path_for_log(.0))]
    VideoTooShort(PathBuf),

    #[error("No random frame was approved after {0} attempts.")]
    AttemptsExhausted(u32),
}
