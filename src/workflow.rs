use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::cleanup::{clear_thumbnail_path, remove_file_if_exists};
use crate::media::MediaTool;
use crate::paths::format_path_for_log;
use crate::prompt::Prompter;

/// Where the embedded image comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailSourceType {
    Manual,
    Timestamp,
    Random,
}

impl ThumbnailSourceType {
    pub const ALL: [ThumbnailSourceType; 3] = [
        ThumbnailSourceType::Manual,
        ThumbnailSourceType::Timestamp,
        ThumbnailSourceType::Random,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ThumbnailSourceType::Manual => "Manual",
            ThumbnailSourceType::Timestamp => "Timestamp",
            ThumbnailSourceType::Random => "Random",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ThumbnailSourceType::Manual => "Use your own image for the thumbnail.",
            ThumbnailSourceType::Timestamp => {
                "Use specific timestamp in the video for the thumbnail."
            }
            ThumbnailSourceType::Random => {
                "Randomly picking a frame in the video for the thumbnail."
            }
        }
    }

    /// Whether the thumbnail is a temporary file owned by the run
    pub fn is_generated(self) -> bool {
        self != ThumbnailSourceType::Manual
    }
}

/// Result of one interactive step
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Step<T> {
    Confirmed(T),
    Cancelled,
}

/// Values confirmed by the five steps, in order
#[derive(Debug, Clone)]
pub struct WorkflowContext {
    pub input_dir: PathBuf,
    pub input_path: PathBuf,
    pub thumbnail_source_type: ThumbnailSourceType,
    pub thumbnail_path: PathBuf,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The new video was written to this path
    Thumbned(PathBuf),
    Aborted,
}

/// Picks the second sampled by the random source type
pub trait RandomSource {
    /// Uniform integer in `0..upper`; `upper` is never zero
    fn below(&mut self, upper: u64) -> u64;
}

pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn below(&mut self, upper: u64) -> u64 {
        rand::thread_rng().gen_range(0..upper)
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Give up on the random source after this many rejected frames
    pub max_random_attempts: Option<u32>,
    pub show_progress: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        WorkflowConfig {
            max_random_attempts: None,
            show_progress: true,
        }
    }
}

pub struct Workflow<'a> {
    pub(crate) prompter: &'a mut dyn Prompter,
    pub(crate) media: &'a dyn MediaTool,
    pub(crate) random: &'a mut dyn RandomSource,
    pub(crate) config: WorkflowConfig,
}

/// Unwrap a confirmed step or stop the whole run
macro_rules! confirmed {
    ($step:expr) => {
        match $step {
            Step::Confirmed(value) => value,
            Step::Cancelled => return Ok(Outcome::Aborted),
        }
    };
}

impl<'a> Workflow<'a> {
    pub fn new(
        prompter: &'a mut dyn Prompter,
        media: &'a dyn MediaTool,
        random: &'a mut dyn RandomSource,
        config: WorkflowConfig,
    ) -> Self {
        Workflow {
            prompter,
            media,
            random,
            config,
        }
    }

    /// Ask for everything, then write the thumbned copy of the video
    pub fn run(&mut self) -> Result<Outcome> {
        let input_dir = confirmed!(self.select_input_directory()?);
        debug!(dir = %input_dir.display(), "input directory confirmed");

        let input_path = confirmed!(self.select_input_video(&input_dir)?);
        debug!(video = %input_path.display(), "input video confirmed");

        let thumbnail_source_type = confirmed!(self.select_thumbnail_source_type()?);
        debug!(source = ?thumbnail_source_type, "thumbnail source confirmed");

        let thumbnail_path =
            confirmed!(self.acquire_thumbnail(thumbnail_source_type, &input_path)?);
        debug!(thumbnail = %thumbnail_path.display(), "thumbnail confirmed");

        let output_path = match self.select_output_path(&input_path)? {
            Step::Confirmed(path) => path,
            Step::Cancelled => {
                clear_thumbnail_path(thumbnail_source_type, &thumbnail_path)?;
                return Ok(Outcome::Aborted);
            }
        };

        let context = WorkflowContext {
            input_dir,
            input_path,
            thumbnail_source_type,
            thumbnail_path,
            output_path,
        };

        self.apply(&context)?;

        Ok(Outcome::Thumbned(context.output_path))
    }

    fn apply(&self, context: &WorkflowContext) -> Result<()> {
        let spinner = busy_indicator(self.config.show_progress);
        spinner.set_message("Adding the thumbnail to the video...");

        if let Err(e) = self.media.embed_thumbnail(
            &context.input_path,
            &context.thumbnail_path,
            &context.output_path,
        ) {
            spinner.abandon_with_message("Failed to add the thumbnail.");
            if context.thumbnail_source_type.is_generated() {
                warn!(
                    thumbnail = %context.thumbnail_path.display(),
                    "generated thumbnail kept after failed embed"
                );
            }
            return Err(e);
        }

        spinner.set_message("Cleaning the post-process waste...");
        clear_thumbnail_path(context.thumbnail_source_type, &context.thumbnail_path)?;

        let done = format!(
            "The video has been thumbned (thumbnail added) into {}.",
            format_path_for_log(&context.output_path)
        );
        if spinner.is_hidden() {
            println!("{}", done);
        } else {
            spinner.finish_with_message(done);
        }

        Ok(())
    }

    /// Drop a frame the user didn't keep
    pub(crate) fn discard_frame(&self, frame_path: &Path) {
        if let Err(e) = remove_file_if_exists(frame_path) {
            warn!("{:#}", e);
        }
    }
}

fn busy_indicator(show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏✔"),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
