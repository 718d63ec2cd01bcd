use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ThumbnedError;
use crate::paths::{
    find_available_output_path, format_path_for_log, is_image_file_name, list_video_names,
    resolve_path, unquote,
};
use crate::prompt::{Choice, TextQuestion, Validation};
use crate::timestamp::{is_timestamp, seconds_to_timestamp};
use crate::workflow::{Step, ThumbnailSourceType, Workflow};

const THUMBNAIL_PREFIX: &str = "thumbned-";
const THUMBNAIL_SUFFIX: &str = ".png";

impl Workflow<'_> {
    pub fn select_input_directory(&mut self) -> Result<Step<PathBuf>> {
        let answer = self.prompter.text(&TextQuestion {
            message: "Enter the directory where the video is located:",
            default: Some("."),
            validate: &validate_input_dir,
        })?;

        let Some(answer) = answer else {
            return Ok(Step::Cancelled);
        };
        Ok(Step::Confirmed(resolve_path(unquote(&answer))?))
    }

    pub fn select_input_video(&mut self, input_dir: &Path) -> Result<Step<PathBuf>> {
        let video_names = list_video_names(input_dir)?;
        if video_names.is_empty() {
            return Err(ThumbnedError::NoVideos(input_dir.to_path_buf()).into());
        }

        let choices: Vec<Choice> = video_names.iter().map(Choice::new).collect();
        let selected = self
            .prompter
            .select("Select a video you want to process:", &choices)?;

        Ok(match selected {
            Some(index) => Step::Confirmed(input_dir.join(&video_names[index])),
            None => Step::Cancelled,
        })
    }

    pub fn select_thumbnail_source_type(&mut self) -> Result<Step<ThumbnailSourceType>> {
        let choices: Vec<Choice> = ThumbnailSourceType::ALL
            .iter()
            .map(|source| Choice::new(source.title()).with_description(source.description()))
            .collect();
        let selected = self
            .prompter
            .select("Select the thumbnail source:", &choices)?;

        Ok(match selected {
            Some(index) => Step::Confirmed(ThumbnailSourceType::ALL[index]),
            None => Step::Cancelled,
        })
    }

    /// Resolve the image to embed; generated frames land in the temp directory
    pub fn acquire_thumbnail(
        &mut self,
        source_type: ThumbnailSourceType,
        input_path: &Path,
    ) -> Result<Step<PathBuf>> {
        match source_type {
            ThumbnailSourceType::Manual => self.acquire_manual_thumbnail(),
            ThumbnailSourceType::Timestamp => self.acquire_timestamp_thumbnail(input_path),
            ThumbnailSourceType::Random => self.acquire_random_thumbnail(input_path),
        }
    }

    fn acquire_manual_thumbnail(&mut self) -> Result<Step<PathBuf>> {
        let answer = self.prompter.text(&TextQuestion {
            message: "Enter the thumbnail image path:",
            default: None,
            validate: &validate_manual_thumbnail,
        })?;

        let Some(answer) = answer else {
            return Ok(Step::Cancelled);
        };
        Ok(Step::Confirmed(resolve_path(unquote(&answer))?))
    }

    fn acquire_timestamp_thumbnail(&mut self, input_path: &Path) -> Result<Step<PathBuf>> {
        let answer = self.prompter.text(&TextQuestion {
            message: "Enter the timestamp on the video you want to make as a thumbnail: (format: hh:mm:ss)",
            default: None,
            validate: &validate_timestamp,
        })?;

        let Some(timestamp) = answer else {
            return Ok(Step::Cancelled);
        };
        let frame_path = self.capture_frame(input_path, timestamp.trim())?;
        Ok(Step::Confirmed(frame_path))
    }

    fn acquire_random_thumbnail(&mut self, input_path: &Path) -> Result<Step<PathBuf>> {
        let mut attempt: u32 = 0;

        loop {
            if let Some(max) = self.config.max_random_attempts {
                if attempt >= max {
                    return Err(ThumbnedError::AttemptsExhausted(max).into());
                }
            }
            attempt += 1;

            let duration = self.media.duration_seconds(input_path)?;
            if duration == 0 {
                return Err(ThumbnedError::VideoTooShort(input_path.to_path_buf()).into());
            }
            let second = self.random.below(duration);
            let timestamp = seconds_to_timestamp(second)
                .ok_or_else(|| ThumbnedError::InvalidDuration(duration.to_string()))?;
            debug!(attempt, %timestamp, "sampling random frame");

            let frame_path = self.capture_frame(input_path, &timestamp)?;

            let message = format!(
                "Do you want to use this {} image as the thumbnail? (attempt: {})",
                format_path_for_log(&frame_path),
                attempt
            );
            match self.prompter.confirm(&message)? {
                Some(true) => return Ok(Step::Confirmed(frame_path)),
                Some(false) => self.discard_frame(&frame_path),
                None => {
                    self.discard_frame(&frame_path);
                    return Ok(Step::Cancelled);
                }
            }
        }
    }

    /// Extract one frame into a fresh temporary PNG
    fn capture_frame(&self, input_path: &Path, timestamp: &str) -> Result<PathBuf> {
        let frame_path = tempfile::Builder::new()
            .prefix(THUMBNAIL_PREFIX)
            .suffix(THUMBNAIL_SUFFIX)
            .tempfile()
            .context("Failed to create a temporary thumbnail file")?
            .into_temp_path()
            .keep()
            .context("Failed to keep the temporary thumbnail file")?;

        if let Err(e) = self.media.extract_frame(input_path, timestamp, &frame_path) {
            self.discard_frame(&frame_path);
            return Err(e);
        }

        Ok(frame_path)
    }

    pub fn select_output_path(&mut self, input_path: &Path) -> Result<Step<PathBuf>> {
        let default_output_path = find_available_output_path(input_path)?;
        let default = default_output_path.to_string_lossy().into_owned();
        let validate = |value: &str| validate_output_path(value, input_path);

        let answer = self.prompter.text(&TextQuestion {
            message: "Enter the output video name:",
            default: Some(default.as_str()),
            validate: &validate,
        })?;

        let Some(answer) = answer else {
            return Ok(Step::Cancelled);
        };
        Ok(Step::Confirmed(resolve_path(unquote(&answer))?))
    }
}

pub fn validate_input_dir(value: &str) -> Validation {
    let value = unquote(value);
    if value.is_empty() {
        return Err("Please enter a directory.".to_string());
    }

    let dir = resolve_path(value).map_err(|e| format!("{:#}", e))?;
    match fs::metadata(&dir) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err("The directory doesn't exist.".to_string())
        }
        Err(e) => Err(format!("Can't read {}: {}", format_path_for_log(&dir), e)),
        Ok(metadata) if !metadata.is_dir() => {
            Err("The entered path is not a directory.".to_string())
        }
        Ok(_) => Ok(()),
    }
}

pub fn validate_manual_thumbnail(value: &str) -> Validation {
    let value = unquote(value);
    if value.is_empty() {
        return Err("Please enter the image path.".to_string());
    }

    if !is_image_file_name(value) {
        return Err("The entered path is not an image file.".to_string());
    }

    let thumbnail_path = resolve_path(value).map_err(|e| format!("{:#}", e))?;
    if !thumbnail_path.exists() {
        return Err(format!(
            "Can't find an image in {}.",
            format_path_for_log(&thumbnail_path)
        ));
    }

    Ok(())
}

pub fn validate_timestamp(value: &str) -> Validation {
    if value.trim().is_empty() {
        return Err("Please enter a timestamp.".to_string());
    }

    if !is_timestamp(value.trim()) {
        return Err("Invalid timestamp format. Please use hh:mm:ss format.".to_string());
    }

    Ok(())
}

pub fn validate_output_path(value: &str, input_path: &Path) -> Validation {
    let value = unquote(value);
    if value.is_empty() {
        return Err("Please enter the output video name.".to_string());
    }

    if Path::new(value).extension() != input_path.extension() {
        return Err("The output name must have the same extension as the input name.".to_string());
    }

    let output_path = resolve_path(value).map_err(|e| format!("{:#}", e))?;
    if output_path.exists() {
        return Err(format!(
            "A file already exists at {}. Enter a name that isn't taken.",
            format_path_for_log(&output_path)
        ));
    }

    Ok(())
}
