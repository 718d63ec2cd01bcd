use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use std::env;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Suffixes accepted as input videos (case-sensitive)
pub const VIDEO_SUFFIXES: &[&str] = &[".mp4", ".mov", ".mkv"];

/// Suffixes accepted as thumbnail images (case-sensitive)
pub const IMAGE_SUFFIXES: &[&str] = &[".jpg", ".jpeg", ".png"];

const OUTPUT_TAG: &str = "THUMBNED";

pub fn is_video_file_name(name: &str) -> bool {
    VIDEO_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

pub fn is_image_file_name(name: &str) -> bool {
    IMAGE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Strip surrounding whitespace and one pair of matching quotes.
///
/// Terminals wrap dragged-in paths containing spaces in quotes.
pub fn unquote(value: &str) -> &str {
    let trimmed = value.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

/// Resolve a user-entered path against the working directory.
///
/// The result is absolute and lexically normalized; symlinks are left alone.
pub fn resolve_path(value: &str) -> Result<PathBuf> {
    let path = Path::new(value);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .context("Failed to read the current working directory")?
            .join(path)
    };
    Ok(normalize(&absolute))
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Names of the video files directly inside `dir`, sorted
pub fn list_video_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to read directory {}", dir.display()))?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        // Non UTF-8 names can't be matched against the suffix list
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };

        if is_video_file_name(name) {
            names.push(name.to_string());
        }
    }

    Ok(names)
}

/// Build `[THUMBNED] name.ext`, or `[THUMBNED n] name.ext` from the second attempt on
pub fn thumbned_file_name(input_path: &Path, attempt: u32) -> Option<String> {
    let stem = input_path.file_stem()?.to_str()?;
    let extension = match input_path.extension() {
        Some(ext) => format!(".{}", ext.to_str()?),
        None => String::new(),
    };
    let tag = if attempt > 1 {
        format!("[{} {}]", OUTPUT_TAG, attempt)
    } else {
        format!("[{}]", OUTPUT_TAG)
    };

    Some(format!("{} {}{}", tag, stem, extension))
}

/// First `[THUMBNED n]` sibling of the input that doesn't exist yet
pub fn find_available_output_path(input_path: &Path) -> Result<PathBuf> {
    let dir = input_path.parent().unwrap_or_else(|| Path::new("."));
    let mut attempt = 1;

    loop {
        let name = thumbned_file_name(input_path, attempt)
            .ok_or_else(|| anyhow!("Invalid video file name: {}", input_path.display()))?;
        let candidate = dir.join(name);

        if !candidate.exists() {
            return Ok(candidate);
        }

        attempt += 1;
    }
}

/// Quote and italicize a path for terminal messages
pub fn format_path_for_log(path: &Path) -> String {
    format!("\"{}\"", path.display().to_string().italic())
}
