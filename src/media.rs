use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tracing::debug;

use crate::error::ThumbnedError;

/// The three media operations the workflow needs from an external toolkit
#[cfg_attr(test, mockall::automock)]
pub trait MediaTool {
    /// Duration of the video, rounded down to whole seconds
    fn duration_seconds(&self, input_path: &Path) -> Result<u64>;

    /// Write the single frame at `timestamp` to `output_path`
    fn extract_frame(&self, input_path: &Path, timestamp: &str, output_path: &Path) -> Result<()>;

    /// Copy every stream of the video into `output_path` with the image attached as its cover
    fn embed_thumbnail(
        &self,
        input_path: &Path,
        thumbnail_path: &Path,
        output_path: &Path,
    ) -> Result<()>;
}

/// `MediaTool` backed by the ffmpeg and ffprobe binaries
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: ProbeFormat,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

impl Ffmpeg {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Ffmpeg {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Fail early when either binary can't be found
    pub fn ensure_available(&self) -> Result<()> {
        for bin in [&self.ffmpeg, &self.ffprobe] {
            which::which(bin)
                .map_err(|_| ThumbnedError::MissingBinary(bin.display().to_string()))?;
        }
        Ok(())
    }

    fn duration_command(&self, input_path: &Path) -> Command {
        let mut command = Command::new(&self.ffprobe);
        command
            .args(["-v", "error"])
            .args(["-show_entries", "format=duration"])
            .args(["-of", "json"])
            .arg(input_path);
        command
    }

    fn frame_command(&self, input_path: &Path, timestamp: &str, output_path: &Path) -> Command {
        let mut command = Command::new(&self.ffmpeg);
        command
            .args(["-hide_banner", "-loglevel", "error"])
            // The temporary file already exists, it has to be overwritten
            .arg("-y")
            .args(["-ss", timestamp])
            .arg("-i")
            .arg(input_path)
            .args(["-frames:v", "1"])
            .arg(output_path);
        command
    }

    fn embed_command(&self, input_path: &Path, thumbnail_path: &Path, output_path: &Path) -> Command {
        let mut command = Command::new(&self.ffmpeg);
        command
            .args(["-hide_banner", "-loglevel", "error"])
            .arg("-n")
            .arg("-i")
            .arg(input_path)
            .arg("-i")
            .arg(thumbnail_path)
            .args(["-map", "1", "-map", "0"])
            .args(["-c", "copy"])
            .args(["-disposition:0", "attached_pic"])
            .arg(output_path);
        command
    }
}

impl MediaTool for Ffmpeg {
    fn duration_seconds(&self, input_path: &Path) -> Result<u64> {
        let output = run(self.duration_command(input_path))
            .with_context(|| format!("Failed to probe the duration of {}", input_path.display()))?;
        parse_probe_duration(&output.stdout)
    }

    fn extract_frame(&self, input_path: &Path, timestamp: &str, output_path: &Path) -> Result<()> {
        run(self.frame_command(input_path, timestamp, output_path)).with_context(|| {
            format!(
                "Failed to capture the frame at {} of {}",
                timestamp,
                input_path.display()
            )
        })?;

        // ffmpeg exits 0 without writing anything when seeking past the end
        let written = fs::metadata(output_path)
            .with_context(|| format!("Failed to read {}", output_path.display()))?
            .len();
        if written == 0 {
            return Err(ThumbnedError::EmptyFrame {
                timestamp: timestamp.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn embed_thumbnail(
        &self,
        input_path: &Path,
        thumbnail_path: &Path,
        output_path: &Path,
    ) -> Result<()> {
        run(self.embed_command(input_path, thumbnail_path, output_path))
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        Ok(())
    }
}

/// Run to completion, turning spawn errors and non-zero exits into `ThumbnedError`
fn run(mut command: Command) -> Result<Output> {
    let tool = command.get_program().to_string_lossy().into_owned();
    debug!(?command, "running {}", tool);

    let output = command
        .stdin(Stdio::null())
        .output()
        .map_err(|source| ThumbnedError::Spawn {
            tool: tool.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(ThumbnedError::ToolFailed {
            tool,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into());
    }

    Ok(output)
}

/// Read `format.duration` from `ffprobe -of json` output and floor it
pub fn parse_probe_duration(stdout: &[u8]) -> Result<u64> {
    let probe: ProbeOutput =
        serde_json::from_slice(stdout).context("Failed to parse ffprobe JSON output")?;
    let raw = probe
        .format
        .duration
        .ok_or_else(|| ThumbnedError::InvalidDuration(String::new()))?;

    let seconds: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ThumbnedError::InvalidDuration(raw.clone()))?;
    if !seconds.is_finite() || seconds < 0.0 || seconds >= i64::MAX as f64 {
        return Err(ThumbnedError::InvalidDuration(raw).into());
    }

    Ok(seconds.floor() as u64)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::ffi::OsStr;

    fn args_of(command: &Command) -> Vec<&OsStr> {
        command.get_args().collect()
    }

    #[test]
    fn test_parse_probe_duration_floors() {
        let stdout = br#"{ "format": { "duration": "100.987000" } }"#;
        assert_eq!(parse_probe_duration(stdout).unwrap(), 100);
    }

    #[test]
    fn test_parse_probe_duration_rejects_garbage() {
        let err = parse_probe_duration(br#"{ "format": { "duration": "N/A" } }"#).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ThumbnedError>(),
            Some(ThumbnedError::InvalidDuration(raw)) if raw == "N/A"
        ));

        let err = parse_probe_duration(br#"{ "format": {} }"#).unwrap_err();
        assert!(err.downcast_ref::<ThumbnedError>().is_some());

        assert!(parse_probe_duration(b"not json").is_err());
    }

    #[test]
    fn test_frame_command_seeks_then_captures_one_frame() {
        let tool = Ffmpeg::new("ffmpeg", "ffprobe");
        let command = tool.frame_command(Path::new("in.mp4"), "00:00:42", Path::new("/tmp/f.png"));
        let args = args_of(&command);

        let seek = args.iter().position(|a| *a == "-ss").unwrap();
        let input = args.iter().position(|a| *a == "-i").unwrap();
        assert!(seek < input);
        assert_eq!(args[seek + 1], "00:00:42");
        assert!(args.windows(2).any(|w| w[0] == "-frames:v" && w[1] == "1"));
        assert_eq!(*args.last().unwrap(), "/tmp/f.png");
    }

    #[test]
    fn test_embed_command_maps_image_as_attached_picture() {
        let tool = Ffmpeg::new("ffmpeg", "ffprobe");
        let command = tool.embed_command(
            Path::new("in.mp4"),
            Path::new("cover.png"),
            Path::new("[THUMBNED] in.mp4"),
        );
        let args: Vec<String> = args_of(&command)
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        let joined = args.join(" ");

        assert!(joined.contains("-i in.mp4 -i cover.png -map 1 -map 0 -c copy -disposition:0 attached_pic"));
        assert!(args.contains(&"-n".to_string()));
        assert_eq!(args.last().unwrap(), "[THUMBNED] in.mp4");
    }

    #[test]
    fn test_parse_probe_duration_rejects_overflow() {
        let err = parse_probe_duration(br#"{ "format": { "duration": "1e20" } }"#).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ThumbnedError>(),
            Some(ThumbnedError::InvalidDuration(raw)) if raw == "1e20"
        ));
    }

    /// Stand-in ffmpeg that reports success without writing its output
    #[cfg(unix)]
    pub(crate) fn silent_ffmpeg(dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("ffmpeg");
        fs::write(
            &script,
            "#!/bin/sh\necho 'Output file is empty, nothing was encoded' >&2\nexit 0\n",
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_frame_fails_when_nothing_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let tool = Ffmpeg::new(silent_ffmpeg(dir.path()), "ffprobe");
        let frame = dir.path().join("frame.png");
        fs::write(&frame, b"").unwrap();

        let err = tool
            .extract_frame(Path::new("in.mp4"), "99:00:00", &frame)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ThumbnedError>(),
            Some(ThumbnedError::EmptyFrame { timestamp }) if timestamp == "99:00:00"
        ));
    }

    #[test]
    fn test_missing_binary_is_reported() {
        let tool = Ffmpeg::new("thumbned-no-such-ffmpeg", "ffprobe");
        let err = tool.ensure_available().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ThumbnedError>(),
            Some(ThumbnedError::MissingBinary(name)) if name == "thumbned-no-such-ffmpeg"
        ));
    }

    #[test]
    fn test_spawn_failure_propagates() {
        let tool = Ffmpeg::new("/nonexistent/ffmpeg", "/nonexistent/ffprobe");
        let err = tool.duration_seconds(Path::new("in.mp4")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ThumbnedError>(),
            Some(ThumbnedError::Spawn { .. })
        ));
    }
}
