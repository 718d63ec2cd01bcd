use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

use crate::workflow::ThumbnailSourceType;

/// Remove a generated thumbnail once it has been embedded.
///
/// User-supplied images are never touched.
pub fn clear_thumbnail_path(source_type: ThumbnailSourceType, thumbnail_path: &Path) -> Result<()> {
    if source_type == ThumbnailSourceType::Manual {
        return Ok(());
    }

    remove_file_if_exists(thumbnail_path)
}

/// Delete `path`, treating an already missing file as success
pub fn remove_file_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed temporary thumbnail");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to delete {}", path.display())),
    }
}
