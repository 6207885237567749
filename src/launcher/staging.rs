//! Mirroring of the scripts directory into the build output tree.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info, warn};

/// Result of staging one directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staged {
    /// The source directory was missing; nothing was touched.
    Skipped,
    Copied { files: usize },
}

/// Replaces `destination` with a fresh copy of `source`.
///
/// `data_dir` (the parent the destination lives in) is created if needed.
/// Any previous content of `destination` is removed first, so files
/// deleted from `source` disappear from the mirror too.
pub fn mirror_dir(source: &Path, data_dir: &Path, destination: &Path) -> Result<Staged> {
    if !source.is_dir() {
        warn!(
            "scripts directory {} does not exist; skipping staging",
            source.display()
        );
        return Ok(Staged::Skipped);
    }

    fs::create_dir_all(data_dir)
        .with_context(|| format!("unable to create {}", data_dir.display()))?;

    if destination.exists() {
        debug!("removing stale {}", destination.display());
        fs::remove_dir_all(destination)
            .with_context(|| format!("unable to remove {}", destination.display()))?;
    }

    let files = copy_dir(source, destination)?;
    info!(
        "staged {files} file(s) from {} to {}",
        source.display(),
        destination.display()
    );
    Ok(Staged::Copied { files })
}

fn copy_dir(source: &Path, destination: &Path) -> Result<usize> {
    fs::create_dir_all(destination)
        .with_context(|| format!("unable to create {}", destination.display()))?;

    let mut copied = 0;
    let entries =
        fs::read_dir(source).with_context(|| format!("unable to list {}", source.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("unable to list {}", source.display()))?;
        let path = entry.path();
        let target = destination.join(entry.file_name());
        if entry
            .file_type()
            .with_context(|| format!("unable to inspect {}", path.display()))?
            .is_dir()
        {
            copied += copy_dir(&path, &target)?;
        } else {
            fs::copy(&path, &target).with_context(|| {
                format!("unable to copy {} to {}", path.display(), target.display())
            })?;
            copied += 1;
        }
    }
    Ok(copied)
}
