use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Extensions picked up by the formatter.
pub const SOURCE_EXTENSIONS: [&str; 2] = ["cpp", "hpp"];

/// Recursively collects C++ sources and headers under `dir`, sorted so the
/// formatter sees a stable argument list.
pub fn collect_sources(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    if dir.is_dir() {
        walk(dir, &mut sources)?;
    }
    sources.sort();
    Ok(sources)
}

fn walk(dir: &Path, sources: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).with_context(|| format!("unable to list {}", dir.display()))?;
    for entry in entries {
        let path = entry
            .with_context(|| format!("unable to list {}", dir.display()))?
            .path();
        if path.is_dir() {
            walk(&path, sources)?;
        } else if is_source(&path) {
            sources.push(path);
        }
    }
    Ok(())
}

fn is_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}
