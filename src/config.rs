//! Project layout, optionally overridden by a `ysamba.toml` in the project root.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILE: &str = "ysamba.toml";

/// Layout settings as written in `ysamba.toml`. Paths are relative to the
/// project root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Name of the binary produced by the build.
    pub target: String,
    pub build_dir: PathBuf,
    pub data_dir: PathBuf,
    pub source_dir: PathBuf,
    /// Scripts directory, relative to `data_dir`.
    pub scripts_dir: PathBuf,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            target: "ysamba".to_string(),
            build_dir: PathBuf::from("build"),
            data_dir: PathBuf::from("data"),
            source_dir: PathBuf::from("src"),
            scripts_dir: PathBuf::from("scripts"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl LayoutConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Absolute locations of everything the launcher touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub target: String,
    pub build_dir: PathBuf,
    pub bin_dir: PathBuf,
    pub data_dir: PathBuf,
    pub source_dir: PathBuf,
    pub scripts_dir: PathBuf,
    /// Where the scripts directory is mirrored before running.
    pub staged_data_dir: PathBuf,
    pub staged_scripts_dir: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>, config: &LayoutConfig) -> Self {
        let root = root.into();
        let build_dir = root.join(&config.build_dir);
        let bin_dir = build_dir.join("bin");
        let data_dir = root.join(&config.data_dir);
        let staged_data_dir = bin_dir.join(&config.data_dir);
        Self {
            target: config.target.clone(),
            source_dir: root.join(&config.source_dir),
            scripts_dir: data_dir.join(&config.scripts_dir),
            staged_scripts_dir: staged_data_dir.join(&config.scripts_dir),
            root,
            build_dir,
            bin_dir,
            data_dir,
            staged_data_dir,
        }
    }

    /// Resolves the layout for `root`, reading `config` if given or
    /// `<root>/ysamba.toml` if it exists.
    pub fn load(root: impl Into<PathBuf>, config: Option<&Path>) -> Result<Self, ConfigError> {
        let root = root.into();
        let config = match config {
            Some(path) => LayoutConfig::from_file(path)?,
            None => {
                let default_path = root.join(CONFIG_FILE);
                if default_path.is_file() {
                    LayoutConfig::from_file(&default_path)?
                } else {
                    LayoutConfig::default()
                }
            }
        };
        Ok(Self::new(root, &config))
    }

    /// Path of the binary produced by the build.
    pub fn target_path(&self) -> PathBuf {
        let mut path = self.bin_dir.join(&self.target);
        if cfg!(windows) {
            path.set_extension("exe");
        }
        path
    }

    pub fn compile_commands(&self) -> PathBuf {
        self.build_dir.join("compile_commands.json")
    }
}
