//! Tooling around the ysamba game project.
//!
//! The crate bundles two independent tools: a launcher that drives the
//! external build tools (CMake, clang-format, clang-tidy) and runs the
//! resulting binary, and a one-shot migration of tileset descriptions from
//! the angle-based schema to the face-based one. Both are exposed as
//! library code so they can be tested without spawning the binaries.

pub mod config;
pub mod face;
pub mod launcher;
pub mod logging;
pub mod migrate;
pub mod tileset;

pub use config::{ConfigError, LayoutConfig, ProjectLayout};
pub use face::Face;
pub use launcher::{plan, Flags, Launcher, Step, ToolCommand, ToolError, ToolRunner};
pub use migrate::{migrate_document, migrate_file, MigrateError, MigrationReport};
pub use tileset::{FaceSet, FrameData, Tileset, TilesetError};
