//! Migration of legacy tileset descriptions to the face-based schema.
//!
//! Legacy frames describe their orientation with an `angle` string and an
//! optional `front_face_id` pointing at the frame drawn on the front side.
//! The current schema replaces both with a `faces` map and a
//! `default_face` name, and drops the `frame` identifier because it is
//! already embedded in `faces`.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::face::Face;

/// Default input file name, relative to the working directory.
pub const LEGACY_TILESET_FILE: &str = "tileset_old.json";
/// Default output file name, relative to the working directory.
pub const TILESET_FILE: &str = "tileset.json";

const FRAMES_KEY: &str = "frames";
const FRAME_KEY: &str = "frame";
const GAME_ID_KEY: &str = "game_id";
const ANGLE_KEY: &str = "angle";
const FRONT_FACE_ID_KEY: &str = "front_face_id";
const FACES_KEY: &str = "faces";
const DEFAULT_FACE_KEY: &str = "default_face";

const ORTHOGONAL: &str = "orthogonal";

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("tileset document has no `frames` array")]
    MissingFrames,
    #[error("frame record {index} is not a JSON object")]
    InvalidFrame { index: usize },
    #[error("frame record {index} has no `frame` identifier")]
    MissingIdentifier { index: usize },
    #[error("front_face_id of frame {frame} is not a frame reference: {value}")]
    InvalidReference { frame: Value, value: Value },
    #[error("front face not found for frame {frame} (front_face_id {front_face_id})")]
    UnresolvedFrontFace { frame: Value, front_face_id: u64 },
}

/// Counts of what happened to each frame during a migration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Frames with a resolved front face: `{top, front}`, default `top`.
    pub top_and_front: usize,
    /// Orthogonal frames: `{front}`, default `front`.
    pub front_only: usize,
    /// Any other frame with a legacy field: `{top}`, default `top`.
    pub top_only: usize,
    /// Frames without legacy fields, left as they were.
    pub untouched: usize,
    /// Frames that had both `front_face_id` and `angle`; the angle was dropped.
    pub discarded_angles: Vec<Value>,
}

impl MigrationReport {
    pub fn migrated(&self) -> usize {
        self.top_and_front + self.front_only + self.top_only
    }
}

/// Identifiers are carried as the JSON values found in the input, so any
/// `frame` value round-trips unchanged into `faces`.
#[derive(Debug, Clone, PartialEq)]
enum Rewrite {
    Untouched,
    TopAndFront { own: Value, front: Value },
    FrontOnly { own: Value },
    TopOnly { own: Value },
}

impl Rewrite {
    fn default_face(&self) -> Option<Face> {
        match self {
            Rewrite::Untouched => None,
            Rewrite::TopAndFront { .. } | Rewrite::TopOnly { .. } => Some(Face::Top),
            Rewrite::FrontOnly { .. } => Some(Face::Front),
        }
    }

    fn faces(self) -> Map<String, Value> {
        let mut faces = Map::new();
        match self {
            Rewrite::Untouched => {}
            Rewrite::TopAndFront { own, front } => {
                faces.insert(Face::Top.as_str().to_string(), own);
                faces.insert(Face::Front.as_str().to_string(), front);
            }
            Rewrite::FrontOnly { own } => {
                faces.insert(Face::Front.as_str().to_string(), own);
            }
            Rewrite::TopOnly { own } => {
                faces.insert(Face::Top.as_str().to_string(), own);
            }
        }
        faces
    }
}

/// Rewrites every legacy frame of `document` in place.
///
/// All frames are classified before anything is mutated, so on error the
/// document is left exactly as it was.
pub fn migrate_document(document: &mut Value) -> Result<MigrationReport, MigrateError> {
    let frames = document
        .get_mut(FRAMES_KEY)
        .and_then(Value::as_array_mut)
        .ok_or(MigrateError::MissingFrames)?;

    let mut report = MigrationReport::default();
    let mut rewrites = Vec::with_capacity(frames.len());
    let snapshot: &[Value] = frames;
    for (index, frame) in snapshot.iter().enumerate() {
        let record = frame
            .as_object()
            .ok_or(MigrateError::InvalidFrame { index })?;
        let rewrite = classify(snapshot, index, record)?;
        match &rewrite {
            Rewrite::Untouched => report.untouched += 1,
            Rewrite::TopAndFront { own, .. } => {
                report.top_and_front += 1;
                if record.contains_key(ANGLE_KEY) {
                    report.discarded_angles.push(own.clone());
                }
            }
            Rewrite::FrontOnly { .. } => report.front_only += 1,
            Rewrite::TopOnly { .. } => report.top_only += 1,
        }
        rewrites.push(rewrite);
    }

    for (frame, rewrite) in frames.iter_mut().zip(rewrites) {
        let Some(default_face) = rewrite.default_face() else {
            continue;
        };
        let Some(record) = frame.as_object_mut() else {
            continue;
        };
        // `frame` is embedded in `faces` from here on.
        record.shift_remove(FRAME_KEY);
        record.shift_remove(FRONT_FACE_ID_KEY);
        record.shift_remove(ANGLE_KEY);
        record.insert(
            DEFAULT_FACE_KEY.to_string(),
            Value::String(default_face.as_str().to_string()),
        );
        record.insert(FACES_KEY.to_string(), Value::Object(rewrite.faces()));
    }

    Ok(report)
}

fn classify(
    frames: &[Value],
    index: usize,
    record: &Map<String, Value>,
) -> Result<Rewrite, MigrateError> {
    let front_face_id = record.get(FRONT_FACE_ID_KEY);
    let angle = record.get(ANGLE_KEY);
    if front_face_id.is_none() && angle.is_none() {
        return Ok(Rewrite::Untouched);
    }

    let own = record
        .get(FRAME_KEY)
        .cloned()
        .ok_or(MigrateError::MissingIdentifier { index })?;

    if let Some(reference) = front_face_id {
        let Some(front_face_id) = reference.as_u64() else {
            return Err(MigrateError::InvalidReference {
                frame: own,
                value: reference.clone(),
            });
        };
        let Some(front) = find_frame_by_id(frames, front_face_id) else {
            return Err(MigrateError::UnresolvedFrontFace {
                frame: own,
                front_face_id,
            });
        };
        debug!("frame {own}: front face {front_face_id} resolved to frame {front}");
        return Ok(Rewrite::TopAndFront { own, front });
    }

    if angle.and_then(Value::as_str) == Some(ORTHOGONAL) {
        Ok(Rewrite::FrontOnly { own })
    } else {
        Ok(Rewrite::TopOnly { own })
    }
}

/// Linear search for the frame a `front_face_id` refers to.
///
/// Records are matched on `game_id`; records without one are matched on
/// their `frame` identifier. Returns the matching record's `frame`.
fn find_frame_by_id(frames: &[Value], id: u64) -> Option<Value> {
    frames.iter().filter_map(Value::as_object).find_map(|record| {
        let frame = record.get(FRAME_KEY)?;
        let key = record.get(GAME_ID_KEY).unwrap_or(frame);
        (key.as_u64() == Some(id)).then(|| frame.clone())
    })
}

/// Serializes a tileset document with four-space indentation.
pub fn render_document(document: &Value) -> Result<String> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    document
        .serialize(&mut serializer)
        .context("failed to serialize tileset")?;
    buffer.push(b'\n');
    String::from_utf8(buffer).context("serialized tileset is not valid UTF-8")
}

/// Parses and migrates a legacy tileset.
pub fn migrate_str(source: &str) -> Result<(Value, MigrationReport)> {
    let mut document: Value = serde_json::from_str(source).context("invalid tileset JSON")?;
    let report = migrate_document(&mut document)?;
    Ok((document, report))
}

/// Migrates `input` into `output`. The input file is never modified and
/// nothing is written unless the whole migration succeeds.
pub fn migrate_file(input: &Path, output: &Path) -> Result<MigrationReport> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("unable to read {}", input.display()))?;
    let (document, report) = migrate_str(&source)
        .with_context(|| format!("failed to migrate {}", input.display()))?;
    let rendered = render_document(&document)?;
    write_atomically(output, rendered.as_bytes())?;

    log_report(&report);
    info!("wrote {}", output.display());
    Ok(report)
}

pub fn log_report(report: &MigrationReport) {
    info!(
        "migrated {} frame(s): {} top+front, {} front, {} top; {} untouched",
        report.migrated(),
        report.top_and_front,
        report.front_only,
        report.top_only,
        report.untouched
    );
    for frame in &report.discarded_angles {
        warn!("frame {frame} had both front_face_id and angle; angle was discarded");
    }
}

fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("unable to create temporary file in {}", dir.display()))?;
    tmp.write_all(contents)
        .with_context(|| format!("unable to write {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("unable to write {}", path.display()))?;
    Ok(())
}
