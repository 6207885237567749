use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::warn;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::face::{Face, UnknownFace};

#[derive(Debug, Error)]
pub enum TilesetError {
    #[error("invalid tileset JSON")]
    Json(#[from] serde_json::Error),
    #[error("frame record {index} is malformed")]
    Frame {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("frame record {index} has an invalid face")]
    Face {
        index: usize,
        #[source]
        source: UnknownFace,
    },
    #[error("frame record {index} has faces but no default_face")]
    MissingDefaultFace { index: usize },
    #[error("frame record {index}: default face {face} is not in its faces")]
    DefaultFaceNotMapped { index: usize, face: Face },
    #[error("frame record {index}: multiple sprite is missing `{field}`")]
    MissingGeometry { index: usize, field: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpriteType {
    Single,
    Multiple,
}

/// Faces of one frame together with the face drawn by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceSet {
    pub default_face: Face,
    faces: BTreeMap<Face, u32>,
}

impl Default for FaceSet {
    fn default() -> Self {
        Self {
            default_face: Face::Top,
            faces: BTreeMap::new(),
        }
    }
}

impl FaceSet {
    /// Frame index drawn for `face`, if the frame defines it.
    pub fn get(&self, face: Face) -> Option<u32> {
        self.faces.get(&face).copied()
    }

    /// Frame index drawn for the default face.
    pub fn default_frame(&self) -> Option<u32> {
        self.get(self.default_face)
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

/// Repeating pattern used by multi-cell tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilePattern {
    pub cells: Vec<u32>,
    pub width: u32,
    pub height: u32,
}

/// Footprint of a sprite that spans more than one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiCell {
    pub width: u32,
    pub height: u32,
    pub anchor_x: i32,
    pub anchor_y: i32,
    pub pattern: Option<TilePattern>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameData {
    pub game_id: u32,
    pub frame_type: String,
    pub sprite_type: SpriteType,
    pub multi_cell: Option<MultiCell>,
    pub faces: FaceSet,
}

/// Face-based tileset as consumed by the game's spritesheet loader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tileset {
    pub tile_size: Option<(u32, u32)>,
    frames: BTreeMap<(u32, String), FrameData>,
}

#[derive(Debug, Deserialize)]
struct RawTileset {
    #[serde(default)]
    frames: Option<Vec<Value>>,
    tile_width: Option<u32>,
    tile_height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    game_id: u32,
    #[serde(rename = "type")]
    frame_type: String,
    sprite_type: SpriteType,
    width: Option<u32>,
    height: Option<u32>,
    anchor_x: Option<i32>,
    anchor_y: Option<i32>,
    pattern: Option<Vec<u32>>,
    pattern_width: Option<u32>,
    pattern_height: Option<u32>,
    #[serde(flatten)]
    faces: RawFaces,
}

#[derive(Debug, Deserialize)]
struct RawFaces {
    frame: Option<u32>,
    faces: Option<BTreeMap<String, u32>>,
    default_face: Option<String>,
}

impl Tileset {
    pub fn from_file(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("unable to read {}", path.display()))?;
        Self::from_str(&source).with_context(|| format!("failed to load {}", path.display()))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(source: &str) -> Result<Self, TilesetError> {
        let document: Value = serde_json::from_str(source)?;
        Self::from_value(&document)
    }

    pub fn from_value(document: &Value) -> Result<Self, TilesetError> {
        let raw = RawTileset::deserialize(document)?;
        let mut tileset = Tileset {
            tile_size: raw.tile_width.zip(raw.tile_height),
            frames: BTreeMap::new(),
        };

        let Some(frames) = raw.frames else {
            warn!("tileset data has no frames");
            return Ok(tileset);
        };

        for (index, value) in frames.iter().enumerate() {
            let frame = RawFrame::deserialize(value)
                .map_err(|source| TilesetError::Frame { index, source })?;
            let data = frame_data(index, frame)?;
            let key = (data.game_id, data.frame_type.clone());
            if tileset.frames.insert(key, data).is_some() {
                warn!("frame record {index} replaces an earlier frame with the same id and type");
            }
        }

        Ok(tileset)
    }

    /// Looks a frame up by game id and frame type (`"tile"`, `"item"`, ...).
    pub fn frame(&self, game_id: u32, frame_type: &str) -> Option<&FrameData> {
        self.frames.get(&(game_id, frame_type.to_string()))
    }

    pub fn frames(&self) -> impl Iterator<Item = &FrameData> {
        self.frames.values()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

fn frame_data(index: usize, frame: RawFrame) -> Result<FrameData, TilesetError> {
    let multi_cell = match frame.sprite_type {
        SpriteType::Single => None,
        SpriteType::Multiple => {
            let pattern = if frame.frame_type == "tile" {
                Some(TilePattern {
                    cells: require(index, "pattern", frame.pattern)?,
                    width: require(index, "pattern_width", frame.pattern_width)?,
                    height: require(index, "pattern_height", frame.pattern_height)?,
                })
            } else {
                None
            };
            Some(MultiCell {
                width: require(index, "width", frame.width)?,
                height: require(index, "height", frame.height)?,
                anchor_x: require(index, "anchor_x", frame.anchor_x)?,
                anchor_y: require(index, "anchor_y", frame.anchor_y)?,
                pattern,
            })
        }
    };

    Ok(FrameData {
        game_id: frame.game_id,
        frame_type: frame.frame_type,
        sprite_type: frame.sprite_type,
        multi_cell,
        faces: face_set(index, frame.faces)?,
    })
}

fn require<T>(index: usize, field: &'static str, value: Option<T>) -> Result<T, TilesetError> {
    value.ok_or(TilesetError::MissingGeometry { index, field })
}

fn face_set(index: usize, raw: RawFaces) -> Result<FaceSet, TilesetError> {
    // A bare `frame` is the pre-migration shape: a single top face.
    if let Some(frame) = raw.frame {
        let mut set = FaceSet::default();
        set.faces.insert(Face::Top, frame);
        return Ok(set);
    }

    let Some(raw_faces) = raw.faces else {
        return Ok(FaceSet::default());
    };
    let default_face = raw
        .default_face
        .ok_or(TilesetError::MissingDefaultFace { index })?
        .parse::<Face>()
        .map_err(|source| TilesetError::Face { index, source })?;

    let mut faces = BTreeMap::new();
    for (name, frame) in raw_faces {
        let face = name
            .parse::<Face>()
            .map_err(|source| TilesetError::Face { index, source })?;
        faces.insert(face, frame);
    }

    if !faces.contains_key(&default_face) {
        return Err(TilesetError::DefaultFaceNotMapped {
            index,
            face: default_face,
        });
    }

    Ok(FaceSet {
        default_face,
        faces,
    })
}
