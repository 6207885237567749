use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Named orientation of a frame. Each face maps to the frame whose image
/// data is drawn when the tile is seen from that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Face {
    Top,
    Front,
    Back,
    Bottom,
    Left,
    Right,
    CenterHorizontal,
    CenterVertical,
}

impl Face {
    pub const ALL: [Face; 8] = [
        Face::Top,
        Face::Front,
        Face::Back,
        Face::Bottom,
        Face::Left,
        Face::Right,
        Face::CenterHorizontal,
        Face::CenterVertical,
    ];

    /// Returns the key used for this face in tileset JSON.
    pub const fn as_str(self) -> &'static str {
        match self {
            Face::Top => "top",
            Face::Front => "front",
            Face::Back => "back",
            Face::Bottom => "bottom",
            Face::Left => "left",
            Face::Right => "right",
            Face::CenterHorizontal => "center_horizontal",
            Face::CenterVertical => "center_vertical",
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown face name: {0:?}")]
pub struct UnknownFace(pub String);

impl FromStr for Face {
    type Err = UnknownFace;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Face::ALL
            .into_iter()
            .find(|face| face.as_str() == value)
            .ok_or_else(|| UnknownFace(value.to_string()))
    }
}
