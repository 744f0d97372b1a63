//! Map tiles

use serde::{Deserialize, Serialize};

/// Floor tile type
pub type FloorType = u16;

/// One cell of the level grid
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tile {
    pub floor: FloorType,
    /// Obstacle slot indices anchored to this tile (rebuilt by the glue pass)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub glued: Vec<usize>,
}

impl Tile {
    pub fn new(floor: FloorType) -> Self {
        Self {
            floor,
            glued: Vec::new(),
        }
    }
}
