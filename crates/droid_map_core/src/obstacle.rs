//! Obstacles, their slot table handles, and the obstacle type catalog

use serde::{Deserialize, Serialize};

use crate::MapPos;

/// Obstacle type index into the [`ObstacleCatalog`]
pub type ObstacleKind = u32;

/// An obstacle placed on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub pos: MapPos,
    /// Index into the level's obstacle name table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_index: Option<usize>,
    /// Index into the level's obstacle description table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_index: Option<usize>,
}

impl Obstacle {
    pub fn new(kind: ObstacleKind, pos: MapPos) -> Self {
        Self {
            kind,
            pos,
            name_index: None,
            description_index: None,
        }
    }
}

/// Stable reference to an obstacle slot
///
/// The generation changes every time the slot is freed, so a handle kept
/// after its obstacle was removed never resolves to a later occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObstacleHandle {
    pub index: usize,
    pub generation: u32,
}

/// One entry of the obstacle slot table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub(crate) struct ObstacleSlot {
    pub(crate) obstacle: Option<Obstacle>,
    pub(crate) generation: u32,
}

/// Which axis a wall piece runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallOrientation {
    /// Runs along x, drawn east/west
    Horizontal,
    /// Runs along y, drawn north/south
    Vertical,
}

/// Metadata for one obstacle type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSpec {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<WallOrientation>,
}

impl ObstacleSpec {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            orientation: None,
        }
    }

    pub fn wall(label: impl Into<String>, orientation: WallOrientation) -> Self {
        Self {
            label: label.into(),
            orientation: Some(orientation),
        }
    }
}

/// Table of known obstacle types, indexed by [`ObstacleKind`]
///
/// An empty catalog accepts every type; level generators that do not care
/// about metadata can leave it empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObstacleCatalog {
    specs: Vec<ObstacleSpec>,
}

impl ObstacleCatalog {
    pub fn new(specs: Vec<ObstacleSpec>) -> Self {
        Self { specs }
    }

    /// Register a type, returning its kind
    pub fn register(&mut self, spec: ObstacleSpec) -> ObstacleKind {
        self.specs.push(spec);
        (self.specs.len() - 1) as ObstacleKind
    }

    pub fn get(&self, kind: ObstacleKind) -> Option<&ObstacleSpec> {
        self.specs.get(kind as usize)
    }

    pub fn contains(&self, kind: ObstacleKind) -> bool {
        self.specs.is_empty() || (kind as usize) < self.specs.len()
    }

    /// Wall orientation of a type, `None` for free-standing obstacles
    pub fn orientation(&self, kind: ObstacleKind) -> Option<WallOrientation> {
        self.get(kind).and_then(|spec| spec.orientation)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Offset inside a tile for keypad-aligned placement
///
/// Positions follow the numeric keypad: 1 is the bottom-left corner, 5 the
/// tile center and 9 the top-right corner. Returns `None` outside `1..=9`.
pub fn aligned_offset(position: u8) -> Option<(f32, f32)> {
    const OFFSET_X: [f32; 9] = [0.0, 0.5, 1.0, 0.0, 0.5, 1.0, 0.0, 0.5, 1.0];
    const OFFSET_Y: [f32; 9] = [1.0, 1.0, 1.0, 0.5, 0.5, 0.5, 0.0, 0.0, 0.0];

    let slot = (position as usize).checked_sub(1)?;
    Some((*OFFSET_X.get(slot)?, *OFFSET_Y.get(slot)?))
}
