//! Map coordinates and compass directions
//!
//! Map space is measured in tiles. North is towards negative y, east is
//! towards positive x.

use serde::{Deserialize, Serialize};

/// A point in map space, in tile units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MapPos {
    pub x: f32,
    pub y: f32,
}

impl MapPos {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The tile containing this point
    pub fn tile(&self) -> TilePos {
        TilePos::new(self.x.floor() as i32, self.y.floor() as i32)
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: MapPos) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Move one tile in `direction`
    pub fn step(&self, direction: Direction) -> MapPos {
        let (dx, dy) = direction.delta();
        MapPos::new(self.x + dx as f32, self.y + dy as f32)
    }
}

/// Integer tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Center of the tile in map space
    pub fn center(&self) -> MapPos {
        MapPos::new(self.x as f32 + 0.5, self.y as f32 + 0.5)
    }

    /// Top-left corner of the tile in map space
    pub fn origin(&self) -> MapPos {
        MapPos::new(self.x as f32, self.y as f32)
    }
}

impl std::fmt::Display for TilePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Compass direction on the map grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Get display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            Direction::North => "North",
            Direction::South => "South",
            Direction::East => "East",
            Direction::West => "West",
        }
    }

    /// Get the opposite direction
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Whether this direction runs along the x axis
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Direction::East | Direction::West)
    }

    /// Tile offset of one step in this direction
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    /// Returns all direction variants
    pub fn all() -> &'static [Direction] {
        &[
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ]
    }
}
