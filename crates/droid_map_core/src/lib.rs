//! Core data structures for the isometric level editor
//!
//! This crate provides the map model the editor mutates:
//! - `Level` - A tile grid with its obstacle, waypoint, label and name tables
//! - `Tile` - Floor type plus the obstacles glued to the tile
//! - `Obstacle` / `ObstacleHandle` - Slot-table obstacles with generation-tagged handles
//! - `ObstacleCatalog` - Per-type metadata (wall orientation)
//! - `Waypoint` - Grid waypoints with bidirectional connections
//! - `MapLabel` - Named map positions
//! - `LevelLimits` - Table capacities
//!
//! Every mutator is bounds-checked and reports an [`EditError`] instead of
//! writing outside a table.

mod direction;
mod error;
mod label;
mod level;
mod limits;
mod obstacle;
mod tile;
mod waypoint;

pub use direction::{Direction, MapPos, TilePos};
pub use error::EditError;
pub use label::{LabelChange, MapLabel, TextEdit, TextSlotChange, TextTable};
pub use level::Level;
pub use limits::LevelLimits;
pub use obstacle::{
    aligned_offset, Obstacle, ObstacleCatalog, ObstacleHandle, ObstacleKind, ObstacleSpec,
    WallOrientation,
};
pub use tile::{FloorType, Tile};
pub use waypoint::{ConnectionChange, RemovedWaypoint, Waypoint};
