//! Errors reported by map mutators

use thiserror::Error;

use crate::{ObstacleHandle, TilePos};

/// Why a map mutation was refused
///
/// Every variant is reported before anything is written, so a failed call
/// leaves the level untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("tile {0} is outside the level")]
    TileOutOfBounds(TilePos),
    #[error("position ({x}, {y}) is outside the level")]
    PositionOutOfBounds { x: f32, y: f32 },
    #[error("ran out of obstacle slots ({capacity} in use)")]
    ObstacleTableFull { capacity: usize },
    #[error("obstacle type {0} is not in the catalog")]
    UnknownObstacleType(u32),
    #[error("no live obstacle for handle {0:?}")]
    StaleObstacle(ObstacleHandle),
    #[error("alignment {0} is not a keypad position (1-9)")]
    InvalidAlignment(u8),
    #[error("obstacle slot {0} is already occupied")]
    SlotOccupied(usize),
    #[error("maximal number of waypoints ({capacity}) reached")]
    WaypointTableFull { capacity: usize },
    #[error("waypoint {0} does not exist")]
    WaypointOutOfRange(usize),
    #[error("waypoint {id} already has the maximal number of connections ({capacity})")]
    ConnectionLimit { id: usize, capacity: usize },
    #[error("a waypoint cannot be connected to itself")]
    SelfConnection,
    #[error("ran out of obstacle {table} slots")]
    NameTableFull { table: &'static str },
    #[error("map label {0} does not exist")]
    LabelOutOfRange(usize),
    #[error("level state does not match the recorded action: {0}")]
    Mismatch(String),
}
