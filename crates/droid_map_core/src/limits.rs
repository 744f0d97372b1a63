//! Table capacities for a level

use serde::{Deserialize, Serialize};

/// Capacity of each per-level table
///
/// Mutators refuse to grow a table past these limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelLimits {
    /// Obstacle slots per level
    pub max_obstacles: usize,
    /// Waypoints per level
    pub max_waypoints: usize,
    /// Outgoing connections per waypoint
    pub max_connections: usize,
    /// Obstacles glued to a single tile
    pub max_glued_per_tile: usize,
    /// Map label slots per level
    pub max_map_labels: usize,
    /// Obstacle name slots per level
    pub max_obstacle_names: usize,
    /// Obstacle description slots per level
    pub max_obstacle_descriptions: usize,
}

impl Default for LevelLimits {
    fn default() -> Self {
        Self {
            max_obstacles: 4000,
            max_waypoints: 200,
            max_connections: 12,
            max_glued_per_tile: 16,
            max_map_labels: 100,
            max_obstacle_names: 100,
            max_obstacle_descriptions: 100,
        }
    }
}
