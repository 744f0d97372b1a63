//! Action records and how they replay against a level
//!
//! Every record owns exactly what it needs to be applied forward (redo) and
//! backward (undo). Records refer to obstacles by handle and to waypoints by
//! index, never by reference.

use droid_map_core::{
    ConnectionChange, EditError, FloorType, LabelChange, Level, MapPos, Obstacle,
    ObstacleHandle, RemovedWaypoint, TextEdit, TilePos,
};

/// What a waypoint toggle did
#[derive(Debug, Clone, PartialEq)]
pub enum WaypointToggle {
    /// A waypoint was appended at `index`
    Created { index: usize, pos: TilePos },
    /// A waypoint was removed along with every edge touching it
    Removed(RemovedWaypoint),
    /// The random spawn suppression flag was flipped
    SpawnFlipped { index: usize },
    /// Random spawn toggle on a tile without a waypoint
    Unchanged { pos: TilePos },
}

/// One undoable editor action
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    CreateObstacle {
        handle: ObstacleHandle,
        obstacle: Obstacle,
    },
    RemoveObstacle {
        handle: ObstacleHandle,
        obstacle: Obstacle,
    },
    MoveObstacle {
        handle: ObstacleHandle,
        from: MapPos,
        to: MapPos,
    },
    ToggleWaypoint(WaypointToggle),
    ToggleWaypointConnection(ConnectionChange),
    SetFloor {
        pos: TilePos,
        before: FloorType,
        after: FloorType,
    },
    /// The preceding `n` entries form one undo step
    Group(usize),
    SetObstacleLabel(TextEdit),
    SetObstacleDescription(TextEdit),
    SetMapLabel(LabelChange),
}

impl Action {
    /// Human-readable description for UI display
    pub fn description(&self) -> &'static str {
        match self {
            Action::CreateObstacle { .. } => "Place Obstacle",
            Action::RemoveObstacle { .. } => "Remove Obstacle",
            Action::MoveObstacle { .. } => "Move Obstacle",
            Action::ToggleWaypoint(_) => "Toggle Waypoint",
            Action::ToggleWaypointConnection(_) => "Toggle Waypoint Connection",
            Action::SetFloor { .. } => "Set Floor",
            Action::Group(_) => "Multiple Actions",
            Action::SetObstacleLabel(_) => "Set Obstacle Label",
            Action::SetObstacleDescription(_) => "Set Obstacle Description",
            Action::SetMapLabel(_) => "Set Map Label",
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Action::Group(_))
    }

    /// Replay the action (redo)
    pub(crate) fn apply_forward(&self, level: &mut Level) -> Result<(), EditError> {
        match self {
            Action::CreateObstacle { handle, obstacle } => {
                level.restore_obstacle(*handle, obstacle.clone())
            }
            Action::RemoveObstacle { handle, .. } => level.remove_obstacle(*handle).map(drop),
            Action::MoveObstacle { handle, to, .. } => level.move_obstacle(*handle, *to).map(drop),
            Action::ToggleWaypoint(toggle) => match toggle {
                WaypointToggle::Created { index, pos } => {
                    let created = level.create_waypoint(*pos)?;
                    if created != *index {
                        return Err(EditError::Mismatch(format!(
                            "waypoint recreated at {created}, expected {index}"
                        )));
                    }
                    Ok(())
                }
                WaypointToggle::Removed(removed) => level.remove_waypoint(removed.index).map(drop),
                WaypointToggle::SpawnFlipped { index } => {
                    level.toggle_waypoint_spawn(*index).map(drop)
                }
                WaypointToggle::Unchanged { .. } => Ok(()),
            },
            Action::ToggleWaypointConnection(change) => level.apply_connection_change(change, true),
            Action::SetFloor { pos, after, .. } => level.set_floor(*pos, *after).map(drop),
            Action::Group(_) => Ok(()),
            Action::SetObstacleLabel(edit) | Action::SetObstacleDescription(edit) => {
                level.apply_text_edit(edit, true)
            }
            Action::SetMapLabel(change) => level.apply_label_change(change, true),
        }
    }

    /// Revert the action (undo)
    pub(crate) fn apply_inverse(&self, level: &mut Level) -> Result<(), EditError> {
        match self {
            Action::CreateObstacle { handle, .. } => level.remove_obstacle(*handle).map(drop),
            Action::RemoveObstacle { handle, obstacle } => {
                level.restore_obstacle(*handle, obstacle.clone())
            }
            Action::MoveObstacle { handle, from, .. } => {
                level.move_obstacle(*handle, *from).map(drop)
            }
            Action::ToggleWaypoint(toggle) => match toggle {
                WaypointToggle::Created { index, .. } => {
                    let removed = level.remove_waypoint(*index)?;
                    if !removed.incoming.is_empty() || !removed.waypoint.connections.is_empty() {
                        // Put it back rather than lose edges nobody recorded.
                        level.restore_waypoint(&removed)?;
                        return Err(EditError::Mismatch(format!(
                            "waypoint {index} gained connections after it was created"
                        )));
                    }
                    Ok(())
                }
                WaypointToggle::Removed(removed) => level.restore_waypoint(removed),
                WaypointToggle::SpawnFlipped { index } => {
                    level.toggle_waypoint_spawn(*index).map(drop)
                }
                WaypointToggle::Unchanged { .. } => Ok(()),
            },
            Action::ToggleWaypointConnection(change) => {
                level.apply_connection_change(change, false)
            }
            Action::SetFloor { pos, before, .. } => level.set_floor(*pos, *before).map(drop),
            Action::Group(_) => Ok(()),
            Action::SetObstacleLabel(edit) | Action::SetObstacleDescription(edit) => {
                level.apply_text_edit(edit, false)
            }
            Action::SetMapLabel(change) => level.apply_label_change(change, false),
        }
    }
}
