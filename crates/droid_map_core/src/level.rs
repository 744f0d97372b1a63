//! Level: the tile grid and its obstacle, waypoint, label and text tables

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::label::{LabelChange, TextEdit, TextSlotChange, TextTable};
use crate::obstacle::ObstacleSlot;
use crate::waypoint::{reinsert_and_renumber, remove_and_renumber};
use crate::{
    ConnectionChange, EditError, FloorType, LevelLimits, MapLabel, MapPos, Obstacle,
    ObstacleHandle, ObstacleKind, RemovedWaypoint, Tile, TilePos, Waypoint,
};

/// A level: tile grid plus every per-level table the editor mutates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: Uuid,
    pub name: String,
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
    obstacles: Vec<ObstacleSlot>,
    waypoints: Vec<Waypoint>,
    labels: Vec<Option<MapLabel>>,
    obstacle_names: Vec<Option<String>>,
    obstacle_descriptions: Vec<Option<String>>,
    limits: LevelLimits,
}

impl Level {
    /// Create a new level filled with one floor type
    pub fn new(name: String, width: u32, height: u32, floor: FloorType) -> Self {
        Self::with_limits(name, width, height, floor, LevelLimits::default())
    }

    /// Create a new level with custom table capacities
    pub fn with_limits(
        name: String,
        width: u32,
        height: u32,
        floor: FloorType,
        limits: LevelLimits,
    ) -> Self {
        let tile_count = width as usize * height as usize;
        Self {
            id: Uuid::new_v4(),
            name,
            width,
            height,
            tiles: vec![Tile::new(floor); tile_count],
            obstacles: Vec::new(),
            waypoints: Vec::new(),
            labels: vec![None; limits.max_map_labels],
            obstacle_names: vec![None; limits.max_obstacle_names],
            obstacle_descriptions: vec![None; limits.max_obstacle_descriptions],
            limits,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn limits(&self) -> &LevelLimits {
        &self.limits
    }

    // ---- Tiles ----

    pub fn contains_tile(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Whether a map-space point lies on the level, edges included
    pub fn contains_point(&self, pos: MapPos) -> bool {
        pos.x.is_finite()
            && pos.y.is_finite()
            && pos.x >= 0.0
            && pos.y >= 0.0
            && pos.x <= self.width as f32
            && pos.y <= self.height as f32
    }

    /// Clamp a tile position into the level
    pub fn clamp_tile(&self, pos: TilePos) -> TilePos {
        let max_x = (self.width as i32 - 1).max(0);
        let max_y = (self.height as i32 - 1).max(0);
        TilePos::new(pos.x.clamp(0, max_x), pos.y.clamp(0, max_y))
    }

    fn tile_index(&self, pos: TilePos) -> Option<usize> {
        self.contains_tile(pos)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    pub fn tile(&self, pos: TilePos) -> Option<&Tile> {
        self.tile_index(pos).and_then(|index| self.tiles.get(index))
    }

    /// Get the floor type at a tile
    pub fn floor(&self, pos: TilePos) -> Option<FloorType> {
        self.tile(pos).map(|tile| tile.floor)
    }

    /// Set the floor type at a tile, returning the previous one
    pub fn set_floor(&mut self, pos: TilePos, floor: FloorType) -> Result<FloorType, EditError> {
        let tile = self
            .tile_index(pos)
            .and_then(|index| self.tiles.get_mut(index))
            .ok_or(EditError::TileOutOfBounds(pos))?;
        Ok(std::mem::replace(&mut tile.floor, floor))
    }

    // ---- Obstacles ----

    fn check_point(&self, pos: MapPos) -> Result<(), EditError> {
        if self.contains_point(pos) {
            Ok(())
        } else {
            Err(EditError::PositionOutOfBounds { x: pos.x, y: pos.y })
        }
    }

    /// Get a live obstacle by handle
    pub fn obstacle(&self, handle: ObstacleHandle) -> Option<&Obstacle> {
        self.obstacles
            .get(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.obstacle.as_ref())
    }

    fn obstacle_mut(&mut self, handle: ObstacleHandle) -> Option<&mut Obstacle> {
        self.obstacles
            .get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.obstacle.as_mut())
    }

    /// Handle of the obstacle currently living in a slot
    pub fn handle_at_slot(&self, index: usize) -> Option<ObstacleHandle> {
        self.obstacles
            .get(index)
            .filter(|slot| slot.obstacle.is_some())
            .map(|slot| ObstacleHandle {
                index,
                generation: slot.generation,
            })
    }

    /// Iterate over live obstacles in slot order
    pub fn obstacles(&self) -> impl Iterator<Item = (ObstacleHandle, &Obstacle)> {
        self.obstacles.iter().enumerate().filter_map(|(index, slot)| {
            slot.obstacle.as_ref().map(|obstacle| {
                (
                    ObstacleHandle {
                        index,
                        generation: slot.generation,
                    },
                    obstacle,
                )
            })
        })
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles
            .iter()
            .filter(|slot| slot.obstacle.is_some())
            .count()
    }

    /// Place an obstacle in the first free slot
    pub fn create_obstacle(
        &mut self,
        kind: ObstacleKind,
        pos: MapPos,
    ) -> Result<ObstacleHandle, EditError> {
        self.check_point(pos)?;

        let index = match self.obstacles.iter().position(|slot| slot.obstacle.is_none()) {
            Some(index) => index,
            None if self.obstacles.len() < self.limits.max_obstacles => {
                self.obstacles.push(ObstacleSlot::default());
                self.obstacles.len() - 1
            }
            None => {
                warn!(
                    capacity = self.limits.max_obstacles,
                    "Ran out of obstacle slots"
                );
                return Err(EditError::ObstacleTableFull {
                    capacity: self.limits.max_obstacles,
                });
            }
        };

        let slot = &mut self.obstacles[index];
        slot.obstacle = Some(Obstacle::new(kind, pos));
        let handle = ObstacleHandle {
            index,
            generation: slot.generation,
        };

        self.glue_obstacles_to_tiles();
        debug!(kind, x = pos.x, y = pos.y, slot = index, "Created obstacle");
        Ok(handle)
    }

    /// Put an obstacle back into a specific slot with a specific generation
    pub fn restore_obstacle(
        &mut self,
        handle: ObstacleHandle,
        obstacle: Obstacle,
    ) -> Result<(), EditError> {
        if handle.index >= self.limits.max_obstacles {
            return Err(EditError::ObstacleTableFull {
                capacity: self.limits.max_obstacles,
            });
        }
        self.check_point(obstacle.pos)?;

        if handle.index >= self.obstacles.len() {
            self.obstacles
                .resize_with(handle.index + 1, ObstacleSlot::default);
        }
        let slot = &mut self.obstacles[handle.index];
        if slot.obstacle.is_some() {
            return Err(EditError::SlotOccupied(handle.index));
        }
        slot.generation = handle.generation;
        slot.obstacle = Some(obstacle);

        self.glue_obstacles_to_tiles();
        Ok(())
    }

    /// Empty an obstacle's slot, returning the obstacle
    pub fn remove_obstacle(&mut self, handle: ObstacleHandle) -> Result<Obstacle, EditError> {
        let slot = self
            .obstacles
            .get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .ok_or(EditError::StaleObstacle(handle))?;
        let Some(obstacle) = slot.obstacle.take() else {
            return Err(EditError::StaleObstacle(handle));
        };
        slot.generation = handle.generation.wrapping_add(1);

        self.glue_obstacles_to_tiles();
        debug!(slot = handle.index, "Removed obstacle");
        Ok(obstacle)
    }

    /// Move an obstacle, returning its previous position
    pub fn move_obstacle(&mut self, handle: ObstacleHandle, pos: MapPos) -> Result<MapPos, EditError> {
        self.check_point(pos)?;
        let obstacle = self
            .obstacle_mut(handle)
            .ok_or(EditError::StaleObstacle(handle))?;
        let previous = std::mem::replace(&mut obstacle.pos, pos);

        self.glue_obstacles_to_tiles();
        Ok(previous)
    }

    /// Rebuild every tile's glued obstacle list
    ///
    /// Each obstacle is glued to the tile nearest to its position, clamped to
    /// the map. A tile whose list is full drops further obstacles.
    pub fn glue_obstacles_to_tiles(&mut self) {
        for tile in &mut self.tiles {
            tile.glued.clear();
        }
        if self.width == 0 || self.height == 0 {
            return;
        }

        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;
        let width = self.width as usize;

        for (index, slot) in self.obstacles.iter().enumerate() {
            let Some(obstacle) = &slot.obstacle else {
                continue;
            };
            let x = (obstacle.pos.x - 0.5).round_ties_even().clamp(0.0, max_x) as usize;
            let y = (obstacle.pos.y - 0.5).round_ties_even().clamp(0.0, max_y) as usize;
            let Some(tile) = self.tiles.get_mut(y * width + x) else {
                continue;
            };
            if tile.glued.len() >= self.limits.max_glued_per_tile {
                warn!(x, y, slot = index, "Tile glue list is full, obstacle not glued");
                continue;
            }
            tile.glued.push(index);
        }
    }

    /// Obstacles glued to a tile
    pub fn obstacles_glued_at(&self, pos: TilePos) -> Vec<ObstacleHandle> {
        self.tile(pos)
            .map(|tile| {
                tile.glued
                    .iter()
                    .filter_map(|&index| self.handle_at_slot(index))
                    .collect()
            })
            .unwrap_or_default()
    }

    // ---- Obstacle names and descriptions ----

    fn text_table(&self, table: TextTable) -> &[Option<String>] {
        match table {
            TextTable::Names => &self.obstacle_names,
            TextTable::Descriptions => &self.obstacle_descriptions,
        }
    }

    fn text_table_mut(&mut self, table: TextTable) -> &mut Vec<Option<String>> {
        match table {
            TextTable::Names => &mut self.obstacle_names,
            TextTable::Descriptions => &mut self.obstacle_descriptions,
        }
    }

    fn text_index(obstacle: &Obstacle, table: TextTable) -> Option<usize> {
        match table {
            TextTable::Names => obstacle.name_index,
            TextTable::Descriptions => obstacle.description_index,
        }
    }

    /// Contents of a text table slot
    pub fn text_slot(&self, table: TextTable, slot: usize) -> Option<&str> {
        self.text_table(table).get(slot)?.as_deref()
    }

    /// An obstacle's name or description
    pub fn obstacle_text(&self, table: TextTable, handle: ObstacleHandle) -> Option<&str> {
        let index = Self::text_index(self.obstacle(handle)?, table)?;
        self.text_slot(table, index)
    }

    /// Whether an obstacle other than `except` uses a text table slot
    fn text_slot_shared(&self, table: TextTable, slot: usize, except: ObstacleHandle) -> bool {
        self.obstacles().any(|(handle, obstacle)| {
            handle != except && Self::text_index(obstacle, table) == Some(slot)
        })
    }

    /// Work out what setting an obstacle's text would change, without
    /// changing anything
    ///
    /// `None` or an empty string clears the obstacle's text. A name already
    /// stored in another slot is shared instead of duplicated. A slot shared
    /// with another obstacle is never rewritten: clearing detaches from it
    /// and renaming moves to a free slot.
    pub fn plan_obstacle_text(
        &self,
        table: TextTable,
        handle: ObstacleHandle,
        text: Option<&str>,
    ) -> Result<TextEdit, EditError> {
        let obstacle = self
            .obstacle(handle)
            .ok_or(EditError::StaleObstacle(handle))?;
        let entries = self.text_table(table);
        let index_before = Self::text_index(obstacle, table);

        // The obstacle's own slot, when no other obstacle refers to it
        let owned = index_before
            .filter(|&slot| slot < entries.len())
            .filter(|&slot| !self.text_slot_shared(table, slot, handle));
        let release = owned.map(|slot| TextSlotChange {
            slot,
            before: entries.get(slot).cloned().flatten(),
            after: None,
        });

        let Some(text) = text.filter(|text| !text.is_empty()) else {
            return Ok(TextEdit {
                table,
                handle,
                index_before,
                index_after: None,
                slots: release.into_iter().collect(),
            });
        };

        if table == TextTable::Names {
            let existing = entries
                .iter()
                .position(|entry| entry.as_deref() == Some(text));
            if let Some(existing) = existing {
                if index_before == Some(existing) {
                    return Ok(TextEdit {
                        table,
                        handle,
                        index_before,
                        index_after: index_before,
                        slots: Vec::new(),
                    });
                }
                warn!(
                    obstacle_name = text,
                    slot = existing,
                    "Obstacle name already in use, sharing the existing entry"
                );
                return Ok(TextEdit {
                    table,
                    handle,
                    index_before,
                    index_after: Some(existing),
                    slots: release.into_iter().collect(),
                });
            }
        }

        let slot = match owned {
            Some(slot) => slot,
            None => entries
                .iter()
                .position(Option::is_none)
                .ok_or(EditError::NameTableFull {
                    table: table.display_name(),
                })?,
        };
        Ok(TextEdit {
            table,
            handle,
            index_before,
            index_after: Some(slot),
            slots: vec![TextSlotChange {
                slot,
                before: entries.get(slot).cloned().flatten(),
                after: Some(text.to_string()),
            }],
        })
    }

    /// Apply a text edit forward (`after` state) or backward (`before` state)
    pub fn apply_text_edit(&mut self, edit: &TextEdit, forward: bool) -> Result<(), EditError> {
        if self.obstacle(edit.handle).is_none() {
            return Err(EditError::StaleObstacle(edit.handle));
        }
        let capacity = self.text_table(edit.table).len();
        if let Some(change) = edit.slots.iter().find(|change| change.slot >= capacity) {
            return Err(EditError::Mismatch(format!(
                "{} slot {} is outside the table",
                edit.table.display_name(),
                change.slot
            )));
        }

        let entries = self.text_table_mut(edit.table);
        let mut write = |change: &TextSlotChange| {
            if let Some(entry) = entries.get_mut(change.slot) {
                *entry = if forward {
                    change.after.clone()
                } else {
                    change.before.clone()
                };
            }
        };
        if forward {
            edit.slots.iter().for_each(&mut write);
        } else {
            edit.slots.iter().rev().for_each(&mut write);
        }

        let index = if forward {
            edit.index_after
        } else {
            edit.index_before
        };
        if let Some(obstacle) = self.obstacle_mut(edit.handle) {
            match edit.table {
                TextTable::Names => obstacle.name_index = index,
                TextTable::Descriptions => obstacle.description_index = index,
            }
        }
        Ok(())
    }

    // ---- Map labels ----

    pub fn label(&self, id: usize) -> Option<&MapLabel> {
        self.labels.get(id)?.as_ref()
    }

    /// Iterate over used label slots
    pub fn labels(&self) -> impl Iterator<Item = (usize, &MapLabel)> {
        self.labels
            .iter()
            .enumerate()
            .filter_map(|(id, label)| label.as_ref().map(|label| (id, label)))
    }

    /// Slot of the label placed on a tile
    pub fn label_at(&self, pos: TilePos) -> Option<usize> {
        self.labels().find(|(_, label)| label.pos == pos).map(|(id, _)| id)
    }

    pub fn free_label_slot(&self) -> Option<usize> {
        self.labels.iter().position(Option::is_none)
    }

    pub fn label_capacity(&self) -> usize {
        self.labels.len()
    }

    /// Work out what setting a map label would change
    ///
    /// A name already used by another slot redirects the edit to that slot.
    /// `None` or an empty name clears the slot.
    pub fn plan_map_label(
        &self,
        id: usize,
        name: Option<&str>,
        pos: TilePos,
    ) -> Result<LabelChange, EditError> {
        if id >= self.labels.len() {
            return Err(EditError::LabelOutOfRange(id));
        }

        let name = name.filter(|name| !name.is_empty());
        let mut target = id;
        let after = match name {
            Some(name) => {
                if !self.contains_tile(pos) {
                    return Err(EditError::TileOutOfBounds(pos));
                }
                if let Some((existing, _)) = self.labels().find(|(_, label)| label.name == name) {
                    if existing != id {
                        warn!(label = name, slot = existing, "Map label name already exists, overwriting it");
                    }
                    target = existing;
                }
                Some(MapLabel::new(name, pos))
            }
            None => None,
        };

        Ok(LabelChange {
            id: target,
            before: self.labels.get(target).cloned().flatten(),
            after,
        })
    }

    /// Apply a label change forward or backward
    pub fn apply_label_change(&mut self, change: &LabelChange, forward: bool) -> Result<(), EditError> {
        let slot = self
            .labels
            .get_mut(change.id)
            .ok_or(EditError::LabelOutOfRange(change.id))?;
        *slot = if forward {
            change.after.clone()
        } else {
            change.before.clone()
        };
        Ok(())
    }

    // ---- Waypoints ----

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn waypoint(&self, index: usize) -> Option<&Waypoint> {
        self.waypoints.get(index)
    }

    /// Index of the waypoint on a tile
    pub fn waypoint_at(&self, pos: TilePos) -> Option<usize> {
        self.waypoints.iter().position(|waypoint| waypoint.pos == pos)
    }

    /// Append a waypoint, returning its index
    pub fn create_waypoint(&mut self, pos: TilePos) -> Result<usize, EditError> {
        if !self.contains_tile(pos) {
            return Err(EditError::TileOutOfBounds(pos));
        }
        if self.waypoints.len() >= self.limits.max_waypoints {
            warn!(
                capacity = self.limits.max_waypoints,
                "Maximal number of waypoints reached"
            );
            return Err(EditError::WaypointTableFull {
                capacity: self.limits.max_waypoints,
            });
        }
        self.waypoints.push(Waypoint::new(pos));
        Ok(self.waypoints.len() - 1)
    }

    /// Remove a waypoint and every reference to it, shifting higher indices
    /// down by one
    pub fn remove_waypoint(&mut self, index: usize) -> Result<RemovedWaypoint, EditError> {
        if index >= self.waypoints.len() {
            return Err(EditError::WaypointOutOfRange(index));
        }
        Ok(remove_and_renumber(&mut self.waypoints, index))
    }

    /// Undo a [`Level::remove_waypoint`]
    pub fn restore_waypoint(&mut self, removed: &RemovedWaypoint) -> Result<(), EditError> {
        if removed.index > self.waypoints.len() {
            return Err(EditError::WaypointOutOfRange(removed.index));
        }
        if self.waypoints.len() >= self.limits.max_waypoints {
            return Err(EditError::WaypointTableFull {
                capacity: self.limits.max_waypoints,
            });
        }
        reinsert_and_renumber(&mut self.waypoints, removed);
        Ok(())
    }

    /// Flip a waypoint's random spawn suppression, returning the new value
    pub fn toggle_waypoint_spawn(&mut self, index: usize) -> Result<bool, EditError> {
        let waypoint = self
            .waypoints
            .get_mut(index)
            .ok_or(EditError::WaypointOutOfRange(index))?;
        waypoint.suppress_random_spawn = !waypoint.suppress_random_spawn;
        Ok(waypoint.suppress_random_spawn)
    }

    /// Add the edge between two waypoints if neither side has it, remove it
    /// from both sides otherwise
    pub fn toggle_connection(
        &mut self,
        origin: usize,
        target: usize,
    ) -> Result<ConnectionChange, EditError> {
        let count = self.waypoints.len();
        if origin >= count {
            return Err(EditError::WaypointOutOfRange(origin));
        }
        if target >= count {
            return Err(EditError::WaypointOutOfRange(target));
        }
        if origin == target {
            return Err(EditError::SelfConnection);
        }

        let origin_slot = self.waypoints[origin]
            .connections
            .iter()
            .position(|&c| c == target);
        let target_slot = self.waypoints[target]
            .connections
            .iter()
            .position(|&c| c == origin);

        let change = if origin_slot.is_some() || target_slot.is_some() {
            ConnectionChange {
                origin,
                target,
                added: false,
                origin_slot,
                target_slot,
            }
        } else {
            let capacity = self.limits.max_connections;
            for id in [origin, target] {
                if self.waypoints[id].connections.len() >= capacity {
                    warn!(id, capacity, "Waypoint connection list is full");
                    return Err(EditError::ConnectionLimit { id, capacity });
                }
            }
            ConnectionChange {
                origin,
                target,
                added: true,
                origin_slot: Some(self.waypoints[origin].connections.len()),
                target_slot: Some(self.waypoints[target].connections.len()),
            }
        };

        self.apply_connection_change(&change, true)?;
        Ok(change)
    }

    /// Replay a connection toggle forward, or revert it
    pub fn apply_connection_change(
        &mut self,
        change: &ConnectionChange,
        forward: bool,
    ) -> Result<(), EditError> {
        let insert = change.added == forward;
        let sides = [
            (change.origin, change.target, change.origin_slot),
            (change.target, change.origin, change.target_slot),
        ];

        // Validate both sides before touching either list.
        for (id, other, slot) in sides {
            let waypoint = self
                .waypoints
                .get(id)
                .ok_or(EditError::WaypointOutOfRange(id))?;
            let Some(slot) = slot else {
                continue;
            };
            let valid = if insert {
                slot <= waypoint.connections.len()
            } else {
                waypoint.connections.get(slot) == Some(&other)
            };
            if !valid {
                return Err(EditError::Mismatch(format!(
                    "connection slot {slot} of waypoint {id} does not hold {other}"
                )));
            }
        }

        for (id, other, slot) in sides {
            let (Some(slot), Some(waypoint)) = (slot, self.waypoints.get_mut(id)) else {
                continue;
            };
            if insert {
                waypoint.connections.insert(slot, other);
            } else {
                waypoint.connections.remove(slot);
            }
        }
        Ok(())
    }
}
