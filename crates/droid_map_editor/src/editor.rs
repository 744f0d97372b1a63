//! Action dispatcher: the only sanctioned way to mutate a level
//!
//! Every primitive comes in two forms. The raw form validates and mutates.
//! The `_logged` form does the same and records an [`Action`] so the edit
//! can be undone. Interactive tools only use the logged forms plus the
//! retraction helpers that roll back their own provisional records.

use droid_map_core::{
    aligned_offset, Direction, EditError, FloorType, LabelChange, Level, MapPos, Obstacle,
    ObstacleCatalog, ObstacleHandle, ObstacleKind, TextEdit, TextTable, TilePos,
};
use tracing::{debug, warn};

use crate::commands::{Action, ActionLog, WaypointToggle};
use crate::preferences::EditorConfig;

/// Asks the user for a line of text
///
/// Consulted when a label or description call passes `None` as its text.
pub trait TextPrompt: Send + Sync {
    /// Returns `None` when the user cancels
    fn prompt(&mut self, title: &str, current: Option<&str>) -> Option<String>;
}

/// A level together with its action history
pub struct Editor {
    level: Level,
    catalog: ObstacleCatalog,
    log: ActionLog,
    prompt: Option<Box<dyn TextPrompt>>,
}

impl Editor {
    pub fn new(level: Level, catalog: ObstacleCatalog) -> Self {
        Self {
            level,
            catalog,
            log: ActionLog::default(),
            prompt: None,
        }
    }

    /// Create an editor honoring the configured history limit
    pub fn with_config(level: Level, catalog: ObstacleCatalog, config: &EditorConfig) -> Self {
        Self {
            log: ActionLog::new(config.history_limit),
            ..Self::new(level, catalog)
        }
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn catalog(&self) -> &ObstacleCatalog {
        &self.catalog
    }

    pub fn log(&self) -> &ActionLog {
        &self.log
    }

    /// Swap in another level; history is dropped since it no longer applies
    pub fn replace_level(&mut self, level: Level) -> Level {
        self.log.clear();
        std::mem::replace(&mut self.level, level)
    }

    pub fn set_history_limit(&mut self, max_steps: Option<usize>) {
        self.log.set_max_steps(max_steps);
    }

    pub fn set_text_prompt(&mut self, prompt: impl TextPrompt + 'static) {
        self.prompt = Some(Box::new(prompt));
    }

    pub fn clear_text_prompt(&mut self) {
        self.prompt = None;
    }

    // ---- Obstacles ----

    pub fn create_obstacle(
        &mut self,
        pos: MapPos,
        kind: ObstacleKind,
    ) -> Result<ObstacleHandle, EditError> {
        if !self.catalog.contains(kind) {
            warn!(kind, "Refusing to place an obstacle of unknown type");
            return Err(EditError::UnknownObstacleType(kind));
        }
        self.level.create_obstacle(kind, pos)
    }

    pub fn create_obstacle_logged(
        &mut self,
        pos: MapPos,
        kind: ObstacleKind,
    ) -> Result<ObstacleHandle, EditError> {
        let handle = self.create_obstacle(pos, kind)?;
        if let Some(obstacle) = self.level.obstacle(handle).cloned() {
            self.log.push(Action::CreateObstacle { handle, obstacle });
        }
        Ok(handle)
    }

    pub fn remove_obstacle(&mut self, handle: ObstacleHandle) -> Result<Obstacle, EditError> {
        self.level.remove_obstacle(handle)
    }

    pub fn remove_obstacle_logged(
        &mut self,
        handle: ObstacleHandle,
    ) -> Result<Obstacle, EditError> {
        let obstacle = self.level.remove_obstacle(handle)?;
        self.log.push(Action::RemoveObstacle {
            handle,
            obstacle: obstacle.clone(),
        });
        Ok(obstacle)
    }

    /// Move an obstacle, returning its previous position
    pub fn move_obstacle(&mut self, handle: ObstacleHandle, pos: MapPos) -> Result<MapPos, EditError> {
        self.level.move_obstacle(handle, pos)
    }

    pub fn move_obstacle_logged(
        &mut self,
        handle: ObstacleHandle,
        pos: MapPos,
    ) -> Result<MapPos, EditError> {
        let from = self.level.move_obstacle(handle, pos)?;
        self.log.push(Action::MoveObstacle {
            handle,
            from,
            to: pos,
        });
        Ok(from)
    }

    /// Place an obstacle at one of the nine keypad positions of a tile
    pub fn place_aligned_obstacle(
        &mut self,
        tile: TilePos,
        position: u8,
        kind: ObstacleKind,
    ) -> Result<ObstacleHandle, EditError> {
        let (dx, dy) = aligned_offset(position).ok_or(EditError::InvalidAlignment(position))?;
        if !self.level.contains_tile(tile) {
            return Err(EditError::TileOutOfBounds(tile));
        }
        let origin = tile.origin();
        self.create_obstacle_logged(MapPos::new(origin.x + dx, origin.y + dy), kind)
    }

    /// Take back an obstacle created by the newest logged action
    ///
    /// The obstacle is removed and its creation record dropped, so the undo
    /// stack looks as if it was never placed.
    pub fn retract_created_obstacle(&mut self, handle: ObstacleHandle) -> Result<(), EditError> {
        match self.log.last() {
            Some(Action::CreateObstacle {
                handle: recorded, ..
            }) if *recorded == handle => {}
            _ => {
                return Err(EditError::Mismatch(format!(
                    "newest action is not the creation of obstacle {handle:?}"
                )))
            }
        }
        self.level.remove_obstacle(handle)?;
        self.log.discard_last();
        Ok(())
    }

    // ---- Waypoints ----

    /// Toggle the waypoint on a tile
    ///
    /// Without `suppress_random_spawn` this adds a waypoint to an empty tile
    /// or removes an existing one along with its connections. With it, the
    /// random spawn flag of an existing waypoint is flipped and empty tiles
    /// are left alone.
    pub fn toggle_waypoint(
        &mut self,
        pos: TilePos,
        suppress_random_spawn: bool,
    ) -> Result<WaypointToggle, EditError> {
        match self.level.waypoint_at(pos) {
            Some(index) if suppress_random_spawn => {
                self.level.toggle_waypoint_spawn(index)?;
                Ok(WaypointToggle::SpawnFlipped { index })
            }
            Some(index) => Ok(WaypointToggle::Removed(self.level.remove_waypoint(index)?)),
            None if suppress_random_spawn => {
                if !self.level.contains_tile(pos) {
                    return Err(EditError::TileOutOfBounds(pos));
                }
                Ok(WaypointToggle::Unchanged { pos })
            }
            None => {
                let index = self.level.create_waypoint(pos)?;
                Ok(WaypointToggle::Created { index, pos })
            }
        }
    }

    pub fn toggle_waypoint_logged(
        &mut self,
        pos: TilePos,
        suppress_random_spawn: bool,
    ) -> Result<WaypointToggle, EditError> {
        let toggle = self.toggle_waypoint(pos, suppress_random_spawn)?;
        self.log.push(Action::ToggleWaypoint(toggle.clone()));
        Ok(toggle)
    }

    /// Index of the waypoint on a tile, creating (and logging) it if needed
    ///
    /// The flag is true when a waypoint was created.
    pub fn ensure_waypoint_logged(&mut self, pos: TilePos) -> Result<(usize, bool), EditError> {
        if let Some(index) = self.level.waypoint_at(pos) {
            return Ok((index, false));
        }
        let index = self.level.create_waypoint(pos)?;
        self.log
            .push(Action::ToggleWaypoint(WaypointToggle::Created { index, pos }));
        Ok((index, true))
    }

    /// Toggle the bidirectional edge between two waypoints
    /// Returns true if the edge now exists
    pub fn toggle_waypoint_connection(
        &mut self,
        origin: usize,
        target: usize,
    ) -> Result<bool, EditError> {
        Ok(self.level.toggle_connection(origin, target)?.added)
    }

    pub fn toggle_waypoint_connection_logged(
        &mut self,
        origin: usize,
        target: usize,
    ) -> Result<bool, EditError> {
        let change = self.level.toggle_connection(origin, target)?;
        self.log.push(Action::ToggleWaypointConnection(change));
        Ok(change.added)
    }

    // ---- Floor ----

    /// Set a tile's floor, returning the previous floor
    pub fn set_floor(&mut self, pos: TilePos, floor: FloorType) -> Result<FloorType, EditError> {
        self.level.set_floor(pos, floor)
    }

    pub fn set_floor_logged(
        &mut self,
        pos: TilePos,
        floor: FloorType,
    ) -> Result<FloorType, EditError> {
        let before = self.level.set_floor(pos, floor)?;
        self.log.push(Action::SetFloor {
            pos,
            before,
            after: floor,
        });
        Ok(before)
    }

    /// Flood fill the 4-connected region around `start` with a new floor
    ///
    /// Every painted tile is logged and the fill is closed by one group, so
    /// it undoes in one step. Returns the number of tiles painted.
    pub fn fill_floor_logged(&mut self, start: TilePos, floor: FloorType) -> Result<usize, EditError> {
        let source = self
            .level
            .floor(start)
            .ok_or(EditError::TileOutOfBounds(start))?;
        if source == floor {
            return Ok(0);
        }

        self.log.begin_gesture();
        let mut painted = 0;
        let mut pending = vec![start];
        while let Some(pos) = pending.pop() {
            if self.level.floor(pos) != Some(source) {
                continue;
            }
            if self.set_floor_logged(pos, floor).is_err() {
                continue;
            }
            painted += 1;
            for direction in Direction::all() {
                let (dx, dy) = direction.delta();
                pending.push(TilePos::new(pos.x + dx, pos.y + dy));
            }
        }
        self.log.push(Action::Group(painted));
        self.log.end_gesture();

        debug!(x = start.x, y = start.y, painted, "Filled floor region");
        Ok(painted)
    }

    // ---- Obstacle names and descriptions ----

    fn ask(&mut self, title: &str, current: Option<String>) -> Option<String> {
        let Some(prompt) = self.prompt.as_mut() else {
            debug!(title, "No text prompt installed, leaving text unchanged");
            return None;
        };
        prompt.prompt(title, current.as_deref())
    }

    fn edit_obstacle_text(
        &mut self,
        table: TextTable,
        handle: ObstacleHandle,
        text: Option<&str>,
    ) -> Result<Option<TextEdit>, EditError> {
        if self.level.obstacle(handle).is_none() {
            return Err(EditError::StaleObstacle(handle));
        }
        let text = match text {
            Some(text) => text.to_string(),
            None => {
                let current = self.level.obstacle_text(table, handle).map(str::to_string);
                let title = match table {
                    TextTable::Names => "Please enter name for this obstacle",
                    TextTable::Descriptions => "Please enter description text for this obstacle",
                };
                match self.ask(title, current) {
                    Some(text) => text,
                    None => return Ok(None),
                }
            }
        };

        let edit = self.level.plan_obstacle_text(table, handle, Some(&text))?;
        if edit.is_noop() {
            debug!(table = table.display_name(), "Obstacle text unchanged");
            return Ok(None);
        }
        self.level.apply_text_edit(&edit, true)?;
        Ok(Some(edit))
    }

    /// Set or clear (empty text) an obstacle's name label
    ///
    /// `None` asks the installed [`TextPrompt`]. Returns false when nothing
    /// was applied: the prompt was cancelled or missing, or the text did
    /// not change.
    pub fn set_obstacle_label(
        &mut self,
        handle: ObstacleHandle,
        name: Option<&str>,
    ) -> Result<bool, EditError> {
        Ok(self
            .edit_obstacle_text(TextTable::Names, handle, name)?
            .is_some())
    }

    pub fn set_obstacle_label_logged(
        &mut self,
        handle: ObstacleHandle,
        name: Option<&str>,
    ) -> Result<bool, EditError> {
        let Some(edit) = self.edit_obstacle_text(TextTable::Names, handle, name)? else {
            return Ok(false);
        };
        self.log.push(Action::SetObstacleLabel(edit));
        Ok(true)
    }

    /// Set or clear an obstacle's description; see [`Editor::set_obstacle_label`]
    pub fn set_obstacle_description(
        &mut self,
        handle: ObstacleHandle,
        description: Option<&str>,
    ) -> Result<bool, EditError> {
        Ok(self
            .edit_obstacle_text(TextTable::Descriptions, handle, description)?
            .is_some())
    }

    pub fn set_obstacle_description_logged(
        &mut self,
        handle: ObstacleHandle,
        description: Option<&str>,
    ) -> Result<bool, EditError> {
        let Some(edit) = self.edit_obstacle_text(TextTable::Descriptions, handle, description)?
        else {
            return Ok(false);
        };
        self.log.push(Action::SetObstacleDescription(edit));
        Ok(true)
    }

    // ---- Map labels ----

    fn edit_map_label(
        &mut self,
        id: usize,
        name: Option<&str>,
        pos: TilePos,
    ) -> Result<Option<LabelChange>, EditError> {
        if id >= self.level.label_capacity() {
            return Err(EditError::LabelOutOfRange(id));
        }
        let name = match name {
            Some(name) => name.to_string(),
            None => {
                let current = self.level.label(id).map(|label| label.name.clone());
                match self.ask("Please enter name for this map label", current) {
                    Some(name) => name,
                    None => return Ok(None),
                }
            }
        };

        let change = self.level.plan_map_label(id, Some(&name), pos)?;
        self.level.apply_label_change(&change, true)?;
        Ok(Some(change))
    }

    /// Set or clear (empty name) map label `id`
    ///
    /// A name already used by another label overwrites that label instead.
    /// `None` asks the installed [`TextPrompt`].
    pub fn set_map_label(
        &mut self,
        id: usize,
        name: Option<&str>,
        pos: TilePos,
    ) -> Result<bool, EditError> {
        Ok(self.edit_map_label(id, name, pos)?.is_some())
    }

    pub fn set_map_label_logged(
        &mut self,
        id: usize,
        name: Option<&str>,
        pos: TilePos,
    ) -> Result<bool, EditError> {
        let Some(change) = self.edit_map_label(id, name, pos)? else {
            return Ok(false);
        };
        self.log.push(Action::SetMapLabel(change));
        Ok(true)
    }

    /// Label the tile at `pos`, reusing the label already there
    ///
    /// Otherwise the first free slot is used, or slot 0 when the table is full.
    pub fn set_map_label_at(&mut self, pos: TilePos, name: Option<&str>) -> Result<bool, EditError> {
        let id = match self.level.label_at(pos).or_else(|| self.level.free_label_slot()) {
            Some(id) => id,
            None => {
                warn!("Map label table is full, overwriting label 0");
                0
            }
        };
        self.set_map_label_logged(id, name, pos)
    }

    // ---- History ----

    /// Undo the last step
    /// Returns true if something was undone
    pub fn undo(&mut self) -> bool {
        self.log.undo(&mut self.level)
    }

    /// Redo the last undone step
    /// Returns true if something was redone
    pub fn redo(&mut self) -> bool {
        self.log.redo(&mut self.level)
    }

    /// Bundle the newest `count` entries into one undo step
    ///
    /// Under a history limit, open a gesture before logging the entries and
    /// close it after the marker; otherwise older entries may already be
    /// trimmed and the marker only covers what is left.
    pub fn push_grouping_marker(&mut self, count: usize) {
        self.log.push(Action::Group(count));
    }

    /// Undo the newest step without making it redoable
    pub fn revert_last(&mut self) -> bool {
        self.log.revert_last(&mut self.level)
    }

    pub fn clear_history(&mut self) {
        self.log.clear();
    }

    /// Hold history trimming while a gesture builds up its records
    pub fn begin_gesture(&mut self) {
        self.log.begin_gesture();
    }

    pub fn end_gesture(&mut self) {
        self.log.end_gesture();
    }
}
