//! Waypoint route tool
//!
//! Click-driven: every left press drops (or reuses) a waypoint and links it
//! to the previous one. Clicking the previous waypoint again, or returning
//! to the first waypoint of the route, ends the route.

use droid_map_core::MapPos;
use tracing::{debug, warn};

use super::{ToolSignal, ToolState};
use crate::Editor;

#[derive(Debug, Clone)]
pub struct WaypointRouteTool {
    suppress_random_spawn: bool,
    /// First waypoint of the route
    origin: Option<usize>,
    /// Waypoint placed by the previous click
    previous: Option<usize>,
    /// Records pushed for this route
    actions: usize,
    state: ToolState,
}

impl WaypointRouteTool {
    pub fn start(editor: &mut Editor, suppress_random_spawn: bool) -> Self {
        editor.begin_gesture();
        Self {
            suppress_random_spawn,
            origin: None,
            previous: None,
            actions: 0,
            state: ToolState::Drawing,
        }
    }

    pub fn origin(&self) -> Option<usize> {
        self.origin
    }

    pub fn previous(&self) -> Option<usize> {
        self.previous
    }

    pub fn state(&self) -> ToolState {
        self.state
    }

    /// Handle a left press at `pointer`
    pub fn click(&mut self, editor: &mut Editor, pointer: MapPos) -> ToolSignal {
        if self.state != ToolState::Drawing {
            return ToolSignal::Done;
        }
        let pos = pointer.tile();

        let (index, created) = match editor.ensure_waypoint_logged(pos) {
            Ok(placed) => placed,
            Err(error) => {
                warn!(%error, x = pos.x, y = pos.y, "Could not place route waypoint");
                return ToolSignal::Continue;
            }
        };
        if created {
            self.actions += 1;
        }

        if let Some(previous) = self.previous.filter(|&previous| previous != index) {
            let linked = editor
                .level()
                .waypoint(previous)
                .is_some_and(|waypoint| waypoint.is_connected_to(index));
            if !linked {
                match editor.toggle_waypoint_connection_logged(previous, index) {
                    Ok(_) => self.actions += 1,
                    Err(error) => warn!(%error, previous, index, "Could not link route waypoints"),
                }
            }
        }

        let spawn_differs = editor
            .level()
            .waypoint(index)
            .is_some_and(|waypoint| waypoint.suppress_random_spawn != self.suppress_random_spawn);
        if spawn_differs && editor.toggle_waypoint_logged(pos, true).is_ok() {
            self.actions += 1;
        }

        if self.previous == Some(index) || (!created && self.origin == Some(index)) {
            self.commit(editor);
            return ToolSignal::Done;
        }

        self.origin.get_or_insert(index);
        self.previous = Some(index);
        ToolSignal::Continue
    }

    /// Close the route as one undo step
    pub fn commit(&mut self, editor: &mut Editor) {
        if self.state != ToolState::Drawing {
            return;
        }
        if self.actions > 0 {
            editor.push_grouping_marker(self.actions);
        }
        editor.end_gesture();
        debug!(actions = self.actions, "Finished waypoint route");
        self.state = ToolState::Committed;
    }

    /// Revert everything the route did
    pub fn cancel(&mut self, editor: &mut Editor) {
        if self.state != ToolState::Drawing {
            return;
        }
        for _ in 0..self.actions {
            editor.revert_last();
        }
        editor.end_gesture();
        self.state = ToolState::Cancelled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droid_map_core::{Level, ObstacleCatalog, TilePos};

    fn test_editor() -> Editor {
        Editor::new(
            Level::new("Test".to_string(), 10, 10, 0),
            ObstacleCatalog::default(),
        )
    }

    #[test]
    fn test_route_links_consecutive_waypoints() {
        let mut editor = test_editor();
        let mut tool = WaypointRouteTool::start(&mut editor, false);

        assert_eq!(tool.click(&mut editor, MapPos::new(1.5, 1.5)), ToolSignal::Continue);
        assert_eq!(tool.click(&mut editor, MapPos::new(4.5, 1.5)), ToolSignal::Continue);
        assert_eq!(tool.click(&mut editor, MapPos::new(4.5, 5.5)), ToolSignal::Continue);

        let level = editor.level();
        assert_eq!(level.waypoints().len(), 3);
        assert_eq!(level.waypoint(0).unwrap().connections, vec![1]);
        assert_eq!(level.waypoint(1).unwrap().connections, vec![0, 2]);
        assert_eq!(level.waypoint(2).unwrap().connections, vec![1]);
    }

    #[test]
    fn test_clicking_previous_ends_route() {
        let mut editor = test_editor();
        let mut tool = WaypointRouteTool::start(&mut editor, false);
        tool.click(&mut editor, MapPos::new(1.5, 1.5));
        tool.click(&mut editor, MapPos::new(3.5, 1.5));

        assert_eq!(tool.click(&mut editor, MapPos::new(3.2, 1.8)), ToolSignal::Done);
        assert_eq!(tool.state(), ToolState::Committed);
        assert_eq!(editor.log().undo_steps(), 1);

        assert!(editor.undo());
        assert!(editor.level().waypoints().is_empty());
    }

    #[test]
    fn test_returning_to_origin_closes_loop() {
        let mut editor = test_editor();
        let mut tool = WaypointRouteTool::start(&mut editor, false);
        tool.click(&mut editor, MapPos::new(1.5, 1.5));
        tool.click(&mut editor, MapPos::new(5.5, 1.5));
        tool.click(&mut editor, MapPos::new(5.5, 5.5));

        assert_eq!(tool.click(&mut editor, MapPos::new(1.5, 1.5)), ToolSignal::Done);
        let level = editor.level();
        assert_eq!(level.waypoint(0).unwrap().connections, vec![1, 2]);
        assert_eq!(level.waypoint(2).unwrap().connections, vec![1, 0]);
    }

    #[test]
    fn test_spawn_flag_follows_tool() {
        let mut editor = test_editor();
        editor.toggle_waypoint(TilePos::new(2, 2), false).unwrap();

        let mut tool = WaypointRouteTool::start(&mut editor, true);
        tool.click(&mut editor, MapPos::new(2.5, 2.5));
        tool.click(&mut editor, MapPos::new(6.5, 2.5));

        assert!(editor.level().waypoint(0).unwrap().suppress_random_spawn);
        assert!(editor.level().waypoint(1).unwrap().suppress_random_spawn);
    }

    #[test]
    fn test_cancel_reverts_route() {
        let mut editor = test_editor();
        editor.toggle_waypoint(TilePos::new(8, 8), false).unwrap();
        let before = editor.level().clone();

        let mut tool = WaypointRouteTool::start(&mut editor, true);
        tool.click(&mut editor, MapPos::new(8.5, 8.5));
        tool.click(&mut editor, MapPos::new(1.5, 1.5));
        tool.click(&mut editor, MapPos::new(1.5, 6.5));
        tool.cancel(&mut editor);

        assert_eq!(editor.level(), &before);
        assert!(!editor.log().can_undo());
        assert!(!editor.log().gesture_open());
    }
}
