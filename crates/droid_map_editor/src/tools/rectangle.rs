//! Rectangle-draw tool for floor painting
//!
//! The rectangle spans from the anchor tile to the tile under the pointer.
//! Each resize reverts the previous rectangle and paints the new one, so the
//! undo stack holds exactly one group for the rectangle at any time.

use droid_map_core::{FloorType, MapPos, TilePos};
use tracing::warn;

use super::ToolState;
use crate::Editor;

#[derive(Debug, Clone)]
pub struct RectangleTool {
    floor: FloorType,
    anchor: TilePos,
    /// Signed offset from the anchor to the far corner
    extent: (i32, i32),
    /// Iteration direction along each axis, always 1 or -1
    step: (i32, i32),
    tiles_painted: usize,
    resize_threshold: f32,
    state: ToolState,
}

impl RectangleTool {
    /// Paint the anchor tile under the pointer, clamped into the map
    pub fn start(
        editor: &mut Editor,
        floor: FloorType,
        pointer: MapPos,
        resize_threshold: f32,
    ) -> Option<Self> {
        let anchor = editor.level().clamp_tile(pointer.tile());

        editor.begin_gesture();
        if let Err(error) = editor.set_floor_logged(anchor, floor) {
            warn!(%error, "Could not start floor rectangle");
            editor.end_gesture();
            return None;
        }
        editor.push_grouping_marker(1);

        Some(Self {
            floor,
            anchor,
            extent: (0, 0),
            step: (1, 1),
            tiles_painted: 1,
            resize_threshold,
            state: ToolState::Drawing,
        })
    }

    pub fn floor(&self) -> FloorType {
        self.floor
    }

    pub fn anchor(&self) -> TilePos {
        self.anchor
    }

    /// Tile diagonally opposite the anchor
    pub fn far_corner(&self) -> TilePos {
        TilePos::new(self.anchor.x + self.extent.0, self.anchor.y + self.extent.1)
    }

    pub fn tiles_painted(&self) -> usize {
        self.tiles_painted
    }

    pub fn state(&self) -> ToolState {
        self.state
    }

    /// Resize the rectangle towards the pointer
    pub fn extend(&mut self, editor: &mut Editor, pointer: MapPos) {
        if self.state != ToolState::Drawing {
            return;
        }
        if pointer.distance(self.far_corner().origin()) <= self.resize_threshold {
            return;
        }

        let target = pointer.tile();
        let extent_x = target.x - self.anchor.x;
        let extent_y = target.y - self.anchor.y;
        self.step = (
            if extent_x > 0 { 1 } else { -1 },
            if extent_y > 0 { 1 } else { -1 },
        );

        editor.revert_last();

        let far = editor
            .level()
            .clamp_tile(TilePos::new(self.anchor.x + extent_x, self.anchor.y + extent_y));
        self.extent = (far.x - self.anchor.x, far.y - self.anchor.y);

        let end_x = far.x + self.step.0;
        let end_y = far.y + self.step.1;
        let mut painted = 0;
        let mut x = self.anchor.x;
        while x != end_x {
            let mut y = self.anchor.y;
            while y != end_y {
                match editor.set_floor_logged(TilePos::new(x, y), self.floor) {
                    Ok(_) => painted += 1,
                    Err(error) => warn!(%error, "Could not paint rectangle tile"),
                }
                y += self.step.1;
            }
            x += self.step.0;
        }
        editor.push_grouping_marker(painted);
        self.tiles_painted = painted;
    }

    /// Keep the painted rectangle
    pub fn commit(&mut self, editor: &mut Editor) {
        if self.state != ToolState::Drawing {
            return;
        }
        editor.end_gesture();
        self.state = ToolState::Committed;
    }

    /// Revert the painted rectangle
    pub fn cancel(&mut self, editor: &mut Editor) {
        if self.state != ToolState::Drawing {
            return;
        }
        editor.revert_last();
        editor.end_gesture();
        self.state = ToolState::Cancelled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droid_map_core::{Level, ObstacleCatalog};

    const SAND: FloorType = 1;
    const STONE: FloorType = 2;

    fn test_editor() -> Editor {
        Editor::new(
            Level::new("Test".to_string(), 10, 10, SAND),
            ObstacleCatalog::default(),
        )
    }

    fn count_floor(editor: &Editor, floor: FloorType) -> usize {
        (0..10)
            .flat_map(|x| (0..10).map(move |y| TilePos::new(x, y)))
            .filter(|&pos| editor.level().floor(pos) == Some(floor))
            .count()
    }

    #[test]
    fn test_start_paints_anchor() {
        let mut editor = test_editor();
        let tool = RectangleTool::start(&mut editor, STONE, MapPos::new(3.4, 4.6), 0.5).unwrap();
        assert_eq!(tool.anchor(), TilePos::new(3, 4));
        assert_eq!(editor.level().floor(TilePos::new(3, 4)), Some(STONE));
        assert_eq!(editor.log().undo_steps(), 1);
    }

    #[test]
    fn test_start_clamps_anchor() {
        let mut editor = test_editor();
        let tool = RectangleTool::start(&mut editor, STONE, MapPos::new(14.0, -2.0), 0.5).unwrap();
        assert_eq!(tool.anchor(), TilePos::new(9, 0));
    }

    #[test]
    fn test_resize_keeps_single_step() {
        let mut editor = test_editor();
        let mut tool = RectangleTool::start(&mut editor, STONE, MapPos::new(2.5, 2.5), 0.5).unwrap();

        tool.extend(&mut editor, MapPos::new(6.5, 6.5));
        assert_eq!(tool.tiles_painted(), 25);
        assert_eq!(count_floor(&editor, STONE), 25);

        // Shrinking repaints only the smaller rectangle
        tool.extend(&mut editor, MapPos::new(3.5, 3.5));
        assert_eq!(tool.tiles_painted(), 4);
        assert_eq!(count_floor(&editor, STONE), 4);
        assert_eq!(editor.log().undo_steps(), 1);
    }

    #[test]
    fn test_resize_towards_origin() {
        let mut editor = test_editor();
        let mut tool = RectangleTool::start(&mut editor, STONE, MapPos::new(5.5, 5.5), 0.5).unwrap();
        tool.extend(&mut editor, MapPos::new(3.5, 4.5));
        assert_eq!(tool.far_corner(), TilePos::new(3, 4));
        assert_eq!(count_floor(&editor, STONE), 6);
    }

    #[test]
    fn test_small_moves_ignored() {
        let mut editor = test_editor();
        let mut tool = RectangleTool::start(&mut editor, STONE, MapPos::new(5.2, 5.2), 0.5).unwrap();
        tool.extend(&mut editor, MapPos::new(5.3, 5.3));
        assert_eq!(tool.far_corner(), TilePos::new(5, 5));
        assert_eq!(editor.log().undo_depth(), 2);
    }

    #[test]
    fn test_far_corner_clamped() {
        let mut editor = test_editor();
        let mut tool = RectangleTool::start(&mut editor, STONE, MapPos::new(7.5, 7.5), 0.5).unwrap();
        tool.extend(&mut editor, MapPos::new(25.0, 8.5));
        assert_eq!(tool.far_corner(), TilePos::new(9, 8));
        assert_eq!(count_floor(&editor, STONE), 6);
    }

    #[test]
    fn test_cancel_restores_floor() {
        let mut editor = test_editor();
        let mut tool = RectangleTool::start(&mut editor, STONE, MapPos::new(1.5, 1.5), 0.5).unwrap();
        tool.extend(&mut editor, MapPos::new(4.5, 4.5));
        tool.cancel(&mut editor);

        assert_eq!(tool.state(), ToolState::Cancelled);
        assert_eq!(count_floor(&editor, STONE), 0);
        assert!(!editor.log().can_undo());
        assert!(!editor.log().can_redo());
    }
}
