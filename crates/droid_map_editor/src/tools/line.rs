//! Line-draw tool for wall obstacles
//!
//! Dragging from the anchor grows a straight wall one tile at a time along
//! the wall's axis. Dragging back over the line takes segments off again.

use droid_map_core::{Direction, MapPos, ObstacleHandle, ObstacleKind, WallOrientation};
use tracing::{debug, warn};

use super::ToolState;
use crate::Editor;

/// One placed wall piece
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub pos: MapPos,
    pub handle: ObstacleHandle,
}

#[derive(Debug, Clone)]
pub struct LineTool {
    kind: ObstacleKind,
    orientation: WallOrientation,
    segments: Vec<LineSegment>,
    /// `None` until the first extension fixes it
    direction: Option<Direction>,
    step_threshold: f32,
    state: ToolState,
}

impl LineTool {
    /// Place the anchor segment under the pointer
    ///
    /// Horizontal walls sit on the middle of the tile's top edge, vertical
    /// walls on the middle of its left edge. Returns `None` when the anchor
    /// cannot be placed.
    pub fn start(
        editor: &mut Editor,
        kind: ObstacleKind,
        orientation: WallOrientation,
        pointer: MapPos,
        step_threshold: f32,
    ) -> Option<Self> {
        let origin = pointer.tile().origin();
        let anchor = match orientation {
            WallOrientation::Horizontal => MapPos::new(origin.x + 0.5, origin.y),
            WallOrientation::Vertical => MapPos::new(origin.x, origin.y + 0.5),
        };

        editor.begin_gesture();
        match editor.create_obstacle_logged(anchor, kind) {
            Ok(handle) => Some(Self {
                kind,
                orientation,
                segments: vec![LineSegment {
                    pos: anchor,
                    handle,
                }],
                direction: None,
                step_threshold,
                state: ToolState::Drawing,
            }),
            Err(error) => {
                warn!(%error, x = anchor.x, y = anchor.y, "Could not start wall line");
                editor.end_gesture();
                None
            }
        }
    }

    pub fn kind(&self) -> ObstacleKind {
        self.kind
    }

    pub fn segments(&self) -> &[LineSegment] {
        &self.segments
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn state(&self) -> ToolState {
        self.state
    }

    fn allows(&self, direction: Direction) -> bool {
        match self.orientation {
            WallOrientation::Horizontal => direction.is_horizontal(),
            WallOrientation::Vertical => !direction.is_horizontal(),
        }
    }

    /// Follow the pointer: grow the line, or shrink it when the pointer
    /// heads back against the fixed direction
    pub fn extend(&mut self, editor: &mut Editor, pointer: MapPos) {
        if self.state != ToolState::Drawing {
            return;
        }
        let Some(last) = self.segments.last().map(|segment| segment.pos) else {
            return;
        };

        let dx = last.x - pointer.x;
        let dy = last.y - pointer.y;
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        let (candidate, distance) = if dy.abs() > dx.abs() {
            let direction = if dy > 0.0 {
                Direction::North
            } else {
                Direction::South
            };
            (direction, (pointer.y - last.y).abs())
        } else {
            let direction = if dx > 0.0 {
                Direction::West
            } else {
                Direction::East
            };
            (direction, (pointer.x - last.x).abs())
        };

        if distance > self.step_threshold
            && self.allows(candidate)
            && self.direction.map_or(true, |direction| direction == candidate)
        {
            let pos = last.step(candidate);
            match editor.create_obstacle_logged(pos, self.kind) {
                Ok(handle) => {
                    self.segments.push(LineSegment { pos, handle });
                    if self.direction.is_none() {
                        debug!(direction = candidate.display_name(), "Wall line direction fixed");
                        self.direction = Some(candidate);
                    }
                }
                Err(error) => warn!(%error, x = pos.x, y = pos.y, "Could not extend wall line"),
            }
        }

        if self.direction == Some(candidate.opposite()) && self.segments.len() > 1 {
            if let Some(segment) = self.segments.pop() {
                if let Err(error) = editor.retract_created_obstacle(segment.handle) {
                    warn!(%error, "Could not take back wall segment");
                }
            }
            if self.segments.len() == 1 {
                self.direction = None;
            }
        }
    }

    /// Keep the line as one undo step
    pub fn commit(&mut self, editor: &mut Editor) {
        if self.state != ToolState::Drawing {
            return;
        }
        editor.push_grouping_marker(self.segments.len());
        editor.end_gesture();
        self.state = ToolState::Committed;
    }

    /// Remove every segment, anchor included, and their records
    pub fn cancel(&mut self, editor: &mut Editor) {
        if self.state != ToolState::Drawing {
            return;
        }
        while let Some(segment) = self.segments.pop() {
            if let Err(error) = editor.retract_created_obstacle(segment.handle) {
                warn!(%error, "Could not take back wall segment");
            }
        }
        self.direction = None;
        editor.end_gesture();
        self.state = ToolState::Cancelled;
    }
}
