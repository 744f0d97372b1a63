//! Placement tools and the gesture router that drives them
//!
//! UI events come in as [`GestureEvent`]s. The router starts the tool that
//! matches the current [`PlaceSelection`] on a left press and forwards the
//! following events to it until the session ends. Right press, Escape and
//! Space cancel; a left release commits (except for the click-driven
//! waypoint route).

mod line;
mod rectangle;
mod waypoint_route;

pub use line::{LineSegment, LineTool};
pub use rectangle::RectangleTool;
pub use waypoint_route::WaypointRouteTool;

use droid_map_core::{FloorType, MapPos, ObstacleKind};
use tracing::warn;

use crate::preferences::EditorConfig;
use crate::Editor;

/// Pointer buttons the tools react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Left,
    Right,
}

/// Keys the tools react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKey {
    Escape,
    Space,
}

/// A UI event in map coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    Press { button: PointerButton, pos: MapPos },
    Release { button: PointerButton, pos: MapPos },
    Move { pos: MapPos },
    Key(ToolKey),
}

/// What a tool wants after handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolSignal {
    /// The session stays open
    Continue,
    /// The session is over (or none was started)
    Done,
}

/// Lifecycle of a tool session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolState {
    #[default]
    Idle,
    Drawing,
    Committed,
    Cancelled,
}

/// What a left press places
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaceSelection {
    /// Paint floor with the rectangle tool
    Floor(FloorType),
    /// Walls draw lines, anything else is placed once
    Obstacle(ObstacleKind),
    /// Lay out a waypoint route
    Waypoint { suppress_random_spawn: bool },
}

/// Tuning for the placement tools
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolSettings {
    pub line_step_threshold: f32,
    pub rectangle_resize_threshold: f32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

impl From<&EditorConfig> for ToolSettings {
    fn from(config: &EditorConfig) -> Self {
        Self {
            line_step_threshold: config.line_step_threshold,
            rectangle_resize_threshold: config.rectangle_resize_threshold,
        }
    }
}

/// The active tool
#[derive(Debug, Clone)]
pub enum ToolSession {
    Line(LineTool),
    Rectangle(RectangleTool),
    WaypointRoute(WaypointRouteTool),
}

impl ToolSession {
    pub fn state(&self) -> ToolState {
        match self {
            ToolSession::Line(tool) => tool.state(),
            ToolSession::Rectangle(tool) => tool.state(),
            ToolSession::WaypointRoute(tool) => tool.state(),
        }
    }

    /// Whether the session ignores releases and advances on presses
    pub fn is_click_driven(&self) -> bool {
        matches!(self, ToolSession::WaypointRoute(_))
    }

    fn extend(&mut self, editor: &mut Editor, pos: MapPos) {
        match self {
            ToolSession::Line(tool) => tool.extend(editor, pos),
            ToolSession::Rectangle(tool) => tool.extend(editor, pos),
            ToolSession::WaypointRoute(_) => {}
        }
    }

    fn press(&mut self, editor: &mut Editor, pos: MapPos) -> ToolSignal {
        match self {
            ToolSession::WaypointRoute(tool) => tool.click(editor, pos),
            _ => ToolSignal::Continue,
        }
    }

    fn commit(&mut self, editor: &mut Editor) {
        match self {
            ToolSession::Line(tool) => tool.commit(editor),
            ToolSession::Rectangle(tool) => tool.commit(editor),
            ToolSession::WaypointRoute(tool) => tool.commit(editor),
        }
    }

    fn cancel(&mut self, editor: &mut Editor) {
        match self {
            ToolSession::Line(tool) => tool.cancel(editor),
            ToolSession::Rectangle(tool) => tool.cancel(editor),
            ToolSession::WaypointRoute(tool) => tool.cancel(editor),
        }
    }
}

/// Routes gesture events to the single active tool session
#[derive(Debug, Clone)]
pub struct GestureRouter {
    selection: PlaceSelection,
    settings: ToolSettings,
    session: Option<ToolSession>,
}

impl GestureRouter {
    pub fn new(selection: PlaceSelection) -> Self {
        Self::with_settings(selection, ToolSettings::default())
    }

    pub fn with_settings(selection: PlaceSelection, settings: ToolSettings) -> Self {
        Self {
            selection,
            settings,
            session: None,
        }
    }

    pub fn selection(&self) -> PlaceSelection {
        self.selection
    }

    pub fn session(&self) -> Option<&ToolSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn state(&self) -> ToolState {
        self.session
            .as_ref()
            .map_or(ToolState::Idle, ToolSession::state)
    }

    /// Change what gets placed; an open session is committed first
    pub fn select(&mut self, editor: &mut Editor, selection: PlaceSelection) {
        if let Some(mut session) = self.session.take() {
            session.commit(editor);
        }
        self.selection = selection;
    }

    /// Abort the open session, if any
    pub fn cancel(&mut self, editor: &mut Editor) {
        if let Some(mut session) = self.session.take() {
            session.cancel(editor);
        }
    }

    /// Feed one event to the active tool, or start one on a left press
    pub fn handle(&mut self, editor: &mut Editor, event: GestureEvent) -> ToolSignal {
        let Some(mut session) = self.session.take() else {
            if let GestureEvent::Press {
                button: PointerButton::Left,
                pos,
            } = event
            {
                self.session = self.start(editor, pos);
            }
            return self.signal();
        };

        let signal = match event {
            GestureEvent::Press {
                button: PointerButton::Right,
                ..
            }
            | GestureEvent::Key(ToolKey::Escape | ToolKey::Space) => {
                session.cancel(editor);
                ToolSignal::Done
            }
            GestureEvent::Press {
                button: PointerButton::Left,
                pos,
            } => session.press(editor, pos),
            GestureEvent::Release {
                button: PointerButton::Left,
                ..
            } if !session.is_click_driven() => {
                session.commit(editor);
                ToolSignal::Done
            }
            GestureEvent::Move { pos } => {
                session.extend(editor, pos);
                ToolSignal::Continue
            }
            GestureEvent::Release { .. } => ToolSignal::Continue,
        };

        if signal == ToolSignal::Continue {
            self.session = Some(session);
        }
        signal
    }

    fn signal(&self) -> ToolSignal {
        if self.session.is_some() {
            ToolSignal::Continue
        } else {
            ToolSignal::Done
        }
    }

    fn start(&mut self, editor: &mut Editor, pos: MapPos) -> Option<ToolSession> {
        match self.selection {
            PlaceSelection::Floor(floor) => {
                RectangleTool::start(editor, floor, pos, self.settings.rectangle_resize_threshold)
                    .map(ToolSession::Rectangle)
            }
            PlaceSelection::Obstacle(kind) => match editor.catalog().orientation(kind) {
                Some(orientation) => LineTool::start(
                    editor,
                    kind,
                    orientation,
                    pos,
                    self.settings.line_step_threshold,
                )
                .map(ToolSession::Line),
                None => {
                    place_single_obstacle(editor, kind, pos);
                    None
                }
            },
            PlaceSelection::Waypoint {
                suppress_random_spawn,
            } => {
                let mut tool = WaypointRouteTool::start(editor, suppress_random_spawn);
                match tool.click(editor, pos) {
                    ToolSignal::Continue => Some(ToolSession::WaypointRoute(tool)),
                    ToolSignal::Done => None,
                }
            }
        }
    }
}

/// Drop one free-standing obstacle exactly at the pointer
fn place_single_obstacle(editor: &mut Editor, kind: ObstacleKind, pos: MapPos) {
    if let Err(error) = editor.create_obstacle_logged(pos, kind) {
        warn!(%error, kind, x = pos.x, y = pos.y, "Could not place obstacle");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droid_map_core::{Level, ObstacleCatalog, ObstacleSpec, TilePos, WallOrientation};

    const SAND: FloorType = 1;
    const STONE: FloorType = 2;

    fn press(x: f32, y: f32) -> GestureEvent {
        GestureEvent::Press {
            button: PointerButton::Left,
            pos: MapPos::new(x, y),
        }
    }

    fn release(x: f32, y: f32) -> GestureEvent {
        GestureEvent::Release {
            button: PointerButton::Left,
            pos: MapPos::new(x, y),
        }
    }

    fn move_to(x: f32, y: f32) -> GestureEvent {
        GestureEvent::Move {
            pos: MapPos::new(x, y),
        }
    }

    fn setup() -> (Editor, ObstacleKind, ObstacleKind) {
        let mut catalog = ObstacleCatalog::default();
        let barrel = catalog.register(ObstacleSpec::new("barrel"));
        let wall = catalog.register(ObstacleSpec::wall("wall", WallOrientation::Horizontal));
        let editor = Editor::new(Level::new("Test".to_string(), 10, 10, SAND), catalog);
        (editor, barrel, wall)
    }

    #[test]
    fn test_floor_gesture() {
        let (mut editor, _, _) = setup();
        let mut router = GestureRouter::new(PlaceSelection::Floor(STONE));

        assert_eq!(router.handle(&mut editor, press(1.5, 1.5)), ToolSignal::Continue);
        assert_eq!(router.state(), ToolState::Drawing);
        router.handle(&mut editor, move_to(3.5, 2.5));
        assert_eq!(router.handle(&mut editor, release(3.5, 2.5)), ToolSignal::Done);
        assert_eq!(router.state(), ToolState::Idle);

        assert_eq!(editor.level().floor(TilePos::new(3, 2)), Some(STONE));
        assert_eq!(editor.log().undo_steps(), 1);
    }

    #[test]
    fn test_right_press_cancels() {
        let (mut editor, _, wall) = setup();
        let mut router = GestureRouter::new(PlaceSelection::Obstacle(wall));

        router.handle(&mut editor, press(2.5, 2.5));
        router.handle(&mut editor, move_to(4.5, 2.0));
        assert_eq!(editor.level().obstacle_count(), 2);

        let cancel = GestureEvent::Press {
            button: PointerButton::Right,
            pos: MapPos::new(4.5, 2.0),
        };
        assert_eq!(router.handle(&mut editor, cancel), ToolSignal::Done);
        assert_eq!(editor.level().obstacle_count(), 0);
        assert!(!editor.log().can_undo());
    }

    #[test]
    fn test_escape_cancels_rectangle() {
        let (mut editor, _, _) = setup();
        let mut router = GestureRouter::new(PlaceSelection::Floor(STONE));
        router.handle(&mut editor, press(1.5, 1.5));
        router.handle(&mut editor, move_to(5.5, 5.5));

        assert_eq!(
            router.handle(&mut editor, GestureEvent::Key(ToolKey::Escape)),
            ToolSignal::Done
        );
        assert_eq!(editor.level().floor(TilePos::new(1, 1)), Some(SAND));
        assert!(!editor.log().can_undo());
    }

    #[test]
    fn test_single_obstacle_placement() {
        let (mut editor, barrel, _) = setup();
        let mut router = GestureRouter::new(PlaceSelection::Obstacle(barrel));

        assert_eq!(router.handle(&mut editor, press(3.3, 4.7)), ToolSignal::Done);
        assert!(!router.is_active());
        let (_, obstacle) = editor.level().obstacles().next().unwrap();
        assert_eq!(obstacle.pos, MapPos::new(3.3, 4.7));
        assert_eq!(editor.log().undo_depth(), 1);
    }

    #[test]
    fn test_idle_events_are_ignored() {
        let (mut editor, _, _) = setup();
        let mut router = GestureRouter::new(PlaceSelection::Floor(STONE));
        assert_eq!(router.handle(&mut editor, move_to(1.0, 1.0)), ToolSignal::Done);
        assert_eq!(router.handle(&mut editor, release(1.0, 1.0)), ToolSignal::Done);
        assert!(!editor.log().can_undo());
    }

    #[test]
    fn test_route_ignores_release() {
        let (mut editor, _, _) = setup();
        let mut router = GestureRouter::new(PlaceSelection::Waypoint {
            suppress_random_spawn: false,
        });

        router.handle(&mut editor, press(1.5, 1.5));
        assert_eq!(router.handle(&mut editor, release(1.5, 1.5)), ToolSignal::Continue);
        router.handle(&mut editor, press(4.5, 1.5));
        assert_eq!(router.handle(&mut editor, press(4.5, 1.5)), ToolSignal::Done);
        assert_eq!(editor.level().waypoints().len(), 2);
        assert_eq!(editor.log().undo_steps(), 1);
    }

    #[test]
    fn test_select_commits_open_route() {
        let (mut editor, barrel, _) = setup();
        let mut router = GestureRouter::new(PlaceSelection::Waypoint {
            suppress_random_spawn: false,
        });
        router.handle(&mut editor, press(1.5, 1.5));
        router.handle(&mut editor, press(4.5, 1.5));

        router.select(&mut editor, PlaceSelection::Obstacle(barrel));
        assert!(!router.is_active());
        assert_eq!(editor.log().undo_steps(), 1);
        assert!(!editor.log().gesture_open());
    }
}
