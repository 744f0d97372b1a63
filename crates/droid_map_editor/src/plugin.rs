//! Bevy integration: feeds mouse and keyboard input to the gesture router

use bevy::prelude::*;
use droid_map_core::{Level, MapPos, ObstacleCatalog};

use crate::commands::handle_history_shortcuts;
use crate::preferences::EditorConfig;
use crate::tools::{GestureEvent, GestureRouter, PlaceSelection, PointerButton, ToolKey, ToolSettings};
use crate::Editor;

/// The level being edited and the router driving the placement tools
#[derive(Resource)]
pub struct EditorSession {
    pub editor: Editor,
    pub router: GestureRouter,
}

impl EditorSession {
    pub fn new(
        level: Level,
        catalog: ObstacleCatalog,
        config: &EditorConfig,
        selection: PlaceSelection,
    ) -> Self {
        Self {
            editor: Editor::with_config(level, catalog, config),
            router: GestureRouter::with_settings(selection, ToolSettings::from(config)),
        }
    }
}

/// Pointer position in map space, written by the viewport each frame
///
/// `None` while the cursor is outside the map view.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq)]
pub struct PointerMapPosition(pub Option<MapPos>);

/// Registers the input systems
///
/// The app inserts an [`EditorSession`] once a level is open; until then the
/// systems do nothing.
#[derive(Default)]
pub struct LevelEditorPlugin {
    /// Configuration to use instead of the one on disk
    pub config: Option<EditorConfig>,
}

impl Plugin for LevelEditorPlugin {
    fn build(&self, app: &mut App) {
        let config = self.config.clone().unwrap_or_else(EditorConfig::load);
        app.insert_resource(config)
            .init_resource::<PointerMapPosition>()
            .init_resource::<ButtonInput<MouseButton>>()
            .init_resource::<ButtonInput<KeyCode>>()
            .add_systems(
                Update,
                (handle_history_shortcuts, route_gesture_input)
                    .chain()
                    .run_if(resource_exists::<EditorSession>),
            );
    }
}

/// Translate this frame's input into gesture events
pub fn route_gesture_input(
    mouse: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    pointer: Res<PointerMapPosition>,
    mut session: ResMut<EditorSession>,
    mut last_pointer: Local<Option<MapPos>>,
) {
    let session = &mut *session;
    let mut send = |event: GestureEvent| {
        session.router.handle(&mut session.editor, event);
    };

    if keyboard.just_pressed(KeyCode::Escape) {
        send(GestureEvent::Key(ToolKey::Escape));
    }
    if keyboard.just_pressed(KeyCode::Space) {
        send(GestureEvent::Key(ToolKey::Space));
    }

    let Some(pos) = pointer.0 else {
        return;
    };
    if *last_pointer != Some(pos) {
        *last_pointer = Some(pos);
        send(GestureEvent::Move { pos });
    }

    if mouse.just_pressed(MouseButton::Left) {
        send(GestureEvent::Press {
            button: PointerButton::Left,
            pos,
        });
    }
    if mouse.just_pressed(MouseButton::Right) {
        send(GestureEvent::Press {
            button: PointerButton::Right,
            pos,
        });
    }
    if mouse.just_released(MouseButton::Left) {
        send(GestureEvent::Release {
            button: PointerButton::Left,
            pos,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droid_map_core::TilePos;

    const SAND: u16 = 1;
    const STONE: u16 = 2;

    fn test_app() -> App {
        let config = EditorConfig::default();
        let mut app = App::new();
        app.add_plugins(LevelEditorPlugin {
            config: Some(config.clone()),
        });
        app.insert_resource(EditorSession::new(
            Level::new("Test".to_string(), 10, 10, SAND),
            ObstacleCatalog::default(),
            &config,
            PlaceSelection::Floor(STONE),
        ));
        app
    }

    fn set_pointer(app: &mut App, x: f32, y: f32) {
        app.world_mut().resource_mut::<PointerMapPosition>().0 = Some(MapPos::new(x, y));
    }

    fn clear_input(app: &mut App) {
        app.world_mut().resource_mut::<ButtonInput<MouseButton>>().clear();
        app.world_mut().resource_mut::<ButtonInput<KeyCode>>().clear();
    }

    #[test]
    fn test_drag_paints_rectangle() {
        let mut app = test_app();

        set_pointer(&mut app, 1.5, 1.5);
        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(MouseButton::Left);
        app.update();
        clear_input(&mut app);
        assert!(app.world().resource::<EditorSession>().router.is_active());

        set_pointer(&mut app, 3.5, 2.5);
        app.update();

        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .release(MouseButton::Left);
        app.update();

        let session = app.world().resource::<EditorSession>();
        assert!(!session.router.is_active());
        assert_eq!(session.editor.level().floor(TilePos::new(3, 2)), Some(STONE));
        assert_eq!(session.editor.level().floor(TilePos::new(4, 2)), Some(SAND));
        assert_eq!(session.editor.log().undo_steps(), 1);
    }

    #[test]
    fn test_escape_cancels_and_ctrl_z_undoes() {
        let mut app = test_app();

        set_pointer(&mut app, 1.5, 1.5);
        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(MouseButton::Left);
        app.update();
        clear_input(&mut app);

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::Escape);
        app.update();
        clear_input(&mut app);
        {
            let session = app.world().resource::<EditorSession>();
            assert!(!session.router.is_active());
            assert!(!session.editor.log().can_undo());
        }

        // A single click paints one tile once released
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .release(KeyCode::Escape);
        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .release(MouseButton::Left);
        clear_input(&mut app);
        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(MouseButton::Left);
        app.update();
        clear_input(&mut app);
        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .release(MouseButton::Left);
        app.update();
        clear_input(&mut app);
        assert_eq!(
            app.world()
                .resource::<EditorSession>()
                .editor
                .level()
                .floor(TilePos::new(1, 1)),
            Some(STONE)
        );

        {
            let mut keyboard = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
            keyboard.press(KeyCode::ControlLeft);
            keyboard.press(KeyCode::KeyZ);
        }
        app.update();

        let session = app.world().resource::<EditorSession>();
        assert_eq!(session.editor.level().floor(TilePos::new(1, 1)), Some(SAND));
        assert!(session.editor.log().can_redo());
    }
}
