//! Keyboard shortcut handling

use bevy::prelude::*;
use tracing::debug;

use crate::plugin::EditorSession;

/// Ctrl+Z undoes, Ctrl+Y or Ctrl+Shift+Z redoes
///
/// Ignored while a placement gesture is in progress; the tool owns the top
/// of the undo stack until it commits or cancels.
pub fn handle_history_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    session: Option<ResMut<EditorSession>>,
) {
    let Some(mut session) = session else {
        return;
    };
    let ctrl = keyboard.pressed(KeyCode::ControlLeft) || keyboard.pressed(KeyCode::ControlRight);
    let shift = keyboard.pressed(KeyCode::ShiftLeft) || keyboard.pressed(KeyCode::ShiftRight);
    if !ctrl {
        return;
    }

    let undo = keyboard.just_pressed(KeyCode::KeyZ) && !shift;
    let redo = (keyboard.just_pressed(KeyCode::KeyZ) && shift) || keyboard.just_pressed(KeyCode::KeyY);
    if !undo && !redo {
        return;
    }
    if session.router.is_active() {
        debug!("Ignoring history shortcut during a gesture");
        return;
    }

    if undo {
        session.editor.undo();
    } else {
        session.editor.redo();
    }
}
