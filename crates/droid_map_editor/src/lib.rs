//! droid_map_editor - Editing layer for isometric droid levels
//!
//! This crate provides:
//! - An [`Editor`] dispatcher whose logged operations record undoable actions
//! - An [`ActionLog`] with grouped, nestable undo/redo history
//! - Line-draw (walls), rectangle-draw (floors) and waypoint route tools
//! - A [`GestureRouter`] that turns pointer and key events into tool sessions
//! - Persisted [`EditorConfig`]
//!
//! With the `bevy` feature, [`LevelEditorPlugin`] wires keyboard shortcuts
//! and pointer input into an [`EditorSession`] resource.
//!
//! # Usage
//!
//! ```rust,ignore
//! use droid_map_editor::droid_map_core::{Level, ObstacleCatalog};
//! use droid_map_editor::{Editor, GestureEvent, GestureRouter, PlaceSelection};
//!
//! let mut editor = Editor::new(Level::new("Hangar".into(), 32, 32, 0), ObstacleCatalog::default());
//! let mut router = GestureRouter::new(PlaceSelection::Floor(3));
//! router.handle(&mut editor, event);
//! editor.undo();
//! ```

pub mod commands;
mod editor;
pub mod preferences;
pub mod tools;

#[cfg(feature = "bevy")]
pub mod plugin;

pub use droid_map_core;

pub use commands::{Action, ActionLog, WaypointToggle};
pub use editor::{Editor, TextPrompt};
pub use preferences::{ConfigError, EditorConfig};
pub use tools::{
    GestureEvent, GestureRouter, LineTool, PlaceSelection, PointerButton, RectangleTool, ToolKey,
    ToolSession, ToolSettings, ToolSignal, ToolState, WaypointRouteTool,
};

#[cfg(feature = "bevy")]
pub use plugin::{EditorSession, LevelEditorPlugin, PointerMapPosition};
