//! Editor configuration (persisted across sessions)

mod file;

pub use file::ConfigError;

use droid_map_core::LevelLimits;
use serde::{Deserialize, Serialize};

/// Editor configuration, stored as JSON in the user's config directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(bevy::prelude::Resource))]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum undo steps kept, a group counting as one step. `None` keeps
    /// everything.
    pub history_limit: Option<usize>,
    /// Table capacities for newly created levels
    pub limits: LevelLimits,
    /// Pointer distance from the far corner before a rectangle is resized
    pub rectangle_resize_threshold: f32,
    /// Pointer distance along the drawing axis before a wall line grows
    pub line_step_threshold: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: None,
            limits: LevelLimits::default(),
            rectangle_resize_threshold: 0.5,
            line_step_threshold: 1.0,
        }
    }
}
