//! Map labels and the text tables attached to obstacles

use serde::{Deserialize, Serialize};

use crate::{ObstacleHandle, TilePos};

/// A named position on the map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapLabel {
    pub name: String,
    pub pos: TilePos,
}

impl MapLabel {
    pub fn new(name: impl Into<String>, pos: TilePos) -> Self {
        Self {
            name: name.into(),
            pos,
        }
    }
}

/// Before/after contents of one map label slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelChange {
    pub id: usize,
    pub before: Option<MapLabel>,
    pub after: Option<MapLabel>,
}

/// Which per-level string table an obstacle text edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextTable {
    Names,
    Descriptions,
}

impl TextTable {
    pub fn display_name(&self) -> &'static str {
        match self {
            TextTable::Names => "name",
            TextTable::Descriptions => "description",
        }
    }
}

/// Before/after contents of one string table slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSlotChange {
    pub slot: usize,
    pub before: Option<String>,
    pub after: Option<String>,
}

/// A complete obstacle text edit: the obstacle's table index and every
/// table slot it touched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub table: TextTable,
    pub handle: ObstacleHandle,
    pub index_before: Option<usize>,
    pub index_after: Option<usize>,
    pub slots: Vec<TextSlotChange>,
}

impl TextEdit {
    /// Whether applying the edit changes nothing
    pub fn is_noop(&self) -> bool {
        self.index_before == self.index_after
            && self.slots.iter().all(|change| change.before == change.after)
    }
}
