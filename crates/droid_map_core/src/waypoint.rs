//! Waypoints and the bookkeeping needed to reverse waypoint edits

use serde::{Deserialize, Serialize};

use crate::TilePos;

/// A navigation waypoint on the tile grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoint {
    pub pos: TilePos,
    /// Indices of connected waypoints, in insertion order
    #[serde(default)]
    pub connections: Vec<usize>,
    #[serde(default)]
    pub suppress_random_spawn: bool,
}

impl Waypoint {
    pub fn new(pos: TilePos) -> Self {
        Self {
            pos,
            connections: Vec::new(),
            suppress_random_spawn: false,
        }
    }

    pub fn is_connected_to(&self, other: usize) -> bool {
        self.connections.contains(&other)
    }
}

/// Everything needed to put a removed waypoint back exactly where it was
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedWaypoint {
    pub index: usize,
    pub waypoint: Waypoint,
    /// `(source, position)` of every connection that pointed at the removed
    /// waypoint, using the indices from before the removal
    pub incoming: Vec<(usize, usize)>,
}

/// One toggle of a waypoint connection
///
/// A slot is the position inside a connection list where the edge was
/// inserted or removed; `None` means that side was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionChange {
    pub origin: usize,
    pub target: usize,
    pub added: bool,
    pub origin_slot: Option<usize>,
    pub target_slot: Option<usize>,
}

/// Remove `index` from `list`, renumbering every connection above it
pub(crate) fn remove_and_renumber(list: &mut Vec<Waypoint>, index: usize) -> RemovedWaypoint {
    let waypoint = list.remove(index);
    let mut incoming = Vec::new();

    for (new_index, other) in list.iter_mut().enumerate() {
        let source = if new_index < index {
            new_index
        } else {
            new_index + 1
        };
        let mut original_position = 0;
        other.connections.retain_mut(|connection| {
            let keep = if *connection == index {
                incoming.push((source, original_position));
                false
            } else {
                if *connection > index {
                    *connection -= 1;
                }
                true
            };
            original_position += 1;
            keep
        });
    }

    RemovedWaypoint {
        index,
        waypoint,
        incoming,
    }
}

/// Inverse of [`remove_and_renumber`]
pub(crate) fn reinsert_and_renumber(list: &mut Vec<Waypoint>, removed: &RemovedWaypoint) {
    let index = removed.index;
    for other in list.iter_mut() {
        for connection in other.connections.iter_mut() {
            if *connection >= index {
                *connection += 1;
            }
        }
    }

    list.insert(index, removed.waypoint.clone());

    // Positions were recorded left to right, so ascending insertion lands
    // every edge back on its original position.
    for &(source, position) in &removed.incoming {
        if let Some(other) = list.get_mut(source) {
            let position = position.min(other.connections.len());
            other.connections.insert(position, index);
        }
    }
}
