//! Property tests for the undo/redo history
//!
//! 1. Undoing every logged edit walks the level back through each earlier state
//! 2. Redoing everything afterwards lands on the final state again
//! 3. A new edit after an undo drops the redo branch
//! 4. A grouped floor edit undoes and redoes as one step

use droid_map_editor::droid_map_core::{
    FloorType, Level, MapLabel, MapPos, Obstacle, ObstacleCatalog, ObstacleHandle, ObstacleSpec,
    TextTable, TilePos, Waypoint, WallOrientation,
};
use droid_map_editor::Editor;
use proptest::prelude::*;

const SIZE: i32 = 8;
const SAND: FloorType = 1;
const STONE: FloorType = 2;

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    CreateObstacle { x: u8, y: u8, kind: u32 },
    RemoveObstacle(usize),
    MoveObstacle { nth: usize, x: u8, y: u8 },
    SetFloor { x: i32, y: i32, floor: FloorType },
    ToggleWaypoint { x: i32, y: i32, suppress: bool },
    ToggleConnection(usize, usize),
    SetObstacleLabel { nth: usize, name: &'static str },
    SetObstacleDescription { nth: usize, text: &'static str },
    SetMapLabel { id: usize, name: &'static str, x: i32, y: i32 },
}

const NAMES: &[&str] = &["", "door", "lift", "console"];

fn op_strategy() -> impl Strategy<Value = Op> {
    let half = 0u8..=(SIZE as u8 * 2);
    let tile = 0..SIZE;
    prop_oneof![
        (half.clone(), half.clone(), 0u32..2)
            .prop_map(|(x, y, kind)| Op::CreateObstacle { x, y, kind }),
        (0usize..8).prop_map(Op::RemoveObstacle),
        (0usize..8, half.clone(), half).prop_map(|(nth, x, y)| Op::MoveObstacle { nth, x, y }),
        (tile.clone(), tile.clone(), 0u16..4).prop_map(|(x, y, floor)| Op::SetFloor { x, y, floor }),
        (tile.clone(), tile.clone(), any::<bool>())
            .prop_map(|(x, y, suppress)| Op::ToggleWaypoint { x, y, suppress }),
        (0usize..6, 0usize..6).prop_map(|(a, b)| Op::ToggleConnection(a, b)),
        (0usize..8, proptest::sample::select(NAMES))
            .prop_map(|(nth, name)| Op::SetObstacleLabel { nth, name }),
        (0usize..8, proptest::sample::select(NAMES))
            .prop_map(|(nth, text)| Op::SetObstacleDescription { nth, text }),
        (0usize..4, proptest::sample::select(NAMES), tile.clone(), tile)
            .prop_map(|(id, name, x, y)| Op::SetMapLabel { id, name, x, y }),
    ]
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Everything a user can observe about a level
///
/// Slot generations are left out: freeing a slot on undo retires its
/// handles, which is not a visible change.
#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    floors: Vec<Option<FloorType>>,
    obstacles: Vec<(usize, Obstacle, Option<String>, Option<String>)>,
    glued: Vec<Vec<usize>>,
    waypoints: Vec<Waypoint>,
    labels: Vec<(usize, MapLabel)>,
}

fn tiles() -> impl Iterator<Item = TilePos> {
    (0..SIZE).flat_map(|y| (0..SIZE).map(move |x| TilePos::new(x, y)))
}

fn snapshot(level: &Level) -> Snapshot {
    Snapshot {
        floors: tiles().map(|pos| level.floor(pos)).collect(),
        obstacles: level
            .obstacles()
            .map(|(handle, obstacle)| {
                (
                    handle.index,
                    obstacle.clone(),
                    level
                        .obstacle_text(TextTable::Names, handle)
                        .map(str::to_string),
                    level
                        .obstacle_text(TextTable::Descriptions, handle)
                        .map(str::to_string),
                )
            })
            .collect(),
        glued: tiles()
            .map(|pos| {
                level
                    .obstacles_glued_at(pos)
                    .into_iter()
                    .map(|handle| handle.index)
                    .collect()
            })
            .collect(),
        waypoints: level.waypoints().to_vec(),
        labels: level
            .labels()
            .map(|(id, label)| (id, label.clone()))
            .collect(),
    }
}

fn test_editor() -> Editor {
    let mut catalog = ObstacleCatalog::default();
    catalog.register(ObstacleSpec::new("crate"));
    catalog.register(ObstacleSpec::wall("wall", WallOrientation::Horizontal));
    Editor::new(Level::new("Laws".to_string(), SIZE as u32, SIZE as u32, SAND), catalog)
}

fn nth_obstacle(editor: &Editor, nth: usize) -> Option<ObstacleHandle> {
    let count = editor.level().obstacle_count();
    if count == 0 {
        return None;
    }
    editor
        .level()
        .obstacles()
        .nth(nth % count)
        .map(|(handle, _)| handle)
}

/// Apply one op through the logged dispatcher; refused edits are fine
fn apply(editor: &mut Editor, op: &Op) {
    let half = |v: u8| f32::from(v) * 0.5;
    match *op {
        Op::CreateObstacle { x, y, kind } => {
            let _ = editor.create_obstacle_logged(MapPos::new(half(x), half(y)), kind);
        }
        Op::RemoveObstacle(nth) => {
            if let Some(handle) = nth_obstacle(editor, nth) {
                let _ = editor.remove_obstacle_logged(handle);
            }
        }
        Op::MoveObstacle { nth, x, y } => {
            if let Some(handle) = nth_obstacle(editor, nth) {
                let _ = editor.move_obstacle_logged(handle, MapPos::new(half(x), half(y)));
            }
        }
        Op::SetFloor { x, y, floor } => {
            let _ = editor.set_floor_logged(TilePos::new(x, y), floor);
        }
        Op::ToggleWaypoint { x, y, suppress } => {
            let _ = editor.toggle_waypoint_logged(TilePos::new(x, y), suppress);
        }
        Op::ToggleConnection(a, b) => {
            let count = editor.level().waypoints().len();
            if count > 0 {
                let _ = editor.toggle_waypoint_connection_logged(a % count, b % count);
            }
        }
        Op::SetObstacleLabel { nth, name } => {
            if let Some(handle) = nth_obstacle(editor, nth) {
                let _ = editor.set_obstacle_label_logged(handle, Some(name));
            }
        }
        Op::SetObstacleDescription { nth, text } => {
            if let Some(handle) = nth_obstacle(editor, nth) {
                let _ = editor.set_obstacle_description_logged(handle, Some(text));
            }
        }
        Op::SetMapLabel { id, name, x, y } => {
            let _ = editor.set_map_label_logged(id, Some(name), TilePos::new(x, y));
        }
    }
}

/// Run `ops`, returning the state before every op that was logged
fn run(editor: &mut Editor, ops: &[Op]) -> Vec<Snapshot> {
    let mut history = Vec::new();
    for op in ops {
        let before = snapshot(editor.level());
        let depth = editor.log().undo_depth();
        apply(editor, op);
        let pushed = editor.log().undo_depth() - depth;
        assert!(pushed <= 1, "{op:?} pushed {pushed} records");
        if pushed == 1 {
            history.push(before);
        } else {
            assert_eq!(snapshot(editor.level()), before, "refused {op:?} changed the level");
        }
    }
    history
}

// ═══════════════════════════════════════════════════════════════════════
// 1-2. Undo walks back through every state, redo walks forward again
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn undo_restores_every_earlier_state(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut editor = test_editor();
        let history = run(&mut editor, &ops);
        let last = snapshot(editor.level());

        for expected in history.iter().rev() {
            prop_assert!(editor.undo());
            prop_assert_eq!(&snapshot(editor.level()), expected);
        }
        prop_assert!(!editor.undo());

        for _ in 0..history.len() {
            prop_assert!(editor.redo());
        }
        prop_assert!(!editor.redo());
        prop_assert_eq!(snapshot(editor.level()), last);
    }

    #[test]
    fn new_edit_drops_redo_branch(
        ops in prop::collection::vec(op_strategy(), 1..20),
        undos in 1usize..5,
        (x, y) in (0..SIZE, 0..SIZE),
    ) {
        let mut editor = test_editor();
        run(&mut editor, &ops);
        for _ in 0..undos {
            editor.undo();
        }

        let current = editor.level().floor(TilePos::new(x, y)).unwrap_or(SAND);
        let next = if current == STONE { SAND } else { STONE };
        prop_assert!(editor.set_floor_logged(TilePos::new(x, y), next).is_ok());
        prop_assert!(!editor.log().can_redo());
        prop_assert!(!editor.redo());
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Grouped floor edit
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn grouped_floor_edit_round_trip() {
    let mut editor = Editor::new(
        Level::new("Scenario".to_string(), 10, 10, SAND),
        ObstacleCatalog::default(),
    );
    let pos = TilePos::new(2, 2);

    editor.set_floor_logged(pos, STONE).unwrap();
    editor.push_grouping_marker(1);
    assert_eq!(editor.log().undo_depth(), 2);

    assert!(editor.undo());
    assert_eq!(editor.level().floor(pos), Some(SAND));
    assert!(!editor.log().can_undo());
    assert_eq!(editor.log().redo_depth(), 2);

    assert!(editor.redo());
    assert_eq!(editor.level().floor(pos), Some(STONE));
    assert_eq!(editor.log().undo_depth(), 2);
    assert!(!editor.log().can_redo());
}
