//! Action log for undo/redo
//!
//! A single linear history: pushing a new action after undos drops the redo
//! branch. `Action::Group(n)` markers bundle the `n` entries below them into
//! one step; groups may nest.
//!
//! With a history limit, every push outside a gesture is a closed step and
//! may be trimmed right away. Code that pushes several records and then a
//! group marker must bracket them with [`ActionLog::begin_gesture`] and
//! [`ActionLog::end_gesture`] so none of them is trimmed before the marker
//! claims it.

pub mod action;
#[cfg(feature = "bevy")]
pub mod shortcuts;

pub use action::{Action, WaypointToggle};
#[cfg(feature = "bevy")]
pub use shortcuts::handle_history_shortcuts;

use droid_map_core::Level;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Replay {
    Forward,
    Inverse,
}

/// Undo and redo stacks of [`Action`] records
#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    /// Stack of actions that can be undone (most recent at end)
    undo_stack: Vec<Action>,
    /// Stack of actions that can be redone (most recent at end)
    redo_stack: Vec<Action>,
    /// Maximum number of undo steps to keep, groups counting as one
    max_steps: Option<usize>,
    /// Open gestures; trimming waits until every gesture is closed
    open_gestures: usize,
}

impl ActionLog {
    pub fn new(max_steps: Option<usize>) -> Self {
        Self {
            max_steps,
            ..Default::default()
        }
    }

    pub fn max_steps(&self) -> Option<usize> {
        self.max_steps
    }

    pub fn set_max_steps(&mut self, max_steps: Option<usize>) {
        self.max_steps = max_steps;
        self.trim();
    }

    /// Append an already-applied action and drop the redo branch
    ///
    /// A group marker claiming more steps than the stack holds is shortened
    /// to what is there.
    pub fn push(&mut self, action: Action) {
        let action = match action {
            Action::Group(count) => {
                let available = step_starts(&self.undo_stack).len();
                if count > available {
                    warn!(
                        count,
                        available, "Group marker claims trimmed or missing steps, shortening it"
                    );
                }
                Action::Group(count.min(available))
            }
            action => action,
        };
        self.undo_stack.push(action);
        self.redo_stack.clear();
        self.trim();
    }

    /// Undo the last step
    /// Returns true if something was undone
    pub fn undo(&mut self, level: &mut Level) -> bool {
        Self::replay(
            &mut self.undo_stack,
            Some(&mut self.redo_stack),
            level,
            Replay::Inverse,
        )
    }

    /// Redo the last undone step
    /// Returns true if something was redone
    pub fn redo(&mut self, level: &mut Level) -> bool {
        Self::replay(
            &mut self.redo_stack,
            Some(&mut self.undo_stack),
            level,
            Replay::Forward,
        )
    }

    /// Undo the last step and forget it; the redo stack is left alone
    pub fn revert_last(&mut self, level: &mut Level) -> bool {
        Self::replay(&mut self.undo_stack, None, level, Replay::Inverse)
    }

    /// Pop the newest raw record without applying anything
    pub fn discard_last(&mut self) -> Option<Action> {
        self.undo_stack.pop()
    }

    /// Newest record on the undo stack
    pub fn last(&self) -> Option<&Action> {
        self.undo_stack.last()
    }

    /// Pop one step from `from`, apply it and move it to `to`
    ///
    /// A group marker pulls the entries it covers along with it, so the
    /// whole group lands on `to` in an order the opposite replay can undo.
    fn replay(
        from: &mut Vec<Action>,
        mut to: Option<&mut Vec<Action>>,
        level: &mut Level,
        direction: Replay,
    ) -> bool {
        let Some(action) = from.pop() else {
            return false;
        };

        if let Action::Group(count) = action {
            for replayed in 0..count {
                if !Self::replay(from, to.as_deref_mut(), level, direction) {
                    debug!(count, replayed, "Group marker covers more entries than exist");
                    break;
                }
            }
        } else {
            let result = match direction {
                Replay::Forward => action.apply_forward(level),
                Replay::Inverse => action.apply_inverse(level),
            };
            if let Err(error) = &result {
                warn!(
                    action = action.description(),
                    ?direction,
                    %error,
                    "Skipping action that no longer matches the level"
                );
            }
            debug_assert!(result.is_ok(), "action replay failed: {result:?}");
        }

        if let Some(to) = to {
            to.push(action);
        }
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Raw record count on the undo stack
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Raw record count on the redo stack
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Number of undo steps, groups counting as one
    pub fn undo_steps(&self) -> usize {
        step_starts(&self.undo_stack).len()
    }

    /// Get the description of the action that would be undone
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(Action::description)
    }

    /// Get the description of the action that would be redone
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(Action::description)
    }

    /// Clear all action history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Hold off trimming until the matching [`ActionLog::end_gesture`]
    pub fn begin_gesture(&mut self) {
        self.open_gestures += 1;
    }

    pub fn end_gesture(&mut self) {
        self.open_gestures = self.open_gestures.saturating_sub(1);
        self.trim();
    }

    pub fn gesture_open(&self) -> bool {
        self.open_gestures > 0
    }

    /// Drop the oldest steps beyond the history limit
    fn trim(&mut self) {
        let Some(max_steps) = self.max_steps else {
            return;
        };
        if self.gesture_open() {
            return;
        }

        let starts = step_starts(&self.undo_stack);
        if starts.len() <= max_steps {
            return;
        }
        // `starts` runs newest first; keep the newest `max_steps` steps.
        let cut = if max_steps == 0 {
            self.undo_stack.len()
        } else {
            starts[max_steps - 1]
        };
        self.undo_stack.drain(..cut);
        debug!(
            dropped = cut,
            kept = self.undo_stack.len(),
            "Trimmed action history"
        );
    }
}

/// Start index of every logical step on a stack, newest step first
fn step_starts(stack: &[Action]) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut end = stack.len();
    while end > 0 {
        end = step_start(stack, end);
        starts.push(end);
    }
    starts
}

/// Start index of the step whose last record sits at `end - 1`
fn step_start(stack: &[Action], end: usize) -> usize {
    let Some(top) = end.checked_sub(1) else {
        return 0;
    };
    let mut start = top;
    if let Some(Action::Group(count)) = stack.get(top) {
        for _ in 0..*count {
            if start == 0 {
                break;
            }
            start = step_start(stack, start);
        }
    }
    start
}
