// =============================================================================
// Undo / redo history
//
// Both stacks hold full GameState snapshots. Every executed move pushes the
// position it was played from onto the undo stack and empties the redo
// stack. Undo is only accepted before a deadline set when the move (or a
// redo) happened; the deadline is compared against a clock reading passed in
// by the caller, so nothing ticks in the background.
// =============================================================================

use std::cell::Cell;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::state::GameState;

/// A monotonic time source. Readings are durations since an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall-clock time source for interactive play.
#[derive(Debug)]
pub struct MonotonicClock {
    #[cfg(not(target_arch = "wasm32"))]
    origin: std::time::Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock {
            #[cfg(not(target_arch = "wasm32"))]
            origin: std::time::Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        #[cfg(target_arch = "wasm32")]
        {
            Duration::from_secs_f64(js_sys::Date::now().max(0.0) / 1000.0)
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.origin.elapsed()
        }
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct HistoryManager {
    undo_stack: Vec<GameState>,
    redo_stack: Vec<GameState>,
    /// Clock readings are only meaningful within one session.
    #[serde(skip)]
    undo_deadline: Option<Duration>,
    window: Duration,
}

impl HistoryManager {
    pub fn new(window: Duration) -> Self {
        HistoryManager {
            window,
            ..Default::default()
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Change the window length. Takes effect from the next move or redo.
    pub fn set_window(&mut self, window: Duration) {
        self.window = window;
    }

    /// Remember the position a move is about to be played from.
    pub fn record(&mut self, before: GameState, now: Duration) {
        self.undo_stack.push(before);
        self.redo_stack.clear();
        self.undo_deadline = Some(now + self.window);
    }

    pub fn can_undo(&self, now: Duration) -> bool {
        !self.undo_stack.is_empty() && self.window_open(now)
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn window_open(&self, now: Duration) -> bool {
        self.undo_deadline.map(|d| now < d).unwrap_or(false)
    }

    /// Time left to undo, for display. Zero once the window has closed.
    pub fn remaining(&self, now: Duration) -> Duration {
        self.undo_deadline
            .map(|d| d.saturating_sub(now))
            .unwrap_or(Duration::ZERO)
    }

    /// Swap `current` for the most recent pre-move snapshot.
    pub fn undo(&mut self, current: &GameState, now: Duration) -> Result<GameState, GameError> {
        if self.undo_stack.is_empty() {
            return Err(GameError::NothingToUndo);
        }
        if !self.window_open(now) {
            return Err(GameError::UndoWindowClosed);
        }
        let previous = self.undo_stack.pop().ok_or(GameError::NothingToUndo)?;
        self.redo_stack.push(current.clone());
        Ok(previous)
    }

    /// Swap `current` for the most recently undone state and reopen the window.
    pub fn redo(&mut self, current: &GameState, now: Duration) -> Result<GameState, GameError> {
        let next = self.redo_stack.pop().ok_or(GameError::NothingToRedo)?;
        self.undo_stack.push(current.clone());
        self.undo_deadline = Some(now + self.window);
        Ok(next)
    }

    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.undo_deadline = None;
    }

    /// Every stored snapshot, oldest undo entry first.
    pub(crate) fn snapshots_mut(&mut self) -> impl Iterator<Item = &mut GameState> {
        self.undo_stack.iter_mut().chain(self.redo_stack.iter_mut())
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
}
