use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// What counts as "the same position" for threefold repetition.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "snake_case")]
pub enum RepetitionRule {
    /// Grid, side to move, castling rights and en-passant target must all match.
    #[default]
    Position,
    /// Only the piece placement is compared.
    BoardOnly,
}

/// Session settings. Every field has a default, so a partial JSON object
/// such as `{"undo_window_ms": 3000}` is a valid configuration.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct GameConfig {
    /// How long after a move (or redo) an undo is still accepted.
    pub undo_window_ms: u64,
    pub repetition: RepetitionRule,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    pub const DEFAULT_UNDO_WINDOW_MS: u64 = 10_000;

    pub fn new() -> Self {
        GameConfig {
            undo_window_ms: Self::DEFAULT_UNDO_WINDOW_MS,
            repetition: RepetitionRule::Position,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, GameError> {
        Ok(serde_json::from_str(json)?)
    }

    /// String-keyed setter for front ends. Returns false for unknown keys or values.
    pub fn set_option(&mut self, name: &str, value: &str) -> bool {
        match name {
            "undo_window_ms" => match value.parse() {
                Ok(ms) => {
                    self.undo_window_ms = ms;
                    true
                }
                Err(_) => false,
            },
            "repetition" => match value {
                "position" => {
                    self.repetition = RepetitionRule::Position;
                    true
                }
                "board_only" => {
                    self.repetition = RepetitionRule::BoardOnly;
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }
}
