pub mod board;
pub mod config;
pub mod error;
pub mod executor;
pub mod game;
pub mod history;
pub mod moves;
pub mod persist;
pub mod piece;
pub mod rules;
pub mod square;
pub mod state;
pub mod status;

pub use config::{GameConfig, RepetitionRule};
pub use error::{GameError, MoveError};
pub use executor::{ApplyOutcome, MoveReport, PendingPromotion};
pub use game::Game;
pub use moves::Move;
pub use piece::{Color, Piece, PieceType};
pub use square::Square;
pub use state::GameState;
pub use status::GameStatus;

#[cfg(target_arch = "wasm32")]
mod wasm_api;
