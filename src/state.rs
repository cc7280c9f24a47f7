use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::config::RepetitionRule;
use crate::moves::Move;
use crate::piece::{Color, Piece};
use crate::square::Square;
use crate::status::GameStatus;

/// Records whether each king and corner rook has ever left its origin
/// square. Flags are only ever set, never cleared.
#[derive(Clone, Copy, Default, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct CastlingRights {
    pub white_king_moved: bool,
    pub white_rook_a_moved: bool,
    pub white_rook_h_moved: bool,
    pub black_king_moved: bool,
    pub black_rook_a_moved: bool,
    pub black_rook_h_moved: bool,
}

impl CastlingRights {
    pub fn king_moved(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_king_moved,
            Color::Black => self.black_king_moved,
        }
    }

    /// Has the rook that started on `file` (0 or 7) of `color`'s back rank moved?
    pub fn rook_moved(&self, color: Color, file: usize) -> bool {
        match (color, file) {
            (Color::White, 0) => self.white_rook_a_moved,
            (Color::White, 7) => self.white_rook_h_moved,
            (Color::Black, 0) => self.black_rook_a_moved,
            (Color::Black, 7) => self.black_rook_h_moved,
            _ => true,
        }
    }

    pub fn mark_king(&mut self, color: Color) {
        match color {
            Color::White => self.white_king_moved = true,
            Color::Black => self.black_king_moved = true,
        }
    }

    pub fn mark_rook(&mut self, color: Color, file: usize) {
        match (color, file) {
            (Color::White, 0) => self.white_rook_a_moved = true,
            (Color::White, 7) => self.white_rook_h_moved = true,
            (Color::Black, 0) => self.black_rook_a_moved = true,
            (Color::Black, 7) => self.black_rook_h_moved = true,
            _ => {}
        }
    }

    /// Short form for position keys, e.g. `KQkq` or `-`.
    fn code(&self) -> String {
        let mut s = String::new();
        if !self.white_king_moved && !self.white_rook_h_moved { s.push('K'); }
        if !self.white_king_moved && !self.white_rook_a_moved { s.push('Q'); }
        if !self.black_king_moved && !self.black_rook_h_moved { s.push('k'); }
        if !self.black_king_moved && !self.black_rook_a_moved { s.push('q'); }
        if s.is_empty() { s.push('-'); }
        s
    }
}

/// One executed move as shown in the move log.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    pub mv: Move,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub notation: String,
}

/// Everything needed to continue a game. Cloning it gives a full history snapshot.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub side_to_move: Color,
    pub castling: CastlingRights,
    pub en_passant_target: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
    pub repetition: RepetitionRule,
    /// Position keys, starting position first, one more per executed move.
    pub repetition_history: Vec<String>,
    pub moves: Vec<MoveRecord>,
    pub captured: Vec<Piece>,
    pub status: GameStatus,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self::with_rule(RepetitionRule::default())
    }

    pub fn with_rule(repetition: RepetitionRule) -> Self {
        Self::from_board(Board::new(), Color::White, repetition)
    }

    /// A fresh game from an arbitrary placement. Castling rights start
    /// intact; castling still needs king and rook on their origin squares.
    pub fn from_board(board: Board, side_to_move: Color, repetition: RepetitionRule) -> Self {
        let mut state = GameState {
            board,
            side_to_move,
            castling: CastlingRights::default(),
            en_passant_target: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            repetition,
            repetition_history: Vec::new(),
            moves: Vec::new(),
            captured: Vec::new(),
            status: GameStatus::Normal,
        };
        state.repetition_history.push(state.position_key());
        state.status = crate::status::evaluate(&state);
        state
    }

    /// Key compared for threefold repetition under the configured rule.
    pub fn position_key(&self) -> String {
        match self.repetition {
            RepetitionRule::BoardOnly => self.board.encode(),
            RepetitionRule::Position => {
                let side = match self.side_to_move {
                    Color::White => 'w',
                    Color::Black => 'b',
                };
                let ep = self
                    .en_passant_target
                    .map(|sq| sq.to_string())
                    .unwrap_or_else(|| "-".to_string());
                format!("{} {side} {} {ep}", self.board.encode(), self.castling.code())
            }
        }
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.moves.last()
    }

    pub fn notation_log(&self) -> Vec<&str> {
        self.moves.iter().map(|m| m.notation.as_str()).collect()
    }
}
