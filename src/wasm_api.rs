use crate::config::GameConfig;
use crate::executor::ApplyOutcome;
use crate::game::Game as Session;
use crate::moves::Move;
use crate::piece::{Color, PieceType};
use crate::square::Square;
use crate::status::GameStatus;
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct SquarePiece {
    piece_type: String,
    color: String,
}

#[derive(Serialize)]
struct BoardState {
    squares: Vec<Vec<Option<SquarePiece>>>,
    current_turn: String,
    status: String,
    message: String,
    game_over: bool,
    is_in_check: bool,
    captured: Vec<String>,
    moves: Vec<String>,
    last_move: Option<[[usize; 2]; 2]>,
    promotion_pending: Option<[[usize; 2]; 2]>,
    can_undo: bool,
    can_redo: bool,
    undo_ms_remaining: u64,
}

#[derive(Serialize)]
struct MoveResult {
    #[serde(flatten)]
    board_state: Option<BoardState>,
    error: Option<String>,
}

fn color_to_string(c: Color) -> String {
    c.to_string()
}

fn status_to_string(status: GameStatus) -> String {
    match status {
        GameStatus::Normal => "normal",
        GameStatus::Check(_) => "check",
        GameStatus::Checkmate(_) => "checkmate",
        GameStatus::Stalemate => "stalemate",
        GameStatus::FiftyMoveDraw => "fifty_move_draw",
        GameStatus::ThreefoldRepetitionDraw => "threefold_repetition_draw",
    }
    .to_string()
}

fn string_to_piece_type(s: &str) -> Option<PieceType> {
    match s {
        "Queen" | "q" | "Q" => Some(PieceType::Queen),
        "Rook" | "r" | "R" => Some(PieceType::Rook),
        "Bishop" | "b" | "B" => Some(PieceType::Bishop),
        "Knight" | "n" | "N" => Some(PieceType::Knight),
        "King" => Some(PieceType::King),
        "Pawn" => Some(PieceType::Pawn),
        _ => None,
    }
}

fn square(rank: usize, file: usize) -> Option<Square> {
    if rank < 8 && file < 8 {
        Some(Square::new(rank, file))
    } else {
        None
    }
}

fn pair(mv: &Move) -> [[usize; 2]; 2] {
    [[mv.from.rank, mv.from.file], [mv.to.rank, mv.to.file]]
}

fn build_board_state(game: &Session) -> BoardState {
    let board = game.board();
    let squares = (0..8)
        .map(|r| {
            (0..8)
                .map(|f| {
                    board.get(Square::new(r, f)).map(|p| SquarePiece {
                        piece_type: p.piece_type.to_string(),
                        color: color_to_string(p.color),
                    })
                })
                .collect()
        })
        .collect();

    let status = game.status();
    BoardState {
        squares,
        current_turn: color_to_string(game.side_to_move()),
        status: status_to_string(status),
        message: status.to_string(),
        game_over: status.is_terminal(),
        is_in_check: matches!(status, GameStatus::Check(_) | GameStatus::Checkmate(_)),
        captured: game.captured().iter().map(|p| p.to_char().to_string()).collect(),
        moves: game.moves().iter().map(|m| m.notation.clone()).collect(),
        last_move: game.state().last_move().map(|m| pair(&m.mv)),
        promotion_pending: game.pending_promotion().map(|p| pair(&p.mv)),
        can_undo: game.can_undo(),
        can_redo: game.can_redo(),
        undo_ms_remaining: game.undo_time_remaining().as_millis() as u64,
    }
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

#[wasm_bindgen]
pub struct Game {
    session: Session,
}

#[wasm_bindgen]
impl Game {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Game {
        Game {
            session: Session::new(),
        }
    }

    /// Restore a game saved by `save`; unreadable data starts a new game.
    pub fn load(json: Option<String>) -> Game {
        let session = Session::load_or_new(json.as_deref(), GameConfig::new(), Default::default());
        Game { session }
    }

    pub fn save(&self) -> Option<String> {
        self.session.save().ok()
    }

    pub fn set_option(&mut self, name: &str, value: &str) -> bool {
        let mut config = self.session.config().clone();
        let ok = config.set_option(name, value);
        if ok {
            self.session.set_config(config);
        }
        ok
    }

    pub fn set_undo_window_ms(&mut self, ms: u32) {
        self.set_option("undo_window_ms", &ms.to_string());
    }

    pub fn get_board_state(&self) -> JsValue {
        to_js(&build_board_state(&self.session))
    }

    fn result(&self, error: Option<String>) -> JsValue {
        let result = match error {
            None => MoveResult {
                board_state: Some(build_board_state(&self.session)),
                error: None,
            },
            Some(e) => MoveResult {
                board_state: None,
                error: Some(e),
            },
        };
        to_js(&result)
    }

    pub fn make_move(
        &mut self,
        from_row: usize,
        from_col: usize,
        to_row: usize,
        to_col: usize,
        promotion: Option<String>,
    ) -> JsValue {
        let (Some(from), Some(to)) = (square(from_row, from_col), square(to_row, to_col)) else {
            return self.result(Some("Square off the board".to_string()));
        };
        let mut mv = Move::new(from, to);
        mv.promotion = promotion.as_deref().and_then(string_to_piece_type);

        match self.session.play(mv) {
            Ok(ApplyOutcome::Applied(_)) | Ok(ApplyOutcome::PromotionPending(_)) => self.result(None),
            Err(e) => self.result(Some(e.to_string())),
        }
    }

    pub fn choose_promotion(&mut self, piece: &str) -> JsValue {
        let Some(kind) = string_to_piece_type(piece) else {
            return self.result(Some(format!("Unknown piece '{piece}'; choose Q, R, B or N")));
        };
        match self.session.choose_promotion(kind) {
            Ok(_) => self.result(None),
            Err(e) => self.result(Some(e.to_string())),
        }
    }

    pub fn cancel_promotion(&mut self) -> JsValue {
        self.session.cancel_promotion();
        self.result(None)
    }

    pub fn undo(&mut self) -> JsValue {
        match self.session.undo() {
            Ok(()) => self.result(None),
            Err(e) => self.result(Some(e.to_string())),
        }
    }

    pub fn redo(&mut self) -> JsValue {
        match self.session.redo() {
            Ok(()) => self.result(None),
            Err(e) => self.result(Some(e.to_string())),
        }
    }

    pub fn reset(&mut self) -> JsValue {
        self.session.reset();
        self.result(None)
    }

    pub fn undo_time_remaining_ms(&self) -> u32 {
        self.session.undo_time_remaining().as_millis().min(u32::MAX as u128) as u32
    }

    pub fn get_legal_moves_for_square(&self, row: usize, col: usize) -> JsValue {
        let targets: Vec<[usize; 2]> = match square(row, col) {
            Some(from) => self
                .session
                .legal_destinations(from)
                .iter()
                .map(|sq| [sq.rank, sq.file])
                .collect(),
            None => Vec::new(),
        };
        to_js(&targets)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
