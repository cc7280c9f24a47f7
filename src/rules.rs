// =============================================================================
// Move legality
//
// A candidate move is checked in a fixed order: origin piece and turn, same
// square, friendly capture, then the check-safety gate (the move is played on
// a scratch copy of the board and the mover's king must not be attacked),
// and only then the piece's own movement rule. The gate runs before the shape
// rule, so a move that is both misshapen and self-checking reports
// `LeavesKingInCheck`.
//
// Enumeration tries every destination square for every piece of a color.
// It is only used to detect mate and stalemate and to highlight targets.
// =============================================================================

use crate::board::Board;
use crate::error::MoveError;
use crate::moves::Move;
use crate::piece::{Color, Piece, PieceType};
use crate::square::Square;
use crate::state::GameState;

/// Check a move attempt by the side to move.
pub fn validate(state: &GameState, mv: &Move) -> Result<(), MoveError> {
    let piece = state.board.get(mv.from).ok_or(MoveError::NoPieceAtOrigin)?;
    if piece.color != state.side_to_move {
        return Err(MoveError::NotYourTurn);
    }
    check_move(state, piece, mv)
}

pub fn is_legal(state: &GameState, mv: &Move) -> bool {
    validate(state, mv).is_ok()
}

/// Every legal move for `color`, whether or not it is that side's turn.
/// Promotions appear once, without a chosen piece.
pub fn legal_moves(state: &GameState, color: Color) -> Vec<Move> {
    candidates(state, color)
        .filter(|(piece, mv)| check_move(state, *piece, mv).is_ok())
        .map(|(_, mv)| mv)
        .collect()
}

pub fn has_legal_move(state: &GameState, color: Color) -> bool {
    candidates(state, color).any(|(piece, mv)| check_move(state, piece, &mv).is_ok())
}

/// Squares the piece on `from` may move to, for highlighting. Empty if the
/// square is empty or holds a piece of the side not on move.
pub fn legal_destinations(state: &GameState, from: Square) -> Vec<Square> {
    Square::all()
        .filter(|&to| validate(state, &Move::new(from, to)).is_ok())
        .collect()
}

fn candidates(state: &GameState, color: Color) -> impl Iterator<Item = (Piece, Move)> + '_ {
    state
        .board
        .pieces()
        .filter(move |(_, p)| p.color == color)
        .flat_map(|(from, piece)| Square::all().map(move |to| (piece, Move::new(from, to))))
}

fn check_move(state: &GameState, piece: Piece, mv: &Move) -> Result<(), MoveError> {
    if mv.from == mv.to {
        return Err(MoveError::SameSquare);
    }
    if let Some(target) = state.board.get(mv.to) {
        if target.color == piece.color {
            return Err(MoveError::FriendlyCapture);
        }
    }
    if leaves_king_in_check(state, piece.color, mv) {
        return Err(MoveError::LeavesKingInCheck);
    }

    let board = &state.board;
    match piece.piece_type {
        PieceType::Pawn => pawn_move(state, piece.color, mv),
        PieceType::Knight => knight_move(mv),
        PieceType::Bishop => bishop_move(board, mv),
        PieceType::Rook => rook_move(board, mv),
        PieceType::Queen => match (rook_move(board, mv), bishop_move(board, mv)) {
            (Ok(()), _) | (_, Ok(())) => Ok(()),
            (Err(MoveError::PathBlocked), _) | (_, Err(MoveError::PathBlocked)) => {
                Err(MoveError::PathBlocked)
            }
            _ => Err(MoveError::ShapeInvalid),
        },
        PieceType::King => {
            if mv.from.rank == mv.to.rank && mv.from.file.abs_diff(mv.to.file) == 2 {
                castling(state, piece.color, mv)
            } else {
                king_move(mv)
            }
        }
    }
}

fn leaves_king_in_check(state: &GameState, color: Color, mv: &Move) -> bool {
    let mut scratch = state.board.clone();
    scratch.place(mv.from, mv.to, state.en_passant_target);
    scratch.is_in_check(color)
}

fn deltas(mv: &Move) -> (i32, i32) {
    (
        mv.to.rank as i32 - mv.from.rank as i32,
        mv.to.file as i32 - mv.from.file as i32,
    )
}

fn pawn_move(state: &GameState, color: Color, mv: &Move) -> Result<(), MoveError> {
    let board = &state.board;
    let dir = color.forward();
    let (dr, df) = deltas(mv);

    if df == 0 && dr == dir && board.is_empty(mv.to) {
        return Ok(());
    }
    if df == 0 && dr == 2 * dir && mv.from.rank == color.pawn_start_rank() {
        let skipped = Square::new((mv.from.rank as i32 + dir) as usize, mv.from.file);
        if !board.is_empty(skipped) {
            return Err(MoveError::PathBlocked);
        }
        if board.is_empty(mv.to) {
            return Ok(());
        }
    }
    if df.abs() == 1 && dr == dir {
        if !board.is_empty(mv.to) {
            return Ok(());
        }
        // The target only counts when the pawn that skipped it belongs to the other side.
        let victim = board.get(Square::new(mv.from.rank, mv.to.file));
        if state.en_passant_target == Some(mv.to) && victim == Some(Piece::new(PieceType::Pawn, color.opposite())) {
            return Ok(());
        }
    }
    Err(MoveError::ShapeInvalid)
}

fn knight_move(mv: &Move) -> Result<(), MoveError> {
    let (dr, df) = deltas(mv);
    match (dr.abs(), df.abs()) {
        (2, 1) | (1, 2) => Ok(()),
        _ => Err(MoveError::ShapeInvalid),
    }
}

fn rook_move(board: &Board, mv: &Move) -> Result<(), MoveError> {
    let (dr, df) = deltas(mv);
    if dr != 0 && df != 0 {
        return Err(MoveError::ShapeInvalid);
    }
    let (step_r, step_f) = (dr.signum(), df.signum());
    let mut sq = mv.from.offset(step_r, step_f);
    while let Some(s) = sq {
        if s == mv.to {
            return Ok(());
        }
        if !board.is_empty(s) {
            return Err(MoveError::PathBlocked);
        }
        sq = s.offset(step_r, step_f);
    }
    Ok(())
}

fn bishop_move(board: &Board, mv: &Move) -> Result<(), MoveError> {
    let (dr, df) = deltas(mv);
    if dr.abs() != df.abs() {
        return Err(MoveError::ShapeInvalid);
    }
    let (step_r, step_f) = (dr.signum(), df.signum());
    let (end_r, end_f) = (mv.to.rank as i32, mv.to.file as i32);
    let mut r = mv.from.rank as i32 + step_r;
    let mut f = mv.from.file as i32 + step_f;
    // Walk while both coordinates still differ from the destination.
    while r != end_r && f != end_f {
        if !board.is_empty(Square::new(r as usize, f as usize)) {
            return Err(MoveError::PathBlocked);
        }
        r += step_r;
        f += step_f;
    }
    Ok(())
}

fn king_move(mv: &Move) -> Result<(), MoveError> {
    let (dr, df) = deltas(mv);
    if dr.abs() <= 1 && df.abs() <= 1 {
        Ok(())
    } else {
        Err(MoveError::ShapeInvalid)
    }
}

fn castling(state: &GameState, color: Color, mv: &Move) -> Result<(), MoveError> {
    let board = &state.board;
    let rank = color.back_rank();
    if mv.from != Square::new(rank, 4) || !(mv.to.file == 6 || mv.to.file == 2) {
        return Err(MoveError::ShapeInvalid);
    }

    let rook_file = if mv.to.file == 6 { 7 } else { 0 };
    let rook_home = board.get(Square::new(rank, rook_file)) == Some(Piece::new(PieceType::Rook, color));
    if state.castling.king_moved(color) || state.castling.rook_moved(color, rook_file) || !rook_home {
        return Err(MoveError::CastlingRightsLost);
    }

    let mut between = if rook_file == 7 { 5..7 } else { 1..4 };
    if between.any(|f| !board.is_empty(Square::new(rank, f))) {
        return Err(MoveError::PathBlocked);
    }

    let transit = (4 + mv.to.file) / 2;
    let opponent = color.opposite();
    if [4, transit, mv.to.file]
        .iter()
        .any(|&f| board.is_square_attacked_by(Square::new(rank, f), opponent))
    {
        return Err(MoveError::CastlingPathAttacked);
    }
    Ok(())
}
