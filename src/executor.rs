use serde::{Deserialize, Serialize};

use crate::error::MoveError;
use crate::moves::{notation, Move};
use crate::piece::{Color, Piece, PieceType};
use crate::rules;
use crate::square::Square;
use crate::state::{GameState, MoveRecord};
use crate::status::{self, GameStatus};

/// A pawn move that reached the last rank and is waiting for the player to
/// pick a piece. Nothing on the board has changed yet.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct PendingPromotion {
    pub mv: Move,
    pub color: Color,
}

/// The result of an executed move.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MoveReport {
    pub record: MoveRecord,
    /// Status of the side now on move.
    pub status: GameStatus,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied(MoveReport),
    PromotionPending(PendingPromotion),
}

/// Validate and execute `mv`. A pawn reaching the last rank without a valid
/// promotion choice is suspended instead of executed.
pub fn apply(state: &mut GameState, mv: &Move) -> Result<ApplyOutcome, MoveError> {
    rules::validate(state, mv)?;
    let piece = state.board.get(mv.from).ok_or(MoveError::NoPieceAtOrigin)?;

    if reaches_last_rank(piece, mv.to) {
        match mv.promotion {
            Some(kind) if kind.is_promotion_choice() => {}
            _ => {
                return Ok(ApplyOutcome::PromotionPending(PendingPromotion {
                    mv: Move::new(mv.from, mv.to),
                    color: piece.color,
                }))
            }
        }
    }
    execute(state, mv).map(ApplyOutcome::Applied)
}

/// Complete a suspended promotion. An invalid kind is refused and the
/// pending move may be resumed again with another choice.
pub fn finish_promotion(
    state: &mut GameState,
    pending: &PendingPromotion,
    kind: PieceType,
) -> Result<MoveReport, MoveError> {
    if !kind.is_promotion_choice() {
        return Err(MoveError::InvalidPromotion(kind));
    }
    let mv = pending.mv.with_promotion(kind);
    rules::validate(state, &mv)?;
    execute(state, &mv)
}

fn reaches_last_rank(piece: Piece, to: Square) -> bool {
    piece.piece_type == PieceType::Pawn && to.rank == piece.color.promotion_rank()
}

fn execute(state: &mut GameState, mv: &Move) -> Result<MoveReport, MoveError> {
    let destination_occupied = !state.board.is_empty(mv.to);
    let en_passant_before = state.en_passant_target.take();

    let placement = state
        .board
        .place(mv.from, mv.to, en_passant_before)
        .ok_or(MoveError::NoPieceAtOrigin)?;
    let piece = placement.piece;
    let is_pawn = piece.piece_type == PieceType::Pawn;

    if let Some(captured) = placement.captured {
        state.captured.push(captured);
    }
    if is_pawn || placement.captured.is_some() {
        state.halfmove_clock = 0;
    } else {
        state.halfmove_clock += 1;
    }

    if is_pawn && mv.from.rank.abs_diff(mv.to.rank) == 2 {
        state.en_passant_target = Some(Square::new((mv.from.rank + mv.to.rank) / 2, mv.from.file));
    }

    match piece.piece_type {
        PieceType::King => state.castling.mark_king(piece.color),
        PieceType::Rook => state.castling.mark_rook(piece.color, mv.from.file),
        _ => {}
    }

    let mut executed = Move::new(mv.from, mv.to);
    if reaches_last_rank(piece, mv.to) {
        if let Some(kind) = mv.promotion {
            state.board.set(mv.to, Some(Piece::new(kind, piece.color)));
            executed.promotion = Some(kind);
        }
    }

    if piece.color == Color::Black {
        state.fullmove_number += 1;
    }
    state.side_to_move = piece.color.opposite();
    state.repetition_history.push(state.position_key());

    let record = MoveRecord {
        mv: executed,
        piece,
        captured: placement.captured,
        notation: notation(piece, &executed, destination_occupied),
    };
    state.moves.push(record.clone());
    state.status = status::evaluate(state);

    log::debug!("{} played, {} to move: {}", record.notation, state.side_to_move, state.status);
    Ok(MoveReport {
        record,
        status: state.status,
    })
}
