use thiserror::Error;

use crate::piece::PieceType;
use crate::status::GameStatus;

/// Why a move attempt was refused. A refusal never changes the game.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("no piece on the origin square")]
    NoPieceAtOrigin,
    #[error("that piece belongs to the side not on move")]
    NotYourTurn,
    #[error("origin and destination are the same square")]
    SameSquare,
    #[error("destination holds a piece of the same color")]
    FriendlyCapture,
    #[error("move would leave the king in check")]
    LeavesKingInCheck,
    #[error("piece cannot move that way")]
    ShapeInvalid,
    #[error("path is blocked")]
    PathBlocked,
    #[error("king or rook has already moved")]
    CastlingRightsLost,
    #[error("king's castling path is attacked")]
    CastlingPathAttacked,
    #[error("cannot promote to {0}; choose queen, rook, bishop or knight")]
    InvalidPromotion(PieceType),
}

/// Errors surfaced by a [`crate::game::Game`] session.
#[derive(Error, Debug)]
pub enum GameError {
    #[error("illegal move: {0}")]
    Move(#[from] MoveError),
    #[error("game is already over: {0}")]
    GameOver(GameStatus),
    #[error("a promotion choice is pending")]
    PromotionPending,
    #[error("no promotion is pending")]
    NoPendingPromotion,
    #[error("no moves to undo")]
    NothingToUndo,
    #[error("undo window has closed")]
    UndoWindowClosed,
    #[error("no moves to redo")]
    NothingToRedo,
    #[error("invalid square notation: {0}")]
    InvalidSquare(String),
    #[error("invalid move notation: {0}")]
    InvalidMove(String),
    #[error("snapshot serialization failed: {0}")]
    Persistence(#[from] serde_json::Error),
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),
}
