use std::fmt;

use serde::{Deserialize, Serialize};

use crate::piece::Color;
use crate::rules;
use crate::state::GameState;

/// Classification of a position for the side to move.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub enum GameStatus {
    Normal,
    /// The given side is in check but has a legal reply.
    Check(Color),
    /// The given side has been mated.
    Checkmate(Color),
    Stalemate,
    FiftyMoveDraw,
    ThreefoldRepetitionDraw,
}

impl GameStatus {
    /// Does this status end the game?
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::Normal | GameStatus::Check(_))
    }

    /// Winner, if the game ended decisively.
    pub fn winner(self) -> Option<Color> {
        match self {
            GameStatus::Checkmate(loser) => Some(loser.opposite()),
            _ => None,
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Normal => write!(f, "In progress"),
            GameStatus::Check(c) => write!(f, "{c} is in check!"),
            GameStatus::Checkmate(c) => write!(f, "Checkmate! {c} loses!"),
            GameStatus::Stalemate => write!(f, "Stalemate! It's a draw!"),
            GameStatus::FiftyMoveDraw => write!(f, "Draw by Fifty-Move Rule!"),
            GameStatus::ThreefoldRepetitionDraw => write!(f, "Draw by Threefold Repetition!"),
        }
    }
}

pub fn in_check(state: &GameState, color: Color) -> bool {
    state.board.is_in_check(color)
}

pub fn is_checkmate(state: &GameState, color: Color) -> bool {
    in_check(state, color) && !rules::has_legal_move(state, color)
}

pub fn is_stalemate(state: &GameState, color: Color) -> bool {
    !in_check(state, color) && !rules::has_legal_move(state, color)
}

/// 100 half-moves without a pawn move or capture.
pub fn is_fifty_move_draw(state: &GameState) -> bool {
    state.halfmove_clock >= 100
}

/// The newest repetition key has appeared at least twice before, making
/// this its third occurrence.
pub fn is_threefold_repetition(state: &GameState) -> bool {
    match state.repetition_history.split_last() {
        Some((current, prior)) => prior.iter().filter(|&k| k == current).count() >= 2,
        None => false,
    }
}

/// Status for the side to move. Check and mate win over stalemate, which
/// wins over the fifty-move rule, which wins over repetition.
pub fn evaluate(state: &GameState) -> GameStatus {
    let side = state.side_to_move;
    if in_check(state, side) {
        if rules::has_legal_move(state, side) {
            GameStatus::Check(side)
        } else {
            GameStatus::Checkmate(side)
        }
    } else if !rules::has_legal_move(state, side) {
        GameStatus::Stalemate
    } else if is_fifty_move_draw(state) {
        GameStatus::FiftyMoveDraw
    } else if is_threefold_repetition(state) {
        GameStatus::ThreefoldRepetitionDraw
    } else {
        GameStatus::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::config::RepetitionRule;
    use crate::piece::Piece;
    use crate::square::Square;

    fn position(pieces: &[(&str, char)], side: Color) -> GameState {
        let mut board = Board::empty();
        for &(at, c) in pieces {
            board.set(Square::parse(at).unwrap(), Piece::from_char(c));
        }
        GameState::from_board(board, side, RepetitionRule::Position)
    }

    #[test]
    fn check_with_single_escape_is_not_mate() {
        // Black king h8 checked by the rook on a8; g7 is its only flight square.
        let state = position(&[("h8", 'k'), ("h7", 'p'), ("a8", 'R'), ("e1", 'K')], Color::Black);
        assert_eq!(rules::legal_moves(&state, Color::Black).len(), 1);
        assert!(in_check(&state, Color::Black));
        assert!(!is_checkmate(&state, Color::Black));
        assert_eq!(evaluate(&state), GameStatus::Check(Color::Black));

        // Cover g7 with a bishop and the last escape is gone.
        let mated = position(
            &[("h8", 'k'), ("h7", 'p'), ("a8", 'R'), ("e5", 'B'), ("e1", 'K')],
            Color::Black,
        );
        assert!(is_checkmate(&mated, Color::Black));
        assert_eq!(evaluate(&mated), GameStatus::Checkmate(Color::Black));
        assert_eq!(evaluate(&mated).winner(), Some(Color::White));
    }

    #[test]
    fn stalemate_when_no_moves_and_not_in_check() {
        let state = position(&[("a8", 'k'), ("b6", 'Q'), ("c1", 'K')], Color::Black);
        assert!(!in_check(&state, Color::Black));
        assert!(is_stalemate(&state, Color::Black));
        assert_eq!(evaluate(&state), GameStatus::Stalemate);
        assert!(GameStatus::Stalemate.is_terminal());
    }

    #[test]
    fn fifty_move_rule_at_one_hundred_plies() {
        let mut state = position(&[("a8", 'k'), ("h1", 'K'), ("d4", 'R')], Color::White);
        state.halfmove_clock = 99;
        assert!(!is_fifty_move_draw(&state));
        state.halfmove_clock = 100;
        assert_eq!(evaluate(&state), GameStatus::FiftyMoveDraw);
    }

    #[test]
    fn repetition_needs_two_prior_occurrences() {
        let mut state = GameState::new();
        let key = state.position_key();
        state.repetition_history = vec![key.clone(), "other".into(), key.clone()];
        assert!(!is_threefold_repetition(&state));
        state.repetition_history.push(key);
        assert!(is_threefold_repetition(&state));
        assert_eq!(evaluate(&state), GameStatus::ThreefoldRepetitionDraw);
    }

    #[test]
    fn status_messages() {
        assert_eq!(GameStatus::Checkmate(Color::White).to_string(), "Checkmate! White loses!");
        assert_eq!(GameStatus::Check(Color::Black).to_string(), "Black is in check!");
        assert!(!GameStatus::Check(Color::Black).is_terminal());
    }
}
