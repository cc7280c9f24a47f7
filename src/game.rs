use std::time::Duration;

use crate::board::Board;
use crate::config::GameConfig;
use crate::error::GameError;
use crate::executor::{self, ApplyOutcome, MoveReport, PendingPromotion};
use crate::history::{Clock, HistoryManager, MonotonicClock};
use crate::moves::Move;
use crate::piece::{Color, Piece, PieceType};
use crate::rules;
use crate::square::Square;
use crate::state::{GameState, MoveRecord};
use crate::status::GameStatus;

/// One two-player game session: the position, its undo/redo history, and
/// any promotion waiting for a choice.
#[derive(Debug)]
pub struct Game<C: Clock = MonotonicClock> {
    pub(crate) state: GameState,
    pub(crate) history: HistoryManager,
    pending: Option<PendingPromotion>,
    pub(crate) config: GameConfig,
    clock: C,
}

impl Default for Game<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl Game<MonotonicClock> {
    pub fn new() -> Self {
        Self::with_config(GameConfig::new())
    }

    pub fn with_config(config: GameConfig) -> Self {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl<C: Clock> Game<C> {
    pub fn with_clock(config: GameConfig, clock: C) -> Self {
        Game {
            state: GameState::with_rule(config.repetition),
            history: HistoryManager::new(Duration::from_millis(config.undo_window_ms)),
            pending: None,
            config,
            clock,
        }
    }

    /// Assemble a session from already validated parts.
    pub(crate) fn from_parts(state: GameState, mut history: HistoryManager, config: GameConfig, clock: C) -> Self {
        history.set_window(Duration::from_millis(config.undo_window_ms));
        Game {
            state,
            history,
            pending: None,
            config,
            clock,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn board(&self) -> &Board {
        &self.state.board
    }

    pub fn side_to_move(&self) -> Color {
        self.state.side_to_move
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    pub fn captured(&self) -> &[Piece] {
        &self.state.captured
    }

    pub fn moves(&self) -> &[MoveRecord] {
        &self.state.moves
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn pending_promotion(&self) -> Option<&PendingPromotion> {
        self.pending.as_ref()
    }

    /// Replace the settings. A new undo window applies from the next move;
    /// a new repetition rule applies from the next reset.
    pub fn set_config(&mut self, config: GameConfig) {
        self.history.set_window(Duration::from_millis(config.undo_window_ms));
        self.config = config;
    }

    pub fn is_legal(&self, mv: &Move) -> bool {
        self.pending.is_none() && rules::is_legal(&self.state, mv)
    }

    /// Targets to highlight for the piece on `from`.
    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        if self.pending.is_some() || self.state.status.is_terminal() {
            return Vec::new();
        }
        rules::legal_destinations(&self.state, from)
    }

    pub fn attempt_move(&mut self, from: Square, to: Square) -> Result<ApplyOutcome, GameError> {
        self.play(Move::new(from, to))
    }

    /// Play a move in coordinate notation such as `e2e4` or `e7e8q`.
    pub fn play_uci(&mut self, s: &str) -> Result<ApplyOutcome, GameError> {
        let mv = Move::from_uci(s).ok_or_else(|| GameError::InvalidMove(s.to_string()))?;
        self.play(mv)
    }

    pub fn play(&mut self, mv: Move) -> Result<ApplyOutcome, GameError> {
        if self.pending.is_some() {
            return Err(GameError::PromotionPending);
        }
        if self.state.status.is_terminal() {
            return Err(GameError::GameOver(self.state.status));
        }

        let before = self.state.clone();
        match executor::apply(&mut self.state, &mv) {
            Ok(ApplyOutcome::Applied(report)) => {
                self.history.record(before, self.clock.now());
                announce(&report);
                Ok(ApplyOutcome::Applied(report))
            }
            Ok(ApplyOutcome::PromotionPending(pending)) => {
                self.pending = Some(pending);
                Ok(ApplyOutcome::PromotionPending(pending))
            }
            Err(e) => {
                log::debug!("rejected {}: {e}", mv.to_uci());
                Err(e.into())
            }
        }
    }

    /// Resume a suspended promotion. An invalid kind leaves the promotion
    /// pending so the caller can ask again.
    pub fn choose_promotion(&mut self, kind: PieceType) -> Result<MoveReport, GameError> {
        let pending = self.pending.ok_or(GameError::NoPendingPromotion)?;
        let before = self.state.clone();
        let report = executor::finish_promotion(&mut self.state, &pending, kind)?;
        self.pending = None;
        self.history.record(before, self.clock.now());
        announce(&report);
        Ok(report)
    }

    /// Abandon a suspended promotion; the pawn stays where it was.
    pub fn cancel_promotion(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.pending.is_none() && self.history.can_undo(self.clock.now())
    }

    pub fn can_redo(&self) -> bool {
        self.pending.is_none() && self.history.can_redo()
    }

    pub fn undo_time_remaining(&self) -> Duration {
        self.history.remaining(self.clock.now())
    }

    pub fn undo(&mut self) -> Result<(), GameError> {
        if self.pending.is_some() {
            return Err(GameError::PromotionPending);
        }
        self.state = self.history.undo(&self.state, self.clock.now())?;
        log::info!("undo: {} to move", self.state.side_to_move);
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), GameError> {
        if self.pending.is_some() {
            return Err(GameError::PromotionPending);
        }
        self.state = self.history.redo(&self.state, self.clock.now())?;
        log::info!("redo: {} to move", self.state.side_to_move);
        Ok(())
    }

    /// Start over from the initial position with empty history.
    pub fn reset(&mut self) {
        self.state = GameState::with_rule(self.config.repetition);
        self.history.reset();
        self.pending = None;
    }
}

fn announce(report: &MoveReport) {
    if report.status.is_terminal() {
        log::info!("{} ends the game: {}", report.record.notation, report.status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepetitionRule;
    use crate::history::ManualClock;

    fn game() -> Game<ManualClock> {
        let config = GameConfig {
            undo_window_ms: 5_000,
            ..GameConfig::new()
        };
        Game::with_clock(config, ManualClock::new())
    }

    fn sq(s: &str) -> Square {
        Square::parse(s).unwrap()
    }

    fn play_all(game: &mut Game<ManualClock>, moves: &[&str]) {
        for m in moves {
            match game.play_uci(m) {
                Ok(ApplyOutcome::Applied(_)) => {}
                other => panic!("{m}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn undo_right_after_a_move_restores_everything() {
        let mut game = game();
        play_all(&mut game, &["e2e4", "d7d5"]);
        let before = game.state().clone();
        play_all(&mut game, &["e4d5"]);
        assert_eq!(game.captured().len(), 1);

        game.undo().unwrap();
        assert_eq!(game.state(), &before);
        assert!(game.captured().is_empty());
        assert_eq!(game.moves().len(), 2);
    }

    #[test]
    fn undo_after_window_is_refused() {
        let mut game = game();
        play_all(&mut game, &["e2e4"]);
        game.clock().advance(Duration::from_millis(5_000));
        assert!(!game.can_undo());
        assert!(matches!(game.undo(), Err(GameError::UndoWindowClosed)));
        assert_eq!(game.side_to_move(), Color::Black);
    }

    #[test]
    fn redo_restores_and_reopens_window() {
        let mut game = game();
        play_all(&mut game, &["e2e4"]);
        let after = game.state().clone();
        game.undo().unwrap();
        assert_eq!(game.state(), &GameState::new());

        game.clock().advance(Duration::from_secs(30));
        game.redo().unwrap();
        assert_eq!(game.state(), &after);
        assert_eq!(game.undo_time_remaining(), Duration::from_millis(5_000));
        game.undo().unwrap();
        assert_eq!(game.side_to_move(), Color::White);
    }

    #[test]
    fn promotion_suspends_until_valid_choice() {
        let mut game = game();
        play_all(
            &mut game,
            &["b2b4", "a7a5", "b4a5", "b7b6", "a5b6", "h7h6", "b6b7", "h6h5"],
        );
        let outcome = game.play_uci("b7a8").unwrap();
        assert!(matches!(outcome, ApplyOutcome::PromotionPending(_)));
        assert!(game.pending_promotion().is_some());
        assert_eq!(game.board().get(sq("b7")), Piece::from_char('P'));
        assert!(matches!(game.play_uci("e2e4"), Err(GameError::PromotionPending)));
        assert!(matches!(game.undo(), Err(GameError::PromotionPending)));

        assert!(matches!(
            game.choose_promotion(PieceType::Pawn),
            Err(GameError::Move(crate::error::MoveError::InvalidPromotion(PieceType::Pawn)))
        ));
        assert!(game.pending_promotion().is_some());

        let report = game.choose_promotion(PieceType::Queen).unwrap();
        assert_eq!(report.record.notation, "Pb7xa8");
        assert_eq!(game.board().get(sq("a8")), Piece::from_char('Q'));
        assert!(game.pending_promotion().is_none());
        assert!(matches!(game.choose_promotion(PieceType::Queen), Err(GameError::NoPendingPromotion)));

        game.undo().unwrap();
        assert_eq!(game.board().get(sq("b7")), Piece::from_char('P'));
        assert_eq!(game.board().get(sq("a8")), Piece::from_char('r'));
    }

    #[test]
    fn cancelled_promotion_changes_nothing() {
        let mut game = game();
        play_all(
            &mut game,
            &["b2b4", "a7a5", "b4a5", "b7b6", "a5b6", "h7h6", "b6b7", "h6h5"],
        );
        let before = game.state().clone();
        game.play_uci("b7a8").unwrap();
        assert!(game.cancel_promotion());
        assert_eq!(game.state(), &before);
        assert!(!game.cancel_promotion());
    }

    #[test]
    fn fools_mate_ends_the_game() {
        let mut game = game();
        play_all(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert_eq!(game.status(), GameStatus::Checkmate(Color::White));
        assert!(matches!(game.play_uci("a2a3"), Err(GameError::GameOver(_))));
        assert!(game.legal_destinations(sq("a2")).is_empty());
    }

    #[test]
    fn knight_shuffle_draws_on_third_occurrence() {
        let mut game = game();
        let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
        play_all(&mut game, &shuffle);
        assert_eq!(game.status(), GameStatus::Normal);
        play_all(&mut game, &shuffle[..3]);
        assert_eq!(game.status(), GameStatus::Normal);
        play_all(&mut game, &shuffle[3..]);
        assert_eq!(game.status(), GameStatus::ThreefoldRepetitionDraw);
    }

    #[test]
    fn reset_starts_over() {
        let mut game = game();
        play_all(&mut game, &["e2e4", "e7e5"]);
        game.reset();
        assert_eq!(game.state(), &GameState::new());
        assert!(!game.can_undo());
        assert!(!game.can_redo());
    }

    #[test]
    fn board_only_repetition_rule_from_config() {
        let config = GameConfig {
            repetition: RepetitionRule::BoardOnly,
            ..GameConfig::new()
        };
        let game = Game::with_clock(config, ManualClock::new());
        assert_eq!(game.state().repetition_history[0], Board::new().encode());
    }

    #[test]
    fn rejected_attempts_do_not_touch_history() {
        let mut game = game();
        let err = game.attempt_move(sq("e2"), sq("e5")).unwrap_err();
        assert!(matches!(err, GameError::Move(crate::error::MoveError::ShapeInvalid)));
        assert!(!game.can_undo());
        assert!(matches!(game.play_uci("zz"), Err(GameError::InvalidMove(_))));
        assert_eq!(game.legal_destinations(sq("e2")), vec![sq("e4"), sq("e3")]);
    }
}
