use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::GameError;
use crate::game::Game;
use crate::history::{Clock, HistoryManager};
use crate::piece::{Color, Piece, PieceType};
use crate::state::GameState;
use crate::status;

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    state: &'a GameState,
    history: &'a HistoryManager,
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    state: GameState,
    history: HistoryManager,
}

/// Reject positions no game could reach: every side needs exactly one king
/// and every recorded square must be on the board.
fn check_state(state: &GameState) -> Result<(), GameError> {
    for color in [Color::White, Color::Black] {
        let kings = state.board.count(Piece::new(PieceType::King, color));
        if kings != 1 {
            return Err(GameError::CorruptSnapshot(format!("{color} has {kings} kings")));
        }
    }
    if let Some(target) = state.en_passant_target {
        if !target.is_on_board() {
            return Err(GameError::CorruptSnapshot(format!(
                "en passant target off the board: rank {} file {}",
                target.rank, target.file
            )));
        }
    }
    for record in &state.moves {
        let mv = record.mv;
        if !mv.from.is_on_board() || !mv.to.is_on_board() {
            return Err(GameError::CorruptSnapshot(format!(
                "move log entry {} is off the board",
                record.notation
            )));
        }
    }
    Ok(())
}

/// Parse and check a snapshot. Stored statuses are recomputed, so an edited
/// file cannot hide a finished game.
fn read_snapshot(json: &str) -> Result<Snapshot, GameError> {
    let mut snapshot: Snapshot = serde_json::from_str(json)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(GameError::CorruptSnapshot(format!(
            "unsupported version {}",
            snapshot.version
        )));
    }
    check_state(&snapshot.state)?;
    snapshot.state.status = status::evaluate(&snapshot.state);
    for state in snapshot.history.snapshots_mut() {
        check_state(state)?;
        state.status = status::evaluate(state);
    }
    Ok(snapshot)
}

impl<C: Clock> Game<C> {
    /// Serialize the position, its history stacks and logs to JSON.
    /// A promotion awaiting a choice is not part of the snapshot.
    pub fn save(&self) -> Result<String, GameError> {
        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            state: &self.state,
            history: &self.history,
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    /// Rebuild a session from [`Game::save`] output. The undo window starts
    /// closed; the settings come from `config`, not the snapshot.
    pub fn restore(json: &str, config: GameConfig, clock: C) -> Result<Self, GameError> {
        let snapshot = read_snapshot(json)?;
        Ok(Game::from_parts(snapshot.state, snapshot.history, config, clock))
    }

    /// Like [`Game::restore`], but missing or unreadable data yields a new game.
    pub fn load_or_new(json: Option<&str>, config: GameConfig, clock: C) -> Self {
        let Some(json) = json else {
            return Game::with_clock(config, clock);
        };
        match read_snapshot(json) {
            Ok(snapshot) => Game::from_parts(snapshot.state, snapshot.history, config, clock),
            Err(e) => {
                log::warn!("discarding saved game: {e}");
                Game::with_clock(config, clock)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::ManualClock;
    use crate::square::Square;
    use crate::status::GameStatus;

    fn played(moves: &[&str]) -> Game<ManualClock> {
        let mut game = Game::with_clock(GameConfig::new(), ManualClock::new());
        for m in moves {
            game.play_uci(m).unwrap();
        }
        game
    }

    #[test]
    fn save_and_restore_keeps_position_and_stacks() {
        let mut game = played(&["e2e4", "c7c5", "g1f3"]);
        game.undo().unwrap();
        let json = game.save().unwrap();

        let mut restored = Game::restore(&json, GameConfig::new(), ManualClock::new()).unwrap();
        assert_eq!(restored.state(), game.state());
        assert!(restored.can_redo());
        // Deadlines do not survive a reload.
        assert!(!restored.can_undo());

        restored.redo().unwrap();
        assert_eq!(restored.state().notation_log(), vec!["Pe2-e4", "pc7-c5", "Ng1-f3"]);
        assert_eq!(restored.state().en_passant_target, None);
    }

    #[test]
    fn snapshot_board_is_case_encoded() {
        let json = played(&["e2e4"]).save().unwrap();
        assert!(json.contains("\"rnbqkbnr\""));
        assert!(json.contains("\"....P...\""));
    }

    #[test]
    fn corrupt_data_falls_back_to_a_new_game() {
        let game = Game::load_or_new(Some("{not json"), GameConfig::new(), ManualClock::new());
        assert_eq!(game.state(), &GameState::new());

        let fresh = Game::load_or_new(None, GameConfig::new(), ManualClock::new());
        assert_eq!(fresh.moves().len(), 0);

        let restored = Game::restore("[]", GameConfig::new(), ManualClock::new());
        assert!(matches!(restored, Err(GameError::Persistence(_))));
    }

    #[test]
    fn snapshot_without_a_king_is_rejected() {
        let mut game = played(&[]);
        game.state.board.set(Square::parse("e8").unwrap(), None);
        let json = game.save().unwrap();
        let restored = Game::restore(&json, GameConfig::new(), ManualClock::new());
        assert!(matches!(restored, Err(GameError::CorruptSnapshot(_))));

        let recovered = Game::load_or_new(Some(&json), GameConfig::new(), ManualClock::new());
        assert_eq!(recovered.state(), &GameState::new());
    }

    #[test]
    fn restored_status_is_recomputed() {
        let mut game = played(&["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert_eq!(game.status(), GameStatus::Checkmate(Color::White));
        game.state.status = GameStatus::Normal;
        let json = game.save().unwrap();

        let restored = Game::restore(&json, GameConfig::new(), ManualClock::new()).unwrap();
        assert_eq!(restored.status(), GameStatus::Checkmate(Color::White));
    }

    #[test]
    fn off_board_squares_are_rejected() {
        let mut game = played(&["e2e4"]);
        game.state.en_passant_target = Some(Square::new(9, 4));
        let json = game.save().unwrap();
        let restored = Game::restore(&json, GameConfig::new(), ManualClock::new());
        assert!(matches!(restored, Err(GameError::CorruptSnapshot(_))));

        let mut game = played(&["e2e4"]);
        game.state.moves[0].mv.to = Square::new(4, 12);
        let json = game.save().unwrap();
        let restored = Game::restore(&json, GameConfig::new(), ManualClock::new());
        assert!(matches!(restored, Err(GameError::CorruptSnapshot(_))));
    }
}
