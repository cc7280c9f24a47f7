use chess_rules::executor::ApplyOutcome;
use chess_rules::piece::PieceType;
use chess_rules::rules::legal_moves;
use chess_rules::{Game, GameConfig};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

const MAX_PLIES: u32 = 400;

/// Play random legal moves from the starting position and print the move
/// log. Usage: `selfplay [seed]`.
fn main() {
    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(1u64);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut game = Game::with_config(GameConfig::new());
    let mut plies = 0;

    while !game.status().is_terminal() && plies < MAX_PLIES {
        let moves = legal_moves(game.state(), game.side_to_move());
        let Some(&mv) = moves.choose(&mut rng) else {
            break;
        };
        match game.play(mv) {
            Ok(ApplyOutcome::Applied(_)) => {}
            Ok(ApplyOutcome::PromotionPending(_)) => {
                let kind = *PieceType::PROMOTIONS.choose(&mut rng).unwrap_or(&PieceType::Queen);
                if let Err(e) = game.choose_promotion(kind) {
                    eprintln!("promotion failed: {e}");
                    break;
                }
            }
            Err(e) => {
                eprintln!("engine refused its own legal move {}: {e}", mv.to_uci());
                break;
            }
        }
        plies += 1;
    }

    for (i, pair) in game.state().notation_log().chunks(2).enumerate() {
        println!("{:>3}. {}", i + 1, pair.join(" "));
    }
    let result = if game.status().is_terminal() {
        game.status().to_string()
    } else {
        "ongoing (ply limit)".to_string()
    };
    eprintln!("Game over after {plies} plies (seed {seed}): {result}");
}
