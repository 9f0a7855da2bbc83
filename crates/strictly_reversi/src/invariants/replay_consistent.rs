//! Replay invariant: the board is exactly what the history produces.

use super::super::action::Turn;
use super::super::rules;
use super::super::typestate::GameInProgress;
use super::Invariant;

/// Invariant: replaying every placement from the origin board reproduces
/// the current board.
///
/// Catches cells that were cleared, recolored outside a flip, or filled
/// without a recorded move.
pub struct ReplayConsistentInvariant;

impl Invariant<GameInProgress> for ReplayConsistentInvariant {
    fn holds(game: &GameInProgress) -> bool {
        let mut board = *game.origin();

        for turn in game.history() {
            if let Turn::Placed(mov) = turn {
                match rules::apply_move(&board, mov.player, mov.position) {
                    Ok(next) => board = next,
                    Err(_) => return false,
                }
            }
        }

        board == *game.board()
    }

    fn description() -> &'static str {
        "Replaying history reproduces the board"
    }
}
