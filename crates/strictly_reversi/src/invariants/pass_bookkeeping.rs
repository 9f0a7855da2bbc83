//! Pass bookkeeping invariant.

use super::super::action::Turn;
use super::super::rules;
use super::super::typestate::GameInProgress;
use super::Invariant;

/// Invariant: the pass counter matches the trailing passes in history, is
/// at most one while the game runs, and the side to move can move.
pub struct PassBookkeepingInvariant;

impl Invariant<GameInProgress> for PassBookkeepingInvariant {
    fn holds(game: &GameInProgress) -> bool {
        let trailing = game
            .history()
            .iter()
            .rev()
            .take_while(|t| matches!(t, Turn::Passed(_)))
            .count();

        game.consecutive_passes() <= 1
            && usize::from(game.consecutive_passes()) == trailing
            && rules::has_legal_move(game.board(), game.to_move())
    }

    fn description() -> &'static str {
        "Pass counter matches history and the side to move has a move"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Player;

    #[test]
    fn test_opening_holds() {
        assert!(PassBookkeepingInvariant::holds(&GameInProgress::standard()));
    }

    #[test]
    fn test_unrecorded_pass_violates() {
        let mut game = GameInProgress::standard();
        game.consecutive_passes = 1;
        assert!(!PassBookkeepingInvariant::holds(&game));
    }

    #[test]
    fn test_recorded_pass_holds() {
        let mut game = GameInProgress::standard();
        game.history.push(Turn::Passed(Player::White));
        game.consecutive_passes = 1;
        assert!(PassBookkeepingInvariant::holds(&game));
    }
}
