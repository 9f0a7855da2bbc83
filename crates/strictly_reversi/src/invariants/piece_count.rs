//! Piece count invariant: one new piece per placement, never more than 64.

use super::super::typestate::GameInProgress;
use super::super::types::CELL_COUNT;
use super::Invariant;

/// Invariant: pieces on the board equal the origin's pieces plus one per
/// placement, and never exceed the board size.
pub struct PieceCountInvariant;

impl Invariant<GameInProgress> for PieceCountInvariant {
    fn holds(game: &GameInProgress) -> bool {
        let placements = game
            .history()
            .iter()
            .filter(|t| t.placement().is_some())
            .count();
        let count = game.board().piece_count();

        count == game.origin().piece_count() + placements && count <= CELL_COUNT
    }

    fn description() -> &'static str {
        "Piece count equals starting pieces plus placements"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameResult, Position};

    #[test]
    fn test_counts_grow_with_moves() {
        let moves = [Position::new(2, 3).unwrap(), Position::new(2, 2).unwrap()];
        if let Ok(GameResult::InProgress(game)) = GameInProgress::replay(&moves) {
            assert_eq!(game.board().piece_count(), 6);
            assert!(PieceCountInvariant::holds(&game));
        } else {
            panic!("Expected in-progress game");
        }
    }
}
