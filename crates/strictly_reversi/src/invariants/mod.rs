//! First-class invariants for reversi.
//!
//! Invariants are logical properties that must hold throughout game
//! execution. They are checked after every placement in debug builds and
//! can be tested independently.

mod pass_bookkeeping;
mod piece_count;
mod replay_consistent;

pub use pass_bookkeeping::PassBookkeepingInvariant;
pub use piece_count::PieceCountInvariant;
pub use replay_consistent::ReplayConsistentInvariant;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
///
/// Implemented for tuples so sets compose without boxing.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let violations: Vec<InvariantViolation> = [
            (I1::holds(state), I1::description()),
            (I2::holds(state), I2::description()),
            (I3::holds(state), I3::description()),
        ]
        .into_iter()
        .filter(|(held, _)| !held)
        .map(|(_, description)| InvariantViolation::new(description))
        .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Every invariant a game in progress must satisfy.
pub type ReversiInvariants = (
    ReplayConsistentInvariant,
    PieceCountInvariant,
    PassBookkeepingInvariant,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Board, GameInProgress, GameResult, Position};

    #[test]
    fn test_standard_opening_holds() {
        let game = GameInProgress::standard();
        assert!(ReversiInvariants::check_all(&game).is_ok());
    }

    #[test]
    fn test_replayed_game_holds() {
        let moves: Vec<Position> = ["d3", "c5", "f6", "f5", "e6", "e3"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        match GameInProgress::replay(&moves) {
            Ok(GameResult::InProgress(game)) => {
                assert!(ReversiInvariants::check_all(&game).is_ok());
            }
            other => panic!("Expected in-progress game, got {:?}", other),
        }
    }

    #[test]
    fn test_violations_are_collected() {
        let mut game = GameInProgress::standard();
        game.board = Board::empty();
        game.consecutive_passes = 1;

        let violations = ReversiInvariants::check_all(&game).unwrap_err();
        assert_eq!(violations.len(), 3);
    }
}
