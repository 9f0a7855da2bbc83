//! Contract-based validation for reversi moves.
//!
//! Contracts define correctness through preconditions and postconditions:
//! {P(state, action)} action {Q(before, after)}.

use super::action::{Move, MoveError};
use super::invariants::{InvariantSet, ReversiInvariants};
use super::rules;
use super::typestate::GameInProgress;
use super::Board;
use tracing::{instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// A contract defines preconditions and postconditions for state transitions.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), MoveError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), MoveError>;
}

// ─────────────────────────────────────────────────────────────
//  Move Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: It must be the player's turn.
pub struct PlayersTurn;

impl PlayersTurn {
    /// Checks the mover is the side to move.
    #[instrument(skip(game))]
    pub fn check(mov: &Move, game: &GameInProgress) -> Result<(), MoveError> {
        if mov.player != game.to_move() {
            Err(MoveError::WrongPlayer(mov.player))
        } else {
            Ok(())
        }
    }
}

/// Precondition: The placement must flip at least one piece.
pub struct FlipsSomething;

impl FlipsSomething {
    /// Checks the cell is empty and brackets an opponent line.
    #[instrument(skip(game))]
    pub fn check(mov: &Move, game: &GameInProgress) -> Result<(), MoveError> {
        if rules::is_legal(game.board(), mov.player, mov.position) {
            Ok(())
        } else {
            Err(MoveError::IllegalMove {
                player: mov.player,
                position: mov.position,
            })
        }
    }
}

/// Composite precondition: right player, legal cell.
pub struct LegalMove;

impl LegalMove {
    /// Validates all preconditions for a move.
    #[instrument(skip(game))]
    pub fn check(mov: &Move, game: &GameInProgress) -> Result<(), MoveError> {
        PlayersTurn::check(mov, game)?;
        FlipsSomething::check(mov, game)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
//  Two-state postcondition
// ─────────────────────────────────────────────────────────────

/// Postcondition: a placement fills exactly one empty cell and clears none.
pub struct NoCellCleared;

impl NoCellCleared {
    /// Compares boards before and after one placement.
    pub fn holds(before: &Board, after: &Board) -> bool {
        let cleared = before
            .cells()
            .iter()
            .zip(after.cells().iter())
            .any(|(b, a)| !b.is_empty() && a.is_empty());
        let grew_by_one = after.piece_count() == before.piece_count() + 1;

        let valid = !cleared && grew_by_one;
        if !valid {
            warn!(
                before = before.piece_count(),
                after = after.piece_count(),
                cleared,
                "Board monotonicity violated"
            );
        }
        valid
    }
}

// ─────────────────────────────────────────────────────────────
//  Move Contract (Pre + Post)
// ─────────────────────────────────────────────────────────────

/// Contract for move actions.
///
/// Preconditions:
/// - Must be player's turn
/// - Placement must flip at least one piece
///
/// Postconditions:
/// - No cell cleared, piece count grows by one
/// - Replaying history reproduces the board
/// - Piece count stays within bounds
/// - Pass bookkeeping matches history
pub struct MoveContract;

impl Contract<GameInProgress, Move> for MoveContract {
    fn pre(game: &GameInProgress, action: &Move) -> Result<(), MoveError> {
        LegalMove::check(action, game)
    }

    fn post(before: &GameInProgress, after: &GameInProgress) -> Result<(), MoveError> {
        if !NoCellCleared::holds(before.board(), after.board()) {
            return Err(MoveError::InvariantViolation(
                "Postcondition failed: placement must add one piece and clear none".to_string(),
            ));
        }

        ReversiInvariants::check_all(after).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            MoveError::InvariantViolation(format!("Postcondition failed: {}", descriptions))
        })
    }
}
