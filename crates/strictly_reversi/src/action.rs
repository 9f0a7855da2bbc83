//! First-class action types for reversi.
//!
//! Moves are domain events, not side effects. A move names a player and a
//! cell; whether it is legal depends on the board it is applied to.

use super::{Player, Position};
use serde::{Deserialize, Serialize};

/// A player placing a piece at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// The player making the move.
    pub player: Player,
    /// The cell the piece is placed on.
    pub position: Position,
}

impl Move {
    /// Creates a new move.
    pub fn new(player: Player, position: Position) -> Self {
        Self { player, position }
    }

    /// Returns the player making this move.
    pub fn player(&self) -> Player {
        self.player
    }

    /// Returns the position of this move.
    pub fn position(&self) -> Position {
        self.position
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.player, self.position)
    }
}

/// One entry in a game's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Turn {
    /// A piece was placed.
    Placed(Move),
    /// The player had no legal move and was skipped.
    Passed(Player),
}

impl Turn {
    /// The placement, if this turn was one.
    pub fn placement(&self) -> Option<Move> {
        match self {
            Turn::Placed(mov) => Some(*mov),
            Turn::Passed(_) => None,
        }
    }
}

/// Error that can occur when validating or applying a move.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The move captures nothing or targets an occupied cell.
    #[display("{} cannot play {}: no pieces would flip", player, position)]
    IllegalMove {
        /// Player who attempted the move.
        player: Player,
        /// Target cell.
        position: Position,
    },

    /// It's not this player's turn.
    #[display("It's not {}'s turn", _0)]
    WrongPlayer(Player),

    /// An invariant was violated (postcondition failure).
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for MoveError {}
