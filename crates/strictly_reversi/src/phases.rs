//! Game phases and the final outcome.

use super::types::{Player, Tally};
use serde::{Deserialize, Serialize};

/// Where the turn machine stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// The player has at least one legal move and must play it.
    AwaitingMove(Player),
    /// The player has no legal move and is being skipped.
    ///
    /// Transient: passes are settled inside each transition, so a game
    /// handed back to callers never sits in this phase. Passes show up in
    /// the history as `Turn::Passed`.
    ForcedPass(Player),
    /// Neither player can move.
    Terminal(Outcome),
}

impl Phase {
    /// Checks if the game is over.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Terminal(_))
    }
}

/// Outcome of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Black has more pieces.
    BlackWins,
    /// White has more pieces.
    WhiteWins,
    /// Equal piece counts.
    Draw,
}

impl Outcome {
    /// Decides the outcome from final piece counts.
    pub fn from_tally(tally: Tally) -> Self {
        match tally.black.cmp(&tally.white) {
            std::cmp::Ordering::Greater => Outcome::BlackWins,
            std::cmp::Ordering::Less => Outcome::WhiteWins,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }

    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Player> {
        match self {
            Outcome::BlackWins => Some(Player::Black),
            Outcome::WhiteWins => Some(Player::White),
            Outcome::Draw => None,
        }
    }

    /// Returns true if the game was a draw.
    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::BlackWins => write!(f, "Black wins"),
            Outcome::WhiteWins => write!(f, "White wins"),
            Outcome::Draw => write!(f, "Draw"),
        }
    }
}
