//! Deterministic local opponent.

use super::{MoveProvider, ProviderError};
use strictly_reversi::{Board, Player, Position, rules};
use tracing::debug;

/// Plays the first legal move in row-major order.
pub struct FirstLegalProvider {
    name: String,
}

impl FirstLegalProvider {
    /// Creates a new first-legal provider.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait::async_trait]
impl MoveProvider for FirstLegalProvider {
    async fn request_move(&self, board: &Board, player: Player) -> Result<Position, ProviderError> {
        let choice = rules::legal_moves(board, player)
            .first()
            .copied()
            .ok_or(ProviderError::NoMoves)?;
        debug!(provider = %self.name, position = %choice, "First legal move chosen");
        Ok(choice)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
