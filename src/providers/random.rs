//! Provider that picks uniformly among legal moves.

use super::{MoveProvider, ProviderError};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use std::sync::Mutex;
use strictly_reversi::{Board, Player, Position, rules};
use tracing::{debug, instrument};

/// Plays a uniformly random legal move.
pub struct RandomProvider {
    name: String,
    rng: Mutex<StdRng>,
}

impl RandomProvider {
    /// Creates a provider seeded from the OS.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Creates a provider with a fixed seed, for reproducible games.
    pub fn seeded(name: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

#[async_trait::async_trait]
impl MoveProvider for RandomProvider {
    #[instrument(skip(self, board), fields(provider = %self.name))]
    async fn request_move(&self, board: &Board, player: Player) -> Result<Position, ProviderError> {
        let moves = rules::legal_moves(board, player);
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| ProviderError::Rejected("random source poisoned".to_string()))?;
        let choice = moves.choose(&mut *rng).copied().ok_or(ProviderError::NoMoves)?;
        debug!(position = %choice, "Random move chosen");
        Ok(choice)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
