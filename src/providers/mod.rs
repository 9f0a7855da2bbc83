//! Move providers: anything that picks a move for a non-human seat.

mod channel;
mod first_legal;
mod llm;
mod random;

pub use channel::{ChannelProvider, RemotePeer};
pub use first_legal::FirstLegalProvider;
pub use llm::{LlmMoveProvider, move_prompt, parse_move};
pub use random::RandomProvider;

use crate::coordinator::TurnTicket;
use std::time::Duration;
use strictly_reversi::{Board, Player, Position};

/// Trait for agents that choose moves asynchronously.
///
/// Implementations may return any position, fail, or never answer; the
/// coordinator validates the answer against the current legal moves and
/// substitutes a random legal move when it is unusable.
#[async_trait::async_trait]
pub trait MoveProvider: Send + Sync {
    /// Chooses a move for `player` on `board`.
    async fn request_move(&self, board: &Board, player: Player) -> Result<Position, ProviderError>;

    /// Announces the turn the next [`request_move`](Self::request_move) answers.
    ///
    /// Called before the turn is published, so providers fed from outside
    /// can tell answers for this turn from leftovers of earlier ones.
    fn turn_started(&self, _ticket: TurnTicket) {}

    /// Returns the provider's display name.
    fn name(&self) -> &str;
}

/// Why a provider produced no usable answer.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ProviderError {
    /// No answer within the configured limit.
    #[display("No answer within {:?}", _0)]
    Timeout(Duration),

    /// The provider declined or its backend returned an error.
    #[display("Provider rejected the request: {}", _0)]
    Rejected(String),

    /// The provider's answer could not be read as a position.
    #[display("Unreadable answer: {}", _0)]
    Unparseable(String),

    /// The remote side went away.
    #[display("Provider disconnected")]
    Disconnected,

    /// Asked to move with no legal moves available.
    #[display("No legal moves available")]
    NoMoves,
}

impl std::error::Error for ProviderError {}
