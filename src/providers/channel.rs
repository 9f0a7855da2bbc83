//! Remote peer whose moves arrive over a channel.

use super::{MoveProvider, ProviderError};
use crate::coordinator::TurnTicket;
use strictly_reversi::{Board, Player, Position};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

/// Provider fed by a remote or networked player.
///
/// The transport (socket, HTTP handler, terminal) holds the matching
/// [`RemotePeer`] and forwards each move it receives, tagged with the turn
/// it answers. Moves tagged with any other turn are dropped.
pub struct ChannelProvider {
    name: String,
    current: std::sync::Mutex<Option<TurnTicket>>,
    move_rx: Mutex<mpsc::UnboundedReceiver<(TurnTicket, Position)>>,
}

/// Sending half of a [`ChannelProvider`].
#[derive(Debug, Clone)]
pub struct RemotePeer {
    move_tx: mpsc::UnboundedSender<(TurnTicket, Position)>,
}

impl RemotePeer {
    /// Forwards a move from the remote player for the turn `ticket`.
    ///
    /// May be sent as soon as the turn is announced, before the provider
    /// is actually asked.
    pub fn send_move(&self, ticket: TurnTicket, position: Position) -> Result<(), ProviderError> {
        self.move_tx
            .send((ticket, position))
            .map_err(|_| ProviderError::Disconnected)
    }
}

impl ChannelProvider {
    /// Creates a provider and the peer handle that feeds it.
    pub fn new(name: impl Into<String>) -> (Self, RemotePeer) {
        let name = name.into();
        info!(peer = %name, "Creating remote peer channel");
        let (move_tx, move_rx) = mpsc::unbounded_channel();
        (
            Self {
                name,
                current: std::sync::Mutex::new(None),
                move_rx: Mutex::new(move_rx),
            },
            RemotePeer { move_tx },
        )
    }
}

#[async_trait::async_trait]
impl MoveProvider for ChannelProvider {
    async fn request_move(&self, _board: &Board, player: Player) -> Result<Position, ProviderError> {
        let current = *self
            .current
            .lock()
            .map_err(|_| ProviderError::Rejected("turn state poisoned".to_string()))?;
        let mut move_rx = self.move_rx.lock().await;

        debug!(peer = %self.name, %player, "Waiting for remote move");
        loop {
            let (ticket, position) = move_rx.recv().await.ok_or(ProviderError::Disconnected)?;
            match current {
                Some(current) if ticket != current => {
                    warn!(peer = %self.name, %ticket, %position, "Dropping move for another turn");
                }
                _ => return Ok(position),
            }
        }
    }

    fn turn_started(&self, ticket: TurnTicket) {
        if let Ok(mut current) = self.current.lock() {
            *current = Some(ticket);
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
