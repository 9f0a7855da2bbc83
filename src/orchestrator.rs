//! Async game loop between the coordinator, its providers and the UI.

use crate::coordinator::{
    FallbackReason, MoveRejected, MoveRequest, RejectReason, Snapshot, Transition, TurnCoordinator,
    TurnTicket,
};
use crate::providers::ProviderError;
use anyhow::Result;
use std::time::Duration;
use strictly_reversi::{Outcome, Player, Position, Tally};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, instrument, warn};

/// Messages sent from orchestrator to UI.
#[derive(Debug, Clone)]
pub enum GameEvent {
    /// A player is now to move.
    TurnStarted {
        /// The turn.
        ticket: TurnTicket,
        /// Seat name.
        seat: String,
    },
    /// A provider has been asked for a move.
    ProviderThinking {
        /// Player the provider moves for.
        player: Player,
        /// Provider name.
        provider: String,
    },
    /// A provider's answer was replaced by a random legal move.
    ProviderFallback {
        /// Player the provider moves for.
        player: Player,
        /// Why the answer was replaced.
        reason: FallbackReason,
    },
    /// A move was applied.
    MoveMade {
        /// Who moved.
        player: Player,
        /// Where.
        position: Position,
        /// How many pieces flipped.
        flipped: usize,
    },
    /// A player had no legal move and was skipped.
    Passed {
        /// Skipped player.
        player: Player,
    },
    /// Game ended.
    GameOver {
        /// Final outcome.
        outcome: Outcome,
        /// Final piece counts.
        scores: Tally,
    },
    /// The game was reset to the opening.
    Reset,
}

/// Requests from the UI to the orchestrator.
#[derive(Debug)]
enum Command {
    Submit {
        ticket: Option<TurnTicket>,
        position: Position,
        reply: oneshot::Sender<Result<Snapshot, MoveRejected>>,
    },
    Reset {
        reply: oneshot::Sender<Snapshot>,
    },
    Quit,
}

/// Timing knobs for provider calls.
#[derive(Debug, Clone, Copy, Default, derive_new::new)]
pub struct ProviderTiming {
    /// Limit on a single provider call; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Pause before asking the provider.
    pub think_delay: Duration,
}

/// Cloneable handle the UI uses to drive a running game.
#[derive(Debug, Clone)]
pub struct GameHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
    snapshot_rx: watch::Receiver<Snapshot>,
}

impl GameHandle {
    /// Latest published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver that wakes on every published snapshot.
    pub fn watch(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_rx.clone()
    }

    /// Submits a move for whatever turn is current when it arrives.
    pub async fn submit_move(&self, position: Position) -> Result<Snapshot, MoveRejected> {
        self.submit(None, position).await
    }

    /// Submits a move for a specific turn; rejected as stale if the turn has passed.
    pub async fn submit_move_for(&self, ticket: TurnTicket, position: Position) -> Result<Snapshot, MoveRejected> {
        self.submit(Some(ticket), position).await
    }

    async fn submit(&self, ticket: Option<TurnTicket>, position: Position) -> Result<Snapshot, MoveRejected> {
        let stopped = || MoveRejected::new(RejectReason::Stopped, Some(position));
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Submit {
                ticket,
                position,
                reply,
            })
            .map_err(|_| stopped())?;
        rx.await.map_err(|_| stopped())?
    }

    /// Resets the game to the opening; an outstanding provider request is abandoned.
    pub async fn reset(&self) -> Result<Snapshot> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Reset { reply })
            .map_err(|_| anyhow::anyhow!("Game loop has stopped"))?;
        Ok(rx.await?)
    }

    /// Stops the game loop.
    pub fn quit(&self) {
        let _ = self.cmd_tx.send(Command::Quit);
    }
}

/// Drives a [`TurnCoordinator`]: asks providers, serves the handle, emits events.
pub struct Orchestrator {
    coordinator: TurnCoordinator,
    timing: ProviderTiming,
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    commands_open: bool,
    event_tx: mpsc::UnboundedSender<GameEvent>,
    snapshot_tx: watch::Sender<Snapshot>,
}

/// What the loop should do after handling a command.
enum Flow {
    Continue,
    Restart,
    Stop,
}

impl Orchestrator {
    /// Creates an orchestrator and the handle that controls it.
    pub fn new(
        coordinator: TurnCoordinator,
        timing: ProviderTiming,
        event_tx: mpsc::UnboundedSender<GameEvent>,
    ) -> (Self, GameHandle) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(coordinator.snapshot());
        (
            Self {
                coordinator,
                timing,
                cmd_rx,
                commands_open: true,
                event_tx,
                snapshot_tx,
            },
            GameHandle { cmd_tx, snapshot_rx },
        )
    }

    /// Runs the game loop.
    ///
    /// Returns on [`GameHandle::quit`], or once no handle remains and the
    /// game cannot progress without one. The result is the outcome of the
    /// last game, if it finished.
    #[instrument(skip(self))]
    pub async fn run(mut self) -> Result<Option<Outcome>> {
        info!("Starting game orchestration");

        loop {
            let snapshot = self.coordinator.snapshot();
            // Providers learn the ticket before anyone can see the turn.
            if let Some(request) = self.coordinator.pending_request() {
                request.provider.turn_started(request.ticket);
            }
            self.snapshot_tx.send_replace(snapshot.clone());

            if let Some(outcome) = *snapshot.outcome() {
                info!(%outcome, scores = %snapshot.scores(), "Game over");
                self.emit(GameEvent::GameOver {
                    outcome,
                    scores: *snapshot.scores(),
                });
                // Finished games only answer commands until reset or quit.
                loop {
                    let Some(cmd) = self.next_command().await else {
                        return Ok(Some(outcome));
                    };
                    match self.handle_command(cmd) {
                        Flow::Stop => return Ok(Some(outcome)),
                        Flow::Restart => break,
                        Flow::Continue => {}
                    }
                }
                continue;
            }

            let Some(ticket) = self.coordinator.ticket() else {
                continue;
            };
            self.emit(GameEvent::TurnStarted {
                ticket,
                seat: self.coordinator.seat(ticket.player()).name().to_string(),
            });

            match self.coordinator.pending_request() {
                Some(request) => {
                    if let Flow::Stop = self.provider_turn(request).await {
                        return Ok(None);
                    }
                }
                None => loop {
                    let Some(cmd) = self.next_command().await else {
                        warn!(player = %ticket.player(), "No input source left for human seat");
                        return Ok(None);
                    };
                    match self.handle_command(cmd) {
                        Flow::Stop => return Ok(None),
                        Flow::Restart => break,
                        Flow::Continue => {
                            if self.coordinator.ticket() != Some(ticket) {
                                break;
                            }
                        }
                    }
                },
            }
        }
    }

    /// Asks the provider while still serving commands.
    ///
    /// A reset drops the in-flight call, so its answer is never applied.
    async fn provider_turn(&mut self, request: MoveRequest) -> Flow {
        let ticket = request.ticket;
        self.emit(GameEvent::ProviderThinking {
            player: ticket.player(),
            provider: request.provider.name().to_string(),
        });

        let call = ask_provider(request, self.timing);
        tokio::pin!(call);

        loop {
            tokio::select! {
                answer = &mut call => {
                    match self.coordinator.resolve(ticket, answer) {
                        Ok(transition) => self.report(&transition),
                        Err(rejected) => debug!(%rejected, "Provider answer discarded"),
                    }
                    return Flow::Continue;
                }
                cmd = self.cmd_rx.recv(), if self.commands_open => {
                    let Some(cmd) = cmd else {
                        self.commands_open = false;
                        continue;
                    };
                    match self.handle_command(cmd) {
                        Flow::Continue => {}
                        Flow::Restart => {
                            debug!(%ticket, "Abandoning provider request");
                            return Flow::Restart;
                        }
                        Flow::Stop => return Flow::Stop,
                    }
                }
            }
        }
    }

    async fn next_command(&mut self) -> Option<Command> {
        if !self.commands_open {
            return None;
        }
        let cmd = self.cmd_rx.recv().await;
        if cmd.is_none() {
            self.commands_open = false;
        }
        cmd
    }

    fn handle_command(&mut self, cmd: Command) -> Flow {
        match cmd {
            Command::Submit {
                ticket,
                position,
                reply,
            } => {
                let result = match ticket {
                    Some(ticket) => self.coordinator.submit_move_for(ticket, position),
                    None => self.coordinator.submit_move(position),
                };
                let result = result.map(|transition| {
                    self.report(&transition);
                    transition.snapshot
                });
                let _ = reply.send(result);
                Flow::Continue
            }
            Command::Reset { reply } => {
                let snapshot = self.coordinator.reset();
                self.snapshot_tx.send_replace(snapshot.clone());
                self.emit(GameEvent::Reset);
                let _ = reply.send(snapshot);
                Flow::Restart
            }
            Command::Quit => {
                info!("Quit requested");
                Flow::Stop
            }
        }
    }

    fn report(&mut self, transition: &Transition) {
        if let Some(reason) = &transition.fallback {
            self.emit(GameEvent::ProviderFallback {
                player: transition.placed.player,
                reason: reason.clone(),
            });
        }
        self.emit(GameEvent::MoveMade {
            player: transition.placed.player,
            position: transition.placed.position,
            flipped: transition.snapshot.last_flips().len(),
        });
        for &player in &transition.passed {
            self.emit(GameEvent::Passed { player });
        }
        self.snapshot_tx.send_replace(transition.snapshot.clone());
    }

    fn emit(&self, event: GameEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("Event receiver dropped");
        }
    }
}

/// One provider call with the configured delay and timeout.
#[instrument(skip_all, fields(ticket = %request.ticket, provider = request.provider.name()))]
async fn ask_provider(request: MoveRequest, timing: ProviderTiming) -> Result<Position, ProviderError> {
    if !timing.think_delay.is_zero() {
        tokio::time::sleep(timing.think_delay).await;
    }

    let call = request.provider.request_move(&request.board, request.ticket.player());
    let answer = match timing.timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .unwrap_or(Err(ProviderError::Timeout(limit))),
        None => call.await,
    };

    if let Err(e) = &answer {
        warn!(error = %e, "Provider failed");
    }
    answer
}
