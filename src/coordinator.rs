//! Turn coordination: the single owner of the authoritative game.
//!
//! The coordinator is synchronous. It decides whose turn it is, validates
//! submissions, hands out [`MoveRequest`]s for provider seats and applies
//! their answers. Every turn is identified by a [`TurnTicket`]; anything
//! submitted or answered for a ticket other than the current one is stale
//! and is rejected without touching state.

use crate::providers::{MoveProvider, ProviderError};
use derive_getters::Getters;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use std::sync::Arc;
use strictly_reversi::{
    Board, GameInProgress, GameResult, GameSetup, Move, Outcome, Phase, Player, Position,
    SetupError, Tally, Turn,
};
use tracing::{debug, info, instrument, warn};

/// Identifies one turn of one game.
///
/// `epoch` changes on reset; `turn` counts every placement and pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[display("game {} turn {} ({})", epoch, turn, player)]
pub struct TurnTicket {
    epoch: u64,
    turn: u32,
    player: Player,
}

impl TurnTicket {
    /// The player whose turn this is.
    pub fn player(&self) -> Player {
        self.player
    }

    /// Reset counter at issue time.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Turn counter at issue time.
    pub fn turn(&self) -> u32 {
        self.turn
    }
}

/// Who controls a color.
#[derive(Clone)]
pub enum Seat {
    /// Moves arrive through [`TurnCoordinator::submit_move`].
    Human,
    /// Moves are requested from a provider.
    Provider(Arc<dyn MoveProvider>),
}

impl Seat {
    /// Wraps a provider.
    pub fn provider(provider: impl MoveProvider + 'static) -> Self {
        Seat::Provider(Arc::new(provider))
    }

    /// Checks if this seat takes human input.
    pub fn is_human(&self) -> bool {
        matches!(self, Seat::Human)
    }

    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            Seat::Human => "Human",
            Seat::Provider(p) => p.name(),
        }
    }
}

impl std::fmt::Debug for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Seat::Human => write!(f, "Human"),
            Seat::Provider(p) => write!(f, "Provider({})", p.name()),
        }
    }
}

/// Read-only view of the game after a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct Snapshot {
    /// Current turn, `None` once the game is over.
    ticket: Option<TurnTicket>,
    /// The board.
    board: Board,
    /// Current phase.
    phase: Phase,
    /// Side to move, `None` once the game is over.
    active_player: Option<Player>,
    /// Legal moves for the side to move, row-major.
    legal_moves: Vec<Position>,
    /// Piece counts.
    scores: Tally,
    /// Final outcome, once decided.
    outcome: Option<Outcome>,
    /// Passes since the last placement (2 once finished).
    consecutive_passes: u8,
    /// Most recent placement.
    last_move: Option<Move>,
    /// Pieces flipped by the most recent placement.
    last_flips: Vec<Position>,
}

/// Why a submitted move was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_more::Display)]
pub enum RejectReason {
    /// The game is over.
    #[display("the game is over")]
    GameOver,
    /// The ticket belongs to an earlier turn or game.
    #[display("the turn has already moved on")]
    StaleTurn,
    /// The side to move is not controlled by a human.
    #[display("{} is not a human seat", _0)]
    NotHumanSeat(Player),
    /// The position is not among the current legal moves.
    #[display("the move is not legal on the current board")]
    NotLegal,
    /// The coordinator is no longer running.
    #[display("the game is no longer running")]
    Stopped,
}

/// A submitted move was refused; state is unchanged.
///
/// Recoverable: re-read the snapshot and ask again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_more::Display)]
#[display("Move rejected: {}", reason)]
pub struct MoveRejected {
    /// Why the move was refused.
    pub reason: RejectReason,
    /// The position that was submitted, if any.
    pub position: Option<Position>,
}

impl MoveRejected {
    /// Creates a rejection.
    pub fn new(reason: RejectReason, position: Option<Position>) -> Self {
        Self { reason, position }
    }
}

impl std::error::Error for MoveRejected {}

/// Why a provider's answer was replaced.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum FallbackReason {
    /// The provider answered with a position that is not legal.
    #[display("provider answered {}, which is not legal", _0)]
    IllegalAnswer(Position),
    /// The provider failed, timed out or disconnected.
    #[display("{}", _0)]
    ProviderFailed(ProviderError),
}

/// A request for a provider seat to move.
#[derive(Clone, derive_new::new)]
pub struct MoveRequest {
    /// The turn this request answers.
    pub ticket: TurnTicket,
    /// Board at request time.
    pub board: Board,
    /// The provider to ask.
    pub provider: Arc<dyn MoveProvider>,
}

impl std::fmt::Debug for MoveRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveRequest")
            .field("ticket", &self.ticket)
            .field("provider", &self.provider.name())
            .finish()
    }
}

/// What one accepted move did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The placement that was applied.
    pub placed: Move,
    /// Players skipped by forced passes after the placement.
    pub passed: Vec<Player>,
    /// Set when a provider answer was replaced by a random legal move.
    pub fallback: Option<FallbackReason>,
    /// State after the transition.
    pub snapshot: Snapshot,
}

/// Owns the authoritative game state and the two seats.
pub struct TurnCoordinator {
    game: GameResult,
    black: Seat,
    white: Seat,
    epoch: u64,
    turn: u32,
    rng: StdRng,
}

impl TurnCoordinator {
    /// Creates a coordinator at the standard opening, Black to move.
    #[instrument(skip_all, fields(black = black.name(), white = white.name()))]
    pub fn new(black: Seat, white: Seat) -> Self {
        Self::with_rng(black, white, StdRng::from_os_rng())
    }

    /// Creates a coordinator whose fallback moves are reproducible.
    pub fn with_seed(black: Seat, white: Seat, seed: u64) -> Self {
        Self::with_rng(black, white, StdRng::seed_from_u64(seed))
    }

    fn with_rng(black: Seat, white: Seat, rng: StdRng) -> Self {
        info!(black = black.name(), white = white.name(), "New game");
        Self {
            game: GameSetup::new().start(),
            black,
            white,
            epoch: 0,
            turn: 0,
            rng,
        }
    }

    /// Replaces the starting position, e.g. for puzzles. Counts as a reset.
    ///
    /// # Errors
    ///
    /// Rejects boards no game can reach; state is unchanged.
    #[instrument(skip(self, board))]
    pub fn load_position(&mut self, board: Board, first: Player) -> Result<Snapshot, SetupError> {
        let setup = GameSetup::from_board(board, first)?;
        self.epoch += 1;
        self.game = setup.start();
        self.turn = self.game.history().len() as u32;
        info!(epoch = self.epoch, "Position loaded");
        Ok(self.snapshot())
    }

    /// Reinitializes to the standard opening.
    ///
    /// Tickets issued before the reset become stale, so any outstanding
    /// provider answer is discarded when it arrives.
    #[instrument(skip(self), fields(epoch = self.epoch))]
    pub fn reset(&mut self) -> Snapshot {
        self.epoch += 1;
        self.turn = 0;
        self.game = GameSetup::new().start();
        info!(epoch = self.epoch, "Game reset");
        self.snapshot()
    }

    /// The seat controlling `player`.
    pub fn seat(&self, player: Player) -> &Seat {
        match player {
            Player::Black => &self.black,
            Player::White => &self.white,
        }
    }

    /// Current ticket, `None` once the game is over.
    pub fn ticket(&self) -> Option<TurnTicket> {
        match &self.game {
            GameResult::InProgress(g) => Some(TurnTicket {
                epoch: self.epoch,
                turn: self.turn,
                player: g.to_move(),
            }),
            GameResult::Finished(_) => None,
        }
    }

    /// Checks if the game is over.
    pub fn is_terminal(&self) -> bool {
        self.game.is_finished()
    }

    /// The underlying game state.
    pub fn game(&self) -> &GameResult {
        &self.game
    }

    /// Read-only view of the current state.
    pub fn snapshot(&self) -> Snapshot {
        match &self.game {
            GameResult::InProgress(g) => Snapshot {
                ticket: self.ticket(),
                board: *g.board(),
                phase: g.phase(),
                active_player: Some(g.to_move()),
                legal_moves: g.valid_moves(),
                scores: g.tally(),
                outcome: None,
                consecutive_passes: g.consecutive_passes(),
                last_move: g.last_move(),
                last_flips: g.last_flips().to_vec(),
            },
            GameResult::Finished(g) => Snapshot {
                ticket: None,
                board: *g.board(),
                phase: Phase::Terminal(g.outcome()),
                active_player: None,
                legal_moves: Vec::new(),
                scores: g.tally(),
                outcome: Some(g.outcome()),
                consecutive_passes: 2,
                last_move: g.last_move(),
                last_flips: g.last_flips().to_vec(),
            },
        }
    }

    /// Submits a human move for the current turn.
    pub fn submit_move(&mut self, position: Position) -> Result<Transition, MoveRejected> {
        let ticket = self
            .ticket()
            .ok_or_else(|| MoveRejected::new(RejectReason::GameOver, Some(position)))?;
        self.submit_move_for(ticket, position)
    }

    /// Submits a human move for a specific turn.
    ///
    /// # Errors
    ///
    /// Rejected if the game is over, the ticket is stale, the side to move
    /// is not a human seat, or the position is not legal now.
    #[instrument(skip(self), fields(%ticket, %position))]
    pub fn submit_move_for(&mut self, ticket: TurnTicket, position: Position) -> Result<Transition, MoveRejected> {
        let reject = |reason: RejectReason| {
            warn!(%reason, "Rejecting submitted move");
            MoveRejected::new(reason, Some(position))
        };

        let game = self.in_progress_for(ticket).map_err(reject)?;
        if !self.seat(game.to_move()).is_human() {
            return Err(reject(RejectReason::NotHumanSeat(game.to_move())));
        }
        if !game.is_legal(position) {
            return Err(reject(RejectReason::NotLegal));
        }

        self.apply(position, None).map_err(reject)
    }

    /// The provider request for the current turn, if a provider seat is to move.
    ///
    /// Never issued once the game is over; forced passes are resolved before
    /// a turn is ever offered, so the side to move always has a legal move.
    pub fn pending_request(&self) -> Option<MoveRequest> {
        let GameResult::InProgress(game) = &self.game else {
            return None;
        };
        let ticket = self.ticket()?;
        match self.seat(game.to_move()) {
            Seat::Human => None,
            Seat::Provider(provider) => Some(MoveRequest::new(ticket, *game.board(), Arc::clone(provider))),
        }
    }

    /// Applies a provider's answer for `ticket`.
    ///
    /// Illegal answers and failures are replaced by a uniformly random legal
    /// move, so a fresh answer always advances the game.
    ///
    /// # Errors
    ///
    /// Only stale tickets (reset, turn already played, game over) are
    /// rejected; the answer is discarded and state is unchanged.
    #[instrument(skip(self, answer), fields(%ticket))]
    pub fn resolve(
        &mut self,
        ticket: TurnTicket,
        answer: Result<Position, ProviderError>,
    ) -> Result<Transition, MoveRejected> {
        let answered = answer.as_ref().ok().copied();
        let game = self.in_progress_for(ticket).map_err(|reason: RejectReason| {
            warn!(%reason, "Discarding provider answer");
            MoveRejected::new(reason, answered)
        })?;

        let legal = game.valid_moves();
        let (position, fallback) = match answer {
            Ok(pos) if legal.contains(&pos) => (pos, None),
            Ok(pos) => (
                self.fallback_move(&legal, answered)?,
                Some(FallbackReason::IllegalAnswer(pos)),
            ),
            Err(e) => (
                self.fallback_move(&legal, answered)?,
                Some(FallbackReason::ProviderFailed(e)),
            ),
        };

        if let Some(reason) = &fallback {
            warn!(%reason, %position, "Substituting random legal move");
        }
        self.apply(position, fallback)
            .map_err(|reason| MoveRejected::new(reason, Some(position)))
    }

    /// The running game, provided `ticket` is the current one.
    fn in_progress_for(&self, ticket: TurnTicket) -> Result<&GameInProgress, RejectReason> {
        match &self.game {
            GameResult::Finished(_) => Err(RejectReason::GameOver),
            GameResult::InProgress(_) if self.ticket() != Some(ticket) => Err(RejectReason::StaleTurn),
            GameResult::InProgress(g) => Ok(g),
        }
    }

    fn fallback_move(&mut self, legal: &[Position], answered: Option<Position>) -> Result<Position, MoveRejected> {
        legal
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| MoveRejected::new(RejectReason::NotLegal, answered))
    }

    /// Applies a legal placement for the side to move and settles passes.
    fn apply(&mut self, position: Position, fallback: Option<FallbackReason>) -> Result<Transition, RejectReason> {
        let GameResult::InProgress(game) = &self.game else {
            return Err(RejectReason::GameOver);
        };
        let placed = Move::new(game.to_move(), position);
        let history_before = game.history().len();

        let next = game.clone().make_move(placed).map_err(|e| {
            warn!(error = %e, "Move failed validation");
            RejectReason::NotLegal
        })?;

        let new_turns = &next.history()[history_before..];
        let passed: Vec<Player> = new_turns
            .iter()
            .filter_map(|t| match t {
                Turn::Passed(p) => Some(*p),
                Turn::Placed(_) => None,
            })
            .collect();
        self.turn += new_turns.len() as u32;
        self.game = next;

        info!(%placed, passes = passed.len(), "Move applied");
        for player in &passed {
            debug!(%player, "Skipped: no legal move");
        }

        Ok(Transition {
            placed,
            passed,
            fallback,
            snapshot: self.snapshot(),
        })
    }
}
