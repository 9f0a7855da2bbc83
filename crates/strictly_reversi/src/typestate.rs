//! Phase-specific typestate structs for reversi.
//!
//! Each phase is its own type. A `GameInProgress` always has a side to move
//! that holds at least one legal move; a `GameFinished` always has an
//! outcome. Forced passes are resolved inside the transition, so no caller
//! ever holds a game where the side to move must skip.

use super::action::{Move, MoveError, Turn};
use super::contracts::{Contract, MoveContract};
use super::phases::{Outcome, Phase};
use super::rules;
use super::{Board, Player, Position, STARTING_PIECES, Tally};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Setup Phase
// ─────────────────────────────────────────────────────────────

/// Game in setup phase - ready to start.
#[derive(Debug, Clone)]
pub struct GameSetup {
    board: Board,
    first: Player,
}

impl GameSetup {
    /// Creates a setup on the standard starting board, Black to move.
    #[instrument]
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            first: Player::Black,
        }
    }

    /// Creates a setup from an arbitrary position.
    ///
    /// Useful for puzzles and fixtures. The position may already be
    /// finished or require an immediate pass; [`GameSetup::start`] settles it.
    ///
    /// # Errors
    ///
    /// Boards with fewer pieces than the standard opening are rejected, since
    /// no game of reversi can reach them.
    pub fn from_board(board: Board, first: Player) -> Result<Self, SetupError> {
        let count = board.piece_count();
        if count < STARTING_PIECES {
            warn!(count, "Rejecting setup board");
            return Err(SetupError::TooFewPieces(count));
        }
        Ok(Self { board, first })
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Starts the game, resolving any pass or end condition on the opening board.
    #[instrument(skip(self), fields(first = %self.first))]
    pub fn start(self) -> GameResult {
        let game = GameInProgress {
            origin: self.board,
            board: self.board,
            to_move: self.first,
            consecutive_passes: 0,
            history: Vec::new(),
            last_flips: Vec::new(),
        };
        game.settle()
    }
}

/// A board that cannot start a game.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SetupError {
    /// Fewer pieces than the standard opening.
    #[display("Board has {} pieces, at least {} required", _0, STARTING_PIECES)]
    TooFewPieces(usize),
}

impl std::error::Error for SetupError {}

impl Default for GameSetup {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────
//  InProgress Phase
// ─────────────────────────────────────────────────────────────

/// Game in progress - can accept moves.
///
/// Invariants enforced by construction:
/// - `to_move` has at least one legal move
/// - `consecutive_passes` is 0 or 1
///
/// Serializable for display and logging, but only constructible through
/// [`GameSetup::start`] and [`GameInProgress::make_move`]:
///
/// ```compile_fail
/// let game: strictly_reversi::GameInProgress = serde_json::from_str("{}").unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameInProgress {
    pub(crate) origin: Board,
    pub(crate) board: Board,
    pub(crate) to_move: Player,
    pub(crate) consecutive_passes: u8,
    pub(crate) history: Vec<Turn>,
    pub(crate) last_flips: Vec<Position>,
}

impl GameInProgress {
    /// Standard opening: starting board, Black to move.
    pub fn standard() -> Self {
        Self {
            origin: Board::new(),
            board: Board::new(),
            to_move: Player::Black,
            consecutive_passes: 0,
            history: Vec::new(),
            last_flips: Vec::new(),
        }
    }

    /// Makes a move, consuming self and transitioning to the next state.
    ///
    /// After the placement the turn passes to the opponent; if the opponent
    /// cannot move they are skipped, and if neither side can move the game
    /// finishes.
    ///
    /// Contract enforcement:
    /// - Preconditions checked always
    /// - Postconditions checked in debug builds only
    #[instrument(skip(self), fields(player = %action.player, position = %action.position))]
    pub fn make_move(self, action: Move) -> Result<GameResult, MoveError> {
        MoveContract::pre(&self, &action)?;

        #[cfg(debug_assertions)]
        let before = self.clone();

        let (board, flips) = rules::apply_move_with_flips(&self.board, action.player, action.position)?;
        debug!(flipped = flips.len(), "Move applied");

        let mut game = self;
        game.board = board;
        game.last_flips = flips;
        game.history.push(Turn::Placed(action));
        game.consecutive_passes = 0;
        game.to_move = action.player.opponent();

        let result = game.settle();

        #[cfg(debug_assertions)]
        if let GameResult::InProgress(after) = &result {
            MoveContract::post(&before, after)?;
        }

        Ok(result)
    }

    /// Runs the pass/terminal check for the side to move.
    fn settle(mut self) -> GameResult {
        loop {
            if rules::has_legal_move(&self.board, self.to_move) {
                return GameResult::InProgress(self);
            }

            if !rules::has_legal_move(&self.board, self.to_move.opponent()) {
                let outcome = rules::outcome_of(&self.board);
                info!(%outcome, tally = %rules::tally(&self.board), "Game finished");
                return GameResult::Finished(GameFinished {
                    board: self.board,
                    history: self.history,
                    last_flips: self.last_flips,
                    outcome,
                });
            }

            info!(player = %self.to_move, "Forced pass");
            self.history.push(Turn::Passed(self.to_move));
            self.consecutive_passes += 1;
            self.to_move = self.to_move.opponent();
        }
    }

    /// Returns the current player to move.
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the board the game started from.
    pub fn origin(&self) -> &Board {
        &self.origin
    }

    /// Passes since the last placement (0 or 1).
    pub fn consecutive_passes(&self) -> u8 {
        self.consecutive_passes
    }

    /// Returns turn history, including passes.
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Positions flipped by the most recent placement.
    pub fn last_flips(&self) -> &[Position] {
        &self.last_flips
    }

    /// Most recent placement.
    pub fn last_move(&self) -> Option<Move> {
        last_placement(&self.history)
    }

    /// Returns the legal moves for the side to move, in row-major order.
    pub fn valid_moves(&self) -> Vec<Position> {
        rules::legal_moves(&self.board, self.to_move)
    }

    /// Checks if the side to move may play `pos`.
    pub fn is_legal(&self, pos: Position) -> bool {
        rules::is_legal(&self.board, self.to_move, pos)
    }

    /// Piece counts.
    pub fn tally(&self) -> Tally {
        rules::tally(&self.board)
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        Phase::AwaitingMove(self.to_move)
    }

    /// Replays placements from the standard opening.
    ///
    /// Each position is played by whichever side is to move; passes happen
    /// automatically.
    #[instrument(skip(positions), fields(count = positions.len()))]
    pub fn replay(positions: &[Position]) -> Result<GameResult, MoveError> {
        let mut game = GameInProgress::standard();

        for &pos in positions {
            let action = Move::new(game.to_move, pos);
            match game.make_move(action)? {
                GameResult::InProgress(g) => game = g,
                GameResult::Finished(g) => return Ok(GameResult::Finished(g)),
            }
        }

        Ok(GameResult::InProgress(game))
    }
}

impl Default for GameInProgress {
    fn default() -> Self {
        Self::standard()
    }
}

// ─────────────────────────────────────────────────────────────
//  Finished Phase
// ─────────────────────────────────────────────────────────────

/// Game finished - outcome determined.
///
/// The outcome is always present, not an `Option`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameFinished {
    board: Board,
    history: Vec<Turn>,
    last_flips: Vec<Position>,
    outcome: Outcome,
}

impl GameFinished {
    /// Returns the outcome.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Returns the final board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns turn history.
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Positions flipped by the final placement.
    pub fn last_flips(&self) -> &[Position] {
        &self.last_flips
    }

    /// Final placement.
    pub fn last_move(&self) -> Option<Move> {
        last_placement(&self.history)
    }

    /// Final piece counts.
    pub fn tally(&self) -> Tally {
        rules::tally(&self.board)
    }

    /// Restarts the game (consumes finished, returns setup).
    #[instrument(skip(self))]
    pub fn restart(self) -> GameSetup {
        GameSetup::new()
    }
}

fn last_placement(history: &[Turn]) -> Option<Move> {
    history.iter().rev().find_map(Turn::placement)
}

// ─────────────────────────────────────────────────────────────
//  Result Type
// ─────────────────────────────────────────────────────────────

/// Result of making a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameResult {
    /// Game continues.
    InProgress(GameInProgress),
    /// Game finished.
    Finished(GameFinished),
}

impl GameResult {
    /// Returns the board in either phase.
    pub fn board(&self) -> &Board {
        match self {
            GameResult::InProgress(g) => g.board(),
            GameResult::Finished(g) => g.board(),
        }
    }

    /// Returns turn history in either phase.
    pub fn history(&self) -> &[Turn] {
        match self {
            GameResult::InProgress(g) => g.history(),
            GameResult::Finished(g) => g.history(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        match self {
            GameResult::InProgress(g) => g.phase(),
            GameResult::Finished(g) => Phase::Terminal(g.outcome()),
        }
    }

    /// Passes since the last placement; 2 once finished.
    pub fn consecutive_passes(&self) -> u8 {
        match self {
            GameResult::InProgress(g) => g.consecutive_passes(),
            GameResult::Finished(_) => 2,
        }
    }

    /// Checks if the game is over.
    pub fn is_finished(&self) -> bool {
        matches!(self, GameResult::Finished(_))
    }
}
