//! Pure reversi game logic.
//!
//! - **Board model**: [`Board`], [`Cell`], [`Position`], [`Player`]
//! - **Rules**: [`rules::flip_set`], [`rules::legal_moves`],
//!   [`rules::apply_move`], [`rules::tally`]
//! - **Turn machine**: [`GameSetup`] → [`GameInProgress`] → [`GameFinished`],
//!   with forced passes resolved inside each transition
//! - **Contracts**: preconditions on every move, postconditions and
//!   [`invariants`] in debug builds
//!
//! ```
//! use strictly_reversi::{GameInProgress, GameResult, Move, Player, Position};
//!
//! let game = GameInProgress::standard();
//! assert_eq!(game.valid_moves().len(), 4);
//!
//! let d3 = Position::new(2, 3).unwrap();
//! match game.make_move(Move::new(Player::Black, d3)).unwrap() {
//!     GameResult::InProgress(game) => assert_eq!(game.to_move(), Player::White),
//!     GameResult::Finished(_) => unreachable!(),
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod contracts;
pub mod invariants;
mod phases;
mod position;
pub mod rules;
mod types;
mod typestate;

pub use action::{Move, MoveError, Turn};
pub use contracts::{Contract, FlipsSomething, LegalMove, MoveContract, NoCellCleared, PlayersTurn};
pub use phases::{Outcome, Phase};
pub use position::{Direction, Position, PositionParseError};
pub use types::{
    BOARD_SIZE, Board, BoardParseError, CELL_COUNT, Cell, Player, STARTING_PIECES, Tally,
};
pub use typestate::{GameFinished, GameInProgress, GameResult, GameSetup, SetupError};
