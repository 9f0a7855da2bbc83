//! Reversi move rules.
//!
//! Every function here is pure: boards go in, values come out. A single
//! rule decides legality and flips. Placing on an empty cell must bracket at
//! least one straight, unbroken line of opponent pieces between the new piece
//! and another of the mover's pieces.

use super::action::MoveError;
use super::phases::Outcome;
use super::position::Direction;
use super::types::{Board, Cell, Player, Tally};
use super::Position;
use strum::IntoEnumIterator;
use tracing::instrument;

/// Opponent pieces that `player` would flip by playing `pos`.
///
/// Returns an empty set when the cell is occupied or nothing is bracketed.
/// Positions are grouped by direction, nearest first.
pub fn flip_set(board: &Board, player: Player, pos: Position) -> Vec<Position> {
    if !board.is_empty(pos) {
        return Vec::new();
    }

    let own = player.cell();
    let theirs = player.opponent().cell();
    let mut flips = Vec::new();

    for dir in Direction::iter() {
        let mut candidates = Vec::new();
        let mut cursor = pos.step(dir);

        while let Some(p) = cursor {
            if board.get(p) != theirs {
                break;
            }
            candidates.push(p);
            cursor = p.step(dir);
        }

        let closed = cursor.is_some_and(|p| board.get(p) == own);
        if closed && !candidates.is_empty() {
            flips.extend(candidates);
        }
    }

    flips
}

/// Checks if `player` may play `pos`.
pub fn is_legal(board: &Board, player: Player, pos: Position) -> bool {
    !flip_set(board, player, pos).is_empty()
}

/// All legal moves for `player`, in row-major order.
#[instrument(skip(board))]
pub fn legal_moves(board: &Board, player: Player) -> Vec<Position> {
    Position::all()
        .filter(|&pos| is_legal(board, player, pos))
        .collect()
}

/// Checks if `player` has at least one legal move.
pub fn has_legal_move(board: &Board, player: Player) -> bool {
    Position::all().any(|pos| is_legal(board, player, pos))
}

/// Plays `pos` for `player`, returning the new board.
///
/// # Errors
///
/// Returns [`MoveError::IllegalMove`] if the move flips nothing.
#[instrument(skip(board), fields(position = %pos))]
pub fn apply_move(board: &Board, player: Player, pos: Position) -> Result<Board, MoveError> {
    apply_move_with_flips(board, player, pos).map(|(next, _)| next)
}

/// Like [`apply_move`], also returning the flipped positions.
pub fn apply_move_with_flips(
    board: &Board,
    player: Player,
    pos: Position,
) -> Result<(Board, Vec<Position>), MoveError> {
    let flips = flip_set(board, player, pos);
    if flips.is_empty() {
        return Err(MoveError::IllegalMove {
            player,
            position: pos,
        });
    }

    let cell = player.cell();
    let next = flips
        .iter()
        .fold(board.with(pos, cell), |b, &p| b.with(p, cell));
    Ok((next, flips))
}

/// Counts pieces of each color.
pub fn tally(board: &Board) -> Tally {
    board
        .cells()
        .iter()
        .fold(Tally::default(), |mut t, cell| {
            match cell {
                Cell::Black => t.black += 1,
                Cell::White => t.white += 1,
                Cell::Empty => {}
            }
            t
        })
}

/// Outcome if the game ended on this board: more pieces wins.
pub fn outcome_of(board: &Board) -> Outcome {
    Outcome::from_tally(tally(board))
}

/// Checks if neither player can move.
pub fn is_terminal(board: &Board) -> bool {
    !has_legal_move(board, Player::Black) && !has_legal_move(board, Player::White)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col).unwrap()
    }

    #[test]
    fn occupied_cell_flips_nothing() {
        let board = Board::new();
        assert!(flip_set(&board, Player::Black, pos(3, 3)).is_empty());
        assert!(!is_legal(&board, Player::Black, pos(3, 4)));
    }

    #[test]
    fn black_opening_moves() {
        let board = Board::new();
        let moves = legal_moves(&board, Player::Black);
        assert_eq!(moves, vec![pos(2, 3), pos(3, 2), pos(4, 5), pos(5, 4)]);
    }

    #[test]
    fn white_opening_moves() {
        let board = Board::new();
        let moves = legal_moves(&board, Player::White);
        assert_eq!(moves, vec![pos(2, 4), pos(3, 5), pos(4, 2), pos(5, 3)]);
    }

    #[test]
    fn line_ending_in_empty_flips_nothing() {
        let board = Board::from_rows(&[
            "........",
            "........",
            "........",
            "..WWW...",
            "........",
            "........",
            "........",
            "........",
        ])
        .unwrap();
        assert!(flip_set(&board, Player::Black, pos(3, 1)).is_empty());
    }

    #[test]
    fn line_running_off_board_flips_nothing() {
        let board = Board::from_rows(&[
            "........",
            "........",
            "........",
            ".WWWWWWW",
            "........",
            "........",
            "........",
            "........",
        ])
        .unwrap();
        assert!(flip_set(&board, Player::Black, pos(3, 0)).is_empty());
    }

    #[test]
    fn flips_in_several_directions() {
        let board = Board::from_rows(&[
            "B.B.....",
            ".WW.....",
            "BW......",
            "........",
            "........",
            "........",
            "........",
            "........",
        ])
        .unwrap();
        // (2,2): north via (1,2) to (0,2), north-west via (1,1) to (0,0),
        // west via (2,1) to (2,0).
        let mut flips = flip_set(&board, Player::Black, pos(2, 2));
        flips.sort();
        assert_eq!(flips, vec![pos(1, 1), pos(1, 2), pos(2, 1)]);
    }

    #[test]
    fn apply_move_leaves_input_untouched() {
        let board = Board::new();
        let next = apply_move(&board, Player::Black, pos(2, 3)).unwrap();
        assert_eq!(board, Board::new());
        assert_eq!(next.get(pos(2, 3)), Cell::Black);
        assert_eq!(next.get(pos(3, 3)), Cell::Black);
        assert_eq!(tally(&next), Tally { black: 4, white: 1 });
    }

    #[test]
    fn apply_illegal_move_errors() {
        let board = Board::new();
        assert_eq!(
            apply_move(&board, Player::Black, pos(0, 0)),
            Err(MoveError::IllegalMove {
                player: Player::Black,
                position: pos(0, 0)
            })
        );
    }

    #[test]
    fn full_board_is_terminal() {
        let rows = ["BBBBBBBB"; 8];
        let board = Board::from_rows(&rows).unwrap();
        assert!(is_terminal(&board));
        assert_eq!(outcome_of(&board), Outcome::BlackWins);
    }
}
