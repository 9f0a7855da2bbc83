//! Core domain types for reversi.

use super::position::Position;
use serde::{Deserialize, Serialize};

/// Side length of the board.
pub const BOARD_SIZE: usize = 8;

/// Number of cells on the board.
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// Pieces on the board before the first move.
pub const STARTING_PIECES: usize = 4;

/// Player in the game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum Player {
    /// Black (moves first).
    Black,
    /// White.
    White,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    /// Returns the cell state this player's pieces occupy.
    pub fn cell(self) -> Cell {
        match self {
            Player::Black => Cell::Black,
            Player::White => Cell::White,
        }
    }
}

/// A cell on the reversi board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Empty cell.
    #[default]
    Empty,
    /// Cell holding a black piece.
    Black,
    /// Cell holding a white piece.
    White,
}

impl Cell {
    /// Returns the owner of the piece in this cell, if any.
    pub fn owner(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Black => Some(Player::Black),
            Cell::White => Some(Player::White),
        }
    }

    /// Checks if the cell is empty.
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Black => 'B',
            Cell::White => 'W',
        }
    }

    fn from_symbol(c: char) -> Option<Self> {
        match c {
            '.' => Some(Cell::Empty),
            'B' | 'b' => Some(Cell::Black),
            'W' | 'w' => Some(Cell::White),
            _ => None,
        }
    }
}

/// 8x8 reversi board.
///
/// Boards are values. Rule functions return a new board rather than
/// mutating one in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    /// Cells in row-major order (0-63).
    #[serde(with = "cells_serde")]
    cells: [Cell; CELL_COUNT],
}

impl Board {
    /// Creates the starting board: d4/e5 white, e4/d5 black.
    pub fn new() -> Self {
        let mut board = Self::empty();
        board.cells[3 * BOARD_SIZE + 3] = Cell::White;
        board.cells[3 * BOARD_SIZE + 4] = Cell::Black;
        board.cells[4 * BOARD_SIZE + 3] = Cell::Black;
        board.cells[4 * BOARD_SIZE + 4] = Cell::White;
        board
    }

    /// Creates a board with every cell empty.
    pub fn empty() -> Self {
        Self {
            cells: [Cell::Empty; CELL_COUNT],
        }
    }

    /// Gets the cell at the given position.
    pub fn get(&self, pos: Position) -> Cell {
        self.cells[pos.index()]
    }

    /// Checks if the cell at the position is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos).is_empty()
    }

    /// Returns a copy of this board with one cell replaced.
    pub fn with(mut self, pos: Position, cell: Cell) -> Self {
        self.cells[pos.index()] = cell;
        self
    }

    /// Returns all cells in row-major order.
    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.cells
    }

    /// Number of occupied cells.
    pub fn piece_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    /// Checks if every cell is occupied.
    pub fn is_full(&self) -> bool {
        self.piece_count() == CELL_COUNT
    }

    /// Formats the board as rows of `B`, `W` and `.` separated by spaces.
    pub fn display(&self) -> String {
        self.cells
            .chunks(BOARD_SIZE)
            .map(|row| {
                row.iter()
                    .map(|c| c.symbol().to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Parses a board from eight rows of `B`, `W` and `.`.
    ///
    /// Whitespace inside a row is ignored, so the output of
    /// [`Board::display`] parses back to the same board.
    pub fn from_rows(rows: &[&str]) -> Result<Self, BoardParseError> {
        if rows.len() != BOARD_SIZE {
            return Err(BoardParseError::RowCount(rows.len()));
        }
        let mut board = Self::empty();
        for (r, line) in rows.iter().enumerate() {
            let symbols: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if symbols.len() != BOARD_SIZE {
                return Err(BoardParseError::RowWidth {
                    row: r,
                    width: symbols.len(),
                });
            }
            for (c, symbol) in symbols.into_iter().enumerate() {
                let cell = Cell::from_symbol(symbol)
                    .ok_or(BoardParseError::BadSymbol { row: r, symbol })?;
                board.cells[r * BOARD_SIZE + c] = cell;
            }
        }
        Ok(board)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "  a b c d e f g h")?;
        for (r, row) in self.display().lines().enumerate() {
            writeln!(f, "{} {}", r + 1, row)?;
        }
        Ok(())
    }
}

/// Error parsing a board from text rows.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum BoardParseError {
    /// Wrong number of rows.
    #[display("Expected 8 rows, got {}", _0)]
    RowCount(usize),
    /// A row had the wrong number of cells.
    #[display("Row {} has {} cells, expected 8", row, width)]
    RowWidth {
        /// Zero-based row index.
        row: usize,
        /// Number of cells found.
        width: usize,
    },
    /// A character other than `B`, `W` or `.`.
    #[display("Row {} contains unknown symbol {:?}", row, symbol)]
    BadSymbol {
        /// Zero-based row index.
        row: usize,
        /// The offending character.
        symbol: char,
    },
}

impl std::error::Error for BoardParseError {}

/// Piece counts for both colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Tally {
    /// Black pieces on the board.
    pub black: usize,
    /// White pieces on the board.
    pub white: usize,
}

impl Tally {
    /// Count for one player.
    pub fn of(&self, player: Player) -> usize {
        match player {
            Player::Black => self.black,
            Player::White => self.white,
        }
    }

    /// Total pieces on the board.
    pub fn total(&self) -> usize {
        self.black + self.white
    }
}

impl std::fmt::Display for Tally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Black {} - White {}", self.black, self.white)
    }
}

// serde only derives arrays up to 32 elements.
mod cells_serde {
    use super::{CELL_COUNT, Cell};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(cells: &[Cell; CELL_COUNT], s: S) -> Result<S::Ok, S::Error> {
        cells.as_slice().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[Cell; CELL_COUNT], D::Error> {
        let cells = Vec::<Cell>::deserialize(d)?;
        let len = cells.len();
        cells
            .try_into()
            .map_err(|_| D::Error::invalid_length(len, &"64 cells"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_board_has_two_of_each() {
        let board = Board::new();
        let black = board.cells().iter().filter(|c| **c == Cell::Black).count();
        let white = board.cells().iter().filter(|c| **c == Cell::White).count();
        assert_eq!((black, white), (2, 2));
        assert_eq!(board.piece_count(), STARTING_PIECES);
    }

    #[test]
    fn display_parses_back() {
        let board = Board::new();
        let text = board.display();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(Board::from_rows(&rows), Ok(board));
    }

    #[test]
    fn from_rows_rejects_bad_input() {
        assert_eq!(
            Board::from_rows(&["........"]),
            Err(BoardParseError::RowCount(1))
        );
        let mut rows = vec!["........"; 8];
        rows[2] = "...x....";
        assert!(matches!(
            Board::from_rows(&rows),
            Err(BoardParseError::BadSymbol { row: 2, symbol: 'x' })
        ));
    }

    #[test]
    fn serde_keeps_all_cells() {
        let board = Board::new();
        let json = serde_json::to_string(&board).unwrap();
        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(back, board);
    }
}
