//! Board coordinates and compass directions.

use super::types::{BOARD_SIZE, CELL_COUNT};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::EnumIter;

/// A cell coordinate on the board.
///
/// Rows and columns are zero-based and always in `0..8`; out-of-range
/// coordinates cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawPosition", into = "RawPosition")]
pub struct Position {
    row: u8,
    col: u8,
}

impl Position {
    /// Creates a position, or `None` if either coordinate is off the board.
    pub fn new(row: usize, col: usize) -> Option<Self> {
        (row < BOARD_SIZE && col < BOARD_SIZE).then_some(Self {
            row: row as u8,
            col: col as u8,
        })
    }

    /// Creates a position from a row-major index (0-63).
    pub fn from_index(index: usize) -> Option<Self> {
        (index < CELL_COUNT).then(|| Self {
            row: (index / BOARD_SIZE) as u8,
            col: (index % BOARD_SIZE) as u8,
        })
    }

    /// Zero-based row.
    pub fn row(self) -> usize {
        self.row as usize
    }

    /// Zero-based column.
    pub fn col(self) -> usize {
        self.col as usize
    }

    /// Row-major index (0-63).
    pub fn index(self) -> usize {
        self.row() * BOARD_SIZE + self.col()
    }

    /// All 64 positions in row-major order.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..CELL_COUNT).filter_map(Position::from_index)
    }

    /// The neighbouring position one step in `dir`, if it is on the board.
    pub fn step(self, dir: Direction) -> Option<Position> {
        let (dr, dc) = dir.delta();
        let row = self.row as i8 + dr;
        let col = self.col as i8 + dc;
        if row < 0 || col < 0 {
            return None;
        }
        Position::new(row as usize, col as usize)
    }

    /// Checks if this is one of the four centre cells.
    pub fn is_center(self) -> bool {
        (3..=4).contains(&self.row) && (3..=4).contains(&self.col)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", (b'a' + self.col) as char, self.row + 1)
    }
}

/// Error parsing a position.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("Invalid position {:?}: expected a1-h8 or row,col", _0)]
pub struct PositionParseError(pub String);

impl std::error::Error for PositionParseError {}

impl FromStr for Position {
    type Err = PositionParseError;

    /// Accepts algebraic form (`d3`) or zero-based `row,col` / `row col`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || PositionParseError(trimmed.to_string());

        let mut chars = trimmed.chars();
        if let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) {
            if file.is_ascii_alphabetic() && rank.is_ascii_digit() {
                let col = (file.to_ascii_lowercase() as u8).wrapping_sub(b'a') as usize;
                let row = (rank as u8 - b'0') as usize;
                return row
                    .checked_sub(1)
                    .and_then(|row| Position::new(row, col))
                    .ok_or_else(err);
            }
        }

        let parts: Vec<&str> = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();
        match parts.as_slice() {
            [row, col] => {
                let row = row.parse::<usize>().map_err(|_| err())?;
                let col = col.parse::<usize>().map_err(|_| err())?;
                Position::new(row, col).ok_or_else(err)
            }
            _ => Err(err()),
        }
    }
}

/// Wire form: `{ "row": r, "col": c }`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawPosition {
    row: usize,
    col: usize,
}

impl TryFrom<RawPosition> for Position {
    type Error = PositionParseError;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        Position::new(raw.row, raw.col)
            .ok_or_else(|| PositionParseError(format!("{},{}", raw.row, raw.col)))
    }
}

impl From<Position> for RawPosition {
    fn from(pos: Position) -> Self {
        Self {
            row: pos.row(),
            col: pos.col(),
        }
    }
}

/// The eight compass directions a capture line can run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Direction {
    /// Up-left.
    NorthWest,
    /// Up.
    North,
    /// Up-right.
    NorthEast,
    /// Left.
    West,
    /// Right.
    East,
    /// Down-left.
    SouthWest,
    /// Down.
    South,
    /// Down-right.
    SouthEast,
}

impl Direction {
    /// (row, col) offset of one step.
    pub fn delta(self) -> (i8, i8) {
        match self {
            Direction::NorthWest => (-1, -1),
            Direction::North => (-1, 0),
            Direction::NorthEast => (-1, 1),
            Direction::West => (0, -1),
            Direction::East => (0, 1),
            Direction::SouthWest => (1, -1),
            Direction::South => (1, 0),
            Direction::SouthEast => (1, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_is_unrepresentable() {
        assert!(Position::new(8, 0).is_none());
        assert!(Position::new(0, 8).is_none());
        assert!(Position::from_index(64).is_none());
        assert_eq!(Position::all().count(), 64);
    }

    #[test]
    fn parses_algebraic_and_pairs() {
        let d3 = Position::new(2, 3).unwrap();
        assert_eq!("d3".parse::<Position>(), Ok(d3));
        assert_eq!("D3".parse::<Position>(), Ok(d3));
        assert_eq!("2,3".parse::<Position>(), Ok(d3));
        assert_eq!(" 2 3 ".parse::<Position>(), Ok(d3));
        assert_eq!(d3.to_string(), "d3");
        assert!("i1".parse::<Position>().is_err());
        assert!("a9".parse::<Position>().is_err());
        assert!("a0".parse::<Position>().is_err());
        assert!("8,0".parse::<Position>().is_err());
    }

    #[test]
    fn step_stays_on_board() {
        let corner = Position::new(0, 0).unwrap();
        assert_eq!(corner.step(Direction::North), None);
        assert_eq!(corner.step(Direction::West), None);
        assert_eq!(corner.step(Direction::SouthEast), Position::new(1, 1));
    }

    #[test]
    fn json_uses_row_col() {
        let pos = Position::new(5, 4).unwrap();
        let json = serde_json::to_string(&pos).unwrap();
        assert_eq!(json, r#"{"row":5,"col":4}"#);
        assert!(serde_json::from_str::<Position>(r#"{"row":9,"col":0}"#).is_err());
    }
}
