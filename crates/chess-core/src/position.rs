//! Board coordinates: 1-indexed rows (ranks) and columns (files).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const BOARD_SIZE: u8 = 8;

const FILES: &[u8; 8] = b"abcdefgh";

/// A square on the board, row 1-8 and column 1-8.
///
/// Positions coming off the wire are not validated on construction, so
/// anything that indexes a board goes through [`Position::is_on_board`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    pub fn is_on_board(self) -> bool {
        (1..=BOARD_SIZE).contains(&self.row) && (1..=BOARD_SIZE).contains(&self.col)
    }

    /// The square `(dr, dc)` away, or `None` if that falls off the board.
    pub fn offset(self, dr: i8, dc: i8) -> Option<Self> {
        let row = self.row as i8 + dr;
        let col = self.col as i8 + dc;
        let pos = Self::new(u8::try_from(row).ok()?, u8::try_from(col).ok()?);
        pos.is_on_board().then_some(pos)
    }

    /// Every square, rank by rank from row 1.
    pub fn all() -> impl Iterator<Item = Position> {
        (1..=BOARD_SIZE).flat_map(|row| (1..=BOARD_SIZE).map(move |col| Position::new(row, col)))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_on_board() {
            write!(f, "{}{}", FILES[self.col as usize - 1] as char, self.row)
        } else {
            write!(f, "({},{})", self.row, self.col)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid square '{0}'")]
pub struct ParsePositionError(pub String);

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ParsePositionError(s.to_string()));
        }
        let col = FILES
            .iter()
            .position(|&f| f == bytes[0].to_ascii_lowercase())
            .ok_or_else(|| ParsePositionError(s.to_string()))?;
        let row = (bytes[1] as char)
            .to_digit(10)
            .filter(|r| (1..=BOARD_SIZE as u32).contains(r))
            .ok_or_else(|| ParsePositionError(s.to_string()))?;
        Ok(Position::new(row as u8, col as u8 + 1))
    }
}
