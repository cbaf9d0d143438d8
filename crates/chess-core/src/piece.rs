use std::fmt;

use serde::{Deserialize, Serialize};

/// Side of the board a piece belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a single pawn step.
    pub fn pawn_direction(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Row pawns of this color start on (double step allowed only here).
    pub fn pawn_start_row(self) -> u8 {
        match self {
            Color::White => 2,
            Color::Black => 7,
        }
    }

    /// Row where pawns of this color promote.
    pub fn back_rank(self) -> u8 {
        match self {
            Color::White => 8,
            Color::Black => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => f.write_str("white"),
            Color::Black => f.write_str("black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PieceType {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceType {
    /// Types a pawn may promote to.
    pub const PROMOTIONS: [PieceType; 4] = [
        PieceType::Bishop,
        PieceType::Knight,
        PieceType::Queen,
        PieceType::Rook,
    ];

    pub fn is_promotion_target(self) -> bool {
        Self::PROMOTIONS.contains(&self)
    }

    /// Lowercase letter used in coordinate move notation.
    pub fn letter(self) -> char {
        match self {
            PieceType::King => 'k',
            PieceType::Queen => 'q',
            PieceType::Rook => 'r',
            PieceType::Bishop => 'b',
            PieceType::Knight => 'n',
            PieceType::Pawn => 'p',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'k' => Some(PieceType::King),
            'q' => Some(PieceType::Queen),
            'r' => Some(PieceType::Rook),
            'b' => Some(PieceType::Bishop),
            'n' => Some(PieceType::Knight),
            'p' => Some(PieceType::Pawn),
            _ => None,
        }
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceType::King => "king",
            PieceType::Queen => "queen",
            PieceType::Rook => "rook",
            PieceType::Bishop => "bishop",
            PieceType::Knight => "knight",
            PieceType::Pawn => "pawn",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    #[serde(rename = "type")]
    pub kind: PieceType,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceType) -> Self {
        Self { color, kind }
    }
}
