//! Pseudo-legal move generation.
//!
//! Moves produced here follow each piece's movement and capture pattern but
//! ignore whether the mover's own king is left in check; that filter lives
//! in [`crate::game`].

use crate::board::Board;
use crate::moves::Move;
use crate::piece::{Color, Piece, PieceType};
use crate::position::Position;

pub const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

pub const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

pub const QUEEN_DIRS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

pub const KING_OFFSETS: [(i8, i8); 8] = QUEEN_DIRS;

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// How a piece type moves.
#[derive(Debug, Clone, Copy)]
pub enum MovePattern {
    /// Walk each ray until the edge or the first occupied square.
    Slide(&'static [(i8, i8)]),
    /// Try each offset exactly once.
    Step(&'static [(i8, i8)]),
    /// Forward pushes, double step from the start row, diagonal captures.
    Pawn,
}

impl PieceType {
    pub fn pattern(self) -> MovePattern {
        match self {
            PieceType::Bishop => MovePattern::Slide(&BISHOP_DIRS),
            PieceType::Rook => MovePattern::Slide(&ROOK_DIRS),
            PieceType::Queen => MovePattern::Slide(&QUEEN_DIRS),
            PieceType::King => MovePattern::Step(&KING_OFFSETS),
            PieceType::Knight => MovePattern::Step(&KNIGHT_OFFSETS),
            PieceType::Pawn => MovePattern::Pawn,
        }
    }
}

/// Pseudo-legal moves for whatever stands on `from`; empty if the square is empty.
pub fn pseudo_legal_moves(board: &Board, from: Position) -> Vec<Move> {
    match board.get(from) {
        Some(piece) => piece_moves(board, from, piece),
        None => Vec::new(),
    }
}

/// Pseudo-legal moves for `piece` as if it stood on `from`.
pub fn piece_moves(board: &Board, from: Position, piece: Piece) -> Vec<Move> {
    match piece.kind.pattern() {
        MovePattern::Slide(dirs) => slide_moves(board, from, piece.color, dirs),
        MovePattern::Step(offsets) => step_moves(board, from, piece.color, offsets),
        MovePattern::Pawn => pawn_moves(board, from, piece.color),
    }
}

fn slide_moves(board: &Board, from: Position, color: Color, dirs: &[(i8, i8)]) -> Vec<Move> {
    let mut moves = Vec::new();
    for &(dr, dc) in dirs {
        let mut cursor = from;
        while let Some(next) = cursor.offset(dr, dc) {
            match board.get(next) {
                None => moves.push(Move::new(from, next)),
                Some(other) => {
                    if other.color != color {
                        moves.push(Move::new(from, next));
                    }
                    break;
                }
            }
            cursor = next;
        }
    }
    moves
}

fn step_moves(board: &Board, from: Position, color: Color, offsets: &[(i8, i8)]) -> Vec<Move> {
    offsets
        .iter()
        .filter_map(|&(dr, dc)| from.offset(dr, dc))
        .filter(|to| !matches!(board.get(*to), Some(other) if other.color == color))
        .map(|to| Move::new(from, to))
        .collect()
}

fn pawn_moves(board: &Board, from: Position, color: Color) -> Vec<Move> {
    let dir = color.pawn_direction();
    let mut targets = Vec::with_capacity(4);

    if let Some(one) = from.offset(dir, 0) {
        if board.get(one).is_none() {
            targets.push(one);
            if from.row == color.pawn_start_row() {
                if let Some(two) = one.offset(dir, 0) {
                    if board.get(two).is_none() {
                        targets.push(two);
                    }
                }
            }
        }
    }

    for dc in [-1, 1] {
        if let Some(diag) = from.offset(dir, dc) {
            if board.get(diag).is_some_and(|other| other.color != color) {
                targets.push(diag);
            }
        }
    }

    let mut moves = Vec::with_capacity(targets.len() * PieceType::PROMOTIONS.len());
    for to in targets {
        if to.row == color.back_rank() {
            moves.extend(
                PieceType::PROMOTIONS
                    .iter()
                    .map(|&promotion| Move::promoting(from, to, promotion)),
            );
        } else {
            moves.push(Move::new(from, to));
        }
    }
    moves
}
