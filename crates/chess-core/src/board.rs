use serde::{Deserialize, Serialize};

use crate::piece::{Color, Piece, PieceType};
use crate::position::{Position, BOARD_SIZE};

const BACK_ROW: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// An 8x8 grid of optional pieces. Knows nothing about the rules.
///
/// `squares[row - 1][col - 1]` holds the piece on `Position { row, col }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Board {
    squares: [[Option<Piece>; BOARD_SIZE as usize]; BOARD_SIZE as usize],
}

impl Board {
    /// An empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard starting arrangement.
    pub fn starting() -> Self {
        let mut board = Self::new();
        for (i, kind) in BACK_ROW.iter().enumerate() {
            let col = i as u8 + 1;
            board.add_piece(Position::new(1, col), Piece::new(Color::White, *kind));
            board.add_piece(Position::new(2, col), Piece::new(Color::White, PieceType::Pawn));
            board.add_piece(Position::new(7, col), Piece::new(Color::Black, PieceType::Pawn));
            board.add_piece(Position::new(8, col), Piece::new(Color::Black, *kind));
        }
        board
    }

    fn slot(&self, pos: Position) -> Option<&Option<Piece>> {
        if !pos.is_on_board() {
            return None;
        }
        Some(&self.squares[pos.row as usize - 1][pos.col as usize - 1])
    }

    /// The piece on `pos`. Off-board positions are always empty.
    pub fn get(&self, pos: Position) -> Option<Piece> {
        self.slot(pos).copied().flatten()
    }

    /// Place `piece` on `pos`, replacing whatever was there. Off-board is a no-op.
    pub fn add_piece(&mut self, pos: Position, piece: Piece) {
        if pos.is_on_board() {
            self.squares[pos.row as usize - 1][pos.col as usize - 1] = Some(piece);
        }
    }

    /// Clear `pos`, returning the piece that stood there.
    pub fn remove_piece(&mut self, pos: Position) -> Option<Piece> {
        if !pos.is_on_board() {
            return None;
        }
        self.squares[pos.row as usize - 1][pos.col as usize - 1].take()
    }

    /// All occupied squares.
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(move |pos| self.get(pos).map(|piece| (pos, piece)))
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.pieces().filter(move |(_, piece)| piece.color == color)
    }

    pub fn king_position(&self, color: Color) -> Option<Position> {
        self.pieces_of(color)
            .find(|(_, piece)| piece.kind == PieceType::King)
            .map(|(pos, _)| pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_layout() {
        let board = Board::starting();
        assert_eq!(board.pieces().count(), 32);
        assert_eq!(board.pieces_of(Color::White).count(), 16);
        assert_eq!(board.king_position(Color::White), Some(Position::new(1, 5)));
        assert_eq!(board.king_position(Color::Black), Some(Position::new(8, 5)));
        assert_eq!(
            board.get(Position::new(8, 4)),
            Some(Piece::new(Color::Black, PieceType::Queen))
        );
        assert_eq!(board.get(Position::new(4, 4)), None);
    }

    #[test]
    fn test_add_and_remove() {
        let mut board = Board::new();
        let pos = Position::new(3, 3);
        let rook = Piece::new(Color::White, PieceType::Rook);
        board.add_piece(pos, rook);
        assert_eq!(board.get(pos), Some(rook));
        assert_eq!(board.remove_piece(pos), Some(rook));
        assert_eq!(board.get(pos), None);
        assert_eq!(board.remove_piece(pos), None);
    }

    #[test]
    fn test_off_board_access_is_empty() {
        let mut board = Board::starting();
        let off = Position::new(9, 1);
        board.add_piece(off, Piece::new(Color::White, PieceType::Queen));
        assert_eq!(board.get(off), None);
        assert_eq!(board.remove_piece(Position::new(0, 0)), None);
        assert_eq!(board, Board::starting());
    }
}
