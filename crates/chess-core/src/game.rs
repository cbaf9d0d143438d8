//! The rules engine: a board plus side to move and game status.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::{GameOver, IllegalMove};
use crate::movegen;
use crate::moves::Move;
use crate::piece::{Color, Piece};
use crate::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    InProgress,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EndReason {
    Checkmate,
    Stalemate,
    Resignation,
}

/// How a finished game ended. `winner` is `None` for a stalemate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub reason: EndReason,
    pub winner: Option<Color>,
}

/// What a successful [`Game::make_move`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedMove {
    pub mv: Move,
    /// The piece that moved, as it was before any promotion.
    pub piece: Piece,
    pub captured: Option<Piece>,
    /// Set when this move ended the game.
    pub result: Option<GameResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    board: Board,
    turn: Color,
    status: GameStatus,
    #[serde(default)]
    result: Option<GameResult>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Standard starting position, white to move.
    pub fn new() -> Self {
        Self::from_board(Board::starting(), Color::White)
    }

    /// An in-progress game over an arbitrary arrangement.
    pub fn from_board(board: Board, turn: Color) -> Self {
        Self {
            board,
            turn,
            status: GameStatus::InProgress,
            result: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    pub fn is_finished(&self) -> bool {
        self.status == GameStatus::Finished
    }

    /// Moves the piece on `from` may make without leaving its own king in
    /// check. Empty if the square is empty or the piece is stuck. Does not
    /// look at whose turn it is.
    pub fn legal_moves(&self, from: Position) -> Vec<Move> {
        let Some(piece) = self.board.get(from) else {
            return Vec::new();
        };
        movegen::piece_moves(&self.board, from, piece)
            .into_iter()
            .filter(|mv| {
                let after = apply(self.board, mv);
                !king_attacked(&after, piece.color)
            })
            .collect()
    }

    /// Apply `mv` for the side to move. On error nothing changes.
    ///
    /// After the move, if the side now to move has no legal move the game is
    /// finished as checkmate (when in check) or stalemate.
    pub fn make_move(&mut self, mv: Move) -> Result<AppliedMove, IllegalMove> {
        let from = mv.start_position;
        let to = mv.end_position;

        if self.is_finished() {
            return Err(IllegalMove::GameOver);
        }
        for pos in [from, to] {
            if !pos.is_on_board() {
                return Err(IllegalMove::OffBoard(pos));
            }
        }
        let piece = self.board.get(from).ok_or(IllegalMove::NoPiece(from))?;
        if piece.color != self.turn {
            return Err(IllegalMove::NotYourTurn {
                from,
                color: piece.color,
                turn: self.turn,
            });
        }
        let legal = self.legal_moves(from);
        if !legal.contains(&mv) {
            let needs_promotion = mv.promotion_piece.is_none()
                && legal
                    .iter()
                    .any(|m| m.end_position == to && m.promotion_piece.is_some());
            return Err(if needs_promotion {
                IllegalMove::PromotionRequired(to)
            } else {
                IllegalMove::NotLegal(mv)
            });
        }

        let captured = self.board.get(to);
        self.board = apply(self.board, &mv);
        self.turn = self.turn.opponent();

        let result = self.end_of_game_for(self.turn);
        if let Some(result) = result {
            self.finish(result);
        }

        Ok(AppliedMove {
            mv,
            piece,
            captured,
            result,
        })
    }

    /// `color` concedes; the opponent wins.
    pub fn resign(&mut self, color: Color) -> Result<GameResult, GameOver> {
        if self.is_finished() {
            return Err(GameOver);
        }
        let result = GameResult {
            reason: EndReason::Resignation,
            winner: Some(color.opponent()),
        };
        self.finish(result);
        Ok(result)
    }

    fn finish(&mut self, result: GameResult) {
        self.status = GameStatus::Finished;
        self.result = Some(result);
    }

    fn end_of_game_for(&self, color: Color) -> Option<GameResult> {
        if self.has_legal_move(color) {
            return None;
        }
        Some(if self.is_in_check(color) {
            GameResult {
                reason: EndReason::Checkmate,
                winner: Some(color.opponent()),
            }
        } else {
            GameResult {
                reason: EndReason::Stalemate,
                winner: None,
            }
        })
    }

    pub fn has_legal_move(&self, color: Color) -> bool {
        self.board
            .pieces_of(color)
            .any(|(pos, _)| !self.legal_moves(pos).is_empty())
    }

    /// Whether any enemy piece could capture `color`'s king. False if that
    /// king is not on the board.
    pub fn is_in_check(&self, color: Color) -> bool {
        king_attacked(&self.board, color)
    }

    pub fn is_in_checkmate(&self, color: Color) -> bool {
        self.is_in_check(color) && !self.has_legal_move(color)
    }

    pub fn is_in_stalemate(&self, color: Color) -> bool {
        !self.is_in_check(color) && !self.has_legal_move(color)
    }
}

/// The board after `mv`, promotion included. Works on a copy.
fn apply(mut board: Board, mv: &Move) -> Board {
    if let Some(mut piece) = board.remove_piece(mv.start_position) {
        if let Some(promotion) = mv.promotion_piece {
            piece.kind = promotion;
        }
        board.add_piece(mv.end_position, piece);
    }
    board
}

fn king_attacked(board: &Board, color: Color) -> bool {
    let Some(king) = board.king_position(color) else {
        return false;
    };
    board.pieces_of(color.opponent()).any(|(pos, piece)| {
        movegen::piece_moves(board, pos, piece)
            .iter()
            .any(|mv| mv.end_position == king)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::PieceType;

    fn sq(s: &str) -> Position {
        s.parse().unwrap()
    }

    fn mv(from: &str, to: &str) -> Move {
        Move::new(sq(from), sq(to))
    }

    fn board_with(pieces: &[(&str, Color, PieceType)]) -> Board {
        let mut board = Board::new();
        for &(s, color, kind) in pieces {
            board.add_piece(sq(s), Piece::new(color, kind));
        }
        board
    }

    #[test]
    fn test_turn_alternates() {
        let mut game = Game::new();
        assert_eq!(game.turn(), Color::White);
        game.make_move(mv("e2", "e4")).unwrap();
        assert_eq!(game.turn(), Color::Black);
        game.make_move(mv("e7", "e5")).unwrap();
        assert_eq!(game.turn(), Color::White);
    }

    #[test]
    fn test_wrong_color_rejected() {
        let mut game = Game::new();
        let err = game.make_move(mv("e7", "e5")).unwrap_err();
        assert!(matches!(err, IllegalMove::NotYourTurn { color: Color::Black, .. }));
        assert_eq!(game, Game::new());
    }

    #[test]
    fn test_illegal_move_is_idempotent() {
        let mut game = Game::new();
        let before = serde_json::to_string(&game).unwrap();
        let first = game.make_move(mv("e2", "e5")).unwrap_err();
        let second = game.make_move(mv("e2", "e5")).unwrap_err();
        assert_eq!(first, second);
        assert_eq!(first, IllegalMove::NotLegal(mv("e2", "e5")));
        assert_eq!(serde_json::to_string(&game).unwrap(), before);
    }

    #[test]
    fn test_empty_square_and_off_board() {
        let mut game = Game::new();
        assert_eq!(game.make_move(mv("e4", "e5")), Err(IllegalMove::NoPiece(sq("e4"))));
        let off = Move::new(sq("e2"), Position::new(9, 5));
        assert_eq!(game.make_move(off), Err(IllegalMove::OffBoard(Position::new(9, 5))));
        assert!(game.legal_moves(Position::new(0, 0)).is_empty());
    }

    #[test]
    fn test_pinned_piece_cannot_expose_king() {
        // White rook on e2 is pinned against e1 by the black rook on e8.
        let board = board_with(&[
            ("e1", Color::White, PieceType::King),
            ("e2", Color::White, PieceType::Rook),
            ("e8", Color::Black, PieceType::Rook),
            ("a8", Color::Black, PieceType::King),
        ]);
        let game = Game::from_board(board, Color::White);
        let moves = game.legal_moves(sq("e2"));
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|m| m.end_position.col == 5));
        assert!(moves.contains(&mv("e2", "e8")), "capturing the pinner is allowed");
    }

    #[test]
    fn test_legal_moves_never_leave_king_in_check() {
        let mut game = Game::new();
        for (from, to) in [("e2", "e4"), ("f7", "f6"), ("d1", "h5")] {
            game.make_move(mv(from, to)).unwrap();
        }
        // Black is in check from h5; every legal black move must resolve it.
        assert!(game.is_in_check(Color::Black));
        for (pos, _) in game.board().pieces_of(Color::Black) {
            for m in game.legal_moves(pos) {
                let mut probe = game.clone();
                probe.make_move(m).unwrap();
                assert!(!probe.is_in_check(Color::Black), "{m} leaves black in check");
            }
        }
    }

    #[test]
    fn test_capture_is_restored_during_simulation() {
        // The king may not take the defended queen, and probing that capture
        // must leave the queen on the board.
        let board = board_with(&[
            ("e1", Color::White, PieceType::King),
            ("e2", Color::Black, PieceType::Queen),
            ("e3", Color::Black, PieceType::Rook),
            ("a8", Color::Black, PieceType::King),
        ]);
        let game = Game::from_board(board, Color::White);
        assert!(game.legal_moves(sq("e1")).iter().all(|m| m.end_position != sq("e2")));
        assert_eq!(game.board().get(sq("e2")).map(|p| p.kind), Some(PieceType::Queen));
        assert!(game.is_in_checkmate(Color::White));
    }

    #[test]
    fn test_fools_mate() {
        let mut game = Game::new();
        game.make_move(mv("f2", "f3")).unwrap();
        game.make_move(mv("e7", "e5")).unwrap();
        game.make_move(mv("g2", "g4")).unwrap();
        let applied = game.make_move(mv("d8", "h4")).unwrap();

        assert!(game.is_in_checkmate(Color::White));
        assert!(!game.is_in_stalemate(Color::White));
        assert_eq!(game.status(), GameStatus::Finished);
        let expected = GameResult {
            reason: EndReason::Checkmate,
            winner: Some(Color::Black),
        };
        assert_eq!(applied.result, Some(expected));
        assert_eq!(game.result(), Some(expected));
        assert_eq!(game.make_move(mv("a2", "a3")), Err(IllegalMove::GameOver));
    }

    #[test]
    fn test_predicates_do_not_change_status() {
        let board = board_with(&[
            ("h8", Color::Black, PieceType::King),
            ("g6", Color::White, PieceType::Queen),
            ("f7", Color::White, PieceType::King),
        ]);
        let game = Game::from_board(board, Color::Black);
        assert!(game.is_in_stalemate(Color::Black));
        assert!(!game.is_in_checkmate(Color::Black));
        assert!(!game.is_in_check(Color::Black));
        assert_eq!(game.status(), GameStatus::InProgress);
    }

    #[test]
    fn test_move_into_stalemate_finishes_game() {
        let board = board_with(&[
            ("h8", Color::Black, PieceType::King),
            ("g5", Color::White, PieceType::Queen),
            ("f7", Color::White, PieceType::King),
        ]);
        let mut game = Game::from_board(board, Color::White);
        let applied = game.make_move(mv("g5", "g6")).unwrap();
        assert_eq!(
            applied.result,
            Some(GameResult {
                reason: EndReason::Stalemate,
                winner: None
            })
        );
        assert!(game.is_finished());
    }

    #[test]
    fn test_promotion_replaces_piece_type() {
        let board = board_with(&[
            ("a7", Color::White, PieceType::Pawn),
            ("e1", Color::White, PieceType::King),
            ("e8", Color::Black, PieceType::King),
        ]);
        let mut game = Game::from_board(board, Color::White);

        let err = game.make_move(mv("a7", "a8")).unwrap_err();
        assert_eq!(err, IllegalMove::PromotionRequired(sq("a8")));

        let applied = game
            .make_move(Move::promoting(sq("a7"), sq("a8"), PieceType::Knight))
            .unwrap();
        assert_eq!(applied.piece.kind, PieceType::Pawn);
        assert_eq!(
            game.board().get(sq("a8")),
            Some(Piece::new(Color::White, PieceType::Knight))
        );
        assert_eq!(game.board().get(sq("a7")), None);
    }

    #[test]
    fn test_promotion_on_ordinary_move_rejected() {
        let mut game = Game::new();
        let bogus = Move::promoting(sq("e2"), sq("e4"), PieceType::Queen);
        assert_eq!(game.make_move(bogus), Err(IllegalMove::NotLegal(bogus)));
    }

    #[test]
    fn test_resign() {
        let mut game = Game::new();
        let result = game.resign(Color::White).unwrap();
        assert_eq!(result.winner, Some(Color::Black));
        assert_eq!(result.reason, EndReason::Resignation);
        assert!(game.is_finished());
        assert_eq!(game.resign(Color::Black), Err(GameOver));
    }

    #[test]
    fn test_serde_roundtrip_preserves_state() {
        let mut game = Game::new();
        game.make_move(mv("d2", "d4")).unwrap();
        let json = serde_json::to_value(&game).unwrap();
        assert_eq!(json["turn"], "BLACK");
        assert_eq!(json["status"], "IN_PROGRESS");
        let back: Game = serde_json::from_value(json).unwrap();
        assert_eq!(back, game);
    }
}
