//! Rules engine for two-player chess without castling or en passant.
//!
//! [`Game`] owns a [`Board`], the side to move and the game status, and is
//! the only thing that changes them. Move generation per piece type lives in
//! [`movegen`]; it knows piece patterns but not check.

pub mod board;
pub mod error;
pub mod game;
pub mod movegen;
pub mod moves;
pub mod piece;
pub mod position;

pub use board::Board;
pub use error::{GameOver, IllegalMove};
pub use game::{AppliedMove, EndReason, Game, GameResult, GameStatus};
pub use moves::Move;
pub use piece::{Color, Piece, PieceType};
pub use position::Position;
