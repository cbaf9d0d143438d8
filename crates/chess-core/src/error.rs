//! Rules engine errors

use thiserror::Error;

use crate::moves::Move;
use crate::piece::Color;
use crate::position::Position;

/// Why a move was rejected. A rejected move never changes the game.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IllegalMove {
    #[error("{0} is not a square on the board")]
    OffBoard(Position),

    #[error("there is no piece on {0}")]
    NoPiece(Position),

    #[error("it is {turn}'s turn, but the piece on {from} is {color}")]
    NotYourTurn {
        from: Position,
        color: Color,
        turn: Color,
    },

    #[error("the game is already over")]
    GameOver,

    #[error("a pawn moving to {0} must name a promotion piece")]
    PromotionRequired(Position),

    #[error("{0} is not a legal move")]
    NotLegal(Move),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("the game is already over")]
pub struct GameOver;
