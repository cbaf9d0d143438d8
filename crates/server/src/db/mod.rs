//! Persistence for accounts, sessions and game records.
//!
//! Route handlers and the session coordinator only see the [`AuthStore`] and
//! [`GameStore`] traits. [`memory::MemoryStore`] backs tests and runs without
//! a database; [`postgres::PgStore`] is used when `DATABASE_URL` is set.

pub mod memory;
pub mod pool;
pub mod postgres;

use async_trait::async_trait;
use chess_core::{Color, Game};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub email: String,
}

/// A game as stored and as sent in LOAD_GAME. Read and written as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    #[serde(rename = "gameID")]
    pub game_id: i64,
    #[serde(rename = "whiteUsername")]
    pub white_username: Option<String>,
    #[serde(rename = "blackUsername")]
    pub black_username: Option<String>,
    #[serde(rename = "gameName")]
    pub game_name: String,
    pub game: Game,
}

impl GameRecord {
    pub fn new(game_id: i64, game_name: &str) -> Self {
        Self {
            game_id,
            white_username: None,
            black_username: None,
            game_name: game_name.to_string(),
            game: Game::new(),
        }
    }

    /// The seat `username` occupies, if any. White wins if both match.
    pub fn seat_of(&self, username: &str) -> Option<Color> {
        if self.white_username.as_deref() == Some(username) {
            Some(Color::White)
        } else if self.black_username.as_deref() == Some(username) {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn player(&self, color: Color) -> Option<&str> {
        match color {
            Color::White => self.white_username.as_deref(),
            Color::Black => self.black_username.as_deref(),
        }
    }

    pub fn seat_mut(&mut self, color: Color) -> &mut Option<String> {
        match color {
            Color::White => &mut self.white_username,
            Color::Black => &mut self.black_username,
        }
    }
}

#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Insert a new user. Returns false if the username is taken.
    async fn create_user(&self, user: User) -> Result<bool, AppError>;

    async fn get_user(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn create_session(&self, token: &str, username: &str) -> Result<(), AppError>;

    /// The username a live session token belongs to.
    async fn get_session(&self, token: &str) -> Result<Option<String>, AppError>;

    /// Returns false if the token was not a live session.
    async fn delete_session(&self, token: &str) -> Result<bool, AppError>;

    async fn clear(&self) -> Result<(), AppError>;
}

#[async_trait]
pub trait GameStore: Send + Sync {
    /// Create a fresh game with open seats and return its id.
    async fn create_game(&self, game_name: &str) -> Result<i64, AppError>;

    async fn get_game(&self, game_id: i64) -> Result<Option<GameRecord>, AppError>;

    async fn list_games(&self) -> Result<Vec<GameRecord>, AppError>;

    /// Overwrite the stored record. Last write wins.
    async fn update_game(&self, game_id: i64, record: &GameRecord) -> Result<(), AppError>;

    async fn clear(&self) -> Result<(), AppError>;
}
