//! WebSocket wire types.

use chess_core::Move;
use serde::{Deserialize, Serialize};

use crate::db::GameRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandType {
    Connect,
    MakeMove,
    Leave,
    Resign,
}

/// Client → Server command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGameCommand {
    #[serde(rename = "commandType")]
    pub command_type: CommandType,
    #[serde(rename = "authToken")]
    pub auth_token: String,
    #[serde(rename = "gameID")]
    pub game_id: i64,
    /// Only meaningful for MAKE_MOVE.
    #[serde(rename = "move", default, skip_serializing_if = "Option::is_none")]
    pub mv: Option<Move>,
}

impl UserGameCommand {
    fn new(command_type: CommandType, auth_token: &str, game_id: i64) -> Self {
        Self {
            command_type,
            auth_token: auth_token.to_string(),
            game_id,
            mv: None,
        }
    }

    pub fn connect(auth_token: &str, game_id: i64) -> Self {
        Self::new(CommandType::Connect, auth_token, game_id)
    }

    pub fn make_move(auth_token: &str, game_id: i64, mv: Move) -> Self {
        Self {
            mv: Some(mv),
            ..Self::new(CommandType::MakeMove, auth_token, game_id)
        }
    }

    pub fn leave(auth_token: &str, game_id: i64) -> Self {
        Self::new(CommandType::Leave, auth_token, game_id)
    }

    pub fn resign(auth_token: &str, game_id: i64) -> Self {
        Self::new(CommandType::Resign, auth_token, game_id)
    }
}

/// Server → Client message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "serverMessageType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    LoadGame {
        game: GameRecord,
    },
    Notification {
        message: String,
    },
    Error {
        #[serde(rename = "errorMessage")]
        error_message: String,
    },
}

impl ServerMessage {
    pub fn notification(message: impl Into<String>) -> Self {
        ServerMessage::Notification {
            message: message.into(),
        }
    }

    pub fn error(error_message: impl Into<String>) -> Self {
        ServerMessage::Error {
            error_message: error_message.into(),
        }
    }
}
