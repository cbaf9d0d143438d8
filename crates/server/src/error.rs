use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chess_core::IllegalMove;
use serde_json::json;

/// Errors from the REST routes and the stores behind them.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::Sqlx(e) => {
                tracing::error!("Database error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "database error".to_string())
            }
        };

        (status, Json(json!({ "message": format!("Error: {message}") }))).into_response()
    }
}

/// Why a WebSocket command failed. Reported to the sending connection only.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("no game exists with id {0}")]
    NotFound(i64),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("it is not your turn")]
    OutOfTurn,

    #[error("the game is over, no more moves can be made")]
    GameOver,

    #[error("invalid move: {0}")]
    IllegalMove(#[from] IllegalMove),

    #[error("malformed command: {0}")]
    Malformed(String),

    #[error("connection closed: {0}")]
    Transport(String),

    #[error("storage failure")]
    Storage(#[source] AppError),
}

impl From<AppError> for SessionError {
    fn from(e: AppError) -> Self {
        SessionError::Storage(e)
    }
}

impl SessionError {
    /// Text for the ERROR message sent back to the client.
    pub fn client_message(&self) -> String {
        format!("Error: {self}")
    }
}
