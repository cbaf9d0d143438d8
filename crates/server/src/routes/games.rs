use axum::{Extension, Json};
use chess_core::Color;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use crate::auth::middleware::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    pub game_name: Option<String>,
}

#[derive(Deserialize)]
pub struct JoinGameRequest {
    #[serde(rename = "playerColor")]
    pub player_color: Option<String>,
    #[serde(rename = "gameID")]
    pub game_id: Option<i64>,
}

fn parse_color(raw: &str) -> Option<Color> {
    match raw.to_ascii_uppercase().as_str() {
        "WHITE" => Some(Color::White),
        "BLACK" => Some(Color::Black),
        _ => None,
    }
}

/// GET /game
pub async fn list_games(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
) -> Result<Json<JsonValue>, AppError> {
    let games = state.games.list_games().await?;
    Ok(Json(json!({ "games": games })))
}

/// POST /game
pub async fn create_game(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Json(req): Json<CreateGameRequest>,
) -> Result<Json<JsonValue>, AppError> {
    let name = req
        .game_name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("gameName is required".into()))?;

    let game_id = state.games.create_game(&name).await?;
    tracing::info!(user = %user.username, game_id, "Created game");
    Ok(Json(json!({ "gameID": game_id })))
}

/// PUT /game
pub async fn join_game(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Json(req): Json<JoinGameRequest>,
) -> Result<Json<JsonValue>, AppError> {
    let color = req
        .player_color
        .as_deref()
        .and_then(parse_color)
        .ok_or_else(|| AppError::BadRequest("playerColor must be WHITE or BLACK".into()))?;
    let game_id = req
        .game_id
        .ok_or_else(|| AppError::BadRequest("gameID is required".into()))?;

    let _guard = state.sessions.lock_game(game_id).await;
    let mut record = state
        .games
        .get_game(game_id)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("no game exists with id {game_id}")))?;

    if let Some(held) = record.seat_of(&user.username) {
        if held != color {
            return Err(AppError::Forbidden(format!("already playing {held} in this game")));
        }
    }
    let seat = record.seat_mut(color);
    if seat.is_some() {
        return Err(AppError::Forbidden("already taken".into()));
    }
    *seat = Some(user.username.clone());
    state.games.update_game(game_id, &record).await?;

    tracing::info!(user = %user.username, game_id, %color, "Took seat");
    Ok(Json(json!({})))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("WHITE"), Some(Color::White));
        assert_eq!(parse_color("black"), Some(Color::Black));
        assert_eq!(parse_color("GREEN"), None);
    }
}
