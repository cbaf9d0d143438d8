//! Applies WebSocket commands to stored games and fans out the results.

use std::sync::Arc;

use chess_core::{AppliedMove, Color};
use tracing::{debug, info, warn};

use super::locks::{GameGuard, GameLocks};
use super::protocol::{CommandType, ServerMessage, UserGameCommand};
use super::registry::{ConnectionRegistry, Outbox};
use crate::auth::Authenticator;
use crate::db::{GameRecord, GameStore};
use crate::error::SessionError;

pub struct SessionCoordinator {
    auth: Arc<Authenticator>,
    games: Arc<dyn GameStore>,
    registry: Arc<ConnectionRegistry>,
    locks: GameLocks,
}

impl SessionCoordinator {
    pub fn new(
        auth: Arc<Authenticator>,
        games: Arc<dyn GameStore>,
        registry: Arc<ConnectionRegistry>,
    ) -> Self {
        Self {
            auth,
            games,
            registry,
            locks: GameLocks::new(),
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Hold `game_id` exclusively, for REST writes that touch a game
    /// sessions may be playing.
    pub async fn lock_game(&self, game_id: i64) -> GameGuard {
        self.locks.lock(game_id).await
    }

    /// Parse and run one text frame. Anything that fails is reported to
    /// `reply` as a single ERROR and nobody else hears about it.
    pub async fn handle_text(&self, text: &str, reply: &Outbox) {
        match serde_json::from_str::<UserGameCommand>(text) {
            Ok(command) => self.handle(command, reply).await,
            Err(e) => {
                let err = SessionError::Malformed(e.to_string());
                debug!(error = %err, "Rejected frame");
                if let Err(closed) = send(reply, ServerMessage::error(err.client_message())).await {
                    debug!(error = %closed, "Reply dropped");
                }
            }
        }
    }

    pub async fn handle(&self, command: UserGameCommand, reply: &Outbox) {
        let game_id = command.game_id;
        let kind = command.command_type;
        debug!(?kind, game_id, "Session command");

        let outcome = match kind {
            CommandType::Connect => self.connect(&command, reply).await,
            CommandType::MakeMove => self.make_move(&command, reply).await,
            CommandType::Leave => self.leave(&command).await,
            CommandType::Resign => self.resign(&command, reply).await,
        };

        if let Err(err) = outcome {
            match &err {
                SessionError::Storage(source) => {
                    warn!(?kind, game_id, error = %source, "Command failed")
                }
                SessionError::Transport(_) => {
                    debug!(?kind, game_id, error = %err, "Caller went away");
                    return;
                }
                _ => debug!(?kind, game_id, error = %err, "Command rejected"),
            }
            if let Err(closed) = send(reply, ServerMessage::error(err.client_message())).await {
                debug!(error = %closed, "Reply dropped");
            }
        }
    }

    /// The socket behind `reply` is gone.
    pub async fn disconnect(&self, reply: &Outbox) {
        let gone = self.registry.remove_outbox(reply).await;
        let remaining = self.registry.len().await;
        for username in gone {
            info!(user = %username, remaining, "Connection closed");
        }
    }

    async fn connect(&self, command: &UserGameCommand, reply: &Outbox) -> Result<(), SessionError> {
        let username = self.authenticate(&command.auth_token).await?;
        let game_id = command.game_id;
        let _guard = self.locks.lock(game_id).await;
        let record = self.load(game_id).await?;

        if let Some(previous) = self.registry.register(&username, reply.clone(), game_id).await {
            debug!(user = %username, game_id, previous, "Replaced earlier connection");
        }

        let role = match record.seat_of(&username) {
            Some(color) => color.to_string(),
            None => "an observer".to_string(),
        };
        info!(user = %username, game_id, %role, "Joined game");

        send(reply, ServerMessage::LoadGame { game: record }).await?;
        self.registry
            .broadcast(
                &username,
                game_id,
                &ServerMessage::notification(format!("{username} has joined the game as {role}!")),
                false,
            )
            .await;
        Ok(())
    }

    async fn make_move(&self, command: &UserGameCommand, reply: &Outbox) -> Result<(), SessionError> {
        let username = self.authenticate(&command.auth_token).await?;
        let mv = command
            .mv
            .ok_or_else(|| SessionError::Malformed("MAKE_MOVE needs a move".into()))?;
        let game_id = command.game_id;
        let _guard = self.locks.lock(game_id).await;
        let mut record = self.load(game_id).await?;

        if record.game.is_finished() {
            return Err(SessionError::GameOver);
        }
        let color = record
            .seat_of(&username)
            .ok_or(SessionError::Forbidden("observers cannot make moves"))?;
        if color != record.game.turn() {
            return Err(SessionError::OutOfTurn);
        }

        let applied = record.game.make_move(mv)?;
        self.games.update_game(game_id, &record).await?;
        info!(user = %username, game_id, mv = %applied.mv, "Move applied");

        let load = ServerMessage::LoadGame { game: record.clone() };
        self.registry.broadcast(&username, game_id, &load, false).await;
        send(reply, load).await?;

        self.registry
            .broadcast(
                &username,
                game_id,
                &ServerMessage::notification(describe_move(&username, &applied)),
                false,
            )
            .await;

        if let Some(status) = status_notification(&record) {
            let status = ServerMessage::notification(status);
            self.registry.broadcast(&username, game_id, &status, false).await;
            send(reply, status).await?;
        }
        Ok(())
    }

    async fn leave(&self, command: &UserGameCommand) -> Result<(), SessionError> {
        let username = self.authenticate(&command.auth_token).await?;
        let game_id = command.game_id;
        let _guard = self.locks.lock(game_id).await;
        let mut record = self.load(game_id).await?;

        let mut vacated = false;
        for color in [Color::White, Color::Black] {
            if record.player(color) == Some(username.as_str()) {
                *record.seat_mut(color) = None;
                vacated = true;
            }
        }
        if vacated {
            self.games.update_game(game_id, &record).await?;
        }

        let disconnected = self.registry.remove_from(&username, game_id).await;
        if !disconnected {
            if let Some(current) = self.registry.game_of(&username).await {
                debug!(user = %username, game_id, current, "Connection kept for another game");
            }
        }
        info!(user = %username, game_id, vacated, disconnected, "Left game");

        self.registry
            .broadcast(
                &username,
                game_id,
                &ServerMessage::notification(format!("{username} has left the game.")),
                false,
            )
            .await;
        Ok(())
    }

    async fn resign(&self, command: &UserGameCommand, reply: &Outbox) -> Result<(), SessionError> {
        let username = self.authenticate(&command.auth_token).await?;
        let game_id = command.game_id;
        let _guard = self.locks.lock(game_id).await;
        let mut record = self.load(game_id).await?;

        let color = record
            .seat_of(&username)
            .ok_or(SessionError::Forbidden("observers cannot resign"))?;
        record.game.resign(color).map_err(|_| SessionError::GameOver)?;
        self.games.update_game(game_id, &record).await?;
        info!(user = %username, game_id, "Resigned");

        let winner = color.opponent();
        let note = ServerMessage::notification(format!("{username} has resigned. {winner} wins."));
        self.registry.broadcast(&username, game_id, &note, false).await;
        send(reply, note).await?;
        Ok(())
    }

    async fn authenticate(&self, token: &str) -> Result<String, SessionError> {
        self.auth
            .resolve_identity(token)
            .await?
            .ok_or(SessionError::Unauthorized)
    }

    async fn load(&self, game_id: i64) -> Result<GameRecord, SessionError> {
        self.games
            .get_game(game_id)
            .await?
            .ok_or(SessionError::NotFound(game_id))
    }
}

/// Queue `message` for the caller, waiting for room if its socket is slow.
async fn send(reply: &Outbox, message: ServerMessage) -> Result<(), SessionError> {
    reply
        .send(message)
        .await
        .map_err(|_| SessionError::Transport("socket writer has stopped".into()))
}

/// The seated player's name, or the color when the seat is empty.
fn display_name(record: &GameRecord, color: Color) -> String {
    record
        .player(color)
        .map(str::to_string)
        .unwrap_or_else(|| color.to_string())
}

fn describe_move(username: &str, applied: &AppliedMove) -> String {
    let mut text = format!(
        "{username} moved the {} from {} to {}",
        applied.piece.kind, applied.mv.start_position, applied.mv.end_position
    );
    if let Some(promoted) = applied.mv.promotion_piece {
        text.push_str(&format!(" and promoted to {promoted}"));
    }
    text.push('.');
    text
}

/// Check, checkmate or stalemate of the side now to move.
fn status_notification(record: &GameRecord) -> Option<String> {
    let to_move = record.game.turn();
    let name = display_name(record, to_move);
    if record.game.is_in_checkmate(to_move) {
        let winner = to_move.opponent();
        Some(format!("{name} is in checkmate! {winner} wins."))
    } else if record.game.is_in_stalemate(to_move) {
        Some("The game has ended in a stalemate!".to_string())
    } else if record.game.is_in_check(to_move) {
        Some(format!("{name} is in check!"))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{Board, Game, Move, Piece, PieceType, Position};

    fn record_with(game: Game) -> GameRecord {
        let mut record = GameRecord::new(1, "g");
        record.white_username = Some("alice".into());
        record.game = game;
        record
    }

    #[test]
    fn test_describe_promotion() {
        let applied = AppliedMove {
            mv: Move::promoting(Position::new(7, 1), Position::new(8, 1), PieceType::Queen),
            piece: Piece::new(Color::White, PieceType::Pawn),
            captured: None,
            result: None,
        };
        assert_eq!(
            describe_move("alice", &applied),
            "alice moved the pawn from a7 to a8 and promoted to queen."
        );
    }

    #[test]
    fn test_status_names_empty_seat_by_color() {
        // Black king on h8 boxed in by a white queen on g7 guarded from f6.
        let mut board = Board::new();
        board.add_piece(Position::new(8, 8), Piece::new(Color::Black, PieceType::King));
        board.add_piece(Position::new(7, 7), Piece::new(Color::White, PieceType::Queen));
        board.add_piece(Position::new(6, 6), Piece::new(Color::White, PieceType::King));
        let record = record_with(Game::from_board(board, Color::Black));
        assert_eq!(
            status_notification(&record).as_deref(),
            Some("black is in checkmate! white wins.")
        );
    }

    #[tokio::test]
    async fn test_send_to_closed_socket_is_transport_error() {
        let (reply, inbox) = crate::session::outbox();
        drop(inbox);
        let err = send(&reply, ServerMessage::notification("x")).await.unwrap_err();
        assert!(matches!(err, SessionError::Transport(_)));
    }

    #[test]
    fn test_status_quiet_position() {
        let record = record_with(Game::new());
        assert_eq!(status_notification(&record), None);
    }
}
