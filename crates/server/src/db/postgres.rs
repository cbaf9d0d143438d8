use async_trait::async_trait;
use chess_core::Game;
use sqlx::types::Json;
use sqlx::PgPool;

use super::{AuthStore, GameRecord, GameStore, User};
use crate::error::AppError;

/// Postgres-backed store. Games keep the rules-engine state as JSONB.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    username: String,
    password_hash: String,
    email: String,
}

#[derive(sqlx::FromRow)]
struct GameRow {
    id: i64,
    white_username: Option<String>,
    black_username: Option<String>,
    game_name: String,
    game: Json<Game>,
}

impl From<GameRow> for GameRecord {
    fn from(row: GameRow) -> Self {
        GameRecord {
            game_id: row.id,
            white_username: row.white_username,
            black_username: row.black_username,
            game_name: row.game_name,
            game: row.game.0,
        }
    }
}

#[async_trait]
impl AuthStore for PgStore {
    async fn create_user(&self, user: User) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"INSERT INTO users (username, password_hash, email)
               VALUES ($1, $2, $3)
               ON CONFLICT (username) DO NOTHING"#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.email)
        .execute(&self.pool)
        .await
        .map_err(AppError::Sqlx)?;

        Ok(result.rows_affected() == 1)
    }

    async fn get_user(&self, username: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT username, password_hash, email FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Sqlx)?;

        Ok(row.map(|r| User {
            username: r.username,
            password_hash: r.password_hash,
            email: r.email,
        }))
    }

    async fn create_session(&self, token: &str, username: &str) -> Result<(), AppError> {
        sqlx::query("INSERT INTO auth_sessions (token, username) VALUES ($1, $2)")
            .bind(token)
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(AppError::Sqlx)?;
        Ok(())
    }

    async fn get_session(&self, token: &str) -> Result<Option<String>, AppError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT username FROM auth_sessions WHERE token = $1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::Sqlx)?;
        Ok(row.map(|r| r.0))
    }

    async fn delete_session(&self, token: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(AppError::Sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self) -> Result<(), AppError> {
        sqlx::query("TRUNCATE auth_sessions, users")
            .execute(&self.pool)
            .await
            .map_err(AppError::Sqlx)?;
        Ok(())
    }
}

#[async_trait]
impl GameStore for PgStore {
    async fn create_game(&self, game_name: &str) -> Result<i64, AppError> {
        let row: (i64,) = sqlx::query_as(
            r#"INSERT INTO games (game_name, game)
               VALUES ($1, $2)
               RETURNING id"#,
        )
        .bind(game_name)
        .bind(Json(Game::new()))
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Sqlx)?;

        Ok(row.0)
    }

    async fn get_game(&self, game_id: i64) -> Result<Option<GameRecord>, AppError> {
        let row = sqlx::query_as::<_, GameRow>(
            "SELECT id, white_username, black_username, game_name, game FROM games WHERE id = $1",
        )
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Sqlx)?;

        Ok(row.map(GameRecord::from))
    }

    async fn list_games(&self) -> Result<Vec<GameRecord>, AppError> {
        let rows = sqlx::query_as::<_, GameRow>(
            "SELECT id, white_username, black_username, game_name, game FROM games ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Sqlx)?;

        Ok(rows.into_iter().map(GameRecord::from).collect())
    }

    async fn update_game(&self, game_id: i64, record: &GameRecord) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"UPDATE games SET
                white_username = $2,
                black_username = $3,
                game_name = $4,
                game = $5,
                updated_at = NOW()
            WHERE id = $1"#,
        )
        .bind(game_id)
        .bind(&record.white_username)
        .bind(&record.black_username)
        .bind(&record.game_name)
        .bind(Json(&record.game))
        .execute(&self.pool)
        .await
        .map_err(AppError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("game {game_id} does not exist")));
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        sqlx::query("TRUNCATE games RESTART IDENTITY")
            .execute(&self.pool)
            .await
            .map_err(AppError::Sqlx)?;
        Ok(())
    }
}
