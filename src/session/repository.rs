use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::PlayerSession;
use crate::shared::AppError;

/// Persistence for player sessions, keyed by (post, user).
///
/// A session is owned by exactly one player, so last-write-wins saves are
/// safe here; there is no cross-player contention to guard against.
#[async_trait]
pub trait SessionRepository {
    async fn save_session(&self, post_id: &str, session: &PlayerSession) -> Result<(), AppError>;

    async fn get_session(
        &self,
        post_id: &str,
        user_id: &str,
    ) -> Result<Option<PlayerSession>, AppError>;

    /// Bulk administrative clear of every session recorded for a post
    async fn clear_post(&self, post_id: &str) -> Result<(), AppError>;
}

/// In-memory implementation for development and testing
pub struct InMemorySessionRepository {
    sessions: Mutex<HashMap<(String, String), PlayerSession>>,
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    #[instrument(skip(self, session))]
    async fn save_session(&self, post_id: &str, session: &PlayerSession) -> Result<(), AppError> {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.insert(
            (post_id.to_string(), session.user_id.clone()),
            session.clone(),
        );
        debug!(
            post_id = %post_id,
            user_id = %session.user_id,
            game_state = ?session.game_state,
            "Saved session in memory"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_session(
        &self,
        post_id: &str,
        user_id: &str,
    ) -> Result<Option<PlayerSession>, AppError> {
        let sessions = self.sessions.lock().unwrap();
        Ok(sessions
            .get(&(post_id.to_string(), user_id.to_string()))
            .cloned())
    }

    #[instrument(skip(self))]
    async fn clear_post(&self, post_id: &str) -> Result<(), AppError> {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.retain(|(post, _), _| post != post_id);
        debug!(post_id = %post_id, "Cleared sessions from memory");
        Ok(())
    }
}

/// PostgreSQL implementation; sessions are stored as a JSON document per
/// (post, user), mirroring the key-value layout of the in-memory store
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    #[instrument(skip(self, session))]
    async fn save_session(&self, post_id: &str, session: &PlayerSession) -> Result<(), AppError> {
        let data = serde_json::to_string(session).map_err(|_e| AppError::Internal)?;

        sqlx::query(
            "INSERT INTO player_sessions (post_id, user_id, data) VALUES ($1, $2, $3) \
             ON CONFLICT (post_id, user_id) DO UPDATE SET data = $3",
        )
        .bind(post_id)
        .bind(&session.user_id)
        .bind(&data)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, post_id = %post_id, "Failed to save session in database");
            AppError::Storage(e.to_string())
        })?;

        debug!(post_id = %post_id, user_id = %session.user_id, "Saved session in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_session(
        &self,
        post_id: &str,
        user_id: &str,
    ) -> Result<Option<PlayerSession>, AppError> {
        let row = sqlx::query(
            "SELECT data FROM player_sessions WHERE post_id = $1 AND user_id = $2",
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, post_id = %post_id, "Failed to fetch session from database");
            AppError::Storage(e.to_string())
        })?;

        match row {
            Some(row) => {
                let data: String = row.get("data");
                let session = serde_json::from_str(&data).map_err(|_e| AppError::Internal)?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn clear_post(&self, post_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM player_sessions WHERE post_id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, post_id = %post_id, "Failed to clear sessions from database");
                AppError::Storage(e.to_string())
            })?;
        debug!(post_id = %post_id, "Cleared sessions from database");
        Ok(())
    }
}
