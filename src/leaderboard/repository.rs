use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::LeaderboardEntry;
use crate::shared::AppError;

/// Persistence for finished players' scores.
///
/// `insert_if_absent` must be a conditional write, not a read-then-write:
/// two completions for the same user racing each other may both pass an
/// application-level existence check, and exactly one of them is allowed to
/// land.
#[async_trait]
pub trait LeaderboardRepository {
    /// Returns true if the entry was inserted, false if the user already had one
    async fn insert_if_absent(
        &self,
        post_id: &str,
        entry: &LeaderboardEntry,
    ) -> Result<bool, AppError>;

    /// All entries for a post, ordered by score descending. Tie order is
    /// unspecified and may differ between implementations.
    async fn get_sorted(&self, post_id: &str) -> Result<Vec<LeaderboardEntry>, AppError>;

    /// Bulk administrative clear of a post's leaderboard
    async fn clear_post(&self, post_id: &str) -> Result<(), AppError>;
}

/// In-memory implementation for development and testing
pub struct InMemoryLeaderboardRepository {
    entries: Mutex<HashMap<(String, String), LeaderboardEntry>>,
}

impl Default for InMemoryLeaderboardRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLeaderboardRepository {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl LeaderboardRepository for InMemoryLeaderboardRepository {
    #[instrument(skip(self, entry))]
    async fn insert_if_absent(
        &self,
        post_id: &str,
        entry: &LeaderboardEntry,
    ) -> Result<bool, AppError> {
        let mut entries = self.entries.lock().unwrap();
        match entries.entry((post_id.to_string(), entry.user_id.clone())) {
            Entry::Occupied(_) => {
                debug!(
                    post_id = %post_id,
                    user_id = %entry.user_id,
                    "User already on the leaderboard, keeping first completion"
                );
                Ok(false)
            }
            Entry::Vacant(slot) => {
                slot.insert(entry.clone());
                debug!(
                    post_id = %post_id,
                    user_id = %entry.user_id,
                    score = entry.score,
                    "Leaderboard entry inserted in memory"
                );
                Ok(true)
            }
        }
    }

    #[instrument(skip(self))]
    async fn get_sorted(&self, post_id: &str) -> Result<Vec<LeaderboardEntry>, AppError> {
        let entries = self.entries.lock().unwrap();
        let mut sorted: Vec<LeaderboardEntry> = entries
            .iter()
            .filter(|((post, _), _)| post == post_id)
            .map(|(_, entry)| entry.clone())
            .collect();
        sorted.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(sorted)
    }

    #[instrument(skip(self))]
    async fn clear_post(&self, post_id: &str) -> Result<(), AppError> {
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|(post, _), _| post != post_id);
        debug!(post_id = %post_id, "Cleared leaderboard from memory");
        Ok(())
    }
}

/// PostgreSQL implementation; `ON CONFLICT DO NOTHING` provides the
/// set-if-absent semantics
pub struct PostgresLeaderboardRepository {
    pool: PgPool,
}

impl PostgresLeaderboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeaderboardRepository for PostgresLeaderboardRepository {
    #[instrument(skip(self, entry))]
    async fn insert_if_absent(
        &self,
        post_id: &str,
        entry: &LeaderboardEntry,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT INTO leaderboard_entries \
             (post_id, user_id, username, score, scoring_mode, completed_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (post_id, user_id) DO NOTHING",
        )
        .bind(post_id)
        .bind(&entry.user_id)
        .bind(&entry.username)
        .bind(entry.score)
        .bind(entry.scoring_mode.to_string())
        .bind(entry.completed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, post_id = %post_id, "Failed to insert leaderboard entry");
            AppError::Storage(e.to_string())
        })?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn get_sorted(&self, post_id: &str) -> Result<Vec<LeaderboardEntry>, AppError> {
        let rows = sqlx::query(
            "SELECT user_id, username, score, scoring_mode, completed_at \
             FROM leaderboard_entries WHERE post_id = $1 ORDER BY score DESC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, post_id = %post_id, "Failed to fetch leaderboard");
            AppError::Storage(e.to_string())
        })?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let scoring_mode: String = row.get("scoring_mode");
            entries.push(LeaderboardEntry {
                user_id: row.get("user_id"),
                username: row.get("username"),
                score: row.get::<i32, _>("score"),
                scoring_mode: scoring_mode
                    .parse()
                    .map_err(|_| AppError::Storage(format!("Bad scoring mode: {}", scoring_mode)))?,
                completed_at: row.get("completed_at"),
            });
        }
        Ok(entries)
    }

    #[instrument(skip(self))]
    async fn clear_post(&self, post_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM leaderboard_entries WHERE post_id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, post_id = %post_id, "Failed to clear leaderboard");
                AppError::Storage(e.to_string())
            })?;
        debug!(post_id = %post_id, "Cleared leaderboard from database");
        Ok(())
    }
}
