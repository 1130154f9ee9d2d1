use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::QuestionStats;
use crate::session::models::AnswerValue;
use crate::shared::AppError;

/// The community statistics store.
///
/// `record_answer` is the atomic increment-on-answer operation: all counters
/// touched by one submission land together or not at all, and concurrent
/// submissions never lose updates. Reads return a plain snapshot; a snapshot
/// taken right after a write is not guaranteed to order consistently against
/// other writers (see `game::service` for why that is acceptable).
#[async_trait]
pub trait StatsRepository {
    async fn record_answer(
        &self,
        post_id: &str,
        question_id: &str,
        answer: &AnswerValue,
    ) -> Result<(), AppError>;

    /// Current snapshot; a question nobody has answered yet reads as empty
    async fn get_question_stats(
        &self,
        post_id: &str,
        question_id: &str,
    ) -> Result<QuestionStats, AppError>;

    /// Bulk administrative clear of every counter recorded for a post
    async fn clear_post(&self, post_id: &str) -> Result<(), AppError>;
}

/// In-memory implementation for development and testing
pub struct InMemoryStatsRepository {
    // One lock over the whole table keeps each submission's increments atomic
    stats: Mutex<HashMap<(String, String), QuestionStats>>,
}

impl Default for InMemoryStatsRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStatsRepository {
    pub fn new() -> Self {
        Self {
            stats: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl StatsRepository for InMemoryStatsRepository {
    #[instrument(skip(self, answer))]
    async fn record_answer(
        &self,
        post_id: &str,
        question_id: &str,
        answer: &AnswerValue,
    ) -> Result<(), AppError> {
        let mut stats = self.stats.lock().unwrap();
        let entry = stats
            .entry((post_id.to_string(), question_id.to_string()))
            .or_insert_with(|| QuestionStats::empty(question_id));
        entry.record(answer);

        debug!(
            post_id = %post_id,
            question_id = %question_id,
            total_responses = entry.total_responses,
            "Recorded answer in memory"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_question_stats(
        &self,
        post_id: &str,
        question_id: &str,
    ) -> Result<QuestionStats, AppError> {
        let stats = self.stats.lock().unwrap();
        let snapshot = stats
            .get(&(post_id.to_string(), question_id.to_string()))
            .cloned()
            .unwrap_or_else(|| QuestionStats::empty(question_id));
        Ok(snapshot)
    }

    #[instrument(skip(self))]
    async fn clear_post(&self, post_id: &str) -> Result<(), AppError> {
        let mut stats = self.stats.lock().unwrap();
        let before = stats.len();
        stats.retain(|(post, _), _| post != post_id);
        debug!(
            post_id = %post_id,
            removed = before - stats.len(),
            "Cleared question stats from memory"
        );
        Ok(())
    }
}

/// PostgreSQL implementation. Counter upserts ride on `ON CONFLICT … DO
/// UPDATE SET count = count + 1`, so each field increment is atomic on the
/// database side, and the whole submission is wrapped in one transaction.
pub struct PostgresStatsRepository {
    pool: PgPool,
}

impl PostgresStatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepository for PostgresStatsRepository {
    #[instrument(skip(self, answer))]
    async fn record_answer(
        &self,
        post_id: &str,
        question_id: &str,
        answer: &AnswerValue,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            warn!(error = %e, "Failed to open stats transaction");
            AppError::Storage(e.to_string())
        })?;

        sqlx::query(
            "INSERT INTO question_totals (post_id, question_id, total_responses) \
             VALUES ($1, $2, 1) \
             ON CONFLICT (post_id, question_id) \
             DO UPDATE SET total_responses = question_totals.total_responses + 1",
        )
        .bind(post_id)
        .bind(question_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

        let card_ids: Vec<&str> = match answer {
            AnswerValue::Single(card_id) => vec![card_id.as_str()],
            AnswerValue::Sequence(card_ids) => card_ids.iter().map(String::as_str).collect(),
        };

        for card_id in &card_ids {
            sqlx::query(
                "INSERT INTO question_card_stats (post_id, question_id, card_id, count) \
                 VALUES ($1, $2, $3, 1) \
                 ON CONFLICT (post_id, question_id, card_id) \
                 DO UPDATE SET count = question_card_stats.count + 1",
            )
            .bind(post_id)
            .bind(question_id)
            .bind(card_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        }

        if let AnswerValue::Sequence(card_ids) = answer {
            for (index, card_id) in card_ids.iter().enumerate() {
                let position = index as i32 + 1;
                sqlx::query(
                    "INSERT INTO question_position_stats \
                     (post_id, question_id, card_id, position, count) \
                     VALUES ($1, $2, $3, $4, 1) \
                     ON CONFLICT (post_id, question_id, card_id, position) \
                     DO UPDATE SET count = question_position_stats.count + 1",
                )
                .bind(post_id)
                .bind(question_id)
                .bind(card_id)
                .bind(position)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::Storage(e.to_string()))?;
            }
        }

        tx.commit().await.map_err(|e| {
            warn!(error = %e, post_id = %post_id, "Failed to commit answer stats");
            AppError::Storage(e.to_string())
        })?;

        debug!(post_id = %post_id, question_id = %question_id, "Recorded answer in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_question_stats(
        &self,
        post_id: &str,
        question_id: &str,
    ) -> Result<QuestionStats, AppError> {
        let total_row = sqlx::query(
            "SELECT total_responses FROM question_totals WHERE post_id = $1 AND question_id = $2",
        )
        .bind(post_id)
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

        let total_responses = total_row
            .map(|row| row.get::<i64, _>("total_responses") as u32)
            .unwrap_or(0);

        let card_rows = sqlx::query(
            "SELECT card_id, count FROM question_card_stats \
             WHERE post_id = $1 AND question_id = $2",
        )
        .bind(post_id)
        .bind(question_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

        let mut card_stats = HashMap::new();
        for row in card_rows {
            card_stats.insert(
                row.get::<String, _>("card_id"),
                row.get::<i64, _>("count") as u32,
            );
        }

        let position_rows = sqlx::query(
            "SELECT card_id, position, count FROM question_position_stats \
             WHERE post_id = $1 AND question_id = $2",
        )
        .bind(post_id)
        .bind(question_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

        let position_stats = if position_rows.is_empty() {
            None
        } else {
            let mut positions: HashMap<String, HashMap<u32, u32>> = HashMap::new();
            for row in position_rows {
                positions
                    .entry(row.get::<String, _>("card_id"))
                    .or_default()
                    .insert(
                        row.get::<i32, _>("position") as u32,
                        row.get::<i64, _>("count") as u32,
                    );
            }
            Some(positions)
        };

        Ok(QuestionStats {
            question_id: question_id.to_string(),
            card_stats,
            position_stats,
            total_responses,
        })
    }

    #[instrument(skip(self))]
    async fn clear_post(&self, post_id: &str) -> Result<(), AppError> {
        for table in [
            "question_totals",
            "question_card_stats",
            "question_position_stats",
        ] {
            sqlx::query(&format!("DELETE FROM {} WHERE post_id = $1", table))
                .bind(post_id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    warn!(error = %e, table = %table, "Failed to clear stats table");
                    AppError::Storage(e.to_string())
                })?;
        }
        debug!(post_id = %post_id, "Cleared question stats from database");
        Ok(())
    }
}
