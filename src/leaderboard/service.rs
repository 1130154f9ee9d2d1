use std::sync::Arc;
use tracing::{info, instrument};

use super::models::LeaderboardEntry;
use super::repository::LeaderboardRepository;
use crate::shared::AppError;

/// Default number of entries returned for top-of-board queries
pub const DEFAULT_LIMIT: usize = 15;

/// Entries shown on each side of the player in an around-me query
const NEAR_WINDOW: usize = 7;

pub struct LeaderboardService {
    repository: Arc<dyn LeaderboardRepository + Send + Sync>,
}

impl LeaderboardService {
    pub fn new(repository: Arc<dyn LeaderboardRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Records a finished run. Idempotent per (post, user): a repeat
    /// completion is a silent no-op that returns false, never an error.
    #[instrument(skip(self, entry))]
    pub async fn record_finish(
        &self,
        post_id: &str,
        entry: LeaderboardEntry,
    ) -> Result<bool, AppError> {
        let inserted = self.repository.insert_if_absent(post_id, &entry).await?;
        if inserted {
            info!(
                post_id = %post_id,
                user_id = %entry.user_id,
                score = entry.score,
                "Leaderboard entry recorded"
            );
        }
        Ok(inserted)
    }

    #[instrument(skip(self))]
    pub async fn get_top(
        &self,
        post_id: &str,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, AppError> {
        let mut entries = self.repository.get_sorted(post_id).await?;
        entries.truncate(limit);
        Ok(entries)
    }

    /// A symmetric window of entries around the user's rank. Users without
    /// an entry fall back to the top of the board.
    #[instrument(skip(self))]
    pub async fn get_near(
        &self,
        post_id: &str,
        user_id: &str,
    ) -> Result<Vec<LeaderboardEntry>, AppError> {
        let entries = self.repository.get_sorted(post_id).await?;

        let Some(user_index) = entries.iter().position(|e| e.user_id == user_id) else {
            let mut top = entries;
            top.truncate(DEFAULT_LIMIT);
            return Ok(top);
        };

        let start = user_index.saturating_sub(NEAR_WINDOW);
        let end = (user_index + NEAR_WINDOW + 1).min(entries.len());
        Ok(entries[start..end].to_vec())
    }

    /// 1-based rank by descending score, None for users with no entry
    #[instrument(skip(self))]
    pub async fn get_rank(&self, post_id: &str, user_id: &str) -> Result<Option<usize>, AppError> {
        let entries = self.repository.get_sorted(post_id).await?;
        Ok(entries
            .iter()
            .position(|e| e.user_id == user_id)
            .map(|index| index + 1))
    }
}
