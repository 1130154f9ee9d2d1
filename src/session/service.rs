use std::sync::Arc;
use tracing::{info, instrument};

use super::models::PlayerSession;
use super::repository::SessionRepository;
use crate::scoring::ScoringMode;
use crate::shared::AppError;

/// Session lifecycle: creation at game start, lookup on revisit.
/// Mutation during play belongs to the answer processor in `game::service`.
pub struct SessionService {
    repository: Arc<dyn SessionRepository + Send + Sync>,
}

impl SessionService {
    pub fn new(repository: Arc<dyn SessionRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Starts a fresh run for the player. Starting over replaces any
    /// in-flight session; a finished run keeps its leaderboard entry either
    /// way since that insert is first-completion-wins.
    #[instrument(skip(self))]
    pub async fn start_session(
        &self,
        post_id: &str,
        user_id: &str,
        username: &str,
        scoring_mode: ScoringMode,
    ) -> Result<PlayerSession, AppError> {
        let session = PlayerSession::new(
            user_id.to_string(),
            username.to_string(),
            scoring_mode,
        );
        self.repository.save_session(post_id, &session).await?;

        info!(
            post_id = %post_id,
            user_id = %user_id,
            scoring_mode = %scoring_mode,
            "Player session started"
        );
        Ok(session)
    }

    #[instrument(skip(self))]
    pub async fn get_session(
        &self,
        post_id: &str,
        user_id: &str,
    ) -> Result<Option<PlayerSession>, AppError> {
        self.repository.get_session(post_id, user_id).await
    }
}
