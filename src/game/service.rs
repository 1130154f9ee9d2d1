use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::types::{CompleteGameResponse, SubmitAnswerRequest, SubmitAnswerResponse};
use crate::deck::models::{Question, QuestionType};
use crate::deck::repository::DeckRepository;
use crate::deck::MAX_QUESTIONS_PER_GAME;
use crate::leaderboard::models::LeaderboardEntry;
use crate::leaderboard::repository::LeaderboardRepository;
use crate::leaderboard::LeaderboardService;
use crate::scoring::calculate_score;
use crate::session::models::{AnswerValue, PlayerAnswer, PlayerSession};
use crate::session::repository::SessionRepository;
use crate::shared::AppError;
use crate::stats::models::QuestionStats;
use crate::stats::repository::StatsRepository;

/// The answer processor: turns one submitted answer into a statistics update
/// and a score, in that order.
///
/// The ordering is a contract, not an accident: a player's vote is recorded
/// BEFORE their score is computed, so everyone is scored against a
/// distribution that includes their own pick. The re-read between the two
/// steps is not linearizable against other concurrent submitters; two players
/// answering at nearly the same moment may or may not see each other's vote
/// in their snapshot. That race window is accepted for simplicity and must
/// not be "fixed" with locking.
pub struct GameService {
    deck_repository: Arc<dyn DeckRepository + Send + Sync>,
    stats_repository: Arc<dyn StatsRepository + Send + Sync>,
    session_repository: Arc<dyn SessionRepository + Send + Sync>,
    leaderboard_repository: Arc<dyn LeaderboardRepository + Send + Sync>,
}

impl GameService {
    pub fn new(
        deck_repository: Arc<dyn DeckRepository + Send + Sync>,
        stats_repository: Arc<dyn StatsRepository + Send + Sync>,
        session_repository: Arc<dyn SessionRepository + Send + Sync>,
        leaderboard_repository: Arc<dyn LeaderboardRepository + Send + Sync>,
    ) -> Self {
        Self {
            deck_repository,
            stats_repository,
            session_repository,
            leaderboard_repository,
        }
    }

    /// Processes one answer for an in-flight session
    #[instrument(skip(self, request))]
    pub async fn submit_answer(
        &self,
        post_id: &str,
        user_id: &str,
        request: SubmitAnswerRequest,
    ) -> Result<SubmitAnswerResponse, AppError> {
        let mut session = self
            .session_repository
            .get_session(post_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("No active session".to_string()))?;

        if session.is_finished() {
            return Err(AppError::Validation("Game already completed".to_string()));
        }

        let deck = self
            .deck_repository
            .get_deck(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Game deck not found".to_string()))?;
        let question = deck
            .question(&request.question_id)
            .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

        validate_answer_shape(question, &request.answer)?;

        let (score, question_stats) = self
            .process_answer(
                post_id,
                &mut session,
                question,
                request.answer,
                request.time_remaining,
            )
            .await?;

        let questions_in_game = deck.questions.len().min(MAX_QUESTIONS_PER_GAME);
        let is_game_complete = session.current_question_index >= questions_in_game;

        // The finished session is persisted before the leaderboard insert so
        // a failed save never ranks a score the session does not hold
        if is_game_complete {
            session.finish(session.total_score);
        }
        self.session_repository.save_session(post_id, &session).await?;

        let mut leaderboard_updated = false;
        if is_game_complete {
            leaderboard_updated = self.record_finish(post_id, &session).await?;
        }

        info!(
            post_id = %post_id,
            user_id = %user_id,
            question_id = %request.question_id,
            score,
            is_game_complete,
            leaderboard_updated,
            "Answer processed"
        );

        Ok(SubmitAnswerResponse {
            score,
            question_stats,
            is_game_complete,
            next_question_index: if is_game_complete {
                None
            } else {
                Some(session.current_question_index)
            },
        })
    }

    /// Record vote, re-read the now-updated snapshot, then score against it.
    /// If the stats store fails, the error propagates before the session is
    /// touched, so the player can resubmit without a dangling half-update.
    async fn process_answer(
        &self,
        post_id: &str,
        session: &mut PlayerSession,
        question: &Question,
        answer: AnswerValue,
        time_remaining: i32,
    ) -> Result<(i32, QuestionStats), AppError> {
        self.stats_repository
            .record_answer(post_id, &question.id, &answer)
            .await?;

        let question_stats = self
            .stats_repository
            .get_question_stats(post_id, &question.id)
            .await?;

        let score = calculate_score(
            session.scoring_mode,
            question,
            &answer,
            &question_stats,
            time_remaining,
        );

        session.record_answer(
            PlayerAnswer {
                question_id: question.id.clone(),
                answer,
                time_remaining,
                timestamp: Utc::now(),
            },
            score,
        );

        debug!(
            question_id = %question.id,
            score,
            total_responses = question_stats.total_responses,
            "Scored against self-inclusive distribution"
        );
        Ok((score, question_stats))
    }

    /// Batch finalization: recomputes every answer's score server-side from
    /// the community stats and persists the authoritative total. The
    /// client-reported total is never trusted.
    #[instrument(skip(self, answers, session_data))]
    pub async fn complete_game(
        &self,
        post_id: &str,
        user_id: &str,
        username: &str,
        answers: Vec<PlayerAnswer>,
        session_data: PlayerSession,
    ) -> Result<CompleteGameResponse, AppError> {
        if answers.is_empty() {
            return Err(AppError::Validation("Valid answers required".to_string()));
        }

        let deck = self
            .deck_repository
            .get_deck(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Game deck not found".to_string()))?;

        // Identity comes from the platform headers; only the run's scoring
        // mode and start time are taken from the client's session copy
        let mut session = PlayerSession::new(
            user_id.to_string(),
            username.to_string(),
            session_data.scoring_mode,
        );
        session.started_at = session_data.started_at;

        let mut final_score = 0;
        for answer in answers {
            let Some(question) = deck.question(&answer.question_id) else {
                debug!(question_id = %answer.question_id, "Skipping answer for unknown question");
                continue;
            };
            validate_answer_shape(question, &answer.answer)?;

            let (score, _) = self
                .process_answer(
                    post_id,
                    &mut session,
                    question,
                    answer.answer,
                    answer.time_remaining,
                )
                .await?;
            final_score += score;
        }

        session.finish(final_score);
        self.session_repository.save_session(post_id, &session).await?;

        let leaderboard_updated = self.record_finish(post_id, &session).await?;

        info!(
            post_id = %post_id,
            user_id = %user_id,
            final_score,
            leaderboard_updated,
            "Game completed"
        );

        Ok(CompleteGameResponse {
            final_score,
            session,
            leaderboard_updated,
        })
    }

    /// Bulk administrative clear of everything recorded for a post
    #[instrument(skip(self))]
    pub async fn clear_post_data(&self, post_id: &str) -> Result<(), AppError> {
        self.stats_repository.clear_post(post_id).await?;
        self.session_repository.clear_post(post_id).await?;
        self.leaderboard_repository.clear_post(post_id).await?;
        self.deck_repository.delete_deck(post_id).await?;
        info!(post_id = %post_id, "Cleared all game data");
        Ok(())
    }

    async fn record_finish(
        &self,
        post_id: &str,
        session: &PlayerSession,
    ) -> Result<bool, AppError> {
        let service = LeaderboardService::new(Arc::clone(&self.leaderboard_repository));
        service
            .record_finish(
                post_id,
                LeaderboardEntry {
                    user_id: session.user_id.clone(),
                    username: session.username.clone(),
                    score: session.total_score,
                    scoring_mode: session.scoring_mode,
                    completed_at: session.finished_at.unwrap_or_else(Utc::now),
                },
            )
            .await
    }
}

/// The answer's shape must match the question type; a mismatch is a caller
/// error surfaced before any counter moves
fn validate_answer_shape(question: &Question, answer: &AnswerValue) -> Result<(), AppError> {
    match (question.question_type, answer) {
        (QuestionType::MultipleChoice, AnswerValue::Single(_)) => Ok(()),
        (QuestionType::Sequence, AnswerValue::Sequence(cards)) if !cards.is_empty() => Ok(()),
        (QuestionType::Sequence, AnswerValue::Sequence(_)) => Err(AppError::Validation(
            "Sequence answer must not be empty".to_string(),
        )),
        _ => Err(AppError::Validation(
            "Answer shape does not match question type".to_string(),
        )),
    }
}
