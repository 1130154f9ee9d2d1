use rand::seq::SliceRandom;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::default::default_deck;
use super::models::{Deck, Question};
use super::repository::DeckRepository;
use crate::shared::AppError;
use crate::stats::repository::StatsRepository;

/// A session plays at most this many questions, however large the deck is
pub const MAX_QUESTIONS_PER_GAME: usize = 10;

/// Deck curation and serving
pub struct DeckService {
    repository: Arc<dyn DeckRepository + Send + Sync>,
    stats_repository: Arc<dyn StatsRepository + Send + Sync>,
}

impl DeckService {
    pub fn new(
        repository: Arc<dyn DeckRepository + Send + Sync>,
        stats_repository: Arc<dyn StatsRepository + Send + Sync>,
    ) -> Self {
        Self {
            repository,
            stats_repository,
        }
    }

    /// The post's deck, seeding the default on first access
    #[instrument(skip(self))]
    pub async fn get_or_create_deck(&self, post_id: &str) -> Result<Deck, AppError> {
        if let Some(deck) = self.repository.get_deck(post_id).await? {
            return Ok(deck);
        }

        let deck = default_deck();
        self.repository.save_deck(post_id, &deck).await?;
        info!(post_id = %post_id, "Seeded default deck");
        Ok(deck)
    }

    /// The deck as a player sees it at game start: questions shuffled and
    /// capped, with stats snapshots attached for questions that have any
    /// recorded responses
    #[instrument(skip(self))]
    pub async fn get_play_deck(&self, post_id: &str) -> Result<Deck, AppError> {
        let mut deck = self.get_or_create_deck(post_id).await?;

        // ThreadRng is !Send, so it must not live across the awaits below
        {
            let mut rng = rand::rng();
            deck.questions.shuffle(&mut rng);
        }
        deck.questions.truncate(MAX_QUESTIONS_PER_GAME);

        deck.question_stats.clear();
        for question in &deck.questions {
            let stats = self
                .stats_repository
                .get_question_stats(post_id, &question.id)
                .await?;
            if stats.total_responses > 0 {
                deck.question_stats.push(stats);
            }
        }

        debug!(
            post_id = %post_id,
            questions = deck.questions.len(),
            stats_attached = deck.question_stats.len(),
            "Prepared play deck"
        );
        Ok(deck)
    }

    /// Validates and appends a user-submitted question, stamping it with a
    /// generated id and author attribution. Returns the new question id.
    #[instrument(skip(self, question))]
    pub async fn add_question(
        &self,
        post_id: &str,
        question: Question,
        author_username: &str,
    ) -> Result<String, AppError> {
        let question = question.with_attribution(author_username.to_string());
        question.validate()?;

        let mut deck = self
            .repository
            .get_deck(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Game deck not found".to_string()))?;

        let question_id = question.id.clone();
        deck.questions.push(question);
        self.repository.save_deck(post_id, &deck).await?;

        info!(post_id = %post_id, question_id = %question_id, "Question added to deck");
        Ok(question_id)
    }

    /// Replaces an existing question in place
    #[instrument(skip(self, question))]
    pub async fn edit_question(&self, post_id: &str, question: Question) -> Result<(), AppError> {
        question.validate()?;

        let mut deck = self
            .repository
            .get_deck(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Game deck not found".to_string()))?;

        let slot = deck
            .questions
            .iter_mut()
            .find(|q| q.id == question.id)
            .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;
        *slot = question;

        self.repository.save_deck(post_id, &deck).await?;
        info!(post_id = %post_id, "Question edited");
        Ok(())
    }

    /// Removes a question; deleting an unknown id is a no-op, matching the
    /// forgiving curation semantics of the original deck screens
    #[instrument(skip(self))]
    pub async fn delete_question(&self, post_id: &str, question_id: &str) -> Result<(), AppError> {
        let mut deck = self
            .repository
            .get_deck(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Game deck not found".to_string()))?;

        deck.questions.retain(|q| q.id != question_id);
        self.repository.save_deck(post_id, &deck).await?;

        info!(post_id = %post_id, question_id = %question_id, "Question deleted");
        Ok(())
    }
}
