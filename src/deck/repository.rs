use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::Deck;
use crate::shared::AppError;

/// Persistence for a post's deck, one deck per post
#[async_trait]
pub trait DeckRepository {
    async fn save_deck(&self, post_id: &str, deck: &Deck) -> Result<(), AppError>;
    async fn get_deck(&self, post_id: &str) -> Result<Option<Deck>, AppError>;
    async fn delete_deck(&self, post_id: &str) -> Result<(), AppError>;
}

/// In-memory implementation for development and testing
pub struct InMemoryDeckRepository {
    decks: Mutex<HashMap<String, Deck>>,
}

impl Default for InMemoryDeckRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDeckRepository {
    pub fn new() -> Self {
        Self {
            decks: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl DeckRepository for InMemoryDeckRepository {
    #[instrument(skip(self, deck))]
    async fn save_deck(&self, post_id: &str, deck: &Deck) -> Result<(), AppError> {
        let mut decks = self.decks.lock().unwrap();
        decks.insert(post_id.to_string(), deck.clone());
        debug!(
            post_id = %post_id,
            question_count = deck.questions.len(),
            "Saved deck in memory"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_deck(&self, post_id: &str) -> Result<Option<Deck>, AppError> {
        let decks = self.decks.lock().unwrap();
        Ok(decks.get(post_id).cloned())
    }

    #[instrument(skip(self))]
    async fn delete_deck(&self, post_id: &str) -> Result<(), AppError> {
        let mut decks = self.decks.lock().unwrap();
        decks.remove(post_id);
        debug!(post_id = %post_id, "Deleted deck from memory");
        Ok(())
    }
}

/// PostgreSQL implementation; the deck is one JSON document per post
pub struct PostgresDeckRepository {
    pool: PgPool,
}

impl PostgresDeckRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeckRepository for PostgresDeckRepository {
    #[instrument(skip(self, deck))]
    async fn save_deck(&self, post_id: &str, deck: &Deck) -> Result<(), AppError> {
        let data = serde_json::to_string(deck).map_err(|_e| AppError::Internal)?;

        sqlx::query(
            "INSERT INTO decks (post_id, data) VALUES ($1, $2) \
             ON CONFLICT (post_id) DO UPDATE SET data = $2",
        )
        .bind(post_id)
        .bind(&data)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, post_id = %post_id, "Failed to save deck in database");
            AppError::Storage(e.to_string())
        })?;

        debug!(post_id = %post_id, "Saved deck in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_deck(&self, post_id: &str) -> Result<Option<Deck>, AppError> {
        let row = sqlx::query("SELECT data FROM decks WHERE post_id = $1")
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, post_id = %post_id, "Failed to fetch deck from database");
                AppError::Storage(e.to_string())
            })?;

        match row {
            Some(row) => {
                let data: String = row.get("data");
                let deck = serde_json::from_str(&data).map_err(|_e| AppError::Internal)?;
                Ok(Some(deck))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn delete_deck(&self, post_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM decks WHERE post_id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, post_id = %post_id, "Failed to delete deck from database");
                AppError::Storage(e.to_string())
            })?;
        debug!(post_id = %post_id, "Deleted deck from database");
        Ok(())
    }
}
