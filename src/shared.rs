use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::deck::repository::DeckRepository;
use crate::leaderboard::repository::LeaderboardRepository;
use crate::session::repository::SessionRepository;
use crate::stats::repository::StatsRepository;

/// Shared application state containing all injected repositories
#[derive(Clone)]
pub struct AppState {
    pub deck_repository: Arc<dyn DeckRepository + Send + Sync>,
    pub stats_repository: Arc<dyn StatsRepository + Send + Sync>,
    pub session_repository: Arc<dyn SessionRepository + Send + Sync>,
    pub leaderboard_repository: Arc<dyn LeaderboardRepository + Send + Sync>,
}

impl AppState {
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
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Storage(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Storage error: {}", msg),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "status": "error",
            "message": error_message
        }));

        (status, body).into_response()
    }
}

/// Player identity supplied by the hosting platform as trusted headers.
///
/// The post id scopes every piece of game data; the user id is only present
/// for logged-in players. Anonymous viewers get a generated display name.
#[derive(Debug, Clone)]
pub struct PlayerIdentity {
    pub post_id: String,
    pub user_id: Option<String>,
    pub username: String,
}

impl PlayerIdentity {
    /// Returns the user id, or a validation error for anonymous players
    pub fn require_user(&self) -> Result<&str, AppError> {
        self.user_id
            .as_deref()
            .ok_or_else(|| AppError::Validation("Must be logged in".to_string()))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for PlayerIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let post_id = header("x-post-id")
            .ok_or_else(|| AppError::Validation("Post ID is required".to_string()))?;
        let user_id = header("x-user-id");
        let username = header("x-username")
            .unwrap_or_else(|| petname::Petnames::default().generate_one(2, "-"));

        Ok(Self {
            post_id,
            user_id,
            username,
        })
    }
}
