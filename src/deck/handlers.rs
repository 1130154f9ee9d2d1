use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::service::DeckService;
use super::types::{
    AddQuestionRequest, AddQuestionResponse, DeleteQuestionRequest, EditQuestionRequest,
};
use crate::shared::{AppError, AppState, PlayerIdentity};

fn deck_service(state: &AppState) -> DeckService {
    DeckService::new(
        Arc::clone(&state.deck_repository),
        Arc::clone(&state.stats_repository),
    )
}

/// HTTP handler for adding a question to the post's deck
///
/// POST /api/add-question
/// Requires a logged-in user; the question is stamped with their username.
#[instrument(name = "add_question", skip(state, request))]
pub async fn add_question(
    State(state): State<AppState>,
    identity: PlayerIdentity,
    Json(request): Json<AddQuestionRequest>,
) -> Result<Json<AddQuestionResponse>, AppError> {
    identity.require_user()?;

    let question_id = deck_service(&state)
        .add_question(&identity.post_id, request.question, &identity.username)
        .await?;

    info!(post_id = %identity.post_id, question_id = %question_id, "Question added");
    Ok(Json(AddQuestionResponse { question_id }))
}

/// HTTP handler for editing a question in place
///
/// POST /api/edit-question
#[instrument(name = "edit_question", skip(state, request))]
pub async fn edit_question(
    State(state): State<AppState>,
    identity: PlayerIdentity,
    Json(request): Json<EditQuestionRequest>,
) -> Result<StatusCode, AppError> {
    deck_service(&state)
        .edit_question(&identity.post_id, request.question)
        .await?;
    Ok(StatusCode::OK)
}

/// HTTP handler for deleting a question from the deck
///
/// POST /api/delete-question
#[instrument(name = "delete_question", skip(state))]
pub async fn delete_question(
    State(state): State<AppState>,
    identity: PlayerIdentity,
    Json(request): Json<DeleteQuestionRequest>,
) -> Result<StatusCode, AppError> {
    deck_service(&state)
        .delete_question(&identity.post_id, &request.question_id)
        .await?;
    Ok(StatusCode::OK)
}
