use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::service::GameService;
use super::types::{
    CompleteGameRequest, CompleteGameResponse, InitResponse, StartSessionRequest,
    SubmitAnswerRequest, SubmitAnswerResponse,
};
use crate::deck::DeckService;
use crate::leaderboard::LeaderboardService;
use crate::session::models::PlayerSession;
use crate::session::SessionService;
use crate::shared::{AppError, AppState, PlayerIdentity};

fn game_service(state: &AppState) -> GameService {
    GameService::new(
        Arc::clone(&state.deck_repository),
        Arc::clone(&state.stats_repository),
        Arc::clone(&state.session_repository),
        Arc::clone(&state.leaderboard_repository),
    )
}

/// HTTP handler for game initialization
///
/// GET /api/init
/// Seeds the deck on first access, shuffles and caps the question list, and
/// returns any existing session and rank for the player.
#[instrument(name = "init_game", skip(state))]
pub async fn init_game(
    State(state): State<AppState>,
    identity: PlayerIdentity,
) -> Result<Json<InitResponse>, AppError> {
    let deck_service = DeckService::new(
        Arc::clone(&state.deck_repository),
        Arc::clone(&state.stats_repository),
    );
    let deck = deck_service.get_play_deck(&identity.post_id).await?;

    let mut player_session = None;
    let mut player_rank = None;
    if let Some(user_id) = identity.user_id.as_deref() {
        player_session = SessionService::new(Arc::clone(&state.session_repository))
            .get_session(&identity.post_id, user_id)
            .await?;
        player_rank = LeaderboardService::new(Arc::clone(&state.leaderboard_repository))
            .get_rank(&identity.post_id, user_id)
            .await?;
    }

    info!(
        post_id = %identity.post_id,
        questions = deck.questions.len(),
        has_session = player_session.is_some(),
        "Game initialized"
    );

    Ok(Json(InitResponse {
        post_id: identity.post_id.clone(),
        deck,
        player_session,
        player_rank,
        user_id: identity
            .user_id
            .unwrap_or_else(|| "anonymous".to_string()),
        username: identity.username,
    }))
}

/// HTTP handler for starting a fresh run
///
/// POST /api/start-session
#[instrument(name = "start_session", skip(state, request))]
pub async fn start_session(
    State(state): State<AppState>,
    identity: PlayerIdentity,
    Json(request): Json<StartSessionRequest>,
) -> Result<Json<PlayerSession>, AppError> {
    let user_id = identity.require_user()?;

    let session = SessionService::new(Arc::clone(&state.session_repository))
        .start_session(
            &identity.post_id,
            user_id,
            &identity.username,
            request.scoring_mode,
        )
        .await?;

    Ok(Json(session))
}

/// HTTP handler for answering one question
///
/// POST /api/submit-answer
#[instrument(name = "submit_answer", skip(state, request))]
pub async fn submit_answer(
    State(state): State<AppState>,
    identity: PlayerIdentity,
    Json(request): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    let user_id = identity.require_user()?;

    let response = game_service(&state)
        .submit_answer(&identity.post_id, user_id, request)
        .await?;

    Ok(Json(response))
}

/// HTTP handler for the batch finalization path
///
/// POST /api/complete-game
/// Recomputes the authoritative score server-side from the recorded
/// community stats; the client's total is ignored.
#[instrument(name = "complete_game", skip(state, request))]
pub async fn complete_game(
    State(state): State<AppState>,
    identity: PlayerIdentity,
    Json(request): Json<CompleteGameRequest>,
) -> Result<Json<CompleteGameResponse>, AppError> {
    let user_id = identity.require_user()?;

    let response = game_service(&state)
        .complete_game(
            &identity.post_id,
            user_id,
            &identity.username,
            request.answers,
            request.session_data,
        )
        .await?;

    Ok(Json(response))
}

/// HTTP handler for the administrative bulk clear
///
/// POST /internal/clear-data
/// The hosting platform only routes moderators here; the server trusts it.
#[instrument(name = "clear_data", skip(state))]
pub async fn clear_data(
    State(state): State<AppState>,
    identity: PlayerIdentity,
) -> Result<StatusCode, AppError> {
    game_service(&state).clear_post_data(&identity.post_id).await?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use tower::ServiceExt; // for `oneshot`

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/api/init", axum::routing::get(init_game))
            .route("/api/start-session", axum::routing::post(start_session))
            .route("/api/submit-answer", axum::routing::post(submit_answer))
            .with_state(state)
    }

    fn get(uri: &str, user: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("GET")
            .uri(uri)
            .header("x-post-id", "p1");
        if let Some(user) = user {
            builder = builder.header("x-user-id", user).header("x-username", user);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn init_seeds_a_deck_and_reports_anonymous_users() {
        let state = AppStateBuilder::new().build();

        let response = app(state).oneshot(get("/api/init", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: InitResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(parsed.post_id, "p1");
        assert_eq!(parsed.user_id, "anonymous");
        assert!(!parsed.deck.questions.is_empty());
        assert!(parsed.player_session.is_none());
        assert!(parsed.player_rank.is_none());
    }

    #[tokio::test]
    async fn start_session_requires_a_logged_in_user() {
        let state = AppStateBuilder::new().build();

        let request = Request::builder()
            .method("POST")
            .uri("/api/start-session")
            .header("content-type", "application/json")
            .header("x-post-id", "p1")
            .body(Body::from(r#"{"scoringMode": "trivia"}"#))
            .unwrap();

        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn submitting_without_a_session_is_not_found() {
        let state = AppStateBuilder::new().build();

        let request = Request::builder()
            .method("POST")
            .uri("/api/submit-answer")
            .header("content-type", "application/json")
            .header("x-post-id", "p1")
            .header("x-user-id", "u1")
            .header("x-username", "player")
            .body(Body::from(
                r#"{"questionId": "q1", "answer": "a", "timeRemaining": 5}"#,
            ))
            .unwrap();

        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
