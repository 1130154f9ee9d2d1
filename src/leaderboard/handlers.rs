use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::service::{LeaderboardService, DEFAULT_LIMIT};
use super::types::{LeaderboardQuery, LeaderboardResponse, LeaderboardView};
use crate::shared::{AppError, AppState, PlayerIdentity};

/// HTTP handler for leaderboard queries
///
/// GET /api/leaderboard?type=top|near
/// Anonymous viewers get the board with no rank or score of their own.
#[instrument(name = "get_leaderboard", skip(state))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    identity: PlayerIdentity,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let service = LeaderboardService::new(Arc::clone(&state.leaderboard_repository));
    let post_id = &identity.post_id;

    let leaderboard = match (query.r#type, identity.user_id.as_deref()) {
        (LeaderboardView::Near, Some(user_id)) => service.get_near(post_id, user_id).await?,
        _ => service.get_top(post_id, DEFAULT_LIMIT).await?,
    };

    let mut player_rank = None;
    let mut player_score = None;
    if let Some(user_id) = identity.user_id.as_deref() {
        player_rank = service.get_rank(post_id, user_id).await?;
        if let Some(session) = state
            .session_repository
            .get_session(post_id, user_id)
            .await?
        {
            player_score = Some(session.total_score);
        }
    }

    info!(
        post_id = %post_id,
        entries = leaderboard.len(),
        "Leaderboard served"
    );

    Ok(Json(LeaderboardResponse {
        leaderboard,
        player_rank,
        player_score,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::models::LeaderboardEntry;
    use crate::leaderboard::repository::{InMemoryLeaderboardRepository, LeaderboardRepository};
    use crate::scoring::ScoringMode;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use chrono::Utc;
    use tower::ServiceExt; // for `oneshot`

    fn entry(user_id: &str, score: i32) -> LeaderboardEntry {
        LeaderboardEntry {
            user_id: user_id.to_string(),
            username: format!("name-{}", user_id),
            score,
            scoring_mode: ScoringMode::Trivia,
            completed_at: Utc::now(),
        }
    }

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/api/leaderboard", axum::routing::get(get_leaderboard))
            .with_state(state)
    }

    #[tokio::test]
    async fn serves_top_entries_with_player_rank() {
        let repo = Arc::new(InMemoryLeaderboardRepository::new());
        for (user, score) in [("u1", 300), ("u2", 200), ("u3", 100)] {
            repo.insert_if_absent("p1", &entry(user, score)).await.unwrap();
        }
        let state = AppStateBuilder::new()
            .with_leaderboard_repository(repo)
            .build();

        let request = Request::builder()
            .method("GET")
            .uri("/api/leaderboard?type=top")
            .header("x-post-id", "p1")
            .header("x-user-id", "u2")
            .header("x-username", "name-u2")
            .body(Body::empty())
            .unwrap();

        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: LeaderboardResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(parsed.leaderboard.len(), 3);
        assert_eq!(parsed.leaderboard[0].user_id, "u1");
        assert_eq!(parsed.player_rank, Some(2));
    }

    #[tokio::test]
    async fn missing_post_id_header_is_a_bad_request() {
        let state = AppStateBuilder::new().build();

        let request = Request::builder()
            .method("GET")
            .uri("/api/leaderboard")
            .body(Body::empty())
            .unwrap();

        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
