mod deck;
mod game;
mod leaderboard;
mod scoring;
mod session;
mod shared;
mod stats;

use axum::{
    routing::{get, post},
    Router,
};
use deck::repository::InMemoryDeckRepository;
use leaderboard::repository::InMemoryLeaderboardRepository;
use session::repository::InMemorySessionRepository;
use shared::AppState;
use stats::InMemoryStatsRepository;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debate_dueler=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Debate Dueler game server");

    // Create shared application state with dependency injection
    // Easy to switch between implementations:
    let app_state = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = sqlx::PgPool::connect(&database_url)
                .await
                .expect("Failed to connect to database");
            info!("Using PostgreSQL repositories");
            AppState::new(
                Arc::new(deck::repository::PostgresDeckRepository::new(pool.clone())),
                Arc::new(stats::PostgresStatsRepository::new(pool.clone())),
                Arc::new(session::repository::PostgresSessionRepository::new(
                    pool.clone(),
                )),
                Arc::new(leaderboard::repository::PostgresLeaderboardRepository::new(
                    pool,
                )),
            )
        }
        Err(_) => {
            info!("Using in-memory repositories");
            AppState::new(
                Arc::new(InMemoryDeckRepository::new()),
                Arc::new(InMemoryStatsRepository::new()),
                Arc::new(InMemorySessionRepository::new()),
                Arc::new(InMemoryLeaderboardRepository::new()),
            )
        }
    };

    // build our application with the game routes
    let app = Router::new()
        .route("/", get(|| async { "Debate Dueler" }))
        .route("/api/init", get(game::init_game))
        .route("/api/start-session", post(game::start_session))
        .route("/api/submit-answer", post(game::submit_answer))
        .route("/api/complete-game", post(game::complete_game))
        .route("/api/leaderboard", get(leaderboard::get_leaderboard))
        .route("/api/add-question", post(deck::add_question))
        .route("/api/edit-question", post(deck::edit_question))
        .route("/api/delete-question", post(deck::delete_question))
        .route("/internal/clear-data", post(game::clear_data))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // run our app with hyper, listening globally on port 3000
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("Server running on http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}
