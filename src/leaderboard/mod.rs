// Public API - what other modules can use
pub use handlers::get_leaderboard;
pub use models::LeaderboardEntry;
pub use service::{LeaderboardService, DEFAULT_LIMIT};

mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
