// Public API - what other modules can use
pub use models::QuestionStats;
pub use repository::{InMemoryStatsRepository, PostgresStatsRepository, StatsRepository};

pub mod models;
pub mod repository;
