// Library crate for the Debate Dueler game server
// This file exposes the public API for integration tests

pub mod deck;
pub mod game;
pub mod leaderboard;
pub mod scoring;
pub mod session;
pub mod shared;
pub mod stats;

// Re-export commonly used types for easier access in tests
pub use deck::{Deck, DeckService, Question, QuestionType, MAX_QUESTIONS_PER_GAME};
pub use game::GameService;
pub use leaderboard::{LeaderboardEntry, LeaderboardService};
pub use scoring::{calculate_score, ScoringMode};
pub use session::{AnswerValue, PlayerSession, SessionService};
pub use shared::AppError;
pub use stats::{QuestionStats, StatsRepository};
