// Public API - what other modules can use
pub use models::{AnswerValue, GameState, PlayerAnswer, PlayerSession};
pub use service::SessionService;

pub mod models;
pub mod repository;
pub mod service;
