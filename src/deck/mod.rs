// Public API - what other modules can use
pub use default::default_deck;
pub use handlers::{add_question, delete_question, edit_question};
pub use models::{Card, Deck, Question, QuestionType};
pub use service::{DeckService, MAX_QUESTIONS_PER_GAME};

mod default;
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
