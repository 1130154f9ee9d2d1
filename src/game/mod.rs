// Public API - what other modules can use
pub use handlers::{clear_data, complete_game, init_game, start_session, submit_answer};
pub use service::GameService;

mod handlers;
pub mod service;
pub mod types;
