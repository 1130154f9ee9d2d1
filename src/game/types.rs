use serde::{Deserialize, Serialize};

use crate::deck::models::Deck;
use crate::scoring::ScoringMode;
use crate::session::models::{AnswerValue, PlayerAnswer, PlayerSession};
use crate::stats::models::QuestionStats;

/// Everything the client needs to render the game on load
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitResponse {
    pub post_id: String,
    pub deck: Deck,
    pub player_session: Option<PlayerSession>,
    pub player_rank: Option<usize>,
    pub user_id: String,
    pub username: String,
}

/// Request payload for starting a fresh run
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub scoring_mode: ScoringMode,
}

/// Request payload for answering one question
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    pub question_id: String,
    pub answer: AnswerValue,
    pub time_remaining: i32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerResponse {
    pub score: i32,
    pub question_stats: QuestionStats,
    pub is_game_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_question_index: Option<usize>,
}

/// Request payload for the batch finalization path. The client's running
/// total comes along for wire compatibility but is never trusted; the server
/// recomputes every answer's score against the community stats.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteGameRequest {
    pub answers: Vec<PlayerAnswer>,
    #[allow(dead_code)] // Client-computed total, deliberately ignored
    #[serde(default)]
    pub total_score: i32,
    pub session_data: PlayerSession,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteGameResponse {
    pub final_score: i32,
    pub session: PlayerSession,
    pub leaderboard_updated: bool,
}
