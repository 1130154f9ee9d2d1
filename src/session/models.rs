use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::ScoringMode;

/// A submitted answer: one card id for multiple choice, an ordered list of
/// card ids for sequence questions. Serialized as the bare value so the wire
/// shape stays `"c1"` or `["c1","c2"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Single(String),
    Sequence(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    Waiting,
    Playing,
    Finished,
}

/// Immutable record of one answered question
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerAnswer {
    pub question_id: String,
    pub answer: AnswerValue,
    /// Client-reported seconds left on the countdown; trusted input, used
    /// only for the time bonus
    pub time_remaining: i32,
    pub timestamp: DateTime<Utc>,
}

/// One player's progression through a post's deck
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSession {
    pub user_id: String,
    pub username: String,
    pub scoring_mode: ScoringMode,
    pub answers: Vec<PlayerAnswer>,
    pub total_score: i32,
    pub current_question_index: usize,
    pub game_state: GameState,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl PlayerSession {
    pub fn new(user_id: String, username: String, scoring_mode: ScoringMode) -> Self {
        Self {
            user_id,
            username,
            scoring_mode,
            answers: Vec::new(),
            total_score: 0,
            current_question_index: 0,
            game_state: GameState::Playing,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.game_state == GameState::Finished
    }

    /// Appends a scored answer and advances to the next question
    pub fn record_answer(&mut self, answer: PlayerAnswer, score: i32) {
        self.answers.push(answer);
        self.total_score += score;
        self.current_question_index += 1;
    }

    /// Freezes the session with its authoritative final score
    pub fn finish(&mut self, final_score: i32) {
        self.total_score = final_score;
        self.game_state = GameState::Finished;
        self.finished_at = Some(Utc::now());
    }
}
