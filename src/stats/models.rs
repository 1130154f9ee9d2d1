use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::session::models::AnswerValue;

/// Community-wide response counters for a single question.
///
/// Counters only ever increase for the lifetime of the hosting post; the one
/// exception is the bulk administrative clear. Positions are 1-based.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionStats {
    pub question_id: String,
    /// card id -> number of submissions that included the card anywhere
    pub card_stats: HashMap<String, u32>,
    /// card id -> (1-based position -> times placed there), sequence questions only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_stats: Option<HashMap<String, HashMap<u32, u32>>>,
    /// Distinct answer submissions recorded, each counted exactly once
    pub total_responses: u32,
}

impl QuestionStats {
    pub fn empty(question_id: &str) -> Self {
        Self {
            question_id: question_id.to_string(),
            card_stats: HashMap::new(),
            position_stats: None,
            total_responses: 0,
        }
    }

    /// Applies one submission to the counters: the total bumps once, each
    /// touched card bumps once, and sequence answers also bump the 1-based
    /// position counter for every card.
    pub fn record(&mut self, answer: &AnswerValue) {
        self.total_responses += 1;

        match answer {
            AnswerValue::Single(card_id) => {
                *self.card_stats.entry(card_id.clone()).or_insert(0) += 1;
            }
            AnswerValue::Sequence(card_ids) => {
                let position_stats = self.position_stats.get_or_insert_with(HashMap::new);
                for (index, card_id) in card_ids.iter().enumerate() {
                    *self.card_stats.entry(card_id.clone()).or_insert(0) += 1;
                    let position = index as u32 + 1;
                    *position_stats
                        .entry(card_id.clone())
                        .or_default()
                        .entry(position)
                        .or_insert(0) += 1;
                }
            }
        }
    }

    pub fn card_count(&self, card_id: &str) -> u32 {
        self.card_stats.get(card_id).copied().unwrap_or(0)
    }

    /// Times `card_id` was placed at 1-based `position`
    pub fn position_count(&self, card_id: &str, position: u32) -> u32 {
        self.position_stats
            .as_ref()
            .and_then(|stats| stats.get(card_id))
            .and_then(|positions| positions.get(&position))
            .copied()
            .unwrap_or(0)
    }
}
