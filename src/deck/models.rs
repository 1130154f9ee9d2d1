use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use uuid::Uuid;

use crate::shared::AppError;
use crate::stats::models::QuestionStats;

/// How a question is answered: pick one card, or order all cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    Sequence,
}

/// A selectable option within a question
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub text: String,
    /// Marks the correct pick for trivia-scored multiple choice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    /// 1-based canonical position, sequence questions only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_order: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub cards: Vec<Card>,
    /// Countdown in seconds, enforced client-side only
    pub time_limit: u32,
    pub question_type: QuestionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_username: Option<String>,
}

impl Question {
    /// Stamps a user-submitted question with a generated id and author
    pub fn with_attribution(mut self, author_username: String) -> Self {
        self.id = format!("user_{}", Uuid::new_v4());
        self.author_username = Some(author_username);
        if self.time_limit == 0 {
            self.time_limit = 20;
        }
        self
    }

    /// Authoring-time validation. Malformed questions are rejected here so
    /// the score calculator never has to guess at intent.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.prompt.trim().is_empty() {
            return Err(AppError::Validation("Question prompt is required".to_string()));
        }
        if self.cards.len() < 2 {
            return Err(AppError::Validation(
                "Question needs at least 2 cards".to_string(),
            ));
        }

        match self.question_type {
            QuestionType::MultipleChoice => {
                let correct_count = self
                    .cards
                    .iter()
                    .filter(|c| c.is_correct.unwrap_or(false))
                    .count();
                if correct_count != 1 {
                    return Err(AppError::Validation(format!(
                        "Multiple choice questions need exactly one correct card, found {}",
                        correct_count
                    )));
                }
            }
            QuestionType::Sequence => {
                // Orders must be a permutation of 1..=N
                let mut orders: Vec<u32> = self
                    .cards
                    .iter()
                    .filter_map(|c| c.sequence_order)
                    .collect();
                orders.sort_unstable();
                let expected: Vec<u32> = (1..=self.cards.len() as u32).collect();
                if orders != expected {
                    return Err(AppError::Validation(
                        "Sequence questions need a contiguous 1..N ordering across all cards"
                            .to_string(),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Card ids in canonical order, sorted ascending by `sequence_order`.
    /// Cards without an order sort first (treated as 0), matching how
    /// pre-validation decks were scored.
    pub fn correct_sequence(&self) -> Vec<String> {
        let mut ordered: Vec<&Card> = self.cards.iter().collect();
        ordered.sort_by_key(|c| c.sequence_order.unwrap_or(0));
        ordered.iter().map(|c| c.id.clone()).collect()
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == card_id)
    }
}

/// The unit of persistence: a post's questions plus their aggregate stats
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: String,
    pub title: String,
    pub description: String,
    pub theme: String,
    pub questions: Vec<Question>,
    /// Snapshots attached when serving the deck; only questions with
    /// recorded responses appear here
    #[serde(default)]
    pub question_stats: Vec<QuestionStats>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Deck {
    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: &str) -> Card {
        Card {
            id: id.to_string(),
            text: id.to_string(),
            is_correct: None,
            sequence_order: None,
        }
    }

    fn multiple_choice(cards: Vec<Card>) -> Question {
        Question {
            id: "q1".to_string(),
            prompt: "Pick one".to_string(),
            cards,
            time_limit: 20,
            question_type: QuestionType::MultipleChoice,
            author_username: None,
        }
    }

    #[test]
    fn multiple_choice_requires_exactly_one_correct_card() {
        let mut a = card("a");
        a.is_correct = Some(true);
        let question = multiple_choice(vec![a.clone(), card("b")]);
        assert!(question.validate().is_ok());

        let none_correct = multiple_choice(vec![card("a"), card("b")]);
        assert!(none_correct.validate().is_err());

        let mut b = card("b");
        b.is_correct = Some(true);
        let two_correct = multiple_choice(vec![a, b]);
        assert!(two_correct.validate().is_err());
    }

    #[test]
    fn sequence_orders_must_be_contiguous() {
        let mut question = Question {
            id: "q2".to_string(),
            prompt: "Order these".to_string(),
            cards: vec![card("a"), card("b"), card("c")],
            time_limit: 30,
            question_type: QuestionType::Sequence,
            author_username: None,
        };

        question.cards[0].sequence_order = Some(2);
        question.cards[1].sequence_order = Some(1);
        question.cards[2].sequence_order = Some(3);
        assert!(question.validate().is_ok());

        // Gap in the ordering
        question.cards[2].sequence_order = Some(4);
        assert!(question.validate().is_err());

        // Duplicate position
        question.cards[2].sequence_order = Some(2);
        assert!(question.validate().is_err());

        // Missing position
        question.cards[2].sequence_order = None;
        assert!(question.validate().is_err());
    }

    #[test]
    fn correct_sequence_sorts_by_order() {
        let mut question = Question {
            id: "q3".to_string(),
            prompt: "Order these".to_string(),
            cards: vec![card("a"), card("b"), card("c")],
            time_limit: 30,
            question_type: QuestionType::Sequence,
            author_username: None,
        };
        question.cards[0].sequence_order = Some(3);
        question.cards[1].sequence_order = Some(1);
        question.cards[2].sequence_order = Some(2);

        assert_eq!(question.correct_sequence(), vec!["b", "c", "a"]);
    }

    #[test]
    fn with_attribution_generates_id_and_defaults_time_limit() {
        let mut a = card("a");
        a.is_correct = Some(true);
        let mut question = multiple_choice(vec![a, card("b")]);
        question.time_limit = 0;

        let stamped = question.with_attribution("debater".to_string());
        assert!(stamped.id.starts_with("user_"));
        assert_eq!(stamped.author_username.as_deref(), Some("debater"));
        assert_eq!(stamped.time_limit, 20);
    }
}
