use chrono::Utc;

use super::models::{Card, Deck, Question, QuestionType};

fn card(id: &str, text: &str) -> Card {
    Card {
        id: id.to_string(),
        text: text.to_string(),
        is_correct: None,
        sequence_order: None,
    }
}

fn correct(id: &str, text: &str) -> Card {
    Card {
        is_correct: Some(true),
        ..card(id, text)
    }
}

fn ordered(id: &str, text: &str, order: u32) -> Card {
    Card {
        sequence_order: Some(order),
        ..card(id, text)
    }
}

/// The deck a fresh post starts with before anyone curates it.
/// Opinion questions still mark one canon pick so trivia mode has
/// something to grade.
pub fn default_deck() -> Deck {
    Deck {
        id: "default".to_string(),
        title: "Debate Dueler".to_string(),
        description: "Settle the internet's least important arguments".to_string(),
        theme: "classic".to_string(),
        questions: vec![
            Question {
                id: "default_q1".to_string(),
                prompt: "Does pineapple belong on pizza?".to_string(),
                cards: vec![
                    correct("q1_yes", "Obviously yes"),
                    card("q1_no", "Absolutely not"),
                    card("q1_depends", "Only on Hawaiian"),
                    card("q1_indifferent", "I just eat what's in front of me"),
                ],
                time_limit: 20,
                question_type: QuestionType::MultipleChoice,
                author_username: None,
            },
            Question {
                id: "default_q2".to_string(),
                prompt: "Which planet is closest to the sun?".to_string(),
                cards: vec![
                    correct("q2_mercury", "Mercury"),
                    card("q2_venus", "Venus"),
                    card("q2_mars", "Mars"),
                    card("q2_earth", "Earth"),
                ],
                time_limit: 15,
                question_type: QuestionType::MultipleChoice,
                author_username: None,
            },
            Question {
                id: "default_q3".to_string(),
                prompt: "Order these animals from smallest to largest".to_string(),
                cards: vec![
                    ordered("q3_ant", "Ant", 1),
                    ordered("q3_cat", "Cat", 2),
                    ordered("q3_horse", "Horse", 3),
                    ordered("q3_whale", "Blue whale", 4),
                ],
                time_limit: 30,
                question_type: QuestionType::Sequence,
                author_username: None,
            },
            Question {
                id: "default_q4".to_string(),
                prompt: "What's the best day of the week?".to_string(),
                cards: vec![
                    card("q4_friday", "Friday"),
                    correct("q4_saturday", "Saturday"),
                    card("q4_sunday", "Sunday"),
                    card("q4_monday", "Monday, fight me"),
                ],
                time_limit: 20,
                question_type: QuestionType::MultipleChoice,
                author_username: None,
            },
        ],
        question_stats: Vec::new(),
        created_by: "debate-dueler".to_string(),
        created_at: Utc::now(),
    }
}
