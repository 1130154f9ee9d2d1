use super::ScoringMode;
use crate::deck::models::Question;
use crate::session::models::AnswerValue;
use crate::stats::models::QuestionStats;

/// Computes the score for one answered question.
///
/// Pure: depends only on the stats snapshot it is handed, never on the store
/// behind it. The caller is responsible for matching the answer shape to the
/// question type; the shape of `answer` decides which path scores it.
///
/// Every mode adds a flat time bonus of one point per second remaining,
/// except a wrong trivia pick, which scores exactly 0 no matter how fast it
/// was submitted. `time_remaining` is client-reported, so the bonus is
/// clamped to the question's own time limit.
pub fn calculate_score(
    scoring_mode: ScoringMode,
    question: &Question,
    answer: &AnswerValue,
    stats: &QuestionStats,
    time_remaining: i32,
) -> i32 {
    let limit = i32::try_from(question.time_limit).unwrap_or(i32::MAX);
    let base_time_bonus = time_remaining.clamp(0, limit);

    match answer {
        AnswerValue::Single(card_id) => {
            score_single(scoring_mode, question, card_id, stats, base_time_bonus)
        }
        AnswerValue::Sequence(card_ids) => {
            score_sequence(scoring_mode, question, card_ids, stats, base_time_bonus)
        }
    }
}

fn score_single(
    scoring_mode: ScoringMode,
    question: &Question,
    card_id: &str,
    stats: &QuestionStats,
    base_time_bonus: i32,
) -> i32 {
    if scoring_mode == ScoringMode::Trivia {
        let correct = question
            .card(card_id)
            .and_then(|c| c.is_correct)
            .unwrap_or(false);
        return if correct {
            100i32.saturating_add(base_time_bonus)
        } else {
            0
        };
    }

    let popularity = card_popularity(stats, card_id);
    let score = match scoring_mode {
        ScoringMode::Conformist => round_pct(popularity * 100.0),
        ScoringMode::Contrarian => round_pct((1.0 - popularity) * 100.0),
        ScoringMode::Trivia => unreachable!(),
    };
    score.saturating_add(base_time_bonus)
}

fn score_sequence(
    scoring_mode: ScoringMode,
    question: &Question,
    card_ids: &[String],
    stats: &QuestionStats,
    base_time_bonus: i32,
) -> i32 {
    if scoring_mode == ScoringMode::Trivia {
        let correct_sequence = question.correct_sequence();
        if correct_sequence.is_empty() {
            return base_time_bonus;
        }

        let correct_positions = card_ids
            .iter()
            .enumerate()
            .filter(|(index, card_id)| correct_sequence.get(*index) == Some(card_id))
            .count();

        let accuracy = correct_positions as f64 / correct_sequence.len() as f64;
        return round_pct(accuracy * 100.0).saturating_add(base_time_bonus);
    }

    // Without positional data there is nothing to agree or disagree with;
    // this branch scores a flat 0 with no time bonus.
    if stats.position_stats.is_none() || card_ids.is_empty() {
        return 0;
    }

    let total_pct: f64 = card_ids
        .iter()
        .enumerate()
        .map(|(index, card_id)| {
            let position = index as u32 + 1;
            let count = stats.position_count(card_id, position);
            if stats.total_responses == 0 {
                0.0
            } else {
                count as f64 / stats.total_responses as f64 * 100.0
            }
        })
        .sum();
    let average_pct = total_pct / card_ids.len() as f64;

    let score = match scoring_mode {
        ScoringMode::Conformist => round_pct(average_pct),
        ScoringMode::Contrarian => round_pct(100.0 - average_pct),
        ScoringMode::Trivia => unreachable!(),
    };
    score.saturating_add(base_time_bonus)
}

/// Fraction of all submissions that picked the card; 0 with no data
fn card_popularity(stats: &QuestionStats, card_id: &str) -> f64 {
    if stats.total_responses == 0 {
        return 0.0;
    }
    stats.card_count(card_id) as f64 / stats.total_responses as f64
}

/// Half-up rounding; inputs here are always in 0..=100
fn round_pct(value: f64) -> i32 {
    value.round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::models::{Card, QuestionType};
    use rstest::rstest;
    use std::collections::HashMap;

    fn choice_question(correct_id: &str, card_ids: &[&str]) -> Question {
        Question {
            id: "q1".to_string(),
            prompt: "Pick one".to_string(),
            cards: card_ids
                .iter()
                .map(|id| Card {
                    id: id.to_string(),
                    text: id.to_string(),
                    is_correct: Some(*id == correct_id),
                    sequence_order: None,
                })
                .collect(),
            time_limit: 20,
            question_type: QuestionType::MultipleChoice,
            author_username: None,
        }
    }

    fn sequence_question(ordered_ids: &[&str]) -> Question {
        Question {
            id: "q2".to_string(),
            prompt: "Order these".to_string(),
            cards: ordered_ids
                .iter()
                .enumerate()
                .map(|(index, id)| Card {
                    id: id.to_string(),
                    text: id.to_string(),
                    is_correct: None,
                    sequence_order: Some(index as u32 + 1),
                })
                .collect(),
            time_limit: 30,
            question_type: QuestionType::Sequence,
            author_username: None,
        }
    }

    fn stats_with_cards(question_id: &str, counts: &[(&str, u32)], total: u32) -> QuestionStats {
        QuestionStats {
            question_id: question_id.to_string(),
            card_stats: counts
                .iter()
                .map(|(id, count)| (id.to_string(), *count))
                .collect(),
            position_stats: None,
            total_responses: total,
        }
    }

    fn single(card_id: &str) -> AnswerValue {
        AnswerValue::Single(card_id.to_string())
    }

    fn sequence(card_ids: &[&str]) -> AnswerValue {
        AnswerValue::Sequence(card_ids.iter().map(|id| id.to_string()).collect())
    }

    #[rstest]
    #[case(0)]
    #[case(5)]
    #[case(30)]
    fn wrong_trivia_pick_scores_zero_regardless_of_time(#[case] time_remaining: i32) {
        let question = choice_question("a", &["a", "b"]);
        let stats = QuestionStats::empty("q1");

        let score = calculate_score(
            ScoringMode::Trivia,
            &question,
            &single("b"),
            &stats,
            time_remaining,
        );
        assert_eq!(score, 0);
    }

    #[test]
    fn correct_trivia_pick_scores_100_plus_bonus() {
        let question = choice_question("a", &["a", "b"]);
        let stats = QuestionStats::empty("q1");

        let score = calculate_score(ScoringMode::Trivia, &question, &single("a"), &stats, 12);
        assert_eq!(score, 112);
    }

    #[test]
    fn unknown_card_is_a_zero_contribution_not_a_panic() {
        let question = choice_question("a", &["a", "b"]);
        let stats = stats_with_cards("q1", &[("a", 10)], 10);

        let trivia = calculate_score(ScoringMode::Trivia, &question, &single("ghost"), &stats, 8);
        assert_eq!(trivia, 0);

        let conformist =
            calculate_score(ScoringMode::Conformist, &question, &single("ghost"), &stats, 8);
        assert_eq!(conformist, 8);
    }

    #[test]
    fn negative_time_remaining_is_clamped_to_zero() {
        let question = choice_question("a", &["a", "b"]);
        let stats = QuestionStats::empty("q1");

        let score = calculate_score(ScoringMode::Conformist, &question, &single("a"), &stats, -30);
        assert_eq!(score, 0);
    }

    // The countdown value comes from the client, so a dishonest one cannot
    // claim more seconds than the question ever had
    #[rstest]
    #[case(21, 120)]
    #[case(i32::MAX, 120)]
    fn time_bonus_is_capped_at_the_question_time_limit(
        #[case] time_remaining: i32,
        #[case] expected: i32,
    ) {
        let question = choice_question("a", &["a", "b"]);
        let stats = QuestionStats::empty("q1");

        let score = calculate_score(
            ScoringMode::Trivia,
            &question,
            &single("a"),
            &stats,
            time_remaining,
        );
        assert_eq!(score, expected);
    }

    // With no recorded responses popularity is defined as 0, so conformist
    // earns only the bonus while contrarian banks the full 100 for
    // disagreeing with nobody.
    #[test]
    fn zero_responses_means_popularity_is_zero() {
        let question = choice_question("a", &["a", "b"]);
        let stats = QuestionStats::empty("q1");

        let conformist =
            calculate_score(ScoringMode::Conformist, &question, &single("a"), &stats, 7);
        assert_eq!(conformist, 7);

        let contrarian =
            calculate_score(ScoringMode::Contrarian, &question, &single("a"), &stats, 7);
        assert_eq!(contrarian, 107);
    }

    // The worked example from the scoring design: A has 41 of 101 votes after
    // the new voter's own pick is counted, so a contrarian pick of A scores
    // round((1 - 41/101) * 100) = 59 plus the bonus.
    #[test]
    fn contrarian_scores_against_self_inclusive_distribution() {
        let question = choice_question("a", &["a", "b", "c"]);
        let stats = stats_with_cards("q1", &[("a", 41), ("b", 30), ("c", 30)], 101);

        let score = calculate_score(ScoringMode::Contrarian, &question, &single("a"), &stats, 10);
        assert_eq!(score, 59 + 10);

        let conformist =
            calculate_score(ScoringMode::Conformist, &question, &single("a"), &stats, 10);
        assert_eq!(conformist, 41 + 10);
    }

    #[rstest]
    #[case(&[("a", 1)], 1)]
    #[case(&[("a", 40), ("b", 30), ("c", 30)], 100)]
    #[case(&[("a", 41), ("b", 30), ("c", 30)], 101)]
    #[case(&[("a", 1), ("b", 2)], 3)]
    fn conformist_and_contrarian_are_complementary_within_rounding(
        #[case] counts: &[(&str, u32)],
        #[case] total: u32,
    ) {
        let question = choice_question("a", &["a", "b", "c"]);
        let stats = stats_with_cards("q1", counts, total);
        let bonus = 6;

        let conformist =
            calculate_score(ScoringMode::Conformist, &question, &single("a"), &stats, bonus);
        let contrarian =
            calculate_score(ScoringMode::Contrarian, &question, &single("a"), &stats, bonus);

        let expected = 100 + 2 * bonus;
        assert!((conformist + contrarian - expected).abs() <= 1);
    }

    #[test]
    fn exact_sequence_scores_100_plus_bonus() {
        let question = sequence_question(&["a", "b", "c", "d"]);
        let stats = QuestionStats::empty("q2");

        let score = calculate_score(
            ScoringMode::Trivia,
            &question,
            &sequence(&["a", "b", "c", "d"]),
            &stats,
            15,
        );
        assert_eq!(score, 115);
    }

    #[test]
    fn fully_reversed_sequence_scores_just_the_bonus() {
        let question = sequence_question(&["a", "b", "c", "d"]);
        let stats = QuestionStats::empty("q2");

        let score = calculate_score(
            ScoringMode::Trivia,
            &question,
            &sequence(&["d", "c", "b", "a"]),
            &stats,
            15,
        );
        assert_eq!(score, 15);
    }

    #[test]
    fn half_right_sequence_rounds_the_accuracy() {
        let question = sequence_question(&["a", "b", "c", "d"]);
        let stats = QuestionStats::empty("q2");

        // a and b in place, c and d swapped
        let score = calculate_score(
            ScoringMode::Trivia,
            &question,
            &sequence(&["a", "b", "d", "c"]),
            &stats,
            0,
        );
        assert_eq!(score, 50);
    }

    #[test]
    fn sequence_popularity_without_position_data_scores_flat_zero() {
        let question = sequence_question(&["a", "b", "c"]);
        let stats = QuestionStats::empty("q2");

        for mode in [ScoringMode::Conformist, ScoringMode::Contrarian] {
            let score = calculate_score(mode, &question, &sequence(&["a", "b", "c"]), &stats, 20);
            assert_eq!(score, 0, "no bonus in the degenerate no-data branch");
        }
    }

    #[test]
    fn sequence_popularity_averages_position_percentages() {
        let question = sequence_question(&["a", "b"]);

        // 4 submissions: "a" led 3 of them, "b" trailed 2 of them
        let mut position_stats: HashMap<String, HashMap<u32, u32>> = HashMap::new();
        position_stats.insert("a".to_string(), HashMap::from([(1, 3), (2, 1)]));
        position_stats.insert("b".to_string(), HashMap::from([(1, 1), (2, 2)]));
        let stats = QuestionStats {
            question_id: "q2".to_string(),
            card_stats: HashMap::from([("a".to_string(), 4), ("b".to_string(), 4)]),
            position_stats: Some(position_stats),
            total_responses: 4,
        };

        // a@1 = 75%, b@2 = 50%, average 62.5% -> 63 half-up
        let conformist = calculate_score(
            ScoringMode::Conformist,
            &question,
            &sequence(&["a", "b"]),
            &stats,
            4,
        );
        assert_eq!(conformist, 63 + 4);

        // 100 - 62.5 = 37.5 -> 38 half-up
        let contrarian = calculate_score(
            ScoringMode::Contrarian,
            &question,
            &sequence(&["a", "b"]),
            &stats,
            4,
        );
        assert_eq!(contrarian, 38 + 4);
    }
}
