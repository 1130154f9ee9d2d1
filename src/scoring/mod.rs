// Public API - what other modules can use
pub use calculator::calculate_score;

mod calculator;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// The scoring philosophy a player commits to for their whole run.
///
/// Trivia rewards correctness, conformist rewards agreeing with the crowd,
/// contrarian rewards disagreeing with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScoringMode {
    Trivia,
    Conformist,
    Contrarian,
}
