use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::ScoringMode;

/// One finished player's counted score for a post. At most one entry exists
/// per (post, user); the first completion wins and later ones are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub username: String,
    pub score: i32,
    pub scoring_mode: ScoringMode,
    pub completed_at: DateTime<Utc>,
}
