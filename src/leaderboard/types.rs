use serde::{Deserialize, Serialize};

use super::models::LeaderboardEntry;

/// Which slice of the board the client wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardView {
    Top,
    Near,
}

fn default_view() -> LeaderboardView {
    LeaderboardView::Top
}

/// Query parameters for GET /api/leaderboard
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default = "default_view")]
    pub r#type: LeaderboardView,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<LeaderboardEntry>,
    pub player_rank: Option<usize>,
    pub player_score: Option<i32>,
}
