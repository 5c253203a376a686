//! XP leaderboard.

use crate::error::Result;
use crate::models::LeaderboardEntry;
use crate::AppState;

/// Top learners by XP, exposing only public fields.
pub async fn leaderboard(state: &AppState) -> Result<Vec<LeaderboardEntry>> {
    let learners = state.db.top_learners(state.config.leaderboard_limit).await?;
    Ok(learners
        .into_iter()
        .map(|l| LeaderboardEntry {
            name: l.name,
            experience_points: l.progress.experience_points,
        })
        .collect())
}
