//! Quiz history and aggregate stats.

use uuid::Uuid;

use crate::error::Result;
use crate::models::{HistoryStats, QuizRecord};
use crate::services::require_learner;
use crate::AppState;

/// Most recent quizzes, newest first, capped at `HISTORY_LIMIT`.
pub async fn recent_history(state: &AppState, learner_id: Uuid) -> Result<Vec<QuizRecord>> {
    require_learner(state, learner_id).await?;
    state
        .db
        .get_quiz_records(learner_id, Some(state.config.history_limit))
        .await
}

/// Totals over every quiz the learner has taken.
pub async fn history_stats(state: &AppState, learner_id: Uuid) -> Result<HistoryStats> {
    require_learner(state, learner_id).await?;
    let records = state.db.get_quiz_records(learner_id, None).await?;
    Ok(summarize(&records))
}

fn summarize(records: &[QuizRecord]) -> HistoryStats {
    let total_correct: u64 = records.iter().map(|r| u64::from(r.score)).sum();
    let total_questions: u64 = records.iter().map(|r| u64::from(r.total)).sum();
    let accuracy = if total_questions == 0 {
        0.0
    } else {
        total_correct as f64 / total_questions as f64
    };

    HistoryStats {
        quizzes_taken: records.len(),
        total_correct,
        total_questions,
        accuracy,
    }
}
