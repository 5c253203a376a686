//! Quiz submission grading.
//!
//! Loads the learner and set, runs the pure grader from vocab-core, and
//! writes both records back in one versioned commit.

use chrono::{DateTime, Local, Utc};
use uuid::Uuid;
use vocab_core::calendar::to_calendar_date;
use vocab_core::grade_submission;

use crate::db::GradingCommit;
use crate::error::{Result, ServiceError};
use crate::models::*;
use crate::services::{require_learner, require_owned_set};
use crate::AppState;

/// Grade a submission at `now` and persist the result.
///
/// `now` decides the study day for streaks and review dates.
pub async fn submit_quiz(
    state: &AppState,
    learner_id: Uuid,
    request: SubmitQuizRequest,
    now: DateTime<Local>,
) -> Result<SubmitQuizResponse> {
    let set_id = request
        .set_id
        .ok_or_else(|| ServiceError::BadRequest("Missing required fields".to_string()))?;
    if request.questions.is_empty() {
        return Err(ServiceError::BadRequest(
            "Missing required fields".to_string(),
        ));
    }

    let learner = require_learner(state, learner_id).await?;
    let stored = require_owned_set(state, learner_id, set_id).await?;

    if let Some(expected) = request.set_version {
        if expected != stored.version {
            return Err(ServiceError::VersionConflict {
                record: format!("set {}", set_id),
                expected,
                found: stored.version,
            });
        }
    }

    let today = to_calendar_date(&now);
    let graded = grade_submission(
        &stored.set,
        &learner.progress,
        &request.questions,
        &state.config.policy,
        today,
    );

    let record = QuizRecord {
        id: Uuid::new_v4(),
        learner_id,
        set_id,
        set_title: stored.set.title.clone(),
        score: graded.summary.score,
        total: graded.summary.total,
        taken_at: now.with_timezone(&Utc),
    };

    let versions = state
        .db
        .commit_grading(GradingCommit {
            learner_id,
            learner_version: learner.version,
            progress: graded.progress.clone(),
            set_id,
            set_version: stored.version,
            set: graded.items_changed.then(|| graded.set.clone()),
            record: record.clone(),
        })
        .await?;

    if graded.items_changed {
        state.cache.invalidate(learner_id);
    }

    tracing::info!(
        %learner_id,
        %set_id,
        score = record.score,
        total = record.total,
        xp_earned = graded.summary.xp_earned,
        streak = graded.progress.current_streak,
        "Graded quiz submission"
    );

    Ok(SubmitQuizResponse {
        record,
        outcomes: graded.outcomes,
        summary: graded.summary,
        progress: graded.progress,
        set_version: versions.set_version,
    })
}
