//! Grading of complete quiz submissions.
//!
//! Ties the pieces together: every answer is judged, each verdict advances
//! the matching item's schedule, and the whole batch is folded into the
//! learner's XP and streak. Inputs are borrowed and never modified; the
//! caller persists the returned state.

use crate::algorithm::SpacedRepetitionAlgorithm;
use crate::matching::evaluate;
use crate::progress::{apply_outcomes, experience_for};
use crate::types::{
    AttemptOutcome, GradingPolicy, LearnerProgress, QuestionResult, QuizSummary, VocabularySet,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Everything produced by grading one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradedSubmission {
    pub set: VocabularySet,
    pub progress: LearnerProgress,
    pub outcomes: Vec<AttemptOutcome>,
    pub summary: QuizSummary,
    /// Whether any item's SRS state differs from the input set.
    pub items_changed: bool,
}

/// Grade a submission with the policy's interval table and XP reward.
pub fn grade_submission(
    set: &VocabularySet,
    progress: &LearnerProgress,
    questions: &[QuestionResult],
    policy: &GradingPolicy,
    today: NaiveDate,
) -> GradedSubmission {
    grade_with(
        &policy.algorithm(),
        set,
        progress,
        questions,
        policy.xp_per_correct,
        today,
    )
}

/// Grade a submission with an explicit scheduling algorithm.
pub fn grade_with(
    algorithm: &dyn SpacedRepetitionAlgorithm,
    set: &VocabularySet,
    progress: &LearnerProgress,
    questions: &[QuestionResult],
    xp_per_correct: u32,
    today: NaiveDate,
) -> GradedSubmission {
    let outcomes: Vec<AttemptOutcome> = questions.iter().map(evaluate).collect();

    let mut graded_set = set.clone();
    for outcome in &outcomes {
        advance_item(algorithm, &mut graded_set, outcome, today);
    }

    let graded_progress = apply_outcomes(progress, &outcomes, xp_per_correct, today);
    let summary = QuizSummary {
        score: saturating_u32(outcomes.iter().filter(|outcome| outcome.is_correct).count()),
        total: saturating_u32(outcomes.len()),
        xp_earned: experience_for(&outcomes, xp_per_correct),
    };
    let items_changed = graded_set.items != set.items;

    debug!(
        set_id = %set.id,
        algorithm = algorithm.name(),
        score = summary.score,
        total = summary.total,
        items_changed,
        "graded submission"
    );

    GradedSubmission {
        set: graded_set,
        progress: graded_progress,
        outcomes,
        summary,
        items_changed,
    }
}

/// Advance the item an outcome refers to, in place.
///
/// Repeated questions on one item compose: each sees the state left by the
/// previous one. Unknown items are skipped.
fn advance_item(
    algorithm: &dyn SpacedRepetitionAlgorithm,
    set: &mut VocabularySet,
    outcome: &AttemptOutcome,
    today: NaiveDate,
) {
    let Some(item) = set
        .items
        .iter_mut()
        .find(|item| item.item_id == outcome.item_id)
    else {
        debug!(item_id = %outcome.item_id, "skipping outcome for unknown item");
        return;
    };

    let before = item.srs.srs_level;
    *item = algorithm.advance(item, outcome.is_correct, today);
    debug!(
        item_id = %item.item_id,
        is_correct = outcome.is_correct,
        from_level = before,
        to_level = item.srs.srs_level,
        interval_days = item.srs.interval_days,
        "advanced item"
    );
}

fn saturating_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}
