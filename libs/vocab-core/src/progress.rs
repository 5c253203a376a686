//! Experience and daily streak bookkeeping.

use crate::calendar::days_between;
use crate::types::{AttemptOutcome, LearnerProgress};
use chrono::NaiveDate;
use tracing::debug;

/// How a submission changed the learner's streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakChange {
    /// First study day on record.
    Started,
    /// Studied the day after the last study day.
    Extended,
    /// A day or more was missed; the streak restarts at 1.
    Reset,
    /// Same day as the last study day, or the clock went backwards.
    Unchanged,
}

/// Classify today's study against the last study date.
pub fn streak_change(last_studied: Option<NaiveDate>, today: NaiveDate) -> StreakChange {
    match last_studied.map(|last| days_between(last, today)) {
        None => StreakChange::Started,
        Some(1) => StreakChange::Extended,
        Some(diff) if diff > 1 => StreakChange::Reset,
        Some(_) => StreakChange::Unchanged,
    }
}

/// Experience earned for a set of outcomes.
pub fn experience_for(outcomes: &[AttemptOutcome], xp_per_correct: u32) -> u64 {
    let correct = outcomes.iter().filter(|outcome| outcome.is_correct).count() as u64;
    correct.saturating_mul(u64::from(xp_per_correct))
}

/// Fold one graded submission into a learner's progress.
///
/// XP and the streak are both updated even when nothing was answered
/// correctly: a wrong answer still counts as studying that day.
pub fn apply_outcomes(
    progress: &LearnerProgress,
    outcomes: &[AttemptOutcome],
    xp_per_correct: u32,
    today: NaiveDate,
) -> LearnerProgress {
    let change = streak_change(progress.last_studied_date, today);
    let current_streak = match change {
        StreakChange::Started | StreakChange::Reset => 1,
        StreakChange::Extended => progress.current_streak.saturating_add(1),
        StreakChange::Unchanged => progress.current_streak,
    };
    debug!(?change, current_streak, "updated study streak");

    LearnerProgress {
        experience_points: progress
            .experience_points
            .saturating_add(experience_for(outcomes, xp_per_correct)),
        current_streak,
        longest_streak: progress.longest_streak.max(current_streak),
        last_studied_date: Some(today),
    }
}
