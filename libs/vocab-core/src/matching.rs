//! Answer matching for quiz questions.

use crate::pinyin;
use crate::types::{AttemptOutcome, MatchingMode, QuestionResult};

/// Compare a typed answer to the correct answer.
///
/// In [`MatchingMode::Phonetic`] only the typed side is converted from tone
/// digits; `correct` is expected to already carry tone marks.
pub fn compare_answers(typed: &str, correct: &str, mode: MatchingMode) -> bool {
    match mode {
        MatchingMode::Exact => typed == correct,
        MatchingMode::Phonetic => {
            pinyin::normalize(typed).to_lowercase() == correct.to_lowercase()
        }
    }
}

/// Judge one answered question.
///
/// A missing answer counts as an empty string.
pub fn evaluate(result: &QuestionResult) -> AttemptOutcome {
    let typed = result.user_answer.as_deref().unwrap_or_default();
    AttemptOutcome {
        item_id: result.item_id.clone(),
        is_correct: compare_answers(
            typed,
            &result.expected_answer,
            result.question_type.matching_mode(),
        ),
    }
}
