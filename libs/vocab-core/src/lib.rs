//! Core quiz grading library shared by the vocabulary services.
//!
//! Provides:
//! - Pinyin tone-number normalization
//! - Answer matching per question type
//! - Level ladder spaced repetition scheduling
//! - XP and study streak bookkeeping
//! - Submission grading that combines all of the above

pub mod algorithm;
pub mod calendar;
pub mod error;
pub mod grading;
pub mod matching;
pub mod pinyin;
pub mod progress;
pub mod types;

pub use algorithm::{IntervalTable, LevelLadder, SpacedRepetitionAlgorithm, DEFAULT_INTERVALS};
pub use error::{ConfigError, Result};
pub use grading::{grade_submission, grade_with, GradedSubmission};
pub use matching::{compare_answers, evaluate};
pub use pinyin::normalize;
pub use progress::{apply_outcomes, StreakChange};
pub use types::{
    AttemptOutcome, Difficulty, GradingPolicy, LearnerProgress, MatchingMode, QuestionResult,
    QuestionType, QuizSummary, SrsState, VocabularyItem, VocabularySet,
};
