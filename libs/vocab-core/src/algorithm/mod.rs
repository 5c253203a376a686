//! Spaced repetition scheduling.

pub mod ladder;

pub use ladder::{IntervalTable, LevelLadder, DEFAULT_INTERVALS};

use crate::types::{SrsState, VocabularyItem};
use chrono::NaiveDate;

/// Trait for spaced repetition algorithms driven by a correct/incorrect signal.
pub trait SpacedRepetitionAlgorithm: Send + Sync {
    /// Algorithm identifier.
    fn name(&self) -> &'static str;

    /// Initial state for a newly added item.
    fn initial_state(&self, today: NaiveDate) -> SrsState;

    /// Calculate the next state after one graded answer.
    fn schedule(&self, state: &SrsState, is_correct: bool, today: NaiveDate) -> SrsState;

    /// Return `item` with its SRS state advanced; content is left untouched.
    fn advance(&self, item: &VocabularyItem, is_correct: bool, today: NaiveDate) -> VocabularyItem {
        VocabularyItem {
            srs: self.schedule(&item.srs, is_correct, today),
            ..item.clone()
        }
    }
}
