//! Level ladder scheduling.
//!
//! Each item sits on a level. A correct answer climbs one level, a wrong
//! answer drops two (never below zero). The level indexes a table of
//! review intervals; levels past the end of the table reuse its last entry.

use super::SpacedRepetitionAlgorithm;
use crate::calendar::add_days;
use crate::error::{ConfigError, Result};
use crate::types::SrsState;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default review intervals in days, from new through long-term retention.
pub const DEFAULT_INTERVALS: [u32; 8] = [0, 1, 3, 7, 14, 30, 90, 180];

const CORRECT_STEP: u32 = 1;
const INCORRECT_PENALTY: u32 = 2;

/// Ordered, non-decreasing list of review intervals indexed by level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct IntervalTable(Vec<u32>);

impl IntervalTable {
    /// Validate and wrap a list of day-counts.
    pub fn new(days: Vec<u32>) -> Result<Self> {
        if days.is_empty() {
            return Err(ConfigError::EmptyIntervalTable);
        }
        if let Some(index) = days.windows(2).position(|pair| pair[1] < pair[0]) {
            return Err(ConfigError::DecreasingInterval {
                index: index + 1,
                previous: days[index],
                next: days[index + 1],
            });
        }
        Ok(Self(days))
    }

    /// Interval for `level`, clamped to the last entry.
    pub fn interval_for(&self, level: u32) -> u32 {
        let last = self.0.len() - 1;
        let index = usize::try_from(level).map_or(last, |level| level.min(last));
        self.0[index]
    }

    pub fn days(&self) -> &[u32] {
        &self.0
    }
}

impl Default for IntervalTable {
    fn default() -> Self {
        Self(DEFAULT_INTERVALS.to_vec())
    }
}

impl TryFrom<Vec<u32>> for IntervalTable {
    type Error = ConfigError;

    fn try_from(days: Vec<u32>) -> Result<Self> {
        Self::new(days)
    }
}

impl From<IntervalTable> for Vec<u32> {
    fn from(table: IntervalTable) -> Self {
        table.0
    }
}

/// Level ladder algorithm with a configurable interval table.
#[derive(Debug, Clone, Default)]
pub struct LevelLadder {
    pub intervals: IntervalTable,
}

impl LevelLadder {
    pub fn new(intervals: IntervalTable) -> Self {
        Self { intervals }
    }
}

impl SpacedRepetitionAlgorithm for LevelLadder {
    fn name(&self) -> &'static str {
        "ladder"
    }

    fn initial_state(&self, today: NaiveDate) -> SrsState {
        SrsState::new(today)
    }

    fn schedule(&self, state: &SrsState, is_correct: bool, today: NaiveDate) -> SrsState {
        let srs_level = if is_correct {
            state.srs_level.saturating_add(CORRECT_STEP)
        } else {
            state.srs_level.saturating_sub(INCORRECT_PENALTY)
        };
        let interval_days = self.intervals.interval_for(srs_level);

        SrsState {
            srs_level,
            interval_days,
            next_review_date: add_days(today, interval_days),
        }
    }
}
