//! Core types for vocabulary quizzes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::algorithm::{IntervalTable, LevelLadder};
use crate::error::Result;

/// Spaced repetition fields carried by every vocabulary item.
///
/// `interval_days` is always the interval table entry for `srs_level`, and
/// `next_review_date` is the grading day plus that interval. Only a
/// [`SpacedRepetitionAlgorithm`](crate::algorithm::SpacedRepetitionAlgorithm)
/// should produce new values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrsState {
    pub srs_level: u32,
    pub interval_days: u32,
    pub next_review_date: NaiveDate,
}

impl SrsState {
    /// State of an item that has never been reviewed: due immediately.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            srs_level: 0,
            interval_days: 0,
            next_review_date: today,
        }
    }
}

/// A single vocabulary entry inside a set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyItem {
    /// Stable identifier, unique within the owning set.
    pub item_id: String,
    pub script: String,
    pub romanization: String,
    pub meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default)]
    pub needs_review: bool,
    #[serde(flatten)]
    pub srs: SrsState,
}

impl VocabularyItem {
    /// Create an item with default SRS state, due on `today`.
    pub fn new(
        item_id: impl Into<String>,
        script: impl Into<String>,
        romanization: impl Into<String>,
        meaning: impl Into<String>,
        example: Option<String>,
        today: NaiveDate,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            script: script.into(),
            romanization: romanization.into(),
            meaning: meaning.into(),
            example,
            needs_review: false,
            srs: SrsState::new(today),
        }
    }

    /// Whether the item is eligible for review on `today`.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.srs.next_review_date <= today
    }
}

/// Set difficulty label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Medium
    }
}

/// A learner-owned collection of vocabulary items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularySet {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub items: Vec<VocabularyItem>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_set_id: Option<String>,
}

impl VocabularySet {
    /// Look up an item by its identifier.
    pub fn item(&self, item_id: &str) -> Option<&VocabularyItem> {
        self.items.iter().find(|item| item.item_id == item_id)
    }

    /// Items eligible for review on `today`, most overdue first.
    ///
    /// Ties on the review date put lower SRS levels first.
    pub fn due_items(&self, today: NaiveDate) -> Vec<&VocabularyItem> {
        let mut due: Vec<&VocabularyItem> =
            self.items.iter().filter(|item| item.is_due(today)).collect();
        due.sort_by_key(|item| (item.srs.next_review_date, item.srs.srs_level));
        due
    }

    /// Number of items eligible for review on `today`.
    pub fn due_count(&self, today: NaiveDate) -> usize {
        self.items.iter().filter(|item| item.is_due(today)).count()
    }

    /// Copy this set's content into a new private set for another learner.
    ///
    /// Review progress does not carry over: every item starts again at
    /// level 0, due on `today`.
    pub fn clone_for(
        &self,
        new_id: impl Into<String>,
        owner_id: impl Into<String>,
        today: NaiveDate,
    ) -> VocabularySet {
        VocabularySet {
            id: new_id.into(),
            owner_id: owner_id.into(),
            title: self.title.clone(),
            description: self.description.clone(),
            difficulty: self.difficulty,
            items: self
                .items
                .iter()
                .map(|item| VocabularyItem {
                    needs_review: false,
                    srs: SrsState::new(today),
                    ..item.clone()
                })
                .collect(),
            is_public: false,
            original_set_id: Some(self.id.clone()),
        }
    }
}

/// Kind of quiz question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// Type the romanization; tone digits are accepted.
    Pinyin,
    /// Type the meaning.
    Meaning,
    /// Type the written form.
    Script,
    /// Pick one of several options.
    MultipleChoice,
}

impl QuestionType {
    /// How answers to this question type are compared.
    pub fn matching_mode(self) -> MatchingMode {
        match self {
            Self::Pinyin => MatchingMode::Phonetic,
            Self::Meaning | Self::Script | Self::MultipleChoice => MatchingMode::Exact,
        }
    }
}

/// Matching mode for typed answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingMode {
    /// Case-sensitive string equality.
    Exact,
    /// Tone digits converted to marks, then compared case-insensitively.
    Phonetic,
}

/// One answered question from a quiz submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub item_id: String,
    pub question_type: QuestionType,
    #[serde(default)]
    pub user_answer: Option<String>,
    pub expected_answer: String,
}

/// Verdict for a single question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptOutcome {
    pub item_id: String,
    pub is_correct: bool,
}

/// Experience and streak bookkeeping for a learner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerProgress {
    pub experience_points: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_studied_date: Option<NaiveDate>,
}

/// Score of one graded submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSummary {
    pub score: u32,
    pub total: u32,
    pub xp_earned: u64,
}

/// Rules a submission is graded with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingPolicy {
    pub xp_per_correct: u32,
    pub intervals: IntervalTable,
}

impl Default for GradingPolicy {
    fn default() -> Self {
        Self {
            xp_per_correct: 10,
            intervals: IntervalTable::default(),
        }
    }
}

impl GradingPolicy {
    /// Build a policy from an XP reward and a list of interval day-counts.
    pub fn new(xp_per_correct: u32, intervals: Vec<u32>) -> Result<Self> {
        Ok(Self {
            xp_per_correct,
            intervals: IntervalTable::new(intervals)?,
        })
    }

    /// Scheduler driven by this policy's interval table.
    pub fn algorithm(&self) -> LevelLadder {
        LevelLadder::new(self.intervals.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn item(id: &str, level: u32, next: NaiveDate) -> VocabularyItem {
        VocabularyItem {
            srs: SrsState {
                srs_level: level,
                interval_days: 0,
                next_review_date: next,
            },
            ..VocabularyItem::new(id, "好", "hǎo", "good", None, next)
        }
    }

    fn set(items: Vec<VocabularyItem>) -> VocabularySet {
        VocabularySet {
            id: "set-1".to_string(),
            owner_id: "learner-1".to_string(),
            title: "HSK 1".to_string(),
            description: None,
            difficulty: Difficulty::Easy,
            items,
            is_public: true,
            original_set_id: None,
        }
    }

    #[test]
    fn new_item_has_default_srs_state() {
        let today = date(2024, 3, 10);
        let item = VocabularyItem::new("1", "好", "hǎo", "good", None, today);
        assert_eq!(item.srs, SrsState::new(today));
        assert_eq!(item.srs.srs_level, 0);
        assert_eq!(item.srs.interval_days, 0);
        assert!(item.is_due(today));
    }

    #[test]
    fn due_items_sorted_by_date_then_level() {
        let today = date(2024, 3, 10);
        let set = set(vec![
            item("late", 2, date(2024, 3, 9)),
            item("future", 0, date(2024, 3, 11)),
            item("oldest", 4, date(2024, 3, 1)),
            item("late-low", 1, date(2024, 3, 9)),
        ]);

        let ids: Vec<&str> = set
            .due_items(today)
            .iter()
            .map(|item| item.item_id.as_str())
            .collect();
        assert_eq!(ids, vec!["oldest", "late-low", "late"]);
        assert_eq!(set.due_count(today), 3);
    }

    #[test]
    fn clone_resets_progress() {
        let today = date(2024, 3, 10);
        let mut source = set(vec![item("a", 5, date(2024, 5, 1))]);
        source.items[0].needs_review = true;

        let copy = source.clone_for("set-2", "learner-2", today);
        assert_eq!(copy.owner_id, "learner-2");
        assert!(!copy.is_public);
        assert_eq!(copy.original_set_id.as_deref(), Some("set-1"));
        assert_eq!(copy.items[0].srs, SrsState::new(today));
        assert!(!copy.items[0].needs_review);
        assert_eq!(copy.items[0].meaning, "good");
    }

    #[test]
    fn question_type_matching_modes() {
        assert_eq!(QuestionType::Pinyin.matching_mode(), MatchingMode::Phonetic);
        assert_eq!(QuestionType::Meaning.matching_mode(), MatchingMode::Exact);
        assert_eq!(QuestionType::MultipleChoice.matching_mode(), MatchingMode::Exact);
    }

    #[test]
    fn item_srs_fields_are_flattened() {
        let item = VocabularyItem::new("7", "猫", "māo", "cat", None, date(2024, 1, 2));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["srs_level"], 0);
        assert_eq!(json["next_review_date"], "2024-01-02");
        assert!(json.get("example").is_none());
    }

    #[test]
    fn missing_user_answer_deserializes_as_none() {
        let json = r#"{"item_id":"1","question_type":"pinyin","expected_answer":"mā"}"#;
        let result: QuestionResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.user_answer, None);
        assert_eq!(result.question_type, QuestionType::Pinyin);
    }

    #[test]
    fn policy_rejects_empty_table() {
        assert!(GradingPolicy::new(10, vec![]).is_err());
        assert_eq!(GradingPolicy::default().xp_per_correct, 10);
    }
}
