//! Stored records and service request/response types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Re-export shared types from vocab-core
pub use vocab_core::types::{
    AttemptOutcome, Difficulty, LearnerProgress, QuestionResult, QuestionType, QuizSummary,
    SrsState, VocabularyItem, VocabularySet,
};

// === Stored Entity Types ===

/// Learner account with gamification progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Learner {
    pub id: Uuid,
    pub name: String,
    pub progress: LearnerProgress,
    /// Community sets this learner has already cloned
    pub cloned_sets: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub version: u64,
}

/// Vocabulary set as stored, with its concurrency version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSet {
    pub id: Uuid,
    pub set: VocabularySet,
    pub clone_count: u32,
    pub created_at: DateTime<Utc>,
    pub version: u64,
}

impl StoredSet {
    /// Whether `learner_id` owns this set
    pub fn is_owned_by(&self, learner_id: Uuid) -> bool {
        self.set.owner_id == learner_id.to_string()
    }

    /// Convert to a listing summary
    pub fn to_summary(&self, today: NaiveDate) -> SetSummary {
        SetSummary {
            id: self.id,
            title: self.set.title.clone(),
            difficulty: self.set.difficulty,
            item_count: self.set.items.len(),
            due_count: self.set.due_count(today),
            version: self.version,
        }
    }
}

/// One graded quiz, kept for history and stats
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizRecord {
    pub id: Uuid,
    pub learner_id: Uuid,
    pub set_id: Uuid,
    pub set_title: String,
    pub score: u32,
    pub total: u32,
    pub taken_at: DateTime<Utc>,
}

// === Database Row Types ===

/// Learner row in SQLite
#[derive(Debug, Clone, FromRow)]
pub struct DbLearner {
    pub id: Uuid,
    pub name: String,
    pub experience_points: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub last_studied_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub version: i64,
}

impl DbLearner {
    /// Convert to a learner, attaching the sets it has cloned
    pub fn to_learner(&self, cloned_sets: Vec<Uuid>) -> Learner {
        Learner {
            id: self.id,
            name: self.name.clone(),
            progress: LearnerProgress {
                experience_points: to_u64(self.experience_points),
                current_streak: to_u32(self.current_streak),
                longest_streak: to_u32(self.longest_streak),
                last_studied_date: self.last_studied_date,
            },
            cloned_sets,
            created_at: self.created_at,
            version: to_u64(self.version),
        }
    }
}

/// Vocabulary set row in SQLite, without its items
#[derive(Debug, Clone, FromRow)]
pub struct DbSet {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: String,
    pub is_public: bool,
    pub original_set_id: Option<Uuid>,
    pub clone_count: i64,
    pub created_at: DateTime<Utc>,
    pub version: i64,
}

impl DbSet {
    /// Convert to a stored set holding `items`
    pub fn to_stored_set(&self, items: Vec<VocabularyItem>) -> StoredSet {
        StoredSet {
            id: self.id,
            set: VocabularySet {
                id: self.id.to_string(),
                owner_id: self.owner_id.to_string(),
                title: self.title.clone(),
                description: self.description.clone(),
                difficulty: parse_difficulty(&self.difficulty),
                items,
                is_public: self.is_public,
                original_set_id: self.original_set_id.map(|id| id.to_string()),
            },
            clone_count: to_u32(self.clone_count),
            created_at: self.created_at,
            version: to_u64(self.version),
        }
    }
}

/// Vocabulary item row in SQLite
#[derive(Debug, Clone, FromRow)]
pub struct DbItem {
    pub item_id: String,
    pub script: String,
    pub romanization: String,
    pub meaning: String,
    pub example: Option<String>,
    pub needs_review: bool,
    pub srs_level: i64,
    pub interval_days: i64,
    pub next_review_date: NaiveDate,
}

impl DbItem {
    /// Convert to a vocab-core item
    pub fn to_item(&self) -> VocabularyItem {
        VocabularyItem {
            item_id: self.item_id.clone(),
            script: self.script.clone(),
            romanization: self.romanization.clone(),
            meaning: self.meaning.clone(),
            example: self.example.clone(),
            needs_review: self.needs_review,
            srs: SrsState {
                srs_level: to_u32(self.srs_level),
                interval_days: to_u32(self.interval_days),
                next_review_date: self.next_review_date,
            },
        }
    }
}

/// Quiz record row in SQLite
#[derive(Debug, Clone, FromRow)]
pub struct DbQuizRecord {
    pub id: Uuid,
    pub learner_id: Uuid,
    pub set_id: Uuid,
    pub set_title: String,
    pub score: i64,
    pub total: i64,
    pub taken_at: DateTime<Utc>,
}

impl DbQuizRecord {
    pub fn to_record(&self) -> QuizRecord {
        QuizRecord {
            id: self.id,
            learner_id: self.learner_id,
            set_id: self.set_id,
            set_title: self.set_title.clone(),
            score: to_u32(self.score),
            total: to_u32(self.total),
            taken_at: self.taken_at,
        }
    }
}

/// Public set listing row, joined with its creator
#[derive(Debug, Clone, FromRow)]
pub struct DbPublicSet {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: String,
    pub creator: String,
    pub item_count: i64,
    pub clone_count: i64,
}

impl DbPublicSet {
    pub fn to_summary(&self) -> PublicSetSummary {
        PublicSetSummary {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            difficulty: parse_difficulty(&self.difficulty),
            creator: self.creator.clone(),
            item_count: usize::try_from(self.item_count).unwrap_or_default(),
            clone_count: to_u32(self.clone_count),
        }
    }
}

/// Column value for a difficulty label
pub fn difficulty_name(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "easy",
        Difficulty::Medium => "medium",
        Difficulty::Hard => "hard",
    }
}

fn parse_difficulty(name: &str) -> Difficulty {
    match name {
        "easy" => Difficulty::Easy,
        "hard" => Difficulty::Hard,
        _ => Difficulty::Medium,
    }
}

fn to_u32(value: i64) -> u32 {
    u32::try_from(value).unwrap_or_default()
}

fn to_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

// === Service Request/Response Types ===

/// Set listing entry (cached per learner)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetSummary {
    pub id: Uuid,
    pub title: String,
    pub difficulty: Difficulty,
    pub item_count: usize,
    pub due_count: usize,
    pub version: u64,
}

/// New vocabulary item content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    pub item_id: String,
    pub script: String,
    pub romanization: String,
    pub meaning: String,
    #[serde(default)]
    pub example: Option<String>,
}

/// Create set request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSetRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub items: Vec<NewItem>,
    #[serde(default)]
    pub is_public: bool,
}

/// Partial set update; `None` fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSetRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    /// Replacement item list; items whose id already exists keep their review state
    #[serde(default)]
    pub items: Option<Vec<NewItem>>,
    #[serde(default)]
    pub is_public: Option<bool>,
    /// Version the edit was based on; defaults to the version just read
    #[serde(default)]
    pub set_version: Option<u64>,
}

/// Community set listing entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicSetSummary {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: Difficulty,
    pub creator: String,
    pub item_count: usize,
    pub clone_count: u32,
}

/// Quiz submission request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitQuizRequest {
    pub set_id: Option<Uuid>,
    #[serde(default)]
    pub questions: Vec<QuestionResult>,
    /// Set version the quiz was generated from; rejected if the set moved on
    #[serde(default)]
    pub set_version: Option<u64>,
}

/// Quiz submission response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitQuizResponse {
    pub record: QuizRecord,
    pub outcomes: Vec<AttemptOutcome>,
    pub summary: QuizSummary,
    pub progress: LearnerProgress,
    pub set_version: u64,
}

/// Aggregate quiz statistics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryStats {
    pub quizzes_taken: usize,
    pub total_correct: u64,
    pub total_questions: u64,
    /// Fraction of questions answered correctly, 0.0 when none were taken
    pub accuracy: f64,
}

/// Public leaderboard entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub experience_points: u64,
}
