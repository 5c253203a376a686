//! Test fixtures and factory functions for creating test data.

use uuid::Uuid;

use vocab_backend::models::{
    CreateSetRequest, Difficulty, NewItem, QuestionResult, QuestionType, SubmitQuizRequest,
};

fn item(id: &str, script: &str, romanization: &str, meaning: &str) -> NewItem {
    NewItem {
        item_id: id.to_string(),
        script: script.to_string(),
        romanization: romanization.to_string(),
        meaning: meaning.to_string(),
        example: None,
    }
}

/// Three-item set: cat, dog, horse.
pub fn animal_set_request(is_public: bool) -> CreateSetRequest {
    CreateSetRequest {
        title: "Animals".to_string(),
        description: Some("Common animals".to_string()),
        difficulty: Difficulty::Easy,
        items: vec![
            item("cat", "猫", "māo", "cat"),
            item("dog", "狗", "gǒu", "dog"),
            item("horse", "马", "mǎ", "horse"),
        ],
        is_public,
    }
}

/// Pinyin question answered with tone digits.
pub fn pinyin(item_id: &str, typed: &str, expected: &str) -> QuestionResult {
    QuestionResult {
        item_id: item_id.to_string(),
        question_type: QuestionType::Pinyin,
        user_answer: Some(typed.to_string()),
        expected_answer: expected.to_string(),
    }
}

/// Meaning question, matched exactly.
pub fn meaning(item_id: &str, typed: &str, expected: &str) -> QuestionResult {
    QuestionResult {
        item_id: item_id.to_string(),
        question_type: QuestionType::Meaning,
        user_answer: Some(typed.to_string()),
        expected_answer: expected.to_string(),
    }
}

/// Submission against a set.
pub fn submission(set_id: Uuid, questions: Vec<QuestionResult>) -> SubmitQuizRequest {
    SubmitQuizRequest {
        set_id: Some(set_id),
        questions,
        set_version: None,
    }
}
