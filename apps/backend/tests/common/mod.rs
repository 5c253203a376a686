//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext wiring an in-memory SQLite store, cache, and config
//! - Helpers for creating learners and sets
//! - A fixed clock so streak and review dates are predictable

pub mod fixtures;

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use vocab_backend::config::ServiceConfig;
use vocab_backend::models::{Learner, StoredSet};
use vocab_backend::services::sets;
use vocab_backend::AppState;

/// Test context holding service state and a settable clock.
pub struct TestContext {
    pub state: AppState,
    pub now: DateTime<Local>,
}

impl TestContext {
    /// Create a context with default configuration.
    ///
    /// Each context gets its own in-memory database.
    pub async fn new() -> Self {
        Self::with_config(ServiceConfig::default()).await
    }

    /// Create a context with custom configuration.
    pub async fn with_config(config: ServiceConfig) -> Self {
        let state = AppState::connect(config)
            .await
            .expect("Failed to set up test database");

        Self {
            state,
            now: Local.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap(),
        }
    }

    /// The study day the clock currently points at.
    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    /// Move the clock forward by whole days.
    pub fn advance_days(&mut self, days: i64) {
        self.now = self.now + Duration::days(days);
    }

    /// Create a learner with zeroed progress.
    pub async fn create_learner(&self, name: &str) -> Learner {
        self.state
            .db
            .create_learner(name, self.now.with_timezone(&Utc))
            .await
            .expect("Failed to create test learner")
    }

    /// Create a set of animal words for a learner.
    pub async fn create_animal_set(&self, learner_id: Uuid, is_public: bool) -> StoredSet {
        sets::create_set(
            &self.state,
            learner_id,
            fixtures::animal_set_request(is_public),
            self.now,
        )
        .await
        .expect("Failed to create test set")
    }

    /// Reload a learner from the store.
    pub async fn learner(&self, learner_id: Uuid) -> Learner {
        self.state
            .db
            .get_learner(learner_id)
            .await
            .unwrap()
            .expect("learner should exist")
    }

    /// Reload a set from the store.
    pub async fn set(&self, set_id: Uuid) -> StoredSet {
        self.state
            .db
            .get_set(set_id)
            .await
            .unwrap()
            .expect("set should exist")
    }
}
