//! Service operations, one module per area.

pub mod cache;
pub mod grading;
pub mod history;
pub mod leaderboard;
pub mod sets;

use uuid::Uuid;

use crate::error::{Result, ServiceError};
use crate::models::{Learner, StoredSet};
use crate::AppState;

/// Load a learner or fail with `NotFound`
pub(crate) async fn require_learner(state: &AppState, learner_id: Uuid) -> Result<Learner> {
    state
        .db
        .get_learner(learner_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Learner not found".to_string()))
}

/// Load a set the learner owns
pub(crate) async fn require_owned_set(
    state: &AppState,
    learner_id: Uuid,
    set_id: Uuid,
) -> Result<StoredSet> {
    let stored = state
        .db
        .get_set(set_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Set not found".to_string()))?;

    if !stored.is_owned_by(learner_id) {
        return Err(ServiceError::Unauthorized(
            "Not authorized to access this set".to_string(),
        ));
    }
    Ok(stored)
}
