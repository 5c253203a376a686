//! Vocabulary set listing, editing, community browsing, cloning, and review queues.

use std::collections::HashSet;

use chrono::{DateTime, Local, NaiveDate, Utc};
use uuid::Uuid;
use vocab_core::calendar::to_calendar_date;

use crate::db::CloneCommit;
use crate::error::{Result, ServiceError};
use crate::models::*;
use crate::services::{require_learner, require_owned_set};
use crate::AppState;

/// List a learner's sets with due counts for `today`.
///
/// The stored sets come from the cache when fresh; summaries are always
/// rebuilt so a cached entry never reports yesterday's due counts.
pub async fn list_sets(
    state: &AppState,
    learner_id: Uuid,
    today: NaiveDate,
) -> Result<Vec<SetSummary>> {
    let sets = match state.cache.get(learner_id) {
        Some(sets) => sets,
        None => {
            let sets = state.db.get_sets_for_owner(learner_id).await?;
            state.cache.insert(learner_id, sets.clone());
            sets
        }
    };

    Ok(sets.iter().map(|s| s.to_summary(today)).collect())
}

/// Create a set whose items all start unreviewed.
pub async fn create_set(
    state: &AppState,
    learner_id: Uuid,
    request: CreateSetRequest,
    now: DateTime<Local>,
) -> Result<StoredSet> {
    require_title(&request.title)?;
    require_unique_items(&request.items)?;
    require_learner(state, learner_id).await?;

    let today = to_calendar_date(&now);
    let id = Uuid::new_v4();
    let set = VocabularySet {
        id: id.to_string(),
        owner_id: learner_id.to_string(),
        title: request.title,
        description: request.description,
        difficulty: request.difficulty,
        items: request
            .items
            .into_iter()
            .map(|i| {
                VocabularyItem::new(i.item_id, i.script, i.romanization, i.meaning, i.example, today)
            })
            .collect(),
        is_public: request.is_public,
        original_set_id: None,
    };

    let stored = state.db.insert_set(id, set, now.with_timezone(&Utc)).await?;
    state.cache.invalidate(learner_id);

    tracing::info!(%learner_id, set_id = %id, items = stored.set.items.len(), "Created set");
    Ok(stored)
}

/// Edit a set the learner owns.
///
/// Replacement items keep the review state of any existing item with the
/// same id; new ids start unreviewed. The write is versioned against
/// `request.set_version`, or the version read here when absent.
pub async fn update_set(
    state: &AppState,
    learner_id: Uuid,
    set_id: Uuid,
    request: UpdateSetRequest,
    now: DateTime<Local>,
) -> Result<StoredSet> {
    if let Some(title) = &request.title {
        require_title(title)?;
    }
    if let Some(items) = &request.items {
        require_unique_items(items)?;
    }

    let stored = require_owned_set(state, learner_id, set_id).await?;
    let expected_version = request.set_version.unwrap_or(stored.version);

    let mut set = stored.set.clone();
    if let Some(title) = request.title {
        set.title = title;
    }
    if let Some(description) = request.description {
        set.description = Some(description);
    }
    if let Some(difficulty) = request.difficulty {
        set.difficulty = difficulty;
    }
    if let Some(is_public) = request.is_public {
        set.is_public = is_public;
    }
    if let Some(items) = request.items {
        let today = to_calendar_date(&now);
        set.items = items
            .into_iter()
            .map(|item| merge_item(&stored.set, item, today))
            .collect();
    }

    let version = state.db.save_set(set_id, &set, expected_version).await?;
    state.cache.invalidate(learner_id);

    tracing::info!(%learner_id, %set_id, version, "Updated set");
    Ok(StoredSet {
        set,
        version,
        ..stored
    })
}

/// Delete a set the learner owns. Quiz history taken on it is kept.
pub async fn delete_set(state: &AppState, learner_id: Uuid, set_id: Uuid) -> Result<()> {
    let stored = require_owned_set(state, learner_id, set_id).await?;
    state.db.delete_set(set_id, stored.version).await?;
    state.cache.invalidate(learner_id);

    tracing::info!(%learner_id, %set_id, "Deleted set");
    Ok(())
}

/// Browse other learners' public sets, most cloned first.
///
/// A blank search term lists everything.
pub async fn public_sets(
    state: &AppState,
    learner_id: Uuid,
    search: Option<&str>,
) -> Result<Vec<PublicSetSummary>> {
    require_learner(state, learner_id).await?;
    let search = search.map(str::trim).filter(|term| !term.is_empty());
    state.db.public_sets(learner_id, search).await
}

/// Full content of a public set.
pub async fn public_set_details(state: &AppState, set_id: Uuid) -> Result<StoredSet> {
    state
        .db
        .get_set(set_id)
        .await?
        .filter(|s| s.set.is_public)
        .ok_or_else(|| ServiceError::NotFound("Public set not found".to_string()))
}

/// Copy a public set into the learner's collection with fresh review state.
pub async fn clone_set(
    state: &AppState,
    learner_id: Uuid,
    source_id: Uuid,
    now: DateTime<Local>,
) -> Result<StoredSet> {
    let source = public_set_details(state, source_id).await?;

    if source.is_owned_by(learner_id) {
        return Err(ServiceError::BadRequest(
            "You cannot clone your own set.".to_string(),
        ));
    }

    let learner = require_learner(state, learner_id).await?;
    if learner.cloned_sets.contains(&source_id) {
        return Err(ServiceError::BadRequest(
            "You have already added this set.".to_string(),
        ));
    }

    let id = Uuid::new_v4();
    let copy = source
        .set
        .clone_for(id.to_string(), learner_id.to_string(), to_calendar_date(&now));

    let stored = state
        .db
        .commit_clone(CloneCommit {
            learner_id,
            source_id,
            set_id: id,
            set: copy,
            created_at: now.with_timezone(&Utc),
        })
        .await?;
    state.cache.invalidate(learner_id);

    tracing::info!(%learner_id, %source_id, set_id = %id, "Cloned public set");
    Ok(stored)
}

/// Items of a set that are due for review, most overdue first.
pub async fn review_queue(
    state: &AppState,
    learner_id: Uuid,
    set_id: Uuid,
    today: NaiveDate,
) -> Result<Vec<VocabularyItem>> {
    let stored = require_owned_set(state, learner_id, set_id).await?;
    Ok(stored.set.due_items(today).into_iter().cloned().collect())
}

fn require_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(ServiceError::BadRequest("Title is required".to_string()));
    }
    Ok(())
}

fn require_unique_items(items: &[NewItem]) -> Result<()> {
    let mut seen = HashSet::new();
    match items.iter().find(|i| !seen.insert(i.item_id.as_str())) {
        Some(duplicate) => Err(ServiceError::BadRequest(format!(
            "Duplicate item id: {}",
            duplicate.item_id
        ))),
        None => Ok(()),
    }
}

/// New content for an item, keeping review state if the id already exists
fn merge_item(current: &VocabularySet, item: NewItem, today: NaiveDate) -> VocabularyItem {
    match current.item(&item.item_id) {
        Some(existing) => VocabularyItem {
            script: item.script,
            romanization: item.romanization,
            meaning: item.meaning,
            example: item.example,
            ..existing.clone()
        },
        None => VocabularyItem::new(
            item.item_id,
            item.script,
            item.romanization,
            item.meaning,
            item.example,
            today,
        ),
    }
}
