//! Per-learner set cache.
//!
//! Holds the stored sets behind a learner's listing, not the rendered
//! summaries, so due counts are always computed for the day asked about.
//! Entries expire after a fixed TTL. Anything that changes a learner's
//! sets must call [`SetCache::invalidate`] so the next listing reloads.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::models::StoredSet;

struct CachedListing {
    stored_at: Instant,
    sets: Vec<StoredSet>,
}

/// TTL cache of learners' sets keyed by learner.
pub struct SetCache {
    ttl: Duration,
    entries: Mutex<HashMap<Uuid, CachedListing>>,
}

impl SetCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cached sets, if present and not expired.
    pub fn get(&self, learner_id: Uuid) -> Option<Vec<StoredSet>> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(&learner_id) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.sets.clone()),
            Some(_) => {
                entries.remove(&learner_id);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, learner_id: Uuid, sets: Vec<StoredSet>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            learner_id,
            CachedListing {
                stored_at: Instant::now(),
                sets,
            },
        );
    }

    /// Drop a learner's cached sets.
    pub fn invalidate(&self, learner_id: Uuid) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.remove(&learner_id).is_some() {
            tracing::debug!(%learner_id, "invalidated set listing cache");
        }
    }
}
