//! In-memory entity store
//!
//! Holds serialized documents instead of files. Writes to selected
//! collections can be made to fail.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use crate::domain::repository::{Collection, CollectionName, Counters, EntityStore, Snapshot};
use crate::error::{LmsError, LmsResult};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    initial: Snapshot,
    saved: Mutex<HashMap<CollectionName, serde_json::Value>>,
    failing: Mutex<HashSet<CollectionName>>,
    save_count: Mutex<usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the seeded catalog, as a fresh data directory would
    pub fn seeded() -> Self {
        Self::with_snapshot(Snapshot {
            courses: crate::domain::Course::default_catalog(chrono::Utc::now()),
            counters: Counters::default(),
            ..Default::default()
        })
    }

    pub fn with_snapshot(initial: Snapshot) -> Self {
        Self {
            initial,
            ..Default::default()
        }
    }

    /// Make every later save of `name` fail
    pub fn fail_writes(&self, name: CollectionName) {
        self.failing.lock().insert(name);
    }

    pub fn heal(&self) {
        self.failing.lock().clear();
    }

    /// Last document saved for `name`, if any
    pub fn saved(&self, name: CollectionName) -> Option<serde_json::Value> {
        self.saved.lock().get(&name).cloned()
    }

    pub fn save_count(&self) -> usize {
        *self.save_count.lock()
    }
}

impl EntityStore for InMemoryStore {
    async fn load(&self) -> LmsResult<Snapshot> {
        Ok(self.initial.clone())
    }

    async fn save(&self, collection: Collection<'_>) -> LmsResult<()> {
        let name = collection.name();
        if self.failing.lock().contains(&name) {
            return Err(LmsError::Persistence(format!("simulated write failure: {name}")));
        }

        let bytes = collection
            .to_json_pretty()
            .map_err(|e| LmsError::Internal(e.to_string()))?;
        let value = serde_json::from_slice(&bytes).map_err(|e| LmsError::Internal(e.to_string()))?;

        self.saved.lock().insert(name, value);
        *self.save_count.lock() += 1;
        Ok(())
    }
}
