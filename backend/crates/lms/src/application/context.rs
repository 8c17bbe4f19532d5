//! Data Context
//!
//! Owns the authoritative in-memory snapshot and funnels every mutation
//! through one write path:
//!
//! 1. the mutation runs against a draft copy under the write lock
//! 2. each collection that differs from the current state is saved
//! 3. the draft replaces the current state only if every save succeeded
//!
//! When a save fails, collections already written for the same mutation are
//! restored on disk (best effort) and the caller gets a persistence error.

use tokio::sync::RwLock;

use crate::domain::repository::{CollectionName, EntityStore, Snapshot};
use crate::error::{LmsError, LmsResult};

pub struct DataContext<S> {
    store: S,
    state: RwLock<Snapshot>,
}

impl<S> DataContext<S>
where
    S: EntityStore + Sync,
{
    /// Load every collection and reconcile the counters
    pub async fn load(store: S) -> LmsResult<Self> {
        let mut snapshot = store.load().await?;

        if snapshot.reconcile_counters() {
            tracing::warn!(counters = ?snapshot.counters, "Counters were behind stored ids, raised");
            if let Err(e) = store.save(snapshot.collection(CollectionName::Counters)).await {
                tracing::error!(error = %e, "Failed to persist reconciled counters");
            }
        }

        Ok(Self {
            store,
            state: RwLock::new(snapshot),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run a read-only query against the current state
    pub async fn read<T>(&self, query: impl FnOnce(&Snapshot) -> T + Send) -> T {
        let state = self.state.read().await;
        query(&state)
    }

    /// Apply `change` as one logical transaction
    pub async fn mutate<T: Send>(
        &self,
        change: impl FnOnce(&mut Snapshot) -> LmsResult<T> + Send,
    ) -> LmsResult<T> {
        let mut state = self.state.write().await;

        let mut draft = state.clone();
        let output = change(&mut draft)?;

        let changed = draft.changed_since(&state);
        let mut written = Vec::with_capacity(changed.len());

        for name in changed {
            if let Err(e) = self.store.save(draft.collection(name)).await {
                tracing::error!(collection = %name, error = %e, "Write failed, rolling back");
                self.roll_back(&state, &written).await;
                return Err(match e {
                    LmsError::Persistence(_) => e,
                    other => LmsError::Persistence(other.to_string()),
                });
            }
            written.push(name);
        }

        *state = draft;
        Ok(output)
    }

    async fn roll_back(&self, previous: &Snapshot, written: &[CollectionName]) {
        for name in written.iter().rev() {
            if let Err(e) = self.store.save(previous.collection(*name)).await {
                tracing::error!(
                    collection = %name,
                    error = %e,
                    "Rollback failed, disk diverges from memory until the next successful write"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::Counters;
    use crate::infra::memory::InMemoryStore;

    #[tokio::test]
    async fn test_mutation_commits_and_persists_changed_collections() {
        let context = DataContext::load(InMemoryStore::seeded()).await.unwrap();

        let id = context
            .mutate(|data| {
                data.courses.pop();
                Ok(data.counters.allocate_course_id())
            })
            .await
            .unwrap();

        assert_eq!(id.value(), 5);
        assert_eq!(context.read(|data| data.courses.len()).await, 3);

        let store = context.store();
        assert_eq!(store.saved(CollectionName::Courses).unwrap().as_array().unwrap().len(), 3);
        assert_eq!(store.saved(CollectionName::Counters).unwrap()["nextCourseId"], 6);
        assert!(store.saved(CollectionName::Users).is_none());
    }

    #[tokio::test]
    async fn test_failed_change_writes_nothing() {
        let context = DataContext::load(InMemoryStore::seeded()).await.unwrap();

        let result: LmsResult<()> = context
            .mutate(|data| {
                data.courses.clear();
                Err(LmsError::CourseNotFound)
            })
            .await;

        assert!(matches!(result, Err(LmsError::CourseNotFound)));
        assert_eq!(context.read(|data| data.courses.len()).await, 4);
        assert_eq!(context.store().save_count(), 0);
    }

    #[tokio::test]
    async fn test_write_failure_rolls_back() {
        let context = DataContext::load(InMemoryStore::seeded()).await.unwrap();
        context.store().fail_writes(CollectionName::Counters);

        let result = context
            .mutate(|data| {
                data.courses.pop();
                data.counters.allocate_course_id();
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(LmsError::Persistence(_))));
        // Memory untouched
        assert_eq!(context.read(|data| data.courses.len()).await, 4);
        assert_eq!(context.read(|data| data.counters).await, Counters::default());
        // Courses were written, then restored
        let courses = context.store().saved(CollectionName::Courses).unwrap();
        assert_eq!(courses.as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_load_reconciles_counters() {
        let mut snapshot = Snapshot {
            courses: crate::domain::Course::default_catalog(chrono::Utc::now()),
            ..Default::default()
        };
        snapshot.counters.next_course_id = 2;

        let context = DataContext::load(InMemoryStore::with_snapshot(snapshot)).await.unwrap();
        assert_eq!(context.read(|data| data.counters.next_course_id).await, 5);
        assert_eq!(
            context.store().saved(CollectionName::Counters).unwrap()["nextCourseId"],
            5
        );
    }
}
