//! JSON-file entity store
//!
//! One pretty-printed document per collection under a data directory:
//! `users.json`, `courses.json`, `enrollments.json`, `assignments.json`,
//! `counters.json`. Writes go to a temp file that is renamed over the target.

use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;

use crate::domain::entity::course::Course;
use crate::domain::repository::{Collection, CollectionName, EntityStore, Snapshot};
use crate::error::{LmsError, LmsResult};

/// Outcome of reading one document
enum Document<T> {
    Loaded(T),
    Missing,
    Unreadable,
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, name: CollectionName) -> PathBuf {
        self.dir.join(format!("{}.json", name.as_str()))
    }

    async fn read<T: DeserializeOwned>(&self, name: CollectionName) -> Document<T> {
        let path = self.path_of(name);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Document::Missing,
            Err(e) => {
                tracing::warn!(collection = %name, error = %e, "Failed to read collection, using default");
                return Document::Unreadable;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Document::Loaded(value),
            Err(e) => {
                tracing::warn!(collection = %name, error = %e, "Corrupt collection document, using default");
                Document::Unreadable
            }
        }
    }

    async fn read_or_default<T: DeserializeOwned + Default>(&self, name: CollectionName) -> T {
        match self.read(name).await {
            Document::Loaded(value) => value,
            Document::Missing | Document::Unreadable => T::default(),
        }
    }

    async fn write(&self, name: CollectionName, bytes: &[u8]) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_of(name);
        let tmp = self.dir.join(format!(".{}.json.tmp", name.as_str()));

        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await
    }
}

impl EntityStore for JsonFileStore {
    async fn load(&self) -> LmsResult<Snapshot> {
        let users = self.read_or_default(CollectionName::Users).await;

        let courses = match self.read(CollectionName::Courses).await {
            Document::Loaded(courses) => courses,
            Document::Unreadable => Vec::new(),
            Document::Missing => {
                let seeded = Course::default_catalog(Utc::now());
                match self.save(Collection::Courses(&seeded)).await {
                    Ok(()) => tracing::info!(count = seeded.len(), "Seeded default course catalog"),
                    Err(e) => tracing::error!(error = %e, "Failed to persist seeded course catalog"),
                }
                seeded
            }
        };

        let snapshot = Snapshot {
            users,
            courses,
            enrollments: self.read_or_default(CollectionName::Enrollments).await,
            assignments: self.read_or_default(CollectionName::Assignments).await,
            counters: self.read_or_default(CollectionName::Counters).await,
        };

        tracing::info!(
            users = snapshot.users.len(),
            courses = snapshot.courses.len(),
            enrollments = snapshot.enrollments.len(),
            assignments = snapshot.assignments.len(),
            dir = %self.dir.display(),
            "Loaded LMS data"
        );

        Ok(snapshot)
    }

    async fn save(&self, collection: Collection<'_>) -> LmsResult<()> {
        let name = collection.name();
        let bytes = collection
            .to_json_pretty()
            .map_err(|e| LmsError::Internal(format!("Failed to serialize {name}: {e}")))?;

        self.write(name, &bytes).await.map_err(|e| {
            LmsError::Persistence(format!("{}: {e}", self.path_of(name).display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::Counters;

    #[tokio::test]
    async fn test_first_load_seeds_courses() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        let snapshot = store.load().await.unwrap();
        assert!(snapshot.users.is_empty());
        assert_eq!(snapshot.courses.len(), 4);
        assert_eq!(snapshot.counters, Counters::default());

        // Seed was written back
        assert!(store.path_of(CollectionName::Courses).exists());
        assert!(!store.path_of(CollectionName::Users).exists());
    }

    #[tokio::test]
    async fn test_save_then_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested"));

        let mut snapshot = store.load().await.unwrap();
        snapshot.courses.truncate(1);
        snapshot.counters.next_user_id = 42;
        store.save(Collection::Courses(&snapshot.courses)).await.unwrap();
        store.save(Collection::Counters(&snapshot.counters)).await.unwrap();

        let reloaded = JsonFileStore::new(dir.path().join("nested")).load().await.unwrap();
        assert_eq!(reloaded.courses, snapshot.courses);
        assert_eq!(reloaded.counters.next_user_id, 42);
    }

    #[tokio::test]
    async fn test_corrupt_document_degrades_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        std::fs::write(store.path_of(CollectionName::Users), b"{not json").unwrap();
        std::fs::write(store.path_of(CollectionName::Courses), b"[").unwrap();

        let snapshot = store.load().await.unwrap();
        assert!(snapshot.users.is_empty());
        // An unreadable catalog is not replaced by the seed
        assert!(snapshot.courses.is_empty());
    }

    #[tokio::test]
    async fn test_legacy_user_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        std::fs::write(
            store.path_of(CollectionName::Users),
            br#"[{"id":1,"name":"Ann","email":"ann@x.com","password":"$2b$10$x","role":"student","createdAt":"2024-05-01T10:00:00.000Z"}]"#,
        )
        .unwrap();

        let snapshot = store.load().await.unwrap();
        assert_eq!(snapshot.users.len(), 1);
        assert_eq!(snapshot.users[0].password_hash.as_phc_string(), "$2b$10$x");
        assert!(snapshot.users[0].created_at.is_some());
    }

    #[tokio::test]
    async fn test_write_failure_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the data directory should be
        let blocker = dir.path().join("data");
        std::fs::write(&blocker, b"").unwrap();
        let store = JsonFileStore::new(&blocker);

        let result = store.save(Collection::Counters(&Counters::default())).await;
        assert!(matches!(result, Err(LmsError::Persistence(_))));
    }
}
