//! In-memory video store for tests and embedded use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use vidmill_core::{AppError, VideoRecord};

use crate::store::VideoStore;

/// Video store backed by a process-local map. Cloning shares the state.
#[derive(Clone, Default)]
pub struct InMemoryVideoStore {
    records: Arc<Mutex<HashMap<Uuid, VideoRecord>>>,
}

impl InMemoryVideoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records (test convenience).
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl VideoStore for InMemoryVideoStore {
    async fn insert(&self, record: &VideoRecord) -> Result<(), AppError> {
        self.records
            .lock()
            .unwrap()
            .insert(record.id, record.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        Ok(self.records.lock().unwrap().get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<VideoRecord>, AppError> {
        let mut records: Vec<VideoRecord> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(records)
    }

    async fn update(&self, record: &VideoRecord) -> Result<(), AppError> {
        let mut records = self.records.lock().unwrap();
        let mut updated = record.clone();
        updated.updated_at = chrono::Utc::now();
        records.insert(record.id, updated);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.records.lock().unwrap().remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidmill_core::{ProcessingStatus, VideoMetadata};

    fn test_record(owner_id: Uuid) -> VideoRecord {
        VideoRecord::new(
            owner_id,
            "a.mp4".to_string(),
            "a.mp4".to_string(),
            format!("media/{}/a.mp4", owner_id),
            "video/mp4".to_string(),
            1024,
            VideoMetadata {
                format: "mp4".to_string(),
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_insert_get_delete() {
        let store = InMemoryVideoStore::new();
        let record = test_record(Uuid::new_v4());

        store.insert(&record).await.unwrap();
        let fetched = store.get(record.id).await.unwrap().unwrap();
        assert_eq!(fetched.filename, "a.mp4");

        store.delete(record.id).await.unwrap();
        assert!(store.get(record.id).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_list_by_owner_filters_and_sorts() {
        let store = InMemoryVideoStore::new();
        let owner = Uuid::new_v4();

        let mut older = test_record(owner);
        older.uploaded_at -= chrono::Duration::hours(1);
        let newer = test_record(owner);
        let other = test_record(Uuid::new_v4());

        store.insert(&older).await.unwrap();
        store.insert(&newer).await.unwrap();
        store.insert(&other).await.unwrap();

        let records = store.list_by_owner(owner).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, newer.id);
        assert_eq!(records[1].id, older.id);
    }

    #[tokio::test]
    async fn test_update_persists_mutations() {
        let store = InMemoryVideoStore::new();
        let mut record = test_record(Uuid::new_v4());
        store.insert(&record).await.unwrap();

        record.status = ProcessingStatus::Failed;
        record.error = Some("boom".to_string());
        store.update(&record).await.unwrap();

        let fetched = store.get(record.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, ProcessingStatus::Failed);
        assert_eq!(fetched.error.as_deref(), Some("boom"));
        assert!(fetched.updated_at >= record.updated_at);
    }
}
