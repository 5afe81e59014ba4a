use async_trait::async_trait;
use uuid::Uuid;

use vidmill_core::{AppError, VideoRecord};

/// Document store for video records.
///
/// Records are updated as whole documents: callers mutate a [`VideoRecord`]
/// and hand it back to [`VideoStore::update`]. The store is responsible for
/// persistence only; ownership checks and file cleanup live in the
/// orchestrator.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Insert a freshly created record.
    async fn insert(&self, record: &VideoRecord) -> Result<(), AppError>;

    /// Fetch a record by id.
    async fn get(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError>;

    /// All records belonging to an owner, newest upload first.
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<VideoRecord>, AppError>;

    /// Persist the record's current state (whole-document update).
    async fn update(&self, record: &VideoRecord) -> Result<(), AppError>;

    /// Remove a record. Removing a missing id is not an error.
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}
