//! Storage abstraction trait
//!
//! All file-store backends must implement [`Storage`]. The orchestrator and
//! repository work against this trait and never touch paths directly.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// File-store abstraction.
///
/// **Key format:** keys are owner-scoped `media/{owner_id}/{filename}`;
/// see the crate root documentation.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload a file under the owner's prefix and return its storage key.
    async fn upload(
        &self,
        owner_id: Uuid,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<String>;

    /// Upload data to a specific storage key (used for derived artifacts
    /// whose keys are computed from their source key).
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Download a file by its storage key
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Delete a file by its storage key. Deleting a missing key is not an
    /// error.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Size in bytes of the object behind the key.
    async fn content_length(&self, storage_key: &str) -> StorageResult<u64>;

    /// Public URL for a stored object.
    fn url(&self, storage_key: &str) -> String;
}
