use crate::{LocalStorage, Storage, StorageResult};
use std::sync::Arc;
use vidmill_core::StorageConfig;

/// Create a storage backend based on configuration.
///
/// Only the local filesystem backend exists today; the [`Storage`] trait is
/// the seam for adding object-store backends.
pub async fn create_storage(config: &StorageConfig) -> StorageResult<Arc<dyn Storage>> {
    let storage = LocalStorage::new(config.root.clone(), config.base_url.clone()).await?;
    Ok(Arc::new(storage))
}
