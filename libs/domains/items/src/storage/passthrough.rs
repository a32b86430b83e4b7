use async_trait::async_trait;

use super::{ImageStore, StorageError};

/// Used when object storage is not configured: items keep the source URL.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughImageStore;

#[async_trait]
impl ImageStore for PassthroughImageStore {
    async fn store(&self, source_url: &str, _owner_id: &str) -> Result<String, StorageError> {
        Ok(source_url.to_string())
    }
}
