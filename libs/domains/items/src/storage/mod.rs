//! Durable copies of captured product images.

mod passthrough;
mod supabase;

pub use passthrough::PassthroughImageStore;
pub use supabase::{SupabaseImageStore, SupabaseStorageConfig};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to download image: {0}")]
    Download(String),

    #[error("URL does not point to an image: {0}")]
    NotAnImage(String),

    #[error("Image too large: {0} bytes")]
    TooLarge(usize),

    #[error("Storage upload failed: {0}")]
    Upload(String),
}

/// Copies an image into object storage and returns its public URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn store(&self, source_url: &str, owner_id: &str) -> Result<String, StorageError>;
}

/// `{owner}/{sha256(url)[..12]}_{random[..8]}.jpg`
pub fn object_path(source_url: &str, owner_id: &str) -> String {
    let digest = const_hex::encode(Sha256::digest(source_url.as_bytes()));
    let unique = uuid::Uuid::new_v4().simple().to_string();
    format!("{owner_id}/{}_{}.jpg", &digest[..12], &unique[..8])
}
