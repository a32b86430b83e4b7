use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_optional, env_or_default};
use reqwest::Client;
use std::time::Duration;
use tracing::{info, instrument};

use super::{ImageStore, StorageError, object_path};
use crate::fetch::{self, FetchError, MAX_IMAGE_BYTES};

/// - `SUPABASE_PROJECT_URL`, `SUPABASE_SERVICE_ROLE_KEY` (both required to enable uploads)
/// - `SUPABASE_STORAGE_BUCKET` (default `product-images`)
#[derive(Debug, Clone)]
pub struct SupabaseStorageConfig {
    pub project_url: Option<String>,
    pub service_role_key: Option<String>,
    pub bucket: String,
    pub download_timeout: Duration,
}

impl SupabaseStorageConfig {
    pub fn new(project_url: impl Into<String>, service_role_key: impl Into<String>) -> Self {
        Self {
            project_url: Some(project_url.into().trim_end_matches('/').to_string()),
            service_role_key: Some(service_role_key.into()),
            ..Self::default()
        }
    }

    pub fn is_configured(&self) -> bool {
        self.project_url.is_some() && self.service_role_key.is_some()
    }
}

impl Default for SupabaseStorageConfig {
    fn default() -> Self {
        Self {
            project_url: None,
            service_role_key: None,
            bucket: "product-images".to_string(),
            download_timeout: Duration::from_secs(30),
        }
    }
}

impl FromEnv for SupabaseStorageConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            project_url: env_optional("SUPABASE_PROJECT_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            service_role_key: env_optional("SUPABASE_SERVICE_ROLE_KEY"),
            bucket: env_or_default("SUPABASE_STORAGE_BUCKET", "product-images"),
            ..Self::default()
        })
    }
}

/// Downloads the source image and re-uploads it to a Supabase Storage bucket.
pub struct SupabaseImageStore {
    client: Client,
    project_url: String,
    service_role_key: String,
    bucket: String,
}

impl SupabaseImageStore {
    /// `None` unless both the project URL and the service role key are set.
    pub fn from_config(config: &SupabaseStorageConfig) -> Result<Option<Self>, StorageError> {
        let (Some(project_url), Some(service_role_key)) =
            (config.project_url.clone(), config.service_role_key.clone())
        else {
            return Ok(None);
        };
        let client = Client::builder()
            .timeout(config.download_timeout)
            .build()
            .map_err(|e| StorageError::Upload(e.to_string()))?;
        Ok(Some(Self {
            client,
            project_url,
            service_role_key,
            bucket: config.bucket.clone(),
        }))
    }

    pub fn upload_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.project_url, self.bucket, path
        )
    }

    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.project_url, self.bucket, path
        )
    }

    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        let response = self
            .client
            .post(self.upload_url(path))
            .bearer_auth(&self.service_role_key)
            .header("apikey", &self.service_role_key)
            .header("content-type", content_type)
            .header("cache-control", "max-age=3600")
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Upload(format!("{status}: {body}")));
        }
        Ok(())
    }
}

#[async_trait]
impl ImageStore for SupabaseImageStore {
    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn store(&self, source_url: &str, owner_id: &str) -> Result<String, StorageError> {
        let image = fetch::download(&self.client, source_url, None, MAX_IMAGE_BYTES, fetch::is_image)
            .await
            .map_err(|err| match err {
                FetchError::UnsupportedType(ct) => StorageError::NotAnImage(ct),
                FetchError::TooLarge(n) => StorageError::TooLarge(n),
                FetchError::Request(e) => StorageError::Download(e.to_string()),
            })?;

        let path = object_path(source_url, owner_id);
        self.upload(&path, image.bytes, &image.content_type).await?;

        let public_url = self.public_url(&path);
        info!(%public_url, "Stored image");
        Ok(public_url)
    }
}
