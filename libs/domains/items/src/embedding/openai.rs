use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EmbeddingError, EmbeddingProvider};
use crate::openai::{OpenAIConfig, describe_api_error};

/// `POST {base_url}/embeddings` client.
pub struct OpenAIEmbeddings {
    client: Client,
    api_key: String,
    url: String,
    model: String,
}

impl OpenAIEmbeddings {
    /// `None` when no API key is configured.
    pub fn from_config(config: &OpenAIConfig) -> Result<Option<Self>, EmbeddingError> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };
        let client = Client::builder().timeout(config.embedding_timeout).build()?;
        Ok(Some(Self {
            client,
            api_key,
            url: config.endpoint("embeddings"),
            model: config.embedding_model.clone(),
        }))
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    encoding_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(EmbeddingError::Empty);
        }

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: text,
                encoding_format: "float",
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api(describe_api_error(status, &body)));
        }

        let parsed: EmbeddingResponse = response.json().await?;
        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|e| !e.is_empty())
            .ok_or(EmbeddingError::Empty)?;

        debug!(dimensions = embedding.len(), "Generated embedding");
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_without_api_key() {
        let provider = OpenAIEmbeddings::from_config(&OpenAIConfig::default()).unwrap();
        assert!(provider.is_none());
    }

    #[test]
    fn request_shape() {
        let body = serde_json::to_value(EmbeddingRequest {
            model: "text-embedding-3-small",
            input: "Product: Lamp",
            encoding_format: "float",
        })
        .unwrap();
        assert_eq!(body["model"], "text-embedding-3-small");
        assert_eq!(body["input"], "Product: Lamp");
        assert_eq!(body["encoding_format"], "float");
    }

    #[tokio::test]
    async fn blank_text_is_rejected_locally() {
        let provider = OpenAIEmbeddings::from_config(&OpenAIConfig::new("sk-test"))
            .unwrap()
            .unwrap();
        assert!(matches!(provider.embed("   ").await, Err(EmbeddingError::Empty)));
    }
}
