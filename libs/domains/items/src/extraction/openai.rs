use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument};

use super::postprocess::{normalize, parse_model_output};
use super::prompt::{build_context, extraction_prompt};
use super::{ExtractedProduct, ExtractionError, ExtractionInput, VisionExtractor};
use crate::fetch::{self, FetchError, MAX_IMAGE_BYTES};
use crate::openai::{OpenAIConfig, describe_api_error};

const USER_AGENT: &str = "Rolodex-AI-Extractor/1.0 (Furniture Product Analysis)";
const MAX_TOKENS: u32 = 1000;
const TEMPERATURE: f32 = 0.1;

/// Chat-completions vision client. Images are downloaded and inlined as a
/// base64 data URL so the model never has to reach the retailer itself.
pub struct OpenAIVisionExtractor {
    client: Client,
    api_key: String,
    url: String,
    model: String,
}

impl OpenAIVisionExtractor {
    /// `None` when no API key is configured.
    pub fn from_config(config: &OpenAIConfig) -> Result<Option<Self>, ExtractionError> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };
        let client = Client::builder()
            .timeout(config.vision_timeout)
            .build()
            .map_err(|e| ExtractionError::Api(format!("Failed to build HTTP client: {e}")))?;
        Ok(Some(Self {
            client,
            api_key,
            url: config.endpoint("chat/completions"),
            model: config.vision_model.clone(),
        }))
    }

    async fn image_data_url(&self, image_url: &str) -> Result<String, ExtractionError> {
        let downloaded = fetch::download(
            &self.client,
            image_url,
            Some(USER_AGENT),
            MAX_IMAGE_BYTES,
            fetch::is_vision_format,
        )
        .await
        .map_err(|e| match e {
            FetchError::UnsupportedType(content_type) => {
                ExtractionError::UnsupportedFormat(content_type)
            }
            FetchError::TooLarge(_) => ExtractionError::TooLarge,
            FetchError::Request(err) => ExtractionError::Fetch(err.to_string()),
        })?;

        debug!(bytes = downloaded.bytes.len(), content_type = %downloaded.content_type, "Downloaded image");
        Ok(format!(
            "data:image/jpeg;base64,{}",
            STANDARD.encode(&downloaded.bytes)
        ))
    }

    fn request_body(&self, prompt: &str, data_url: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": prompt },
                    { "type": "image_url", "image_url": { "url": data_url, "detail": "high" } }
                ]
            }],
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
        })
    }
}

/// Scheme and host are required.
fn validate_image_url(image_url: &str) -> Result<(), ExtractionError> {
    match Url::parse(image_url) {
        Ok(url) if url.has_host() && matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ExtractionError::InvalidUrl(image_url.to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize, Serialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl VisionExtractor for OpenAIVisionExtractor {
    #[instrument(skip(self, input), fields(image_url = %input.image_url))]
    async fn extract(&self, input: &ExtractionInput) -> Result<ExtractedProduct, ExtractionError> {
        validate_image_url(&input.image_url)?;
        let data_url = self.image_data_url(&input.image_url).await?;

        let context = build_context(input.source_url.as_deref(), input.page_title.as_deref());
        let prompt = extraction_prompt(&context);

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(&prompt, &data_url))
            .send()
            .await
            .map_err(|e| ExtractionError::Api(format!("OpenAI request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Api(describe_api_error(status, &body)));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::Parse(e.to_string()))?;
        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ExtractionError::EmptyResponse)?;

        let product = normalize(parse_model_output(&reply)?);
        info!(title = %product.title, "Extracted product metadata");
        Ok(product)
    }
}
