//! Structured product metadata from an image, via a vision-language model.

mod demo;
mod openai;
mod postprocess;
mod prompt;

pub use demo::demo_product;
pub use openai::OpenAIVisionExtractor;
pub use postprocess::{RawProduct, normalize, parse_model_output};
pub use prompt::{build_context, extraction_prompt};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExtractedProduct {
    pub title: String,
    pub vendor: Option<String>,
    pub price: Option<f64>,
    pub currency: String,
    pub description: Option<String>,
    pub colour_hex: Option<String>,
    pub category: Option<String>,
    pub material: Option<String>,
    pub dimensions: Option<String>,
    pub features: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Invalid image URL format: {0}")]
    InvalidUrl(String),

    #[error("Failed to fetch image: {0}")]
    Fetch(String),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Image too large (>10MB)")]
    TooLarge,

    #[error("{0}")]
    Api(String),

    #[error("Empty response from OpenAI API")]
    EmptyResponse,

    #[error("Failed to parse AI response: {0}")]
    Parse(String),
}

/// Inputs for one extraction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionInput {
    pub image_url: String,
    pub source_url: Option<String>,
    pub page_title: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisionExtractor: Send + Sync {
    async fn extract(&self, input: &ExtractionInput) -> Result<ExtractedProduct, ExtractionError>;
}
