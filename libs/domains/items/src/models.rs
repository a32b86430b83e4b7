use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::extraction::ExtractedProduct;

/// A captured product owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Item {
    pub id: String,
    pub owner_id: String,
    pub img_url: String,
    pub title: Option<String>,
    pub vendor: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub colour_hex: Option<String>,
    pub category: Option<String>,
    pub material: Option<String>,
    pub src_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Item {
    /// New item from a create request; `img_url` is the stored copy.
    pub fn new(owner_id: impl Into<String>, input: CreateItem, img_url: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            img_url,
            title: input.title,
            vendor: input.vendor,
            price: input.price,
            currency: input.currency,
            description: input.description,
            colour_hex: input.colour_hex,
            category: input.category,
            material: input.material,
            src_url: input.src_url,
            tags: input.tags,
            notes: input.notes,
            // Postgres keeps microseconds; cursors must round-trip exactly.
            created_at: Utc::now().trunc_subsecs(6),
            updated_at: None,
        }
    }

    pub fn apply_update(&mut self, update: UpdateItem) {
        macro_rules! assign {
            ($($field:ident),*) => {
                $(if let Some(value) = update.$field { self.$field = Some(value); })*
            };
        }
        assign!(
            title,
            vendor,
            price,
            currency,
            description,
            colour_hex,
            category,
            material,
            src_url,
            tags,
            notes
        );
        self.updated_at = Some(Utc::now());
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateItem {
    #[validate(url(message = "img_url must be a valid URL"))]
    #[schema(example = "https://images.example.com/sofa.jpg")]
    pub img_url: String,
    #[validate(length(max = 500))]
    pub title: Option<String>,
    #[validate(length(max = 255))]
    pub vendor: Option<String>,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: Option<f64>,
    #[validate(length(max = 8))]
    pub currency: Option<String>,
    pub description: Option<String>,
    #[validate(length(max = 7))]
    #[schema(example = "#E9E4DC")]
    pub colour_hex: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[validate(length(max = 100))]
    pub material: Option<String>,
    pub src_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
}

/// Partial update. Absent (or `null`) fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateItem {
    #[validate(length(max = 500))]
    pub title: Option<String>,
    #[validate(length(max = 255))]
    pub vendor: Option<String>,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: Option<f64>,
    #[validate(length(max = 8))]
    pub currency: Option<String>,
    pub description: Option<String>,
    #[validate(length(max = 7))]
    pub colour_hex: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[validate(length(max = 100))]
    pub material: Option<String>,
    pub src_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
}

impl UpdateItem {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.vendor.is_none()
            && self.price.is_none()
            && self.currency.is_none()
            && self.description.is_none()
            && self.colour_hex.is_none()
            && self.category.is_none()
            && self.material.is_none()
            && self.src_url.is_none()
            && self.tags.is_none()
            && self.notes.is_none()
    }

    /// Whether the change affects the text the embedding is computed from.
    pub fn touches_embedding(&self) -> bool {
        self.title.is_some()
            || self.vendor.is_some()
            || self.price.is_some()
            || self.currency.is_some()
            || self.description.is_some()
            || self.colour_hex.is_some()
            || self.category.is_some()
            || self.material.is_some()
    }
}

/// `GET /api/items` query string.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListItemsQuery {
    /// Free text matched against title, vendor, description and category
    pub query: Option<String>,
    /// Colour hex substring, e.g. `e9e4`
    pub hex: Option<String>,
    pub price_max: Option<f64>,
    pub category: Option<String>,
    pub vendor: Option<String>,
    /// Page size, clamped to 1..=100 (default 20)
    pub limit: Option<i64>,
    /// `nextCursor` from the previous page
    pub cursor: Option<String>,
    /// Rank by embedding similarity instead of recency
    #[serde(default)]
    pub semantic: bool,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SimilarQuery {
    pub limit: Option<i64>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SearchMode {
    /// Structured filters ordered by recency
    Text,
    /// Embedding similarity
    Semantic,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemPage {
    pub items: Vec<Item>,
    #[serde(rename = "nextCursor")]
    pub next_cursor: Option<String>,
    #[serde(rename = "search_type")]
    pub mode: SearchMode,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct BatchDelete {
    #[validate(length(min = 1, max = 500, message = "ids must contain 1 to 500 entries"))]
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BatchDeleteResult {
    pub deleted: u64,
}

/// `POST /api/items/extract` body. `image_url` is accepted for older clients.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ExtractRequest {
    #[serde(rename = "imageUrl")]
    #[validate(url(message = "imageUrl must be a valid URL"))]
    pub image_url: Option<String>,
    #[serde(rename = "image_url")]
    #[validate(url(message = "image_url must be a valid URL"))]
    pub legacy_image_url: Option<String>,
    #[serde(rename = "sourceUrl")]
    #[validate(url(message = "sourceUrl must be a valid URL"))]
    pub source_url: Option<String>,
    pub title: Option<String>,
    pub raw_text: Option<String>,
}

impl ExtractRequest {
    pub fn image(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .or(self.legacy_image_url.as_deref())
            .filter(|url| !url.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExtractionResponse {
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
    pub img_url: String,
    pub src_url: Option<String>,
    pub embedding_preview: Option<String>,
}

impl ExtractionResponse {
    pub fn new(product: ExtractedProduct, img_url: String, src_url: Option<String>) -> Self {
        Self {
            title: product.title,
            vendor: product.vendor,
            price: product.price,
            currency: product.currency,
            description: product.description,
            colour_hex: product.colour_hex,
            category: product.category,
            material: product.material,
            dimensions: product.dimensions,
            features: product.features,
            img_url,
            src_url,
            embedding_preview: None,
        }
    }
}
