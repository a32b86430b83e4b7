use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Filter preset. Every field is optional; unknown keys are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct SearchFilters {
    pub query: Option<String>,
    pub category: Option<String>,
    pub vendor: Option<String>,
    #[validate(range(min = 0.0))]
    pub price_min: Option<f64>,
    #[validate(range(min = 0.0))]
    pub price_max: Option<f64>,
    pub colour_hex: Option<String>,
    pub material: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateSavedSearch {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(nested)]
    pub filters: SearchFilters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SavedSearch {
    pub id: String,
    #[serde(skip_serializing)]
    pub owner_id: String,
    pub name: String,
    pub filters: SearchFilters,
    pub created_at: DateTime<Utc>,
}

impl SavedSearch {
    pub fn new(owner_id: impl Into<String>, input: CreateSavedSearch) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            name: input.name,
            filters: input.filters,
            created_at: Utc::now().trunc_subsecs(6),
        }
    }
}
