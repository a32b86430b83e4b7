use chrono::{DateTime, SubsecRound, Utc};
use domain_items::Item;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::ToSchema;
use validator::Validate;

static HAS_VISIBLE_CHAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S").unwrap());

/// Rejects names made only of whitespace
fn validate_project_name(name: &str) -> Result<(), validator::ValidationError> {
    if !HAS_VISIBLE_CHAR.is_match(name) {
        return Err(validator::ValidationError::new("blank_project_name"));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Project {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub budget: Option<f64>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    pub fn new(owner_id: impl Into<String>, input: CreateProject) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            name: input.name.trim().to_string(),
            budget: input.budget,
            description: input.description,
            created_at: Utc::now().trunc_subsecs(6),
            updated_at: None,
        }
    }

    pub fn apply_update(&mut self, update: UpdateProject) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(budget) = update.budget {
            self.budget = Some(budget);
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        self.updated_at = Some(Utc::now().trunc_subsecs(6));
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateProject {
    #[validate(
        length(min = 1, max = 120, message = "Name must be 1-120 characters"),
        custom(function = "validate_project_name")
    )]
    pub name: String,
    #[validate(range(min = 0.0, message = "Budget cannot be negative"))]
    pub budget: Option<f64>,
    pub description: Option<String>,
}

/// Partial update; absent and `null` fields are left alone.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateProject {
    #[validate(
        length(min = 1, max = 120, message = "Name must be 1-120 characters"),
        custom(function = "validate_project_name")
    )]
    pub name: Option<String>,
    #[validate(range(min = 0.0, message = "Budget cannot be negative"))]
    pub budget: Option<f64>,
    pub description: Option<String>,
}

impl UpdateProject {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.budget.is_none() && self.description.is_none()
    }
}

/// `add_item` / `remove_item` body
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct ItemLink {
    #[validate(length(min = 1, message = "item_id is required"))]
    pub item_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProjectCreated {
    pub id: String,
    pub name: String,
}

impl From<&Project> for ProjectCreated {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            name: project.name.clone(),
        }
    }
}

/// List row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub item_count: u64,
}

/// PATCH response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProjectView {
    pub id: String,
    pub name: String,
    pub budget: Option<f64>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Project> for ProjectView {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            budget: project.budget,
            description: project.description,
            created_at: project.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectDetail {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub budget: Option<f64>,
    pub description: Option<String>,
    pub items: Vec<Item>,
}

impl ProjectDetail {
    pub fn new(project: Project, items: Vec<Item>) -> Self {
        Self {
            id: project.id,
            name: project.name,
            created_at: project.created_at,
            budget: project.budget,
            description: project.description,
            items,
        }
    }
}
