use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_items::ItemError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Project not found: {0}")]
    NotFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error(transparent)]
    Items(#[from] ItemError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProjectResult<T> = Result<T, ProjectError>;

/// Convert ProjectError to AppError for standardized error responses
impl From<ProjectError> for AppError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::NotFound(_) => AppError::NotFound("Project not found".to_string()),
            ProjectError::ItemNotFound(_) => AppError::NotFound("Item not found".to_string()),
            ProjectError::NoFieldsToUpdate => AppError::BadRequest(err.to_string()),
            ProjectError::Database(e) => AppError::Database(e),
            ProjectError::Items(e) => e.into(),
            ProjectError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl IntoResponse for ProjectError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
