use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ItemError {
    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("{0}")]
    Validation(String),

    #[error("AI extraction failed: {0}")]
    Extraction(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ItemResult<T> = Result<T, ItemError>;

impl From<ItemError> for AppError {
    fn from(err: ItemError) -> Self {
        match err {
            ItemError::NotFound(_) => AppError::NotFound("Item not found".to_string()),
            ItemError::NoFieldsToUpdate => AppError::BadRequest(err.to_string()),
            ItemError::Validation(msg) => AppError::Validation(msg),
            ItemError::Extraction(_) => AppError::Validation(err.to_string()),
            ItemError::Database(e) => AppError::Database(e),
            ItemError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl IntoResponse for ItemError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
