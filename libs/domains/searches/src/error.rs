use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Saved search not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Stored filters are unreadable: {0}")]
    CorruptFilters(#[from] serde_json::Error),
}

pub type SearchResult<T> = Result<T, SearchError>;

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::NotFound(_) => AppError::NotFound("Saved search not found".to_string()),
            SearchError::Database(e) => AppError::Database(e),
            SearchError::CorruptFilters(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
