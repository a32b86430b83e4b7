use axum::Router;
use domain_searches::{PgSavedSearchRepository, SavedSearchService, handlers};
use std::sync::Arc;

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository = PgSavedSearchRepository::new(state.db.clone());
    handlers::router(SavedSearchService::new(Arc::new(repository)))
}
