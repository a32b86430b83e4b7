use axum::Router;
use domain_projects::{PgProjectRepository, ProjectService, handlers};
use std::sync::Arc;

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository = PgProjectRepository::new(state.db.clone());
    let service = ProjectService::new(Arc::new(repository), Arc::clone(&state.items));
    handlers::router(service)
}
