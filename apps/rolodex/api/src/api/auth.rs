use axum::Router;
use domain_users::{PgUserRepository, UserService, handlers};
use std::sync::Arc;

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository = PgUserRepository::new(state.db.clone());
    let service = UserService::new(Arc::new(repository), Arc::clone(&state.verifier));
    handlers::router(service, Arc::clone(&state.verifier))
}
