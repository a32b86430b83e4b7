use axum::{Router, middleware};
use axum_helpers::{rate_limit, require_auth};
use std::sync::Arc;

pub mod auth;
pub mod extension;
pub mod health;
pub mod items;
pub mod projects;
pub mod searches;

use crate::state::AppState;

/// API routes without the `/api` prefix; `create_router` adds it.
///
/// Everything except register/login requires a bearer token. Mutating
/// requests share one rate limiter.
pub fn routes(state: &AppState) -> eyre::Result<Router> {
    let protected = Router::new()
        .nest("/items", items::router(state)?)
        .nest("/projects", projects::router(state))
        .nest("/searches", searches::router(state))
        .nest(
            "/extension",
            extension::router(Arc::clone(&state.verifier), state.config.capture.clone()),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.verifier),
            require_auth,
        ));

    Ok(Router::new()
        .nest("/auth", auth::router(state))
        .merge(protected)
        .layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit,
        )))
}
