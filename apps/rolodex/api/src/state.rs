//! Shared application state handed to the route builders.

use axum_helpers::{RateLimiter, TokenVerifier};
use domain_items::PgItemRepository;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// PostgreSQL connection pool
    pub db: DatabaseConnection,
    pub verifier: Arc<TokenVerifier>,
    pub rate_limiter: RateLimiter,
    /// Shared by the items and projects routes
    pub items: Arc<PgItemRepository>,
}

impl AppState {
    /// Probes the database for pgvector once, up front.
    pub async fn new(config: Config, db: DatabaseConnection) -> eyre::Result<Self> {
        let items = PgItemRepository::detect(db.clone()).await?;
        if !items.vector_enabled() {
            tracing::warn!("pgvector not available; embeddings stored as JSON");
        }

        Ok(Self {
            verifier: Arc::new(TokenVerifier::new(config.auth.clone())),
            rate_limiter: RateLimiter::new(config.rate_limit.clone()),
            config: Arc::new(config),
            db,
            items: Arc::new(items),
        })
    }
}
