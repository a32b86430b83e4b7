use axum_helpers::{create_router, liveness_router, serve};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_projects::PgProjectRepository;
use tracing::{info, warn};

mod api;
mod config;
mod openapi;
mod seed;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Before any fallible start-up work
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    database::postgres::run_migrations::<migration::Migrator>(&db, config.app.name)
        .await
        .map_err(|e| eyre::eyre!("Database migration failed: {}", e))?;

    let state = AppState::new(config, db).await?;

    if state.config.demo.enabled {
        let projects = PgProjectRepository::new(state.db.clone());
        if let Err(e) =
            seed::seed_demo(state.items.as_ref(), &projects, &state.config.demo.owner_id).await
        {
            warn!(error = %e, "Demo seeding failed");
        }
    }

    let api_routes = api::routes(&state)?;
    let router = create_router::<openapi::ApiDoc>(api_routes, &state.config.cors_origins)?;

    // `/`, `/health`, `/ready` and `/live` sit outside `/api`
    let app = router
        .merge(api::health::router(state.db.clone()))
        .merge(liveness_router(state.config.app));

    info!(
        environment = state.config.environment.as_str(),
        "Starting Rolodex API"
    );

    let db = state.db.clone();
    serve(app, &state.config.server, async move {
        info!("Shutting down: closing database connections");
        match db.close().await {
            Ok(()) => info!("PostgreSQL connection closed successfully"),
            Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Rolodex API shutdown complete");
    Ok(())
}
