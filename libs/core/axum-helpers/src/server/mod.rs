//! Server bootstrap: router assembly, health probes, graceful shutdown.
//!
//! ```ignore
//! let router = create_router::<ApiDoc>(api_routes, &config.cors_origins)?
//!     .merge(liveness_router(app_info!()));
//! serve(router, &config.server, async move { db.close().await.ok(); }).await?;
//! ```

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{create_router, serve};
pub use health::{HealthCheckFuture, LivenessResponse, liveness_router, run_health_checks};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
