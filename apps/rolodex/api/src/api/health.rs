//! Health endpoints backed by a real database round-trip.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use sea_orm::DatabaseConnection;
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: &'static str,
    pub db: &'static str,
}

/// `/` and `/health` always answer 200; the body carries the state.
/// `/ready` answers 503 while the database is unreachable.
pub fn router(db: DatabaseConnection) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .with_state(db)
}

async fn health_handler(State(db): State<DatabaseConnection>) -> Json<HealthStatus> {
    let status = match database::postgres::check_health(&db).await {
        Ok(()) => HealthStatus {
            status: "ok",
            db: "connected",
        },
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            HealthStatus {
                status: "error",
                db: "unavailable",
            }
        }
    };
    Json(status)
}

async fn ready_handler(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "database",
        Box::pin(async {
            database::postgres::check_health(&db)
                .await
                .map_err(|e| format!("Database ping failed: {}", e))
        }),
    )];
    run_health_checks(checks).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};
    use serde_json::Value;
    use tower::ServiceExt;

    fn failing_db() -> DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection refused".into())])
            .into_connection()
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_unavailable_database_with_200() {
        let (status, body) = get_json(router(failing_db()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "error");
        assert_eq!(body["db"], "unavailable");
    }

    #[tokio::test]
    async fn ready_is_503_without_database() {
        let (status, body) = get_json(router(failing_db()), "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "not ready");
        assert_eq!(body["database"], "disconnected");
    }
}
