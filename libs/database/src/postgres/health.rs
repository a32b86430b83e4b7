use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, Statement};
use std::time::{Duration, Instant};

/// Round-trip `SELECT 1`.
pub async fn check_health(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.query_one_raw(Statement::from_string(
        DatabaseBackend::Postgres,
        "SELECT 1".to_owned(),
    ))
    .await?;
    Ok(())
}

/// Like [`check_health`] but reports the round-trip latency.
pub async fn ping(db: &DatabaseConnection) -> Result<Duration, DbErr> {
    let start = Instant::now();
    check_health(db).await?;
    Ok(start.elapsed())
}
