use thiserror::Error;

pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Database health check failed: {0}")]
    HealthCheckFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Invalid database configuration: {0}")]
    Config(String),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    Postgres(#[from] sea_orm::DbErr),
}

impl DatabaseError {
    /// Transient failures are worth retrying at startup.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionFailed(_) | Self::HealthCheckFailed(_) => true,
            #[cfg(feature = "postgres")]
            Self::Postgres(err) => matches!(
                err,
                sea_orm::DbErr::Conn(_) | sea_orm::DbErr::ConnectionAcquire(_)
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_errors_are_retryable() {
        assert!(DatabaseError::ConnectionFailed("refused".into()).is_retryable());
        assert!(!DatabaseError::Config("bad url".into()).is_retryable());
        assert!(!DatabaseError::MigrationFailed("boom".into()).is_retryable());
    }

    #[test]
    fn display_includes_context() {
        let err = DatabaseError::Config("DATABASE_URL is empty".into());
        assert_eq!(
            err.to_string(),
            "Invalid database configuration: DATABASE_URL is empty"
        );
    }
}
