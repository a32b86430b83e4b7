use sea_orm::ConnectOptions;
use std::time::Duration;
use tracing::log::LevelFilter;

/// Connection pool settings.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
    pub sqlx_logging: bool,
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_pool_size(mut self, min: u32, max: u32) -> Self {
        self.min_connections = min;
        self.max_connections = max.max(min);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn into_connect_options(self) -> ConnectOptions {
        let mut opt = ConnectOptions::new(self.url);
        opt.max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(self.connect_timeout)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
            .sqlx_logging(self.sqlx_logging)
            .sqlx_logging_level(LevelFilter::Debug);
        opt
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 15,
            min_connections: 1,
            connect_timeout: Duration::from_secs(10),
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
            sqlx_logging: false,
        }
    }
}

#[cfg(feature = "config")]
impl core_config::FromEnv for PostgresConfig {
    fn from_env() -> Result<Self, core_config::ConfigError> {
        use core_config::{ConfigError, env_first, env_flag, env_parse};

        let url = env_first(&["DATABASE_URL", "SUPABASE_DB_URL"])
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;
        let defaults = Self::default();
        let secs = |key: &str, fallback: Duration| -> Result<Duration, ConfigError> {
            env_parse::<u64>(key, fallback.as_secs()).map(Duration::from_secs)
        };

        let min_connections = env_parse("DB_MIN_CONNECTIONS", defaults.min_connections)?;
        let max_connections = env_parse("DB_MAX_CONNECTIONS", defaults.max_connections)?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            connect_timeout: secs("DB_CONNECT_TIMEOUT_SECS", defaults.connect_timeout)?,
            acquire_timeout: secs("DB_ACQUIRE_TIMEOUT_SECS", defaults.acquire_timeout)?,
            idle_timeout: secs("DB_IDLE_TIMEOUT_SECS", defaults.idle_timeout)?,
            max_lifetime: secs("DB_MAX_LIFETIME_SECS", defaults.max_lifetime)?,
            sqlx_logging: env_flag("DB_SQLX_LOGGING", false),
        }
        .with_pool_size(min_connections, max_connections))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_size_never_inverts() {
        let config = PostgresConfig::new("postgres://localhost/rolodex").with_pool_size(8, 2);
        assert_eq!(config.min_connections, 8);
        assert_eq!(config.max_connections, 8);
    }

    #[test]
    fn into_connect_options_keeps_url() {
        let options = PostgresConfig::new("postgres://localhost/rolodex").into_connect_options();
        assert_eq!(options.get_url(), "postgres://localhost/rolodex");
    }

    #[cfg(feature = "config")]
    mod from_env {
        use super::*;
        use core_config::{ConfigError, FromEnv};

        #[test]
        fn prefers_database_url() {
            temp_env::with_vars(
                [
                    ("DATABASE_URL", Some("postgres://primary/db")),
                    ("SUPABASE_DB_URL", Some("postgres://supabase/db")),
                ],
                || {
                    let config = PostgresConfig::from_env().unwrap();
                    assert_eq!(config.url(), "postgres://primary/db");
                },
            );
        }

        #[test]
        fn falls_back_to_supabase_url() {
            temp_env::with_vars(
                [
                    ("DATABASE_URL", None),
                    ("SUPABASE_DB_URL", Some("postgres://supabase/db")),
                    ("DB_MAX_CONNECTIONS", Some("4")),
                    ("DB_CONNECT_TIMEOUT_SECS", Some("3")),
                ],
                || {
                    let config = PostgresConfig::from_env().unwrap();
                    assert_eq!(config.url(), "postgres://supabase/db");
                    assert_eq!(config.max_connections, 4);
                    assert_eq!(config.connect_timeout, Duration::from_secs(3));
                },
            );
        }

        #[test]
        fn missing_url_is_an_error() {
            temp_env::with_vars_unset(["DATABASE_URL", "SUPABASE_DB_URL"], || {
                let err = PostgresConfig::from_env().unwrap_err();
                assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "DATABASE_URL"));
            });
        }

        #[test]
        fn rejects_non_numeric_pool_size() {
            temp_env::with_vars(
                [
                    ("DATABASE_URL", Some("postgres://primary/db")),
                    ("DB_MAX_CONNECTIONS", Some("lots")),
                ],
                || {
                    let err = PostgresConfig::from_env().unwrap_err();
                    assert!(matches!(err, ConfigError::ParseError { .. }));
                },
            );
        }
    }
}
