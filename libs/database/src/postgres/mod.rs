//! PostgreSQL connection management, health probes, and pgvector helpers.

mod config;
mod connector;
mod health;
mod vector;

pub use config::PostgresConfig;
pub use connector::{connect_from_config, connect_from_config_with_retry, run_migrations};
pub use health::{check_health, ping};
pub use vector::{EMBEDDING_DIMENSIONS, format_vector_literal, has_vector_extension, parse_vector_literal};

pub use sea_orm::{ConnectOptions, DatabaseConnection, DbErr};
pub use sea_orm_migration::MigratorTrait;
