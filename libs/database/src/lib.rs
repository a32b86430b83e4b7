//! Database connectivity for the Rolodex backend.
//!
//! Wraps SeaORM's connection pool with environment driven configuration,
//! startup retry, migration running, and a few pgvector helpers.
//!
//! ```ignore
//! use database::postgres::{PostgresConfig, connect_from_config_with_retry, run_migrations};
//! use database::common::RetryConfig;
//!
//! let config = PostgresConfig::from_env()?;
//! let db = connect_from_config_with_retry(config, Some(RetryConfig::default())).await?;
//! run_migrations::<migration::Migrator>(&db, "rolodex").await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult, RetryConfig};
