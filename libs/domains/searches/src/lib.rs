//! Saved Searches Domain
//!
//! Named filter presets a user can re-run against their catalog. The
//! filters are stored as given; running them is up to the client.

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{SearchError, SearchResult};
pub use handlers::ApiDoc;
pub use models::{CreateSavedSearch, SavedSearch, SearchFilters};
pub use postgres::PgSavedSearchRepository;
pub use repository::{InMemorySavedSearchRepository, SavedSearchRepository};
pub use service::SavedSearchService;
