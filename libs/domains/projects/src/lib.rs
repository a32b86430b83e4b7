//! Projects Domain
//!
//! Named, owner-scoped collections of items (mood boards).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← ownership checks, detail assembly
//! └──────┬──────┘
//!        │
//! ┌──────▼──────────────────────────┐
//! │ ProjectRepository · ItemRepository │
//! └─────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_items::InMemoryItemRepository;
//! use domain_projects::{InMemoryProjectRepository, ProjectService, handlers};
//!
//! let items = Arc::new(InMemoryItemRepository::new());
//! let service = ProjectService::new(Arc::new(InMemoryProjectRepository::new()), items);
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{ProjectError, ProjectResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateProject, ItemLink, Project, ProjectCreated, ProjectDetail, ProjectSummary, ProjectView,
    UpdateProject,
};
pub use postgres::PgProjectRepository;
pub use repository::{InMemoryProjectRepository, ProjectRepository};
pub use service::ProjectService;
