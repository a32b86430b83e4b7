//! Users Domain
//!
//! Local email/password accounts. Registration and login hand back an
//! HS256 access token that the rest of the API accepts through
//! [`axum_helpers::require_auth`].

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{AuthResponse, ExtensionStatus, LoginRequest, RegisterRequest, User, UserProfile};
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
