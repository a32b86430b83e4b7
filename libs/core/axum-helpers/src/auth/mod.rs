//! Bearer token authentication.
//!
//! Tokens are verified either with a locally configured shared secret
//! (HS256) or against a hosted identity provider's JWKS (RS256). Either way
//! the result is an [`AuthUser`] carrying the opaque user id used for owner
//! scoping.
//!
//! ```ignore
//! use axum_helpers::auth::{AuthConfig, TokenVerifier, require_auth};
//! use core_config::FromEnv;
//!
//! let verifier = Arc::new(TokenVerifier::new(AuthConfig::from_env()?));
//! let protected = Router::new()
//!     .route("/me", get(me))
//!     .route_layer(axum::middleware::from_fn_with_state(verifier, require_auth));
//! ```

pub mod config;
pub mod jwt;
pub mod middleware;

pub use config::{AuthConfig, jwks_url_from_publishable_key};
pub use jwt::{AccessClaims, AuthError, TokenVerifier};
pub use middleware::{AuthUser, bearer_token, require_auth};
