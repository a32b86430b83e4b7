//! # Axum Helpers
//!
//! Shared building blocks for the HTTP services in this workspace.
//!
//! - **[`auth`]**: bearer token verification (shared secret or JWKS) and the [`AuthUser`] extractor
//! - **[`server`]**: router assembly, health probes, graceful shutdown
//! - **[`http`]**: CORS, security headers, sliding-window rate limiting
//! - **[`errors`]**: the `{"error": {"code", "message"}}` envelope and error codes
//! - **[`extractors`]**: validated JSON bodies and query strings
//! - **[`audit`]**: audit events for state-changing operations

pub mod audit;
pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use auth::{AccessClaims, AuthConfig, AuthError, AuthUser, TokenVerifier, require_auth};

pub use server::{
    HealthCheckFuture, LivenessResponse, ShutdownCoordinator, create_router, liveness_router,
    run_health_checks, serve, shutdown_signal,
};

pub use http::{RateLimitConfig, RateLimiter, create_cors_layer, rate_limit, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{QueryParams, ValidatedJson};

pub use audit::{AuditEvent, AuditOutcome, extract_ip_from_headers, extract_user_agent};
