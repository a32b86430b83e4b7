use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    AuditEvent, AuditOutcome, AuthUser, TokenVerifier, ValidatedJson, require_auth,
    errors::responses::{
        ConfigurationErrorResponse, ConflictResponse, InternalServerErrorResponse,
        NotFoundResponse, UnauthorizedResponse, ValidationErrorResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{UserError, UserResult};
use crate::models::{AuthResponse, ExtensionStatus, LoginRequest, RegisterRequest, UserProfile};
use crate::repository::UserRepository;
use crate::service::UserService;

#[derive(OpenApi)]
#[openapi(
    paths(register, login, me, extension_status),
    components(
        schemas(RegisterRequest, LoginRequest, AuthResponse, UserProfile, ExtensionStatus),
        responses(
            ConflictResponse,
            NotFoundResponse,
            UnauthorizedResponse,
            ValidationErrorResponse,
            ConfigurationErrorResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Auth", description = "Local accounts and token checks")
    )
)]
pub struct ApiDoc;

/// Register and login are public. The profile routes sit behind the
/// bearer check.
pub fn router<R: UserRepository + 'static>(
    service: UserService<R>,
    verifier: Arc<TokenVerifier>,
) -> Router {
    let protected = Router::new()
        .route("/me", get(me::<R>))
        .route("/extension/status", get(extension_status::<R>))
        .route_layer(middleware::from_fn_with_state(verifier, require_auth));

    Router::new()
        .route("/register", post(register::<R>))
        .route("/login", post(login::<R>))
        .merge(protected)
        .with_state(Arc::new(service))
}

/// Create an account and receive an access token
#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 409, response = ConflictResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = ConfigurationErrorResponse)
    )
)]
async fn register<R: UserRepository + 'static>(
    State(service): State<Arc<UserService<R>>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> UserResult<impl IntoResponse> {
    let response = service.register(input).await?;

    AuditEvent::new("user.register", AuditOutcome::Success)
        .user(&response.user.id)
        .from_headers(&headers)
        .log();

    Ok((StatusCode::CREATED, Json(response)))
}

/// Exchange email and password for an access token
#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 422, response = ValidationErrorResponse)
    )
)]
async fn login<R: UserRepository + 'static>(
    State(service): State<Arc<UserService<R>>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<Json<AuthResponse>> {
    match service.login(input).await {
        Ok(response) => {
            AuditEvent::new("user.login", AuditOutcome::Success)
                .user(&response.user.id)
                .from_headers(&headers)
                .log();
            Ok(Json(response))
        }
        Err(err @ UserError::InvalidCredentials) => {
            AuditEvent::new("user.login", AuditOutcome::Denied)
                .from_headers(&headers)
                .log();
            Err(err)
        }
        Err(err) => Err(err),
    }
}

/// Profile of the authenticated user
#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn me<R: UserRepository + 'static>(
    State(service): State<Arc<UserService<R>>>,
    auth: AuthUser,
) -> UserResult<Json<UserProfile>> {
    Ok(Json(service.profile(&auth.user_id).await?))
}

/// Lets the browser extension confirm its token is still accepted
#[utoipa::path(
    get,
    path = "/extension/status",
    tag = "Auth",
    responses(
        (status = 200, description = "Token accepted", body = ExtensionStatus),
        (status = 401, response = UnauthorizedResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn extension_status<R: UserRepository + 'static>(
    State(service): State<Arc<UserService<R>>>,
    auth: AuthUser,
) -> UserResult<Json<ExtensionStatus>> {
    Ok(Json(service.extension_status(&auth.user_id).await?))
}
