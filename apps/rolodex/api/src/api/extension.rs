//! Signed deep links from the browser extension into the capture workspace.

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::post,
};
use axum_helpers::{
    AppError, AuditEvent, AuditOutcome, AuthError, AuthUser, TokenVerifier, ValidatedJson,
    errors::responses::{ConfigurationErrorResponse, UnauthorizedResponse, ValidationErrorResponse},
};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};
use validator::Validate;

use crate::config::{CaptureConfig, CaptureEnvironment};

const TOKEN_TTL_MINUTES: i64 = 5;
const TOKEN_ISSUER: &str = "rolodex-extension";

#[derive(OpenApi)]
#[openapi(
    paths(create_deeplink),
    components(
        schemas(DeepLinkRequest, DeepLinkResponse, CaptureEnvironment),
        responses(UnauthorizedResponse, ValidationErrorResponse, ConfigurationErrorResponse)
    ),
    tags(
        (name = "Extension", description = "Browser extension handshake")
    )
)]
pub struct ExtensionApiDoc;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct DeepLinkRequest {
    /// Image selected on the page
    #[validate(url)]
    #[schema(example = "https://cdn.example.com/image.jpg")]
    pub image: String,
    /// Product or page URL
    #[validate(url)]
    pub source: Option<String>,
    /// Tab title
    #[validate(length(max = 500))]
    pub title: Option<String>,
    pub environment: Option<CaptureEnvironment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeepLinkResponse {
    pub capture_url: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CaptureClaims {
    sub: String,
    image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    exp: i64,
    iss: String,
}

pub struct ExtensionState {
    pub verifier: Arc<TokenVerifier>,
    pub capture: CaptureConfig,
}

pub fn router(verifier: Arc<TokenVerifier>, capture: CaptureConfig) -> Router {
    Router::new()
        .route("/deeplink", post(create_deeplink))
        .with_state(Arc::new(ExtensionState { verifier, capture }))
}

/// Sign a short-lived capture token and build the workspace URL around it.
fn build_deeplink(
    state: &ExtensionState,
    user_id: &str,
    input: DeepLinkRequest,
    now: DateTime<Utc>,
) -> Result<DeepLinkResponse, AuthError> {
    let expires_at = now.trunc_subsecs(0) + Duration::minutes(TOKEN_TTL_MINUTES);
    let claims = CaptureClaims {
        sub: user_id.to_string(),
        image: input.image,
        source: input.source,
        title: input.title.filter(|title| !title.trim().is_empty()),
        exp: expires_at.timestamp(),
        iss: TOKEN_ISSUER.to_string(),
    };
    let token = state.verifier.sign(&claims)?;

    let base = state
        .capture
        .base_url(input.environment.unwrap_or_default());
    let query = [
        ("image", Some(claims.image.as_str())),
        ("source", claims.source.as_deref()),
        ("title", claims.title.as_deref()),
        ("token", Some(token.as_str())),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.map(|v| format!("{key}={}", urlencoding::encode(v))))
    .collect::<Vec<_>>()
    .join("&");

    Ok(DeepLinkResponse {
        capture_url: format!("{base}/capture?{query}"),
        expires_at,
    })
}

/// Create a signed capture deep link
#[utoipa::path(
    post,
    path = "/deeplink",
    tag = "Extension",
    request_body = DeepLinkRequest,
    responses(
        (status = 200, description = "Deep link created", body = DeepLinkResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = ConfigurationErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn create_deeplink(
    State(state): State<Arc<ExtensionState>>,
    auth: AuthUser,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<DeepLinkRequest>,
) -> Result<Json<DeepLinkResponse>, AppError> {
    let response = build_deeplink(&state, &auth.user_id, input, Utc::now())?;

    AuditEvent::new("extension.deeplink", AuditOutcome::Success)
        .user(&auth.user_id)
        .from_headers(&headers)
        .log();

    Ok(Json(response))
}
