use super::config::AuthConfig;
use crate::errors::AppError;
use axum::response::{IntoResponse, Response};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
};
use serde::{Deserialize, Serialize};
use std::time::{Duration as StdDuration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

/// Minimum gap between two JWKS refreshes triggered by unknown key ids.
const JWKS_REFRESH_INTERVAL: StdDuration = StdDuration::from_secs(60);
const JWKS_FETCH_TIMEOUT: StdDuration = StdDuration::from_secs(10);

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing or invalid Authorization header")]
    MissingToken,

    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Authentication is not configured")]
    NotConfigured,

    #[error("JWT signing secret not configured")]
    SigningSecretMissing,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::Expired | AuthError::Invalid => {
                AppError::Unauthorized(err.to_string())
            }
            AuthError::NotConfigured | AuthError::SigningSecretMissing => {
                AppError::Configuration(err.to_string())
            }
            AuthError::Signing(msg) => AppError::Internal(msg),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

/// Claims read from incoming bearer tokens.
///
/// Only `sub` is required. `exp` is enforced when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

struct JwksCache {
    url: String,
    client: reqwest::Client,
    keys: RwLock<Option<(JwkSet, Instant)>>,
}

impl JwksCache {
    fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
            keys: RwLock::new(None),
        }
    }

    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        let response = self
            .client
            .get(&self.url)
            .timeout(JWKS_FETCH_TIMEOUT)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                tracing::warn!(url = %self.url, error = %e, "Failed to fetch JWKS");
                AuthError::Invalid
            })?;

        response.json::<JwkSet>().await.map_err(|e| {
            tracing::warn!(url = %self.url, error = %e, "Failed to parse JWKS");
            AuthError::Invalid
        })
    }

    /// Key for `kid`, refreshing the cached set once when the id is unknown.
    async fn decoding_key(&self, kid: Option<&str>) -> Result<DecodingKey, AuthError> {
        {
            let cached = self.keys.read().await;
            if let Some((set, _)) = cached.as_ref()
                && let Some(key) = select_key(set, kid)
            {
                return key;
            }
        }

        let mut cached = self.keys.write().await;
        let stale = cached
            .as_ref()
            .is_none_or(|(_, fetched_at)| fetched_at.elapsed() >= JWKS_REFRESH_INTERVAL);
        if stale {
            let set = self.fetch().await?;
            tracing::debug!(keys = set.keys.len(), "JWKS refreshed");
            *cached = Some((set, Instant::now()));
        }

        cached
            .as_ref()
            .and_then(|(set, _)| select_key(set, kid))
            .unwrap_or(Err(AuthError::Invalid))
    }
}

fn select_key(set: &JwkSet, kid: Option<&str>) -> Option<Result<DecodingKey, AuthError>> {
    let jwk = match kid {
        Some(kid) => set.find(kid),
        None => set.keys.first(),
    }?;
    Some(DecodingKey::from_jwk(jwk).map_err(|_| AuthError::Invalid))
}

/// Verifies bearer tokens and signs tokens with the shared secret.
pub struct TokenVerifier {
    config: AuthConfig,
    jwks: Option<JwksCache>,
}

impl TokenVerifier {
    pub fn new(config: AuthConfig) -> Self {
        let jwks = config.jwks_url.clone().map(JwksCache::new);
        if !config.is_configured() {
            tracing::warn!("No token verifier configured; authenticated routes will fail");
        }
        Self { config, jwks }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Verify a token and return its claims.
    ///
    /// HMAC tokens are checked with the shared secret, RSA tokens against
    /// the JWKS. Audience is not checked.
    pub async fn verify(&self, token: &str) -> Result<AccessClaims, AuthError> {
        if !self.config.is_configured() {
            return Err(AuthError::NotConfigured);
        }

        let header = decode_header(token).map_err(|_| AuthError::Invalid)?;

        let (key, algorithm) = match header.alg {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                let secret = self
                    .config
                    .shared_secret
                    .as_deref()
                    .ok_or(AuthError::Invalid)?;
                (DecodingKey::from_secret(secret.as_bytes()), header.alg)
            }
            Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512 => {
                let jwks = self.jwks.as_ref().ok_or(AuthError::Invalid)?;
                (jwks.decoding_key(header.kid.as_deref()).await?, header.alg)
            }
            _ => return Err(AuthError::Invalid),
        };

        let mut validation = Validation::new(algorithm);
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let claims = decode::<AccessClaims>(token, &key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => {
                    tracing::debug!(error = %e, "Token verification failed");
                    AuthError::Invalid
                }
            })?
            .claims;

        if claims.sub.trim().is_empty() {
            return Err(AuthError::Invalid);
        }
        Ok(claims)
    }

    /// Sign arbitrary claims with the shared secret (HS256).
    pub fn sign<C: Serialize>(&self, claims: &C) -> Result<String, AuthError> {
        let secret = self
            .config
            .shared_secret
            .as_deref()
            .ok_or(AuthError::SigningSecretMissing)?;

        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Issue an access token for a local account.
    pub fn issue(&self, user_id: &str, email: Option<&str>) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user_id.to_string(),
            email: email.map(str::to_string),
            iss: Some(self.config.issuer.clone()),
            iat: Some(now.timestamp()),
            exp: Some((now + Duration::seconds(self.config.access_token_ttl_secs)).timestamp()),
        };
        self.sign(&claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret-with-more-than-32-chars";

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(AuthConfig::with_secret(SECRET))
    }

    #[tokio::test]
    async fn test_issued_token_verifies() {
        let verifier = verifier();
        let token = verifier.issue("user_123", Some("a@rolodex.test")).unwrap();

        let claims = verifier.verify(&token).await.unwrap();
        assert_eq!(claims.sub, "user_123");
        assert_eq!(claims.iss.as_deref(), Some("rolodex"));
    }

    #[tokio::test]
    async fn test_token_without_exp_is_accepted() {
        let verifier = verifier();
        let token = verifier
            .sign(&serde_json::json!({ "sub": "user_456" }))
            .unwrap();
        assert_eq!(verifier.verify(&token).await.unwrap().sub, "user_456");
    }

    #[tokio::test]
    async fn test_expired_token_is_reported_as_expired() {
        let verifier = verifier();
        let expired = Utc::now().timestamp() - 3_600;
        let token = verifier
            .sign(&serde_json::json!({ "sub": "user_123", "exp": expired }))
            .unwrap();

        let err = verifier.verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::Expired));
        assert_eq!(err.to_string(), "Token expired");
    }

    #[tokio::test]
    async fn test_wrong_secret_is_invalid() {
        let other = TokenVerifier::new(AuthConfig::with_secret("another-secret-also-32-chars-long!!"));
        let token = other.issue("user_123", None).unwrap();

        let err = verifier().verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::Invalid));
    }

    #[tokio::test]
    async fn test_empty_subject_is_invalid() {
        let verifier = verifier();
        let token = verifier.sign(&serde_json::json!({ "sub": "" })).unwrap();
        assert!(matches!(
            verifier.verify(&token).await.unwrap_err(),
            AuthError::Invalid
        ));
    }

    #[tokio::test]
    async fn test_garbage_token_is_invalid() {
        assert!(matches!(
            verifier().verify("not-a-jwt").await.unwrap_err(),
            AuthError::Invalid
        ));
    }

    #[tokio::test]
    async fn test_unconfigured_verifier() {
        let verifier = TokenVerifier::new(AuthConfig::default());
        assert!(matches!(
            verifier.verify("anything").await.unwrap_err(),
            AuthError::NotConfigured
        ));
        assert!(matches!(
            verifier.issue("user", None).unwrap_err(),
            AuthError::SigningSecretMissing
        ));
    }

    #[test]
    fn test_auth_error_maps_to_app_error() {
        use axum::http::StatusCode;

        assert_eq!(
            AppError::from(AuthError::Expired).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(AuthError::SigningSecretMissing).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
