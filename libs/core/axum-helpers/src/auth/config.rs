use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use core_config::{ConfigError, FromEnv, env_first, env_optional, env_or_default, env_parse};

/// Token verification and issuance settings.
///
/// Loaded from:
/// - `SUPABASE_JWT_SECRET` or `JWT_SECRET` - shared HS256 secret (optional)
/// - `CLERK_JWKS_URL` - JWKS endpoint for RS256 tokens (optional)
/// - `CLERK_PUBLISHABLE_KEY` - used to derive the JWKS URL when it is not set
/// - `JWT_ISSUER` (default `rolodex`)
/// - `ACCESS_TOKEN_TTL_SECS` (default one day)
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub shared_secret: Option<String>,
    pub jwks_url: Option<String>,
    pub issuer: String,
    pub access_token_ttl_secs: i64,
}

impl AuthConfig {
    /// HS256-only configuration.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            shared_secret: Some(secret.into()),
            ..Self::default()
        }
    }

    pub fn is_configured(&self) -> bool {
        self.shared_secret.is_some() || self.jwks_url.is_some()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            shared_secret: None,
            jwks_url: None,
            issuer: "rolodex".to_string(),
            access_token_ttl_secs: 86_400,
        }
    }
}

impl FromEnv for AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let shared_secret = env_first(&["SUPABASE_JWT_SECRET", "JWT_SECRET"]);
        if let Some(secret) = &shared_secret
            && secret.len() < 32
        {
            tracing::warn!(
                length = secret.len(),
                "JWT secret is shorter than 32 characters"
            );
        }

        let jwks_url = env_optional("CLERK_JWKS_URL").or_else(|| {
            env_optional("CLERK_PUBLISHABLE_KEY")
                .and_then(|key| jwks_url_from_publishable_key(&key))
        });

        Ok(Self {
            shared_secret,
            jwks_url,
            issuer: env_or_default("JWT_ISSUER", "rolodex"),
            access_token_ttl_secs: env_parse("ACCESS_TOKEN_TTL_SECS", 86_400)?,
        })
    }
}

/// Derive `https://{domain}/.well-known/jwks.json` from a publishable key of
/// the form `pk_test_<base64(domain$)>` or `pk_live_<...>`.
pub fn jwks_url_from_publishable_key(key: &str) -> Option<String> {
    let encoded = key
        .strip_prefix("pk_test_")
        .or_else(|| key.strip_prefix("pk_live_"))?;
    let decoded = STANDARD_NO_PAD.decode(encoded.trim_end_matches('=')).ok()?;
    let domain = String::from_utf8(decoded).ok()?;
    let domain = domain.trim_end_matches('$');

    if domain.is_empty() {
        return None;
    }
    Some(format!("https://{}/.well-known/jwks.json", domain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwks_url_from_publishable_key() {
        assert_eq!(
            jwks_url_from_publishable_key("pk_test_Y2xlcmsucm9sb2RleC50ZXN0JA=="),
            Some("https://clerk.rolodex.test/.well-known/jwks.json".to_string())
        );
        assert_eq!(
            jwks_url_from_publishable_key("pk_live_Y2xlcmsucm9sb2RleC50ZXN0JA"),
            Some("https://clerk.rolodex.test/.well-known/jwks.json".to_string())
        );
    }

    #[test]
    fn test_jwks_url_rejects_unknown_prefix_and_garbage() {
        assert_eq!(jwks_url_from_publishable_key("sk_test_abc"), None);
        assert_eq!(jwks_url_from_publishable_key("pk_test_!!!"), None);
    }

    #[test]
    fn test_from_env_prefers_supabase_secret() {
        temp_env::with_vars(
            [
                ("SUPABASE_JWT_SECRET", Some("supabase-secret")),
                ("JWT_SECRET", Some("local-secret")),
                ("CLERK_JWKS_URL", None),
                ("CLERK_PUBLISHABLE_KEY", None),
            ],
            || {
                let config = AuthConfig::from_env().unwrap();
                assert_eq!(config.shared_secret.as_deref(), Some("supabase-secret"));
                assert_eq!(config.jwks_url, None);
                assert!(config.is_configured());
            },
        );
    }

    #[test]
    fn test_from_env_derives_jwks_url() {
        temp_env::with_vars(
            [
                ("SUPABASE_JWT_SECRET", None),
                ("JWT_SECRET", None),
                ("CLERK_JWKS_URL", None),
                ("CLERK_PUBLISHABLE_KEY", Some("pk_test_Y2xlcmsucm9sb2RleC50ZXN0JA==")),
            ],
            || {
                let config = AuthConfig::from_env().unwrap();
                assert_eq!(config.shared_secret, None);
                assert_eq!(
                    config.jwks_url.as_deref(),
                    Some("https://clerk.rolodex.test/.well-known/jwks.json")
                );
            },
        );
    }

    #[test]
    fn test_from_env_unconfigured() {
        temp_env::with_vars(
            [
                ("SUPABASE_JWT_SECRET", None::<&str>),
                ("JWT_SECRET", None),
                ("CLERK_JWKS_URL", None),
                ("CLERK_PUBLISHABLE_KEY", None),
            ],
            || {
                let config = AuthConfig::from_env().unwrap();
                assert!(!config.is_configured());
                assert_eq!(config.issuer, "rolodex");
            },
        );
    }
}
