use axum_helpers::{AuthConfig, RateLimitConfig};
use core_config::{
    AppInfo, ConfigError, FromEnv, app_info, env_flag, env_list, env_optional, env_or_default,
    server::ServerConfig,
};
use database::postgres::PostgresConfig;
use domain_items::{OpenAIConfig, SupabaseStorageConfig};
use serde::Deserialize;
use utoipa::ToSchema;

pub use core_config::Environment;

const DEFAULT_CAPTURE_BASE_URL: &str = "https://app.rolodex.app";
const DEFAULT_CAPTURE_STAGING_BASE_URL: &str = "https://staging.rolodex.app";
const DEFAULT_CAPTURE_DEVELOPMENT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_DEMO_USER_ID: &str = "00000000-0000-0000-0000-demo00000000";

/// Which capture workspace a deep link should open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CaptureEnvironment {
    #[default]
    Production,
    Staging,
    Development,
}

/// Base URLs of the capture workspace.
///
/// - `ROLODEX_CAPTURE_BASE_URL` (default `https://app.rolodex.app`)
/// - `ROLODEX_CAPTURE_STAGING_BASE_URL` (default `https://staging.rolodex.app`)
/// - `ROLODEX_CAPTURE_DEVELOPMENT_BASE_URL` (default `http://localhost:3000`)
#[derive(Clone, Debug)]
pub struct CaptureConfig {
    pub production: String,
    pub staging: Option<String>,
    pub development: String,
}

impl CaptureConfig {
    /// Staging falls back to production. Trailing slashes are dropped.
    pub fn base_url(&self, environment: CaptureEnvironment) -> &str {
        let base = match environment {
            CaptureEnvironment::Production => &self.production,
            CaptureEnvironment::Staging => self.staging.as_ref().unwrap_or(&self.production),
            CaptureEnvironment::Development => &self.development,
        };
        base.trim_end_matches('/')
    }

    /// Capture hosts double as the default CORS allow-list.
    pub fn origins(&self) -> Vec<String> {
        let mut origins = vec![
            self.development.trim_end_matches('/').to_string(),
            self.production.trim_end_matches('/').to_string(),
        ];
        if let Some(staging) = &self.staging {
            origins.push(staging.trim_end_matches('/').to_string());
        }
        origins
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            production: DEFAULT_CAPTURE_BASE_URL.to_string(),
            staging: Some(DEFAULT_CAPTURE_STAGING_BASE_URL.to_string()),
            development: DEFAULT_CAPTURE_DEVELOPMENT_BASE_URL.to_string(),
        }
    }
}

impl FromEnv for CaptureConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            production: env_or_default("ROLODEX_CAPTURE_BASE_URL", DEFAULT_CAPTURE_BASE_URL),
            staging: env_optional("ROLODEX_CAPTURE_STAGING_BASE_URL")
                .or_else(|| Some(DEFAULT_CAPTURE_STAGING_BASE_URL.to_string())),
            development: env_or_default(
                "ROLODEX_CAPTURE_DEVELOPMENT_BASE_URL",
                DEFAULT_CAPTURE_DEVELOPMENT_BASE_URL,
            ),
        })
    }
}

/// - `ROLODEX_SEED_DEMO` (default off)
/// - `ROLODEX_DEMO_USER_ID`
#[derive(Clone, Debug)]
pub struct DemoConfig {
    pub enabled: bool,
    pub owner_id: String,
}

impl FromEnv for DemoConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            enabled: env_flag("ROLODEX_SEED_DEMO", false),
            owner_id: env_or_default("ROLODEX_DEMO_USER_ID", DEFAULT_DEMO_USER_ID),
        })
    }
}

/// Application configuration composed from the shared config pieces.
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: PostgresConfig,
    pub auth: AuthConfig,
    pub openai: OpenAIConfig,
    pub storage: SupabaseStorageConfig,
    pub capture: CaptureConfig,
    /// `ROLODEX_CORS_ORIGINS`, comma separated; defaults to the capture hosts
    pub cors_origins: Vec<String>,
    pub rate_limit: RateLimitConfig,
    pub demo: DemoConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?; // Required
        let server = ServerConfig::from_env()?;
        let auth = AuthConfig::from_env()?;
        let capture = CaptureConfig::from_env()?;
        let cors_origins = env_list("ROLODEX_CORS_ORIGINS")
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| capture.origins());

        Ok(Self {
            app: app_info!(),
            environment,
            server,
            database,
            auth,
            openai: OpenAIConfig::from_env()?,
            storage: SupabaseStorageConfig::from_env()?,
            capture,
            cors_origins,
            rate_limit: RateLimitConfig::from_env()?,
            demo: DemoConfig::from_env()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_falls_back_to_production() {
        let capture = CaptureConfig {
            production: "https://app.example.com/".into(),
            staging: None,
            development: "http://localhost:3000".into(),
        };
        assert_eq!(
            capture.base_url(CaptureEnvironment::Staging),
            "https://app.example.com"
        );
        assert_eq!(
            capture.base_url(CaptureEnvironment::Development),
            "http://localhost:3000"
        );
    }

    #[test]
    fn capture_urls_from_env() {
        temp_env::with_vars(
            [
                ("ROLODEX_CAPTURE_BASE_URL", Some("https://app.example.com")),
                ("ROLODEX_CAPTURE_STAGING_BASE_URL", Some("https://staging.example.com/")),
                ("ROLODEX_CAPTURE_DEVELOPMENT_BASE_URL", None),
            ],
            || {
                let capture = CaptureConfig::from_env().unwrap();
                assert_eq!(
                    capture.base_url(CaptureEnvironment::Staging),
                    "https://staging.example.com"
                );
                assert_eq!(
                    capture.base_url(CaptureEnvironment::Development),
                    DEFAULT_CAPTURE_DEVELOPMENT_BASE_URL
                );
            },
        );
    }

    #[test]
    fn demo_seeding_is_off_by_default() {
        temp_env::with_vars_unset(["ROLODEX_SEED_DEMO", "ROLODEX_DEMO_USER_ID"], || {
            let demo = DemoConfig::from_env().unwrap();
            assert!(!demo.enabled);
            assert_eq!(demo.owner_id, DEFAULT_DEMO_USER_ID);
        });
        temp_env::with_var("ROLODEX_SEED_DEMO", Some("true"), || {
            assert!(DemoConfig::from_env().unwrap().enabled);
        });
    }

    #[test]
    fn cors_defaults_to_capture_hosts() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgres://localhost/rolodex")),
                ("ROLODEX_CORS_ORIGINS", None),
                ("ROLODEX_CAPTURE_BASE_URL", None),
                ("ROLODEX_CAPTURE_STAGING_BASE_URL", None),
                ("ROLODEX_CAPTURE_DEVELOPMENT_BASE_URL", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(
                    config.cors_origins,
                    vec![
                        "http://localhost:3000".to_string(),
                        "https://app.rolodex.app".to_string(),
                        "https://staging.rolodex.app".to_string(),
                    ]
                );
            },
        );
    }

    #[test]
    fn cors_override_replaces_defaults() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgres://localhost/rolodex")),
                ("ROLODEX_CORS_ORIGINS", Some("https://one.test, https://two.test")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.cors_origins, vec!["https://one.test", "https://two.test"]);
            },
        );
    }
}
