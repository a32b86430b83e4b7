//! Process-local rate limiting on a keyed GCRA limiter.
//!
//! Keys are `"{client}:{path}"`. Each key may burst up to `max_requests`
//! and regains one request every `window / max_requests`. State lives in
//! memory and is lost on restart, so limits only hold per process.

use crate::audit::extract_ip_from_headers;
use crate::errors::AppError;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use core_config::{ConfigError, FromEnv, env_parse};
use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota};
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

/// Drop idle keys once the store grows past this many entries.
const SWEEP_THRESHOLD: usize = 10_000;

/// - `RATE_LIMIT_REQUESTS` (default 60)
/// - `RATE_LIMIT_WINDOW_SECS` (default 60)
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 60,
            window: Duration::from_secs(60),
        }
    }
}

impl FromEnv for RateLimitConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            max_requests: env_parse("RATE_LIMIT_REQUESTS", 60u32)?,
            window: Duration::from_secs(env_parse("RATE_LIMIT_WINDOW_SECS", 60u64)?),
        })
    }
}

impl RateLimitConfig {
    /// A zero limit is read as one request per window.
    fn quota(&self) -> Quota {
        let burst = NonZeroU32::new(self.max_requests).unwrap_or(NonZeroU32::MIN);
        Quota::with_period(self.window / burst.get())
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst)
    }
}

#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<DefaultKeyedRateLimiter<String>>,
    clock: DefaultClock,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            inner: Arc::new(DefaultKeyedRateLimiter::keyed(config.quota())),
            clock: DefaultClock::default(),
        }
    }

    /// Spend one request for `key`. `Err` carries the wait until the next
    /// request is allowed.
    pub fn check(&self, key: &str) -> Result<(), Duration> {
        if self.inner.len() > SWEEP_THRESHOLD {
            self.inner.retain_recent();
        }
        self.inner
            .check_key(&key.to_string())
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }
}

fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .or_else(|| extract_ip_from_headers(request.headers()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Limits state-changing requests (`POST`, `PUT`, `PATCH`, `DELETE`).
/// Reads pass through untouched.
pub async fn rate_limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let limited = matches!(
        *request.method(),
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    );

    if limited {
        let key = format!("{}:{}", client_key(&request), request.uri().path());
        if let Err(retry_after) = limiter.check(&key) {
            tracing::warn!(
                key = %key,
                retry_after_ms = retry_after.as_millis() as u64,
                "Rate limit exceeded"
            );
            return Err(AppError::RateLimited("Too Many Requests".to_string()));
        }
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware,
        routing::post,
    };
    use tower::ServiceExt;

    fn limiter(max_requests: u32) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(60),
        })
    }

    #[test]
    fn test_burst_allows_up_to_limit() {
        let limiter = limiter(3);
        assert!(limiter.check("a:/items").is_ok());
        assert!(limiter.check("a:/items").is_ok());
        assert!(limiter.check("a:/items").is_ok());

        let wait = limiter.check("a:/items").unwrap_err();
        assert!(wait > Duration::from_secs(15) && wait <= Duration::from_secs(20), "{wait:?}");

        assert!(limiter.check("b:/items").is_ok());
    }

    #[test]
    fn test_quota_replenishes() {
        let limiter = RateLimiter::new(RateLimitConfig {
            max_requests: 1,
            window: Duration::from_millis(50),
        });
        assert!(limiter.check("k").is_ok());
        assert!(limiter.check("k").is_err());
        std::thread::sleep(Duration::from_millis(80));
        assert!(limiter.check("k").is_ok());
    }

    #[test]
    fn test_zero_limit_still_admits_one_request() {
        let limiter = limiter(0);
        assert!(limiter.check("k").is_ok());
        assert!(limiter.check("k").is_err());
    }

    #[test]
    fn test_rate_limit_config_from_env() {
        temp_env::with_vars(
            [
                ("RATE_LIMIT_REQUESTS", Some("5")),
                ("RATE_LIMIT_WINDOW_SECS", Some("10")),
            ],
            || {
                let config = RateLimitConfig::from_env().unwrap();
                assert_eq!(config.max_requests, 5);
                assert_eq!(config.window, Duration::from_secs(10));
            },
        );
    }

    fn app(limiter: RateLimiter) -> Router {
        Router::new()
            .route("/items", post(|| async { "ok" }).get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(limiter, rate_limit))
    }

    #[tokio::test]
    async fn test_middleware_returns_429_after_limit() {
        let app = app(limiter(1));

        let post_req = || {
            HttpRequest::post("/items")
                .header("x-forwarded-for", "203.0.113.9")
                .body(Body::empty())
                .unwrap()
        };

        let first = app.clone().oneshot(post_req()).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app.clone().oneshot(post_req()).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

        let read = app
            .oneshot(HttpRequest::get("/items").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(read.status(), StatusCode::OK);
    }
}
