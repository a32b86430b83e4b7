//! Handler tests for the Saved Searches domain

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware;
use axum_helpers::{AuthConfig, TokenVerifier, require_auth};
use domain_searches::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt; // For oneshot()

struct TestApp {
    router: Router,
    verifier: Arc<TokenVerifier>,
}

impl TestApp {
    fn new() -> Self {
        let verifier = Arc::new(TokenVerifier::new(AuthConfig::with_secret(
            "searches-handler-test-secret-0123456789",
        )));
        let service = SavedSearchService::new(Arc::new(InMemorySavedSearchRepository::new()));
        let router = handlers::router(service).route_layer(middleware::from_fn_with_state(
            Arc::clone(&verifier),
            require_auth,
        ));
        Self { router, verifier }
    }

    async fn call(&self, user: &str, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let token = self.verifier.issue(user, None).unwrap();
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {token}"));
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

#[tokio::test]
async fn test_create_and_fetch_saved_search() {
    let app = TestApp::new();
    let (status, created) = app
        .call(
            "alice",
            "POST",
            "/",
            Some(json!({
                "name": "Brass under 500",
                "filters": { "material": "Brass", "price_max": 500.0 }
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Brass under 500");
    assert_eq!(created["filters"]["price_max"], 500.0);
    assert!(created["created_at"].is_string());

    let uri = format!("/{}", created["id"].as_str().unwrap());
    let (status, fetched) = app.call("alice", "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (_, list) = app.call("alice", "GET", "/", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_blank_name_is_rejected() {
    let app = TestApp::new();
    let (status, _) = app
        .call("alice", "POST", "/", Some(json!({ "name": "", "filters": {} })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_other_owner_gets_not_found() {
    let app = TestApp::new();
    let (_, created) = app
        .call("alice", "POST", "/", Some(json!({ "name": "Oak" })))
        .await;
    let uri = format!("/{}", created["id"].as_str().unwrap());

    let (status, body) = app.call("bob", "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Saved search not found");

    let (status, _) = app.call("bob", "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.call("alice", "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.call("alice", "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
