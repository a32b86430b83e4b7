//! Handler tests for Projects domain
//!
//! Routers run behind the bearer-token middleware with in-memory
//! repositories; items are created through the items router so ownership
//! flows the same way it does in the application.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware;
use axum_helpers::{AuthConfig, TokenVerifier, require_auth};
use domain_items::{InMemoryItemRepository, ItemService};
use domain_projects::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt; // For oneshot()

const SECRET: &str = "projects-handler-test-secret-0123456789";

struct TestApp {
    router: Router,
    verifier: Arc<TokenVerifier>,
}

impl TestApp {
    fn new() -> Self {
        let verifier = Arc::new(TokenVerifier::new(AuthConfig::with_secret(SECRET)));
        let items = Arc::new(InMemoryItemRepository::new());
        let projects = ProjectService::new(
            Arc::new(InMemoryProjectRepository::new()),
            Arc::clone(&items),
        );

        let router = Router::new()
            .nest("/items", domain_items::handlers::router(ItemService::new(items)))
            .nest("/projects", handlers::router(projects))
            .route_layer(middleware::from_fn_with_state(
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

    async fn item(&self, user: &str, title: &str) -> String {
        let (status, item) = self
            .call(
                user,
                "POST",
                "/items",
                Some(json!({ "img_url": "https://cdn.example.com/i.jpg", "title": title })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        item["id"].as_str().unwrap().to_string()
    }

    async fn project(&self, user: &str, name: &str) -> String {
        let (status, body) = self
            .call(user, "POST", "/projects", Some(json!({ "name": name })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], name);
        body["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_create_project_handler_returns_201() {
    let app = TestApp::new();
    let (status, body) = app
        .call("alice", "POST", "/projects", Some(json!({ "name": "Living Room" })))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.as_object().unwrap().len(), 2);
    assert_eq!(body["name"], "Living Room");
}

#[tokio::test]
async fn test_create_project_handler_validates_input() {
    let app = TestApp::new();
    let (status, body) = app
        .call("alice", "POST", "/projects", Some(json!({ "name": "" })))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_add_item_twice_keeps_one_link() {
    let app = TestApp::new();
    let project = app.project("alice", "Den").await;
    let item = app.item("alice", "Lamp").await;
    let uri = format!("/projects/{project}/add_item");

    for _ in 0..2 {
        let (status, _) = app
            .call("alice", "POST", &uri, Some(json!({ "item_id": item })))
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let (_, list) = app.call("alice", "GET", "/projects", None).await;
    assert_eq!(list[0]["item_count"], 1);

    let (status, detail) = app
        .call("alice", "GET", &format!("/projects/{project}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["items"].as_array().unwrap().len(), 1);
    assert_eq!(detail["items"][0]["id"], item.as_str());
}

#[tokio::test]
async fn test_remove_unlinked_item_is_no_op() {
    let app = TestApp::new();
    let project = app.project("alice", "Den").await;

    let (status, _) = app
        .call(
            "alice",
            "DELETE",
            &format!("/projects/{project}/remove_item"),
            Some(json!({ "item_id": "never-linked" })),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_project_of_other_owner_is_not_found() {
    let app = TestApp::new();
    let project = app.project("alice", "Den").await;
    let uri = format!("/projects/{project}");

    let (status, body) = app.call("bob", "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Project not found");

    let (status, _) = app.call("bob", "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = app.call("bob", "GET", "/projects", None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_cannot_link_someone_elses_item() {
    let app = TestApp::new();
    let project = app.project("alice", "Den").await;
    let theirs = app.item("bob", "Rug").await;

    let (status, body) = app
        .call(
            "alice",
            "POST",
            &format!("/projects/{project}/add_item"),
            Some(json!({ "item_id": theirs })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Item not found");
}

#[tokio::test]
async fn test_patch_project() {
    let app = TestApp::new();
    let project = app.project("alice", "Den").await;
    let uri = format!("/projects/{project}");

    let (status, body) = app.call("alice", "PATCH", &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "No fields to update");

    let (status, body) = app
        .call("alice", "PATCH", &uri, Some(json!({ "budget": 2500.0, "description": "Cosy" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Den");
    assert_eq!(body["budget"], 2500.0);
    assert_eq!(body["description"], "Cosy");

    let (status, _) = app
        .call("alice", "PATCH", "/projects/missing", Some(json!({ "name": "X" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_project_keeps_items() {
    let app = TestApp::new();
    let project = app.project("alice", "Den").await;
    let item = app.item("alice", "Lamp").await;
    app.call(
        "alice",
        "POST",
        &format!("/projects/{project}/add_item"),
        Some(json!({ "item_id": item })),
    )
    .await;

    let (status, _) = app
        .call("alice", "DELETE", &format!("/projects/{project}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .call("alice", "GET", &format!("/items/{item}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}
