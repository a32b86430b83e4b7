use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    AuditEvent, AuditOutcome, AuthUser, ValidatedJson,
    errors::responses::{
        BadRequestResponse, InternalServerErrorResponse, NotFoundResponse, RateLimitedResponse,
        UnauthorizedResponse, ValidationErrorResponse,
    },
};
use domain_items::{Item, ItemRepository};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ProjectResult;
use crate::models::{
    CreateProject, ItemLink, ProjectCreated, ProjectDetail, ProjectSummary, ProjectView,
    UpdateProject,
};
use crate::repository::ProjectRepository;
use crate::service::ProjectService;

/// OpenAPI documentation for Projects API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_projects,
        create_project,
        get_project,
        update_project,
        delete_project,
        add_item,
        remove_item,
    ),
    components(
        schemas(
            CreateProject, UpdateProject, ItemLink, ProjectCreated, ProjectSummary,
            ProjectView, ProjectDetail, Item
        ),
        responses(
            NotFoundResponse,
            BadRequestResponse,
            ValidationErrorResponse,
            UnauthorizedResponse,
            RateLimitedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Projects", description = "Mood boards grouping captured items")
    )
)]
pub struct ApiDoc;

type SharedService<R, I> = State<Arc<ProjectService<R, I>>>;

/// Create the project router with all HTTP endpoints
pub fn router<R, I>(service: ProjectService<R, I>) -> Router
where
    R: ProjectRepository + 'static,
    I: ItemRepository + 'static,
{
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route(
            "/{id}",
            get(get_project).patch(update_project).delete(delete_project),
        )
        .route("/{id}/add_item", post(add_item))
        .route("/{id}/remove_item", post(remove_item).delete(remove_item))
        .with_state(shared_service)
}

/// List the caller's projects
#[utoipa::path(
    get,
    path = "",
    tag = "Projects",
    responses(
        (status = 200, description = "Projects, newest first", body = Vec<ProjectSummary>),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn list_projects<R: ProjectRepository + 'static, I: ItemRepository + 'static>(
    State(service): SharedService<R, I>,
    auth: AuthUser,
) -> ProjectResult<Json<Vec<ProjectSummary>>> {
    Ok(Json(service.list(&auth.user_id).await?))
}

/// Create a project
#[utoipa::path(
    post,
    path = "",
    tag = "Projects",
    request_body = CreateProject,
    responses(
        (status = 201, description = "Project created", body = ProjectCreated),
        (status = 401, response = UnauthorizedResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 429, response = RateLimitedResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn create_project<R: ProjectRepository + 'static, I: ItemRepository + 'static>(
    State(service): SharedService<R, I>,
    auth: AuthUser,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<CreateProject>,
) -> ProjectResult<impl IntoResponse> {
    let created = service.create(&auth.user_id, input).await?;

    AuditEvent::new("project.create", AuditOutcome::Success)
        .user(&auth.user_id)
        .resource("project", &created.id)
        .from_headers(&headers)
        .with_details(json!({ "name": created.name }))
        .log();

    Ok((StatusCode::CREATED, Json(created)))
}

/// Project detail with its items
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Projects",
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project found", body = ProjectDetail),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn get_project<R: ProjectRepository + 'static, I: ItemRepository + 'static>(
    State(service): SharedService<R, I>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ProjectResult<Json<ProjectDetail>> {
    Ok(Json(service.get(&auth.user_id, &id).await?))
}

/// Update name, budget or description
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Projects",
    params(("id" = String, Path, description = "Project ID")),
    request_body = UpdateProject,
    responses(
        (status = 200, description = "Project updated", body = ProjectView),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn update_project<R: ProjectRepository + 'static, I: ItemRepository + 'static>(
    State(service): SharedService<R, I>,
    auth: AuthUser,
    headers: HeaderMap,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateProject>,
) -> ProjectResult<Json<ProjectView>> {
    let view = service.update(&auth.user_id, &id, input).await?;

    AuditEvent::new("project.update", AuditOutcome::Success)
        .user(&auth.user_id)
        .resource("project", &id)
        .from_headers(&headers)
        .log();

    Ok(Json(view))
}

/// Delete a project and its item links
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Projects",
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 429, response = RateLimitedResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn delete_project<R: ProjectRepository + 'static, I: ItemRepository + 'static>(
    State(service): SharedService<R, I>,
    auth: AuthUser,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ProjectResult<impl IntoResponse> {
    service.delete(&auth.user_id, &id).await?;

    AuditEvent::new("project.delete", AuditOutcome::Success)
        .user(&auth.user_id)
        .resource("project", &id)
        .from_headers(&headers)
        .log();

    Ok(StatusCode::NO_CONTENT)
}

/// Link an item to a project
#[utoipa::path(
    post,
    path = "/{id}/add_item",
    tag = "Projects",
    params(("id" = String, Path, description = "Project ID")),
    request_body = ItemLink,
    responses(
        (status = 204, description = "Item linked (or already linked)"),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 429, response = RateLimitedResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn add_item<R: ProjectRepository + 'static, I: ItemRepository + 'static>(
    State(service): SharedService<R, I>,
    auth: AuthUser,
    headers: HeaderMap,
    Path(id): Path<String>,
    ValidatedJson(link): ValidatedJson<ItemLink>,
) -> ProjectResult<impl IntoResponse> {
    service.add_item(&auth.user_id, &id, &link.item_id).await?;

    AuditEvent::new("project.add_item", AuditOutcome::Success)
        .user(&auth.user_id)
        .resource("project", &id)
        .from_headers(&headers)
        .with_details(json!({ "item_id": link.item_id }))
        .log();

    Ok(StatusCode::NO_CONTENT)
}

/// Unlink an item from a project
#[utoipa::path(
    post,
    path = "/{id}/remove_item",
    tag = "Projects",
    params(("id" = String, Path, description = "Project ID")),
    request_body = ItemLink,
    responses(
        (status = 204, description = "Item unlinked (or was not linked)"),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 429, response = RateLimitedResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn remove_item<R: ProjectRepository + 'static, I: ItemRepository + 'static>(
    State(service): SharedService<R, I>,
    auth: AuthUser,
    headers: HeaderMap,
    Path(id): Path<String>,
    ValidatedJson(link): ValidatedJson<ItemLink>,
) -> ProjectResult<impl IntoResponse> {
    service.remove_item(&auth.user_id, &id, &link.item_id).await?;

    AuditEvent::new("project.remove_item", AuditOutcome::Success)
        .user(&auth.user_id)
        .resource("project", &id)
        .from_headers(&headers)
        .with_details(json!({ "item_id": link.item_id }))
        .log();

    Ok(StatusCode::NO_CONTENT)
}
