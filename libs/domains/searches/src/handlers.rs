use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    AuditEvent, AuditOutcome, AuthUser, ValidatedJson,
    errors::responses::{
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
        ValidationErrorResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::SearchResult;
use crate::models::{CreateSavedSearch, SavedSearch, SearchFilters};
use crate::repository::SavedSearchRepository;
use crate::service::SavedSearchService;

#[derive(OpenApi)]
#[openapi(
    paths(list_searches, create_search, get_search, delete_search),
    components(
        schemas(SavedSearch, CreateSavedSearch, SearchFilters),
        responses(
            NotFoundResponse,
            ValidationErrorResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Searches", description = "Saved filter presets")
    )
)]
pub struct ApiDoc;

pub fn router<R: SavedSearchRepository + 'static>(service: SavedSearchService<R>) -> Router {
    Router::new()
        .route("/", get(list_searches).post(create_search))
        .route("/{id}", get(get_search).delete(delete_search))
        .with_state(Arc::new(service))
}

/// List saved searches, newest first
#[utoipa::path(
    get,
    path = "",
    tag = "Searches",
    responses(
        (status = 200, description = "Saved searches", body = Vec<SavedSearch>),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn list_searches<R: SavedSearchRepository + 'static>(
    State(service): State<Arc<SavedSearchService<R>>>,
    auth: AuthUser,
) -> SearchResult<Json<Vec<SavedSearch>>> {
    Ok(Json(service.list(&auth.user_id).await?))
}

/// Save a filter preset
#[utoipa::path(
    post,
    path = "",
    tag = "Searches",
    request_body = CreateSavedSearch,
    responses(
        (status = 201, description = "Search saved", body = SavedSearch),
        (status = 401, response = UnauthorizedResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn create_search<R: SavedSearchRepository + 'static>(
    State(service): State<Arc<SavedSearchService<R>>>,
    auth: AuthUser,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<CreateSavedSearch>,
) -> SearchResult<impl IntoResponse> {
    let search = service.create(&auth.user_id, input).await?;

    AuditEvent::new("search.create", AuditOutcome::Success)
        .user(&auth.user_id)
        .resource("search", &search.id)
        .from_headers(&headers)
        .log();

    Ok((StatusCode::CREATED, Json(search)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Searches",
    params(("id" = String, Path, description = "Saved search ID")),
    responses(
        (status = 200, description = "Saved search", body = SavedSearch),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn get_search<R: SavedSearchRepository + 'static>(
    State(service): State<Arc<SavedSearchService<R>>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> SearchResult<Json<SavedSearch>> {
    Ok(Json(service.get(&auth.user_id, &id).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Searches",
    params(("id" = String, Path, description = "Saved search ID")),
    responses(
        (status = 204, description = "Saved search deleted"),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn delete_search<R: SavedSearchRepository + 'static>(
    State(service): State<Arc<SavedSearchService<R>>>,
    auth: AuthUser,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> SearchResult<impl IntoResponse> {
    service.delete(&auth.user_id, &id).await?;

    AuditEvent::new("search.delete", AuditOutcome::Success)
        .user(&auth.user_id)
        .resource("search", &id)
        .from_headers(&headers)
        .log();

    Ok(StatusCode::NO_CONTENT)
}
