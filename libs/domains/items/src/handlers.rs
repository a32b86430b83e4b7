use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    AuditEvent, AuditOutcome, AuthUser, QueryParams, ValidatedJson,
    errors::responses::{
        BadRequestResponse, InternalServerErrorResponse, NotFoundResponse, RateLimitedResponse,
        UnauthorizedResponse, ValidationErrorResponse,
    },
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ItemResult;
use crate::extraction::ExtractedProduct;
use crate::models::{
    BatchDelete, BatchDeleteResult, CreateItem, ExtractRequest, ExtractionResponse, Item,
    ItemPage, ListItemsQuery, SearchMode, SimilarQuery, UpdateItem,
};
use crate::repository::ItemRepository;
use crate::search::SearchRequest;
use crate::service::ItemService;

/// OpenAPI documentation for Items API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_items,
        create_item,
        get_item,
        update_item,
        delete_item,
        batch_delete,
        similar_items,
        extract_item,
    ),
    components(
        schemas(
            Item, CreateItem, UpdateItem, ItemPage, SearchMode, BatchDelete,
            BatchDeleteResult, ExtractRequest, ExtractionResponse, ExtractedProduct
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
        (name = "Items", description = "Captured products, search and AI extraction")
    )
)]
pub struct ApiDoc;

/// Items router. Expects [`AuthUser`] to be inserted by an outer auth layer.
pub fn router<R: ItemRepository + 'static>(service: ItemService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/batch-delete", post(batch_delete))
        .route("/extract", post(extract_item))
        .route(
            "/{id}",
            get(get_item).patch(update_item).delete(delete_item),
        )
        .route("/{id}/similar", get(similar_items))
        .with_state(shared_service)
}

/// Search the caller's items
///
/// Text mode pages by `nextCursor`; with `semantic=true` results are ranked
/// by embedding similarity and `nextCursor` is always null.
#[utoipa::path(
    get,
    path = "",
    tag = "Items",
    params(ListItemsQuery),
    responses(
        (status = 200, description = "Page of items", body = ItemPage),
        (status = 401, response = UnauthorizedResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn list_items<R: ItemRepository + 'static>(
    State(service): State<Arc<ItemService<R>>>,
    auth: AuthUser,
    QueryParams(query): QueryParams<ListItemsQuery>,
) -> ItemResult<Json<ItemPage>> {
    let page = service
        .search(SearchRequest::new(auth.user_id, query))
        .await?;
    Ok(Json(page))
}

/// Capture a new item
#[utoipa::path(
    post,
    path = "",
    tag = "Items",
    request_body = CreateItem,
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 401, response = UnauthorizedResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 429, response = RateLimitedResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn create_item<R: ItemRepository + 'static>(
    State(service): State<Arc<ItemService<R>>>,
    auth: AuthUser,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<CreateItem>,
) -> ItemResult<impl IntoResponse> {
    let item = service.create(&auth.user_id, input).await?;

    AuditEvent::new("item.create", AuditOutcome::Success)
        .user(&auth.user_id)
        .resource("item", &item.id)
        .from_headers(&headers)
        .log();

    Ok((StatusCode::CREATED, Json(item)))
}

/// Get one of the caller's items
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Items",
    params(("id" = String, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item found", body = Item),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn get_item<R: ItemRepository + 'static>(
    State(service): State<Arc<ItemService<R>>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ItemResult<Json<Item>> {
    let item = service.get(&auth.user_id, &id).await?;
    Ok(Json(item))
}

/// Partially update an item
///
/// Only fields present in the body change. A body without any known field
/// is rejected.
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Items",
    params(("id" = String, Path, description = "Item ID")),
    request_body = UpdateItem,
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn update_item<R: ItemRepository + 'static>(
    State(service): State<Arc<ItemService<R>>>,
    auth: AuthUser,
    headers: HeaderMap,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateItem>,
) -> ItemResult<Json<Item>> {
    let item = service.update(&auth.user_id, &id, input).await?;

    AuditEvent::new("item.update", AuditOutcome::Success)
        .user(&auth.user_id)
        .resource("item", &id)
        .from_headers(&headers)
        .log();

    Ok(Json(item))
}

/// Delete an item
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Items",
    params(("id" = String, Path, description = "Item ID")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn delete_item<R: ItemRepository + 'static>(
    State(service): State<Arc<ItemService<R>>>,
    auth: AuthUser,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ItemResult<impl IntoResponse> {
    service.delete(&auth.user_id, &id).await?;

    AuditEvent::new("item.delete", AuditOutcome::Success)
        .user(&auth.user_id)
        .resource("item", &id)
        .from_headers(&headers)
        .log();

    Ok(StatusCode::NO_CONTENT)
}

/// Delete several items at once
///
/// Ids that are unknown or belong to someone else are skipped.
#[utoipa::path(
    post,
    path = "/batch-delete",
    tag = "Items",
    request_body = BatchDelete,
    responses(
        (status = 200, description = "Number of items removed", body = BatchDeleteResult),
        (status = 401, response = UnauthorizedResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 429, response = RateLimitedResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn batch_delete<R: ItemRepository + 'static>(
    State(service): State<Arc<ItemService<R>>>,
    auth: AuthUser,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<BatchDelete>,
) -> ItemResult<Json<BatchDeleteResult>> {
    let result = service.batch_delete(&auth.user_id, &input.ids).await?;

    AuditEvent::new("item.batch_delete", AuditOutcome::Success)
        .user(&auth.user_id)
        .from_headers(&headers)
        .with_details(json!({ "requested": input.ids.len(), "deleted": result.deleted }))
        .log();

    Ok(Json(result))
}

/// Items similar to a given item
#[utoipa::path(
    get,
    path = "/{id}/similar",
    tag = "Items",
    params(("id" = String, Path, description = "Source item ID"), SimilarQuery),
    responses(
        (status = 200, description = "Similar items", body = ItemPage),
        (status = 401, response = UnauthorizedResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn similar_items<R: ItemRepository + 'static>(
    State(service): State<Arc<ItemService<R>>>,
    auth: AuthUser,
    Path(id): Path<String>,
    QueryParams(query): QueryParams<SimilarQuery>,
) -> ItemResult<Json<ItemPage>> {
    let page = service.similar(&auth.user_id, &id, query.limit).await?;
    Ok(Json(page))
}

/// Extract product metadata from an image
#[utoipa::path(
    post,
    path = "/extract",
    tag = "Items",
    request_body = ExtractRequest,
    responses(
        (status = 200, description = "Extracted metadata", body = ExtractionResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 429, response = RateLimitedResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn extract_item<R: ItemRepository + 'static>(
    State(service): State<Arc<ItemService<R>>>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<ExtractRequest>,
) -> ItemResult<Json<ExtractionResponse>> {
    let response = service.extract(&auth.user_id, input).await?;
    Ok(Json(response))
}
