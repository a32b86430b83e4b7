//! Reusable OpenAPI responses for the error envelope.

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({
        "error": {"code": "INTERNAL_ERROR", "message": "An internal error occurred"}
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Server misconfiguration",
    content_type = "application/json",
    example = json!({
        "error": {"code": "CONFIGURATION_ERROR", "message": "JWT signing secret not configured"}
    })
)]
pub struct ConfigurationErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Unprocessable Entity - Validation Error",
    content_type = "application/json",
    example = json!({
        "error": {
            "code": "VALIDATION_ERROR",
            "message": "Request validation failed",
            "details": {
                "img_url": [{"code": "url", "message": null, "params": {"value": "not-a-url"}}]
            }
        }
    })
)]
pub struct ValidationErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request",
    content_type = "application/json",
    example = json!({
        "error": {"code": "BAD_REQUEST", "message": "No fields to update"}
    })
)]
pub struct BadRequestResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Resource not found",
    content_type = "application/json",
    example = json!({
        "error": {"code": "NOT_FOUND", "message": "Item not found"}
    })
)]
pub struct NotFoundResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Unauthorized - Authentication required",
    content_type = "application/json",
    example = json!({
        "error": {"code": "UNAUTHORIZED", "message": "Missing or invalid Authorization header"}
    })
)]
pub struct UnauthorizedResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Conflict - Resource already exists",
    content_type = "application/json",
    example = json!({
        "error": {"code": "CONFLICT", "message": "Email already registered"}
    })
)]
pub struct ConflictResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Too Many Requests",
    content_type = "application/json",
    example = json!({
        "error": {"code": "RATE_LIMITED", "message": "Too Many Requests"}
    })
)]
pub struct RateLimitedResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Service Unavailable",
    content_type = "application/json",
    example = json!({
        "error": {"code": "SERVICE_UNAVAILABLE", "message": "Storage service unavailable"}
    })
)]
pub struct ServiceUnavailableResponse(pub ErrorResponse);
