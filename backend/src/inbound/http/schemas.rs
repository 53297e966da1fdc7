//! OpenAPI schema wrappers for the error payload.
//!
//! Domain types do not derive `ToSchema`; these wrappers mirror them in the
//! adapter layer. `details` is free-form JSON, so the two shapes clients can
//! rely on are documented separately as [`FieldErrorDetails`] (400s) and
//! [`PlaceConflictDetails`] (409s from candidate and selection writes).

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    #[schema(rename = "unauthorized")]
    Unauthorized,
    #[schema(rename = "forbidden")]
    Forbidden,
    #[schema(rename = "not_found")]
    NotFound,
    #[schema(rename = "conflict")]
    Conflict,
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    #[schema(example = "title must be between 1 and 100 characters")]
    message: String,
    /// Matches the `trace-id` response header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// [`FieldErrorDetails`], [`PlaceConflictDetails`], or absent.
    details: Option<serde_json::Value>,
}

/// `details` of a validation failure.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct FieldErrorDetails {
    /// Request field in camelCase, e.g. `endDate` or `items`.
    #[schema(example = "orderInDay")]
    field: String,
    /// Machine-readable reason, e.g. `missing_field` or `duplicate_place`.
    #[schema(example = "invalid_field")]
    code: String,
    /// Offending input when it is safe to echo.
    value: Option<String>,
    /// Position within a list field.
    index: Option<usize>,
}

/// `details` of a 409 naming the places that blocked the write.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PlaceConflictDetails {
    #[schema(format = "uuid")]
    place_ids: Vec<String>,
    #[schema(example = "not_candidates")]
    code: String,
}
