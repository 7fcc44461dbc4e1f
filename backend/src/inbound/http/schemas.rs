//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. The
//! wrappers here mirror their domain counterparts and are registered with
//! utoipa under the domain type's name.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// No caller identity was supplied, or it could not be parsed.
    #[schema(rename = "unauthenticated")]
    Unauthenticated,
    /// The caller's role does not permit this operation.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The referenced resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The resource is not in a state that allows the operation.
    #[schema(rename = "invalid_state")]
    InvalidState,
    /// The student's balance is below the reward cost.
    #[schema(rename = "insufficient_points")]
    InsufficientPoints,
    /// A dependency is temporarily unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
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
    /// Stable machine-readable error code.
    #[schema(example = "insufficient_points")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "insufficient points: 100 required, 40 available")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}
