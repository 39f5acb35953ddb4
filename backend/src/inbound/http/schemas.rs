//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// A business rule refused the operation; `details.reason` says which.
    #[schema(rename = "rejected")]
    Rejected,
    /// Storage was busy or unreachable; retry later.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// Stored application records disagree; operators have been alerted.
    #[schema(rename = "inconsistent_state")]
    InconsistentState,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::RejectionReason`].
#[derive(ToSchema)]
#[schema(as = crate::domain::RejectionReason)]
pub enum RejectionReasonSchema {
    #[schema(rename = "role-forbidden")]
    RoleForbidden,
    #[schema(rename = "not-available")]
    NotAvailable,
    #[schema(rename = "duplicate")]
    Duplicate,
    #[schema(rename = "duplicate-username")]
    DuplicateUsername,
    #[schema(rename = "credential-mismatch")]
    CredentialMismatch,
    #[schema(rename = "invalid-credentials")]
    InvalidCredentials,
    #[schema(rename = "invalid-transition")]
    InvalidTransition,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "rejected")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "already applied to this job posting")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details, such as `{"reason": "duplicate"}`.
    details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_code_schema_lists_every_code() {
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        for code in [
            "invalid_request",
            "unauthorized",
            "forbidden",
            "not_found",
            "rejected",
            "service_unavailable",
            "inconsistent_state",
            "internal_error",
        ] {
            assert!(schema_json.contains(code), "missing {code}");
        }
    }

    #[test]
    fn rejection_reason_schema_matches_wire_names() {
        let schema_json = schema_to_json::<RejectionReasonSchema>();
        assert!(schema_json.contains("not-available"));
        assert!(schema_json.contains("invalid-transition"));
    }

    #[test]
    fn error_schema_uses_camel_case_fields() {
        let schema_json = schema_to_json::<ErrorSchema>();
        // utoipa replaces :: with . in schema names
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        assert!(schema_json.contains("traceId"));
        assert!(schema_json.contains("details"));
    }
}
