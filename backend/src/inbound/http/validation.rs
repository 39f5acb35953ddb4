//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every failure becomes an `invalid_request` error whose `details` name the
//! offending field and a machine-readable code.

use serde_json::json;

use crate::domain::{
    ApplicationStatus, CredentialsValidationError, Error, PostingId, PostingStatus,
    PostingValidationError, UserId,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

fn field_error(field: &str, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

fn value_error(field: &str, code: ErrorCode, message: impl Into<String>, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    field_error(
        field,
        ErrorCode::MissingField,
        format!("missing required field: {field}"),
    )
}

pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    value_error(
        field,
        ErrorCode::InvalidUuid,
        format!("{field} must be a valid UUID"),
        value,
    )
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    UserId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_posting_id(value: &str, field: FieldName) -> Result<PostingId, Error> {
    PostingId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_posting_status(value: &str, field: FieldName) -> Result<PostingStatus, Error> {
    let field = field.as_str();
    value.parse().map_err(|_| {
        value_error(
            field,
            ErrorCode::InvalidValue,
            format!("{field} must be active or inactive"),
            value,
        )
    })
}

pub(crate) fn parse_application_status(
    value: &str,
    field: FieldName,
) -> Result<ApplicationStatus, Error> {
    let field = field.as_str();
    value.parse().map_err(|_| {
        value_error(
            field,
            ErrorCode::InvalidValue,
            format!("{field} must be pending, approved or declined"),
            value,
        )
    })
}

/// Map registration and login validation failures to `400` errors.
pub(crate) fn credentials_error(error: CredentialsValidationError) -> Error {
    field_error(error.field(), ErrorCode::InvalidValue, error.to_string())
}

/// Map posting validation failures to `400` errors.
pub(crate) fn posting_error(error: PostingValidationError) -> Error {
    let field = error.field().unwrap_or("posting");
    field_error(field, ErrorCode::InvalidValue, error.to_string())
}
