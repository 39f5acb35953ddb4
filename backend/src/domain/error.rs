//! Domain-level error types.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! responses or any other protocol-specific envelope. The trace identifier in
//! scope when an error is constructed is captured automatically so logs and
//! responses can be correlated.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::TraceId;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Authentication failed or is missing.
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// A business rule refused the operation; see [`RejectionReason`].
    Rejected,
    /// Storage was temporarily unavailable or contended; the caller may retry.
    ServiceUnavailable,
    /// The two halves of an application record disagree.
    InconsistentState,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// Machine-readable reason attached to [`ErrorCode::Rejected`] errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectionReason {
    /// The caller's role may not perform the operation.
    RoleForbidden,
    /// The posting is missing or no longer accepting applications.
    NotAvailable,
    /// The user already applied to the posting.
    Duplicate,
    /// The requested username is taken.
    DuplicateUsername,
    /// The password and its confirmation differ.
    CredentialMismatch,
    /// Username or password did not match a registered user.
    InvalidCredentials,
    /// The requested status change is not permitted from the current status.
    InvalidTransition,
}

impl RejectionReason {
    /// Stable wire representation of the reason.
    ///
    /// # Examples
    /// ```
    /// use jobboard::domain::RejectionReason;
    ///
    /// assert_eq!(RejectionReason::NotAvailable.as_str(), "not-available");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RoleForbidden => "role-forbidden",
            Self::NotAvailable => "not-available",
            Self::Duplicate => "duplicate",
            Self::DuplicateUsername => "duplicate-username",
            Self::CredentialMismatch => "credential-mismatch",
            Self::InvalidCredentials => "invalid-credentials",
            Self::InvalidTransition => "invalid-transition",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        [
            Self::RoleForbidden,
            Self::NotAvailable,
            Self::Duplicate,
            Self::DuplicateUsername,
            Self::CredentialMismatch,
            Self::InvalidCredentials,
            Self::InvalidTransition,
        ]
        .into_iter()
        .find(|reason| reason.as_str() == raw)
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` must be non-empty once trimmed of whitespace.
/// - `trace_id`, when present, must be non-empty.
///
/// # Examples
/// ```
/// use jobboard::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("missing");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
#[serde(try_from = "ErrorDto", into = "ErrorDto")]
pub struct Error {
    code: ErrorCode,
    message: String,
    trace_id: Option<String>,
    details: Option<Value>,
}

/// Validation errors emitted by the fallible constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorValidationError {
    /// The message was blank.
    #[error("error message must not be empty")]
    EmptyMessage,
    /// The trace identifier was blank.
    #[error("trace identifier must not be empty")]
    EmptyTraceId,
}

const FALLBACK_MESSAGE: &str = "unspecified error";

impl Error {
    /// Create a new error. Blank messages are replaced with a generic one.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::try_new(code, message).unwrap_or_else(|_| Self {
            code,
            message: FALLBACK_MESSAGE.to_owned(),
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        })
    }

    /// Fallible constructor that validates the message content.
    pub fn try_new(code: ErrorCode, message: impl Into<String>) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        })
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Trace identifier captured when the error was created.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Supplementary error details for adapters.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Rejection reason carried by [`ErrorCode::Rejected`] errors.
    ///
    /// # Examples
    /// ```
    /// use jobboard::domain::{Error, RejectionReason};
    ///
    /// let err = Error::rejected(RejectionReason::Duplicate);
    /// assert_eq!(err.rejection_reason(), Some(RejectionReason::Duplicate));
    /// ```
    pub fn rejection_reason(&self) -> Option<RejectionReason> {
        if self.code != ErrorCode::Rejected {
            return None;
        }
        self.details
            .as_ref()
            .and_then(|details| details.get("reason"))
            .and_then(Value::as_str)
            .and_then(RejectionReason::parse)
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use jobboard::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("bad").with_details(json!({ "field": "title" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Override the captured trace identifier.
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        let trace_id = trace_id.into();
        if !trace_id.trim().is_empty() {
            self.trace_id = Some(trace_id);
        }
        self
    }

    /// Fallible variant of [`Error::with_trace_id`].
    pub fn try_with_trace_id(
        mut self,
        trace_id: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let trace_id = trace_id.into();
        if trace_id.trim().is_empty() {
            return Err(ErrorValidationError::EmptyTraceId);
        }
        self.trace_id = Some(trace_id);
        Ok(self)
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Construct an [`ErrorCode::Rejected`] error with the reason in `details`.
    pub fn rejected(reason: RejectionReason) -> Self {
        let message = match reason {
            RejectionReason::RoleForbidden => "role may not perform this operation",
            RejectionReason::NotAvailable => "job posting is not accepting applications",
            RejectionReason::Duplicate => "already applied to this job posting",
            RejectionReason::DuplicateUsername => "username is already taken",
            RejectionReason::CredentialMismatch => "password confirmation does not match",
            RejectionReason::InvalidCredentials => "invalid username or password",
            RejectionReason::InvalidTransition => "status change is not permitted",
        };
        Self::new(ErrorCode::Rejected, message).with_details(json!({ "reason": reason.as_str() }))
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InconsistentState`].
    pub fn inconsistent_state(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InconsistentState, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(alias = "trace_id")]
    trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<Error> for ErrorDto {
    fn from(value: Error) -> Self {
        Self {
            code: value.code,
            message: value.message,
            trace_id: value.trace_id,
            details: value.details,
        }
    }
}

impl TryFrom<ErrorDto> for Error {
    type Error = ErrorValidationError;

    fn try_from(value: ErrorDto) -> Result<Self, Self::Error> {
        let ErrorDto {
            code,
            message,
            trace_id,
            details,
        } = value;

        let mut error = Error::try_new(code, message)?;
        // Deserialised payloads carry their own trace id, never the ambient one.
        error.trace_id = None;
        if let Some(trace_id) = trace_id {
            error = error.try_with_trace_id(trace_id)?;
        }
        error.details = details;
        Ok(error)
    }
}
