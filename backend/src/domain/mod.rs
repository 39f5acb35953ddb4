//! Domain primitives, aggregates and services.
//!
//! Purpose: hold the job-board core. Postings, users and the application
//! ledger live here together with the authorization gate; adapters reach
//! them only through the traits in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode / RejectionReason: transport-agnostic failures.
//! - User, JobPosting and the application refs linking them.
//! - SessionContext: the authenticated caller passed into every operation.
//! - IdentityService, PostingService, ApplicationLedger: driving port
//!   implementations.

pub mod application;
pub mod auth;
pub mod authorization;
pub mod error;
pub mod identity_service;
pub mod ledger;
pub mod ports;
pub mod posting;
pub mod posting_service;
pub mod session;
pub mod trace_id;
pub mod user;

pub use self::application::{
    ApplicantRef, ApplicationRef, ApplicationStatus, StatusTransition, UnknownApplicationStatus,
};
pub use self::auth::{
    CredentialsValidationError, LoginCredentials, MAX_PASSWORD_BYTES, Registration,
    RegistrationInput,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, RejectionReason};
pub use self::identity_service::IdentityService;
pub use self::ledger::{ApplicantView, ApplicationLedger, ApplicationView, LedgerLocks, RetryPolicy};
pub use self::posting::{
    JobPosting, NewPosting, PostingId, PostingPatch, PostingPatchInput, PostingStatus,
    PostingValidationError,
};
pub use self::posting_service::PostingService;
pub use self::session::SessionContext;
pub use self::trace_id::TraceId;
pub use self::user::{
    CredentialHash, DisplayName, ProfileLinks, Role, User, UserId, UserProfile,
    UserValidationError, Username,
};

/// HTTP header name used to propagate trace identifiers.
pub const TRACE_ID_HEADER: &str = "trace-id";
