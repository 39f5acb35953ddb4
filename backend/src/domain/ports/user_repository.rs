//! Port abstraction for persisting user accounts.
//!
//! Saves are compare-and-swap on the record's revision so concurrent writers
//! in different processes cannot silently overwrite each other's changes to
//! the application list.

use async_trait::async_trait;

use crate::domain::{Error, RejectionReason, User, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised when persisting or loading users.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The username is already registered.
        DuplicateUsername { username: String } => "username already registered: {username}",
        /// The user to update does not exist.
        Missing { id: String } => "user not found: {id}",
        /// Optimistic concurrency check failed.
        RevisionMismatch { expected: u32, actual: u32 } =>
            "revision mismatch: expected {expected}, found {actual}",
    }
}

impl From<UserRepositoryError> for Error {
    fn from(error: UserRepositoryError) -> Self {
        match error {
            UserRepositoryError::Connection { message } => {
                tracing::warn!(%message, "user storage unavailable");
                Error::service_unavailable("user storage unavailable")
            }
            UserRepositoryError::Query { message } => {
                Error::internal(format!("user storage failure: {message}"))
            }
            UserRepositoryError::DuplicateUsername { .. } => {
                Error::rejected(RejectionReason::DuplicateUsername)
            }
            UserRepositoryError::Missing { .. } => Error::not_found("user not found"),
            UserRepositoryError::RevisionMismatch { .. } => {
                Error::service_unavailable("user record is being modified concurrently")
            }
        }
    }
}

/// Persistence contract for [`User`] records.
///
/// # Revision Semantics
///
/// - [`UserRepository::insert`] stores the record with its current revision
///   (callers use 1 for new users).
/// - [`UserRepository::save`] succeeds only if the stored revision equals
///   `expected_revision`; the caller sets `user.revision` to the new value.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user, failing with `DuplicateUsername` when taken.
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user by username.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Replace a stored user if its revision still equals `expected_revision`.
    async fn save(&self, user: &User, expected_revision: u32) -> Result<(), UserRepositoryError>;
}

/// Fixture implementation that stores nothing.
///
/// Lookups return `None` and writes are accepted. Use it where user storage is
/// not under test.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn insert(&self, _user: &User) -> Result<(), UserRepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(None)
    }

    async fn find_by_username(
        &self,
        _username: &Username,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(None)
    }

    async fn save(&self, _user: &User, _expected_revision: u32) -> Result<(), UserRepositoryError> {
        Ok(())
    }
}
