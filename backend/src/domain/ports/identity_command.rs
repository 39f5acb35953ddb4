//! Driving port for registration, login and profile use-cases.
//!
//! Inbound adapters call it to manage accounts without knowing the backing
//! infrastructure, so HTTP handler tests can substitute a test double.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, Registration, SessionContext, UserId, UserProfile};

/// Domain use-case port for account management.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityCommand: Send + Sync {
    /// Register a regular user.
    ///
    /// Fails with `Rejected(duplicate-username)` when the username is taken
    /// and `Rejected(credential-mismatch)` when the confirmation differs.
    async fn register(&self, registration: &Registration) -> Result<UserId, Error>;

    /// Verify credentials and resolve the caller's session context.
    ///
    /// Unknown usernames and wrong passwords both fail with
    /// `Rejected(invalid-credentials)`.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<SessionContext, Error>;

    /// Public profile of `user_id`, visible to the owner and administrators.
    async fn profile(&self, ctx: &SessionContext, user_id: &UserId) -> Result<UserProfile, Error>;
}
