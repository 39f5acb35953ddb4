//! Account registration, credential verification and profile lookup.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::authorization::require_owner_or_admin;
use crate::domain::ports::{CredentialHasher, IdentityCommand, UserRepository};
use crate::domain::{
    Error, LoginCredentials, Registration, RejectionReason, Role, SessionContext, User, UserId,
    UserProfile, Username,
};

/// Identity service implementing [`IdentityCommand`].
pub struct IdentityService<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
}

impl<U, H> Clone for IdentityService<U, H> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            hasher: Arc::clone(&self.hasher),
        }
    }
}

impl<U, H> IdentityService<U, H> {
    /// Create a new service with the given repository and hasher.
    pub fn new(users: Arc<U>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }
}

impl<U, H> IdentityService<U, H>
where
    U: UserRepository,
    H: CredentialHasher,
{
    /// Register an administrator account.
    ///
    /// Only the provisioning CLI calls this; no HTTP route reaches it.
    pub async fn register_administrator(&self, registration: &Registration) -> Result<UserId, Error> {
        self.create(registration, Role::Administrator).await
    }

    /// Check a username and password, returning the account's id.
    ///
    /// Unknown usernames and wrong passwords fail identically with
    /// `Rejected(invalid-credentials)`.
    pub async fn verify(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let invalid = || Error::rejected(RejectionReason::InvalidCredentials);
        let Ok(username) = Username::new(credentials.username()) else {
            return Err(invalid());
        };
        let Some(user) = self.users.find_by_username(&username).await? else {
            return Err(invalid());
        };
        if self
            .hasher
            .verify(credentials.password(), &user.credential_hash)
            .await?
        {
            Ok(user.id)
        } else {
            Err(invalid())
        }
    }

    /// Resolve the session context for a verified user.
    pub async fn session_for(&self, user_id: &UserId) -> Result<SessionContext, Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| Error::not_found("user not found"))?;
        Ok(SessionContext::new(user.id, user.role))
    }

    async fn create(&self, registration: &Registration, role: Role) -> Result<UserId, Error> {
        if self
            .users
            .find_by_username(registration.username())
            .await?
            .is_some()
        {
            return Err(Error::rejected(RejectionReason::DuplicateUsername));
        }
        if !registration.passwords_match() {
            return Err(Error::rejected(RejectionReason::CredentialMismatch));
        }

        let credential_hash = self.hasher.hash(registration.password()).await?;
        let user = User {
            id: UserId::random(),
            username: registration.username().clone(),
            credential_hash,
            display_name: registration.display_name().clone(),
            role,
            profile_links: registration.profile_links().clone(),
            applications: Vec::new(),
            revision: 1,
        };
        self.users.insert(&user).await?;
        info!(user_id = %user.id, %role, "account registered");
        Ok(user.id)
    }
}

#[async_trait]
impl<U, H> IdentityCommand for IdentityService<U, H>
where
    U: UserRepository,
    H: CredentialHasher,
{
    async fn register(&self, registration: &Registration) -> Result<UserId, Error> {
        self.create(registration, Role::Regular).await
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<SessionContext, Error> {
        let user_id = self.verify(credentials).await?;
        self.session_for(&user_id).await
    }

    async fn profile(&self, ctx: &SessionContext, user_id: &UserId) -> Result<UserProfile, Error> {
        require_owner_or_admin(ctx, user_id)?;
        self.users
            .find_by_id(user_id)
            .await?
            .map(|user| user.profile())
            .ok_or_else(|| Error::not_found("user not found"))
    }
}
