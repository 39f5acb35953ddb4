//! Role and ownership predicates gating core operations.
//!
//! The gate is stateless. Every predicate fails with
//! [`ErrorCode::Forbidden`] except [`require_applicant`], whose refusal is the
//! `role-forbidden` rejection callers see when an administrator tries to apply.
//!
//! [`ErrorCode::Forbidden`]: super::ErrorCode::Forbidden

use super::{Error, RejectionReason, Role, SessionContext, UserId};

/// Require the caller to hold `role`.
///
/// # Examples
/// ```
/// use jobboard::domain::authorization::require_role;
/// use jobboard::domain::{Role, SessionContext, UserId};
///
/// let ctx = SessionContext::new(UserId::random(), Role::Regular);
/// assert!(require_role(&ctx, Role::Regular).is_ok());
/// assert!(require_role(&ctx, Role::Administrator).is_err());
/// ```
pub fn require_role(ctx: &SessionContext, role: Role) -> Result<(), Error> {
    if ctx.role == role {
        Ok(())
    } else {
        Err(Error::forbidden(format!("{role} role required")))
    }
}

/// Require the caller to be `owner` or an administrator.
pub fn require_owner_or_admin(ctx: &SessionContext, owner: &UserId) -> Result<(), Error> {
    if ctx.user_id == *owner || ctx.is_administrator() {
        Ok(())
    } else {
        Err(Error::forbidden("access restricted to the owner or administrators"))
    }
}

/// Require the caller to hold the role allowed to apply to postings.
pub fn require_applicant(ctx: &SessionContext) -> Result<(), Error> {
    if ctx.role == Role::Regular {
        Ok(())
    } else {
        Err(Error::rejected(RejectionReason::RoleForbidden))
    }
}

/// Require the caller to be exactly `owner`.
pub fn require_owner(ctx: &SessionContext, owner: &UserId) -> Result<(), Error> {
    if ctx.user_id == *owner {
        Ok(())
    } else {
        Err(Error::forbidden("access restricted to the owner"))
    }
}
