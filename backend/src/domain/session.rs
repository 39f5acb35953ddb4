//! Authenticated caller identity passed into every core operation.

use super::{Role, UserId};

/// The authenticated caller: who they are and which role they hold.
///
/// Adapters build this from their session store after authentication; core
/// operations receive it explicitly rather than reading ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
    pub user_id: UserId,
    pub role: Role,
}

impl SessionContext {
    /// Construct a context for the given user and role.
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Whether the caller is an administrator.
    pub fn is_administrator(&self) -> bool {
        self.role == Role::Administrator
    }
}
