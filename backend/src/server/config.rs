//! HTTP server configuration object.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};

use crate::domain::RetryPolicy;
use crate::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) retry_policy: RetryPolicy,
}

impl ServerConfig {
    /// Construct a configuration backed by the in-memory stores.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Persist users and postings in PostgreSQL through `pool`.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Override the ledger's retry and lock limits.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Whether the database-backed adapters will be used.
    #[must_use]
    pub fn uses_database(&self) -> bool {
        self.db_pool.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    #[rstest]
    fn defaults_to_memory_storage() {
        let config = ServerConfig::new(
            Key::generate(),
            true,
            SameSite::Lax,
            SocketAddr::from(([127, 0, 0, 1], 0)),
        );
        assert!(!config.uses_database());
        assert_eq!(config.retry_policy, RetryPolicy::default());
    }

    #[rstest]
    fn retry_policy_can_be_overridden() {
        let policy = RetryPolicy::new(2, Duration::from_millis(10));
        let config = ServerConfig::new(
            Key::generate(),
            false,
            SameSite::Strict,
            SocketAddr::from(([127, 0, 0, 1], 9000)),
        )
        .with_retry_policy(policy);
        assert_eq!(config.retry_policy, policy);
        assert_eq!(config.bind_addr().port(), 9000);
    }
}
