//! Wiring of repositories and services into [`HttpState`].

use std::sync::Arc;

use actix_web::web;
use tracing::info;

use crate::domain::ports::{CredentialHasher, PostingRepository, UserRepository};
use crate::domain::{ApplicationLedger, IdentityService, PostingService, RetryPolicy};
use crate::inbound::http::state::HttpState;
use crate::outbound::credentials::BcryptHasher;
use crate::outbound::memory::{MemoryPostingRepository, MemoryUserRepository};
use crate::outbound::persistence::{DieselPostingRepository, DieselUserRepository};

use super::ServerConfig;

/// Assemble the identity, posting and ledger services over one pair of
/// repositories.
///
/// The posting service shares the ledger (and therefore its lock table) so
/// deletion cascades serialize with applications on the same posting.
pub fn services_over<U, P, H>(
    users: Arc<U>,
    postings: Arc<P>,
    hasher: Arc<H>,
    policy: RetryPolicy,
) -> HttpState
where
    U: UserRepository + 'static,
    P: PostingRepository + 'static,
    H: CredentialHasher + 'static,
{
    let ledger = ApplicationLedger::new(Arc::clone(&users), Arc::clone(&postings), policy);
    HttpState::from_services(
        Arc::new(IdentityService::new(users, hasher)),
        Arc::new(PostingService::new(postings, ledger.clone(), policy)),
        Arc::new(ledger),
    )
}

/// Build HTTP state from the server configuration.
///
/// Uses the PostgreSQL adapters when a pool is configured and the in-memory
/// stores otherwise.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let hasher = Arc::new(BcryptHasher::default());
    let state = match &config.db_pool {
        Some(pool) => {
            info!(storage = "postgres", "wiring job board services");
            services_over(
                Arc::new(DieselUserRepository::new(pool.clone())),
                Arc::new(DieselPostingRepository::new(pool.clone())),
                hasher,
                config.retry_policy,
            )
        }
        None => {
            info!(storage = "memory", "wiring job board services");
            services_over(
                Arc::new(MemoryUserRepository::default()),
                Arc::new(MemoryPostingRepository::default()),
                hasher,
                config.retry_policy,
            )
        }
    };
    web::Data::new(state)
}
