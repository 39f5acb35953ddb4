//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    ApplicationCommand, ApplicationQuery, IdentityCommand, PostingCommand, PostingQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub identity: Arc<dyn IdentityCommand>,
    pub postings: Arc<dyn PostingCommand>,
    pub postings_query: Arc<dyn PostingQuery>,
    pub applications: Arc<dyn ApplicationCommand>,
    pub applications_query: Arc<dyn ApplicationQuery>,
}

impl HttpState {
    /// Construct state from services implementing both halves of a port pair.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use jobboard::domain::{ApplicationLedger, IdentityService, PostingService, RetryPolicy};
    /// use jobboard::domain::ports::FixtureCredentialHasher;
    /// use jobboard::inbound::http::state::HttpState;
    /// use jobboard::outbound::memory::{MemoryPostingRepository, MemoryUserRepository};
    ///
    /// let users = Arc::new(MemoryUserRepository::default());
    /// let postings = Arc::new(MemoryPostingRepository::default());
    /// let policy = RetryPolicy::default();
    /// let ledger = ApplicationLedger::new(users.clone(), postings.clone(), policy);
    /// let state = HttpState::from_services(
    ///     Arc::new(IdentityService::new(users, Arc::new(FixtureCredentialHasher))),
    ///     Arc::new(PostingService::new(postings, ledger.clone(), policy)),
    ///     Arc::new(ledger),
    /// );
    /// let _identity = state.identity.clone();
    /// ```
    pub fn from_services<I, P, A>(identity: Arc<I>, postings: Arc<P>, ledger: Arc<A>) -> Self
    where
        I: IdentityCommand + 'static,
        P: PostingCommand + PostingQuery + 'static,
        A: ApplicationCommand + ApplicationQuery + 'static,
    {
        Self {
            identity,
            postings: postings.clone(),
            postings_query: postings,
            applications: ledger.clone(),
            applications_query: ledger,
        }
    }
}
