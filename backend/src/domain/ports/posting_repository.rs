//! Port abstraction for persisting job postings.

use async_trait::async_trait;

use crate::domain::{Error, JobPosting, PostingId, PostingStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised when persisting or loading job postings.
    pub enum PostingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "posting repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "posting repository query failed: {message}",
        /// The posting to update or delete does not exist.
        Missing { id: String } => "job posting not found: {id}",
        /// Optimistic concurrency check failed.
        RevisionMismatch { expected: u32, actual: u32 } =>
            "revision mismatch: expected {expected}, found {actual}",
    }
}

impl From<PostingRepositoryError> for Error {
    fn from(error: PostingRepositoryError) -> Self {
        match error {
            PostingRepositoryError::Connection { message } => {
                tracing::warn!(%message, "posting storage unavailable");
                Error::service_unavailable("posting storage unavailable")
            }
            PostingRepositoryError::Query { message } => {
                Error::internal(format!("posting storage failure: {message}"))
            }
            PostingRepositoryError::Missing { .. } => Error::not_found("job posting not found"),
            PostingRepositoryError::RevisionMismatch { .. } => {
                Error::service_unavailable("job posting is being modified concurrently")
            }
        }
    }
}

/// Persistence contract for [`JobPosting`] records.
///
/// Updates and deletes are compare-and-swap on `revision`, mirroring
/// [`super::UserRepository`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostingRepository: Send + Sync {
    /// Insert a new posting.
    async fn insert(&self, posting: &JobPosting) -> Result<(), PostingRepositoryError>;

    /// Fetch a posting by identifier.
    async fn find_by_id(&self, id: &PostingId) -> Result<Option<JobPosting>, PostingRepositoryError>;

    /// List postings with the given status, oldest first.
    async fn list_by_status(
        &self,
        status: PostingStatus,
    ) -> Result<Vec<JobPosting>, PostingRepositoryError>;

    /// Replace a stored posting if its revision still equals `expected_revision`.
    async fn save(
        &self,
        posting: &JobPosting,
        expected_revision: u32,
    ) -> Result<(), PostingRepositoryError>;

    /// Delete a posting if its revision still equals `expected_revision`.
    async fn delete(
        &self,
        id: &PostingId,
        expected_revision: u32,
    ) -> Result<(), PostingRepositoryError>;
}
