//! Driving ports for managing and browsing job postings.

use async_trait::async_trait;

use crate::domain::{
    Error, JobPosting, NewPosting, PostingId, PostingPatch, PostingStatus, SessionContext, UserId,
};

/// Listing filter for [`PostingQuery::list_postings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostingFilter {
    /// Only return postings with this status.
    pub status: PostingStatus,
    /// Hide postings this user already applied to.
    pub exclude_applied_by: Option<UserId>,
}

impl PostingFilter {
    /// Filter for active postings.
    pub const fn active() -> Self {
        Self {
            status: PostingStatus::Active,
            exclude_applied_by: None,
        }
    }
}

/// Administrator mutations on postings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostingCommand: Send + Sync {
    /// Create a posting; administrators only.
    async fn create_posting(
        &self,
        ctx: &SessionContext,
        posting: NewPosting,
    ) -> Result<JobPosting, Error>;

    /// Apply a partial update; administrators only.
    async fn update_posting(
        &self,
        ctx: &SessionContext,
        id: &PostingId,
        patch: PostingPatch,
    ) -> Result<JobPosting, Error>;

    /// Delete a posting and every application on it; administrators only.
    async fn delete_posting(&self, ctx: &SessionContext, id: &PostingId) -> Result<(), Error>;
}

/// Read access to postings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostingQuery: Send + Sync {
    /// List postings matching `filter`.
    async fn list_postings(
        &self,
        ctx: &SessionContext,
        filter: PostingFilter,
    ) -> Result<Vec<JobPosting>, Error>;

    /// Fetch one posting.
    async fn get_posting(&self, ctx: &SessionContext, id: &PostingId) -> Result<JobPosting, Error>;
}
