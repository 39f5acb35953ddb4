//! Driving ports for the application ledger.

use async_trait::async_trait;

use crate::domain::{
    ApplicantView, ApplicationStatus, ApplicationView, Error, PostingId, SessionContext, UserId,
};

/// Mutations on (user, posting) application pairs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationCommand: Send + Sync {
    /// Apply `user_id` to `posting_id` with status pending.
    async fn apply(
        &self,
        ctx: &SessionContext,
        user_id: &UserId,
        posting_id: &PostingId,
    ) -> Result<(), Error>;

    /// Remove the application of `user_id` from `posting_id`.
    async fn withdraw(
        &self,
        ctx: &SessionContext,
        user_id: &UserId,
        posting_id: &PostingId,
    ) -> Result<(), Error>;

    /// Adjudicate an applicant; administrators only.
    async fn set_applicant_status(
        &self,
        ctx: &SessionContext,
        posting_id: &PostingId,
        user_id: &UserId,
        status: ApplicationStatus,
    ) -> Result<(), Error>;
}

/// Read projections over the application ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationQuery: Send + Sync {
    /// Postings `user_id` applied to, with their statuses.
    async fn applications_for(
        &self,
        ctx: &SessionContext,
        user_id: &UserId,
    ) -> Result<Vec<ApplicationView>, Error>;

    /// Applicants of `posting_id`, with their statuses; administrators only.
    async fn applicants_for(
        &self,
        ctx: &SessionContext,
        posting_id: &PostingId,
    ) -> Result<Vec<ApplicantView>, Error>;
}
