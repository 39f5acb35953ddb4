//! The application ledger: the only writer of application records.
//!
//! An application is stored twice, once on the applicant's [`User`] and once
//! on the [`JobPosting`]. Storage offers no multi-record transaction, so the
//! ledger keeps both halves in agreement itself:
//!
//! - every operation on a (user, posting) pair holds that pair's guard from
//!   [`LedgerLocks`] for its whole duration;
//! - each half is written with compare-and-swap on its revision, posting
//!   first and user second;
//! - when the second write fails the first is undone. A failed undo is
//!   logged as an `internal_consistency` alert and surfaced as
//!   [`crate::domain::ErrorCode::InconsistentState`].
//!
//! Read projections never report a half-written pair: entries whose halves
//! disagree are re-read under the pair guard and dropped, with an alert, if
//! they still disagree.

mod edits;
mod locks;
mod retry;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::domain::authorization::{
    require_applicant, require_owner, require_owner_or_admin, require_role,
};
use crate::domain::ports::{
    ApplicationCommand, ApplicationQuery, PostingRepository, PostingRepositoryError,
    UserRepository,
};
use crate::domain::{
    ApplicantRef, ApplicationRef, ApplicationStatus, Error, JobPosting, PostingId, PostingStatus,
    RejectionReason, Role, SessionContext, StatusTransition, User, UserId, UserProfile,
};

use self::edits::{Edit, report_drift};
pub use self::locks::{LedgerLocks, PairGuard, PostingGuard};
pub use self::retry::{
    DEFAULT_LOCK_TIMEOUT, DEFAULT_LOCK_TIMEOUT_MS, DEFAULT_MAX_ATTEMPTS, RetryPolicy,
};

/// A posting the user applied to, with the application's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationView {
    pub posting: JobPosting,
    pub status: ApplicationStatus,
}

/// An applicant of a posting, with the application's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicantView {
    pub user: UserProfile,
    pub status: ApplicationStatus,
}

/// State of one (user, posting) pair as seen from both halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PairState {
    Absent,
    Present(ApplicationStatus),
    Diverged,
}

fn pair_state(user: &User, posting: &JobPosting) -> PairState {
    match (user.application(&posting.id), posting.applicant(&user.id)) {
        (None, None) => PairState::Absent,
        (Some(held), Some(listed)) if held.status == listed.status => {
            PairState::Present(held.status)
        }
        _ => PairState::Diverged,
    }
}

fn remove_applicant(posting: &mut JobPosting, user_id: &UserId) -> Edit {
    let before = posting.applicants.len();
    posting.applicants.retain(|entry| entry.user_id != *user_id);
    if posting.applicants.len() == before {
        Edit::Skip
    } else {
        Edit::Apply
    }
}

fn insert_applicant(posting: &mut JobPosting, entry: ApplicantRef) -> Edit {
    if posting.has_applicant(&entry.user_id) {
        Edit::Skip
    } else {
        posting.applicants.push(entry);
        Edit::Apply
    }
}

fn set_applicant(posting: &mut JobPosting, user_id: &UserId, status: ApplicationStatus) -> Edit {
    match posting
        .applicants
        .iter_mut()
        .find(|entry| entry.user_id == *user_id)
    {
        Some(entry) if entry.status != status => {
            entry.status = status;
            Edit::Apply
        }
        _ => Edit::Skip,
    }
}

/// Ledger service implementing [`ApplicationCommand`] and [`ApplicationQuery`].
pub struct ApplicationLedger<U, P> {
    users: Arc<U>,
    postings: Arc<P>,
    locks: Arc<LedgerLocks>,
    policy: RetryPolicy,
}

impl<U, P> Clone for ApplicationLedger<U, P> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            postings: Arc::clone(&self.postings),
            locks: Arc::clone(&self.locks),
            policy: self.policy,
        }
    }
}

impl<U, P> ApplicationLedger<U, P> {
    /// Create a ledger over the given repositories.
    pub fn new(users: Arc<U>, postings: Arc<P>, policy: RetryPolicy) -> Self {
        Self {
            users,
            postings,
            locks: Arc::new(LedgerLocks::new(policy.lock_timeout())),
            policy,
        }
    }

    /// Lock table shared by clones of this ledger.
    pub fn locks(&self) -> &Arc<LedgerLocks> {
        &self.locks
    }
}

impl<U, P> ApplicationLedger<U, P>
where
    U: UserRepository,
    P: PostingRepository,
{
    async fn load_user(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| Error::not_found("user not found"))
    }

    /// Undo a posting-side write after the user-side write failed.
    ///
    /// Returns `cause` when the undo succeeds and an inconsistent-state error
    /// when it does not.
    async fn compensate<F>(
        &self,
        user_id: &UserId,
        posting_id: &PostingId,
        cause: Error,
        undo: F,
    ) -> Error
    where
        F: FnMut(&mut JobPosting) -> Result<Edit, Error> + Send,
    {
        match self.edit_posting(posting_id, undo).await {
            Ok(_) => {
                debug!(%user_id, %posting_id, "posting-side write rolled back");
                cause
            }
            Err(undo_error) => {
                error!(
                    alert = "internal_consistency",
                    %user_id,
                    %posting_id,
                    cause = %cause,
                    undo_error = %undo_error,
                    "failed to roll back posting-side application write"
                );
                Error::inconsistent_state("application records are inconsistent")
            }
        }
    }

    /// Re-read a pair under its guard.
    ///
    /// Returns the settled status, `None` when the pair no longer exists, and
    /// `None` with an alert when the halves still disagree.
    async fn settle_pair(
        &self,
        user_id: &UserId,
        posting_id: &PostingId,
    ) -> Result<Option<(User, JobPosting, ApplicationStatus)>, Error> {
        let _guard = self.locks.pair(*user_id, *posting_id).await?;
        let user = self.users.find_by_id(user_id).await?;
        let posting = self.postings.find_by_id(posting_id).await?;
        let (Some(user), Some(posting)) = (user, posting) else {
            return Ok(None);
        };
        match pair_state(&user, &posting) {
            PairState::Present(status) => Ok(Some((user, posting, status))),
            PairState::Absent => Ok(None),
            PairState::Diverged => {
                error!(
                    alert = "internal_consistency",
                    %user_id,
                    %posting_id,
                    "omitting application whose halves disagree"
                );
                Ok(None)
            }
        }
    }

    /// Delete a posting together with every application on it.
    ///
    /// Waits for in-flight pair operations on the posting, clears the
    /// user-side halves, then deletes the posting under compare-and-swap.
    /// When the delete cannot complete the cleared halves are restored.
    /// Callers are responsible for authorization.
    ///
    /// # Errors
    /// [`crate::domain::ErrorCode::NotFound`] when the posting does not exist,
    /// [`crate::domain::ErrorCode::ServiceUnavailable`] on lock timeout or
    /// retry exhaustion, and
    /// [`crate::domain::ErrorCode::InconsistentState`] when restoring the
    /// cleared halves fails.
    pub async fn remove_posting(&self, posting_id: &PostingId) -> Result<(), Error> {
        let _guard = self.locks.posting_exclusive(*posting_id).await?;
        let mut cleared = Vec::new();
        match self.clear_and_delete(posting_id, &mut cleared).await {
            Ok(()) => {
                info!(%posting_id, applicants = cleared.len(), "job posting deleted");
                Ok(())
            }
            Err(cause) => Err(self.restore_cleared(posting_id, &cleared, cause).await),
        }
    }

    async fn clear_and_delete(
        &self,
        posting_id: &PostingId,
        cleared: &mut Vec<ApplicantRef>,
    ) -> Result<(), Error> {
        let attempts = self.policy.max_attempts();
        let mut visited: Vec<UserId> = Vec::new();
        for attempt in 1..=attempts {
            let Some(posting) = self.postings.find_by_id(posting_id).await? else {
                return if attempt == 1 {
                    Err(Error::not_found("job posting not found"))
                } else {
                    Ok(())
                };
            };

            for applicant in &posting.applicants {
                if visited.contains(&applicant.user_id) {
                    continue;
                }
                let mut removed = None;
                let outcome = self
                    .edit_user(&applicant.user_id, |user| {
                        removed = user.application(posting_id).copied();
                        if removed.is_none() {
                            return Ok(Edit::Skip);
                        }
                        user.applications
                            .retain(|entry| entry.posting_id != *posting_id);
                        Ok(Edit::Apply)
                    })
                    .await?;
                visited.push(applicant.user_id);
                match (outcome, removed) {
                    (None, _) => warn!(
                        user_id = %applicant.user_id,
                        %posting_id,
                        "applicant account missing while deleting posting"
                    ),
                    (Some(_), Some(entry)) => cleared.push(ApplicantRef {
                        user_id: applicant.user_id,
                        status: entry.status,
                    }),
                    (Some(_), None) => {}
                }
            }

            match self.postings.delete(posting_id, posting.revision).await {
                Ok(()) | Err(PostingRepositoryError::Missing { .. }) => return Ok(()),
                Err(PostingRepositoryError::RevisionMismatch { expected, actual }) => {
                    debug!(
                        %posting_id,
                        attempt,
                        expected,
                        actual,
                        "job posting changed; retrying delete"
                    );
                }
                Err(other) => return Err(other.into()),
            }
        }
        Err(Error::service_unavailable(
            "job posting is being modified concurrently; retry later",
        ))
    }

    async fn restore_cleared(
        &self,
        posting_id: &PostingId,
        cleared: &[ApplicantRef],
        cause: Error,
    ) -> Error {
        for entry in cleared {
            let restored = self
                .edit_user(&entry.user_id, |user| {
                    if user.application(posting_id).is_some() {
                        return Ok(Edit::Skip);
                    }
                    user.applications.push(ApplicationRef {
                        posting_id: *posting_id,
                        status: entry.status,
                    });
                    Ok(Edit::Apply)
                })
                .await;
            if let Err(restore_error) = restored {
                error!(
                    alert = "internal_consistency",
                    user_id = %entry.user_id,
                    %posting_id,
                    cause = %cause,
                    restore_error = %restore_error,
                    "failed to restore application after aborted posting delete"
                );
                return Error::inconsistent_state("application records are inconsistent");
            }
        }
        cause
    }
}

#[async_trait]
impl<U, P> ApplicationCommand for ApplicationLedger<U, P>
where
    U: UserRepository,
    P: PostingRepository,
{
    async fn apply(
        &self,
        ctx: &SessionContext,
        user_id: &UserId,
        posting_id: &PostingId,
    ) -> Result<(), Error> {
        require_applicant(ctx)?;
        require_owner(ctx, user_id)?;

        let _guard = self.locks.pair(*user_id, *posting_id).await?;
        let user = self.load_user(user_id).await?;
        let Some(posting) = self.postings.find_by_id(posting_id).await? else {
            return Err(Error::rejected(RejectionReason::NotAvailable));
        };
        if posting.status != PostingStatus::Active {
            return Err(Error::rejected(RejectionReason::NotAvailable));
        }
        match pair_state(&user, &posting) {
            PairState::Absent => {}
            PairState::Present(_) => return Err(Error::rejected(RejectionReason::Duplicate)),
            PairState::Diverged => {
                return Err(report_drift(user_id, posting_id, "apply found a one-sided record"));
            }
        }

        let entry = ApplicantRef {
            user_id: *user_id,
            status: ApplicationStatus::Pending,
        };
        let listed = self
            .edit_posting(posting_id, |posting| {
                if posting.status != PostingStatus::Active {
                    return Err(Error::rejected(RejectionReason::NotAvailable));
                }
                if posting.has_applicant(user_id) {
                    return Err(Error::rejected(RejectionReason::Duplicate));
                }
                posting.applicants.push(entry);
                Ok(Edit::Apply)
            })
            .await?;
        if listed.is_none() {
            return Err(Error::rejected(RejectionReason::NotAvailable));
        }

        let held = self
            .edit_user(user_id, |user| {
                if user.application(posting_id).is_some() {
                    return Ok(Edit::Skip);
                }
                user.applications.push(ApplicationRef {
                    posting_id: *posting_id,
                    status: ApplicationStatus::Pending,
                });
                Ok(Edit::Apply)
            })
            .await;
        let cause = match held {
            Ok(Some(_)) => {
                info!(%user_id, %posting_id, "application recorded");
                return Ok(());
            }
            Ok(None) => Error::not_found("user not found"),
            Err(err) => err,
        };
        Err(self
            .compensate(user_id, posting_id, cause, |posting| {
                Ok(remove_applicant(posting, user_id))
            })
            .await)
    }

    async fn withdraw(
        &self,
        ctx: &SessionContext,
        user_id: &UserId,
        posting_id: &PostingId,
    ) -> Result<(), Error> {
        require_owner_or_admin(ctx, user_id)?;

        let _guard = self.locks.pair(*user_id, *posting_id).await?;
        let user = self.load_user(user_id).await?;
        let Some(posting) = self.postings.find_by_id(posting_id).await? else {
            if user.application(posting_id).is_some() {
                return Err(report_drift(user_id, posting_id, "application on a missing posting"));
            }
            return Err(Error::not_found("application not found"));
        };
        let prior = match pair_state(&user, &posting) {
            PairState::Absent => return Err(Error::not_found("application not found")),
            PairState::Present(status) => status,
            PairState::Diverged => {
                return Err(report_drift(user_id, posting_id, "withdraw found a one-sided record"));
            }
        };

        self.edit_posting(posting_id, |posting| Ok(remove_applicant(posting, user_id)))
            .await?;

        let released = self
            .edit_user(user_id, |user| {
                if user.application(posting_id).is_none() {
                    return Ok(Edit::Skip);
                }
                user.applications
                    .retain(|entry| entry.posting_id != *posting_id);
                Ok(Edit::Apply)
            })
            .await;
        let cause = match released {
            Ok(Some(_)) => {
                info!(%user_id, %posting_id, "application withdrawn");
                return Ok(());
            }
            Ok(None) => Error::not_found("user not found"),
            Err(err) => err,
        };
        let entry = ApplicantRef {
            user_id: *user_id,
            status: prior,
        };
        Err(self
            .compensate(user_id, posting_id, cause, |posting| {
                Ok(insert_applicant(posting, entry))
            })
            .await)
    }

    async fn set_applicant_status(
        &self,
        ctx: &SessionContext,
        posting_id: &PostingId,
        user_id: &UserId,
        status: ApplicationStatus,
    ) -> Result<(), Error> {
        require_role(ctx, Role::Administrator)?;

        let _guard = self.locks.pair(*user_id, *posting_id).await?;
        let Some(posting) = self.postings.find_by_id(posting_id).await? else {
            return Err(Error::not_found("job posting not found"));
        };
        let user = self.load_user(user_id).await?;
        let prior = match pair_state(&user, &posting) {
            PairState::Absent => return Err(Error::not_found("application not found")),
            PairState::Present(current) => current,
            PairState::Diverged => {
                return Err(report_drift(user_id, posting_id, "status change found a one-sided record"));
            }
        };
        match prior.transition_to(status) {
            StatusTransition::Unchanged => return Ok(()),
            StatusTransition::Forbidden => {
                return Err(Error::rejected(RejectionReason::InvalidTransition));
            }
            StatusTransition::Change => {}
        }

        let listed = self
            .edit_posting(posting_id, |posting| Ok(set_applicant(posting, user_id, status)))
            .await?;
        if listed.is_none() {
            return Err(Error::not_found("job posting not found"));
        }

        let held = self
            .edit_user(user_id, |user| {
                match user
                    .applications
                    .iter_mut()
                    .find(|entry| entry.posting_id == *posting_id)
                {
                    Some(entry) if entry.status != status => {
                        entry.status = status;
                        Ok(Edit::Apply)
                    }
                    _ => Ok(Edit::Skip),
                }
            })
            .await;
        let cause = match held {
            Ok(Some(_)) => {
                info!(%user_id, %posting_id, %status, "application status changed");
                return Ok(());
            }
            Ok(None) => Error::not_found("user not found"),
            Err(err) => err,
        };
        Err(self
            .compensate(user_id, posting_id, cause, |posting| {
                Ok(set_applicant(posting, user_id, prior))
            })
            .await)
    }
}

#[async_trait]
impl<U, P> ApplicationQuery for ApplicationLedger<U, P>
where
    U: UserRepository,
    P: PostingRepository,
{
    async fn applications_for(
        &self,
        ctx: &SessionContext,
        user_id: &UserId,
    ) -> Result<Vec<ApplicationView>, Error> {
        require_owner_or_admin(ctx, user_id)?;
        let user = self.load_user(user_id).await?;

        let mut views = Vec::with_capacity(user.applications.len());
        for entry in &user.applications {
            let posting = self.postings.find_by_id(&entry.posting_id).await?;
            let settled = posting
                .filter(|posting| {
                    posting
                        .applicant(user_id)
                        .is_some_and(|listed| listed.status == entry.status)
                })
                .map(|posting| (posting, entry.status));
            let view = match settled {
                Some(found) => Some(found),
                None => self
                    .settle_pair(user_id, &entry.posting_id)
                    .await?
                    .map(|(_, posting, status)| (posting, status)),
            };
            if let Some((posting, status)) = view {
                views.push(ApplicationView { posting, status });
            }
        }
        Ok(views)
    }

    async fn applicants_for(
        &self,
        ctx: &SessionContext,
        posting_id: &PostingId,
    ) -> Result<Vec<ApplicantView>, Error> {
        require_role(ctx, Role::Administrator)?;
        let Some(posting) = self.postings.find_by_id(posting_id).await? else {
            return Err(Error::not_found("job posting not found"));
        };

        let mut views = Vec::with_capacity(posting.applicants.len());
        for entry in &posting.applicants {
            let user = self.users.find_by_id(&entry.user_id).await?;
            let settled = user
                .filter(|user| {
                    user.application(posting_id)
                        .is_some_and(|held| held.status == entry.status)
                })
                .map(|user| (user, entry.status));
            let view = match settled {
                Some(found) => Some(found),
                None => self
                    .settle_pair(&entry.user_id, posting_id)
                    .await?
                    .map(|(user, _, status)| (user, status)),
            };
            if let Some((user, status)) = view {
                views.push(ApplicantView {
                    user: user.profile(),
                    status,
                });
            }
        }
        Ok(views)
    }
}
