//! Compare-and-swap edit loops over a single stored record.
//!
//! Each loop re-reads the record, re-applies the edit and saves against the
//! revision it read. A revision conflict restarts the loop; after
//! [`RetryPolicy::max_attempts`](super::RetryPolicy::max_attempts) attempts
//! the edit fails as a transient storage error.

use tracing::{debug, error};

use crate::domain::ports::{
    PostingRepository, PostingRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{Error, JobPosting, PostingId, User, UserId};

use super::ApplicationLedger;

/// Whether an edit closure changed the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Edit {
    Apply,
    Skip,
}

fn next_revision(current: u32) -> Result<u32, Error> {
    current
        .checked_add(1)
        .ok_or_else(|| Error::internal("record revision overflowed"))
}

fn exhausted(kind: &str, id: &str, attempts: u32) -> Error {
    debug!(kind, id, attempts, "compare-and-swap retries exhausted");
    Error::service_unavailable(format!("{kind} is being modified concurrently; retry later"))
}

/// Log a detected divergence between the two halves of an application and
/// build the error surfaced to the caller.
pub(super) fn report_drift(user_id: &UserId, posting_id: &PostingId, detail: &str) -> Error {
    error!(
        alert = "internal_consistency",
        %user_id,
        %posting_id,
        detail,
        "application ledger halves disagree"
    );
    Error::inconsistent_state("application records are inconsistent")
}

impl<U, P> ApplicationLedger<U, P>
where
    U: UserRepository,
    P: PostingRepository,
{
    /// Edit a posting under compare-and-swap.
    ///
    /// Returns `Ok(None)` when the posting does not exist (or vanished during
    /// the edit) and the stored record otherwise.
    pub(super) async fn edit_posting<F>(
        &self,
        id: &PostingId,
        mut edit: F,
    ) -> Result<Option<JobPosting>, Error>
    where
        F: FnMut(&mut JobPosting) -> Result<Edit, Error> + Send,
    {
        let attempts = self.policy.max_attempts();
        for attempt in 1..=attempts {
            let Some(mut posting) = self.postings.find_by_id(id).await? else {
                return Ok(None);
            };
            let expected = posting.revision;
            if edit(&mut posting)? == Edit::Skip {
                return Ok(Some(posting));
            }
            posting.revision = next_revision(expected)?;
            match self.postings.save(&posting, expected).await {
                Ok(()) => return Ok(Some(posting)),
                Err(PostingRepositoryError::RevisionMismatch { expected, actual }) => {
                    debug!(%id, attempt, expected, actual, "job posting changed; retrying");
                }
                Err(PostingRepositoryError::Missing { .. }) => return Ok(None),
                Err(other) => return Err(other.into()),
            }
        }
        Err(exhausted("job posting", &id.to_string(), attempts))
    }

    /// Edit a user under compare-and-swap; see [`Self::edit_posting`].
    pub(super) async fn edit_user<F>(&self, id: &UserId, mut edit: F) -> Result<Option<User>, Error>
    where
        F: FnMut(&mut User) -> Result<Edit, Error> + Send,
    {
        let attempts = self.policy.max_attempts();
        for attempt in 1..=attempts {
            let Some(mut user) = self.users.find_by_id(id).await? else {
                return Ok(None);
            };
            let expected = user.revision;
            if edit(&mut user)? == Edit::Skip {
                return Ok(Some(user));
            }
            user.revision = next_revision(expected)?;
            match self.users.save(&user, expected).await {
                Ok(()) => return Ok(Some(user)),
                Err(UserRepositoryError::RevisionMismatch { expected, actual }) => {
                    debug!(%id, attempt, expected, actual, "user changed; retrying");
                }
                Err(UserRepositoryError::Missing { .. }) => return Ok(None),
                Err(other) => return Err(other.into()),
            }
        }
        Err(exhausted("user", &id.to_string(), attempts))
    }
}
