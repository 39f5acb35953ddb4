//! Job posting management and browsing.
//!
//! Postings are created, edited and deleted by administrators. Deletion is
//! delegated to the [`ApplicationLedger`] so every application on the posting
//! disappears with it.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::authorization::require_role;
use crate::domain::ports::{
    PostingCommand, PostingFilter, PostingQuery, PostingRepository, PostingRepositoryError,
    UserRepository,
};
use crate::domain::{
    ApplicationLedger, Error, JobPosting, NewPosting, PostingId, PostingPatch, PostingStatus,
    RetryPolicy, Role, SessionContext,
};

/// Posting service implementing [`PostingCommand`] and [`PostingQuery`].
pub struct PostingService<U, P> {
    postings: Arc<P>,
    ledger: ApplicationLedger<U, P>,
    policy: RetryPolicy,
}

impl<U, P> Clone for PostingService<U, P> {
    fn clone(&self) -> Self {
        Self {
            postings: Arc::clone(&self.postings),
            ledger: self.ledger.clone(),
            policy: self.policy,
        }
    }
}

impl<U, P> PostingService<U, P> {
    /// Create a service sharing `ledger`'s repositories and lock table.
    pub fn new(postings: Arc<P>, ledger: ApplicationLedger<U, P>, policy: RetryPolicy) -> Self {
        Self {
            postings,
            ledger,
            policy,
        }
    }
}

impl<U, P> PostingService<U, P>
where
    U: UserRepository,
    P: PostingRepository,
{
    async fn load(&self, id: &PostingId) -> Result<JobPosting, Error> {
        self.postings
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("job posting not found"))
    }
}

#[async_trait]
impl<U, P> PostingCommand for PostingService<U, P>
where
    U: UserRepository,
    P: PostingRepository,
{
    async fn create_posting(
        &self,
        ctx: &SessionContext,
        posting: NewPosting,
    ) -> Result<JobPosting, Error> {
        require_role(ctx, Role::Administrator)?;
        let record = JobPosting {
            id: PostingId::random(),
            company: posting.company,
            location: posting.location,
            title: posting.title,
            description: posting.description,
            status: posting.status,
            applicants: Vec::new(),
            revision: 1,
        };
        self.postings.insert(&record).await?;
        info!(posting_id = %record.id, status = %record.status, "job posting created");
        Ok(record)
    }

    async fn update_posting(
        &self,
        ctx: &SessionContext,
        id: &PostingId,
        patch: PostingPatch,
    ) -> Result<JobPosting, Error> {
        require_role(ctx, Role::Administrator)?;
        let attempts = self.policy.max_attempts();
        for attempt in 1..=attempts {
            let mut posting = self.load(id).await?;
            if patch.is_empty() {
                return Ok(posting);
            }
            let expected = posting.revision;
            patch.apply_to(&mut posting);
            posting.revision = expected
                .checked_add(1)
                .ok_or_else(|| Error::internal("record revision overflowed"))?;
            match self.postings.save(&posting, expected).await {
                Ok(()) => {
                    info!(posting_id = %id, "job posting updated");
                    return Ok(posting);
                }
                Err(PostingRepositoryError::RevisionMismatch { expected, actual }) => {
                    debug!(
                        posting_id = %id,
                        attempt,
                        expected,
                        actual,
                        "job posting changed; retrying update"
                    );
                }
                Err(other) => return Err(other.into()),
            }
        }
        Err(Error::service_unavailable(
            "job posting is being modified concurrently; retry later",
        ))
    }

    async fn delete_posting(&self, ctx: &SessionContext, id: &PostingId) -> Result<(), Error> {
        require_role(ctx, Role::Administrator)?;
        self.ledger.remove_posting(id).await
    }
}

#[async_trait]
impl<U, P> PostingQuery for PostingService<U, P>
where
    U: UserRepository,
    P: PostingRepository,
{
    async fn list_postings(
        &self,
        ctx: &SessionContext,
        filter: PostingFilter,
    ) -> Result<Vec<JobPosting>, Error> {
        if filter.status == PostingStatus::Inactive {
            require_role(ctx, Role::Administrator)?;
        }
        if filter
            .exclude_applied_by
            .is_some_and(|applicant| applicant != ctx.user_id)
        {
            require_role(ctx, Role::Administrator)?;
        }

        let mut postings = self.postings.list_by_status(filter.status).await?;
        if let Some(applicant) = filter.exclude_applied_by {
            postings.retain(|posting| !posting.has_applicant(&applicant));
        }
        Ok(postings)
    }

    async fn get_posting(&self, ctx: &SessionContext, id: &PostingId) -> Result<JobPosting, Error> {
        let posting = self.load(id).await?;
        let visible = posting.status == PostingStatus::Active
            || ctx.is_administrator()
            || posting.has_applicant(&ctx.user_id);
        if visible {
            Ok(posting)
        } else {
            Err(Error::not_found("job posting not found"))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{FixtureUserRepository, MockPostingRepository};
    use crate::domain::{ApplicantRef, ApplicationStatus, ErrorCode, PostingPatchInput, UserId};
    use rstest::{fixture, rstest};

    type Service = PostingService<FixtureUserRepository, MockPostingRepository>;

    fn service(repo: MockPostingRepository) -> Service {
        let postings = Arc::new(repo);
        let policy = RetryPolicy::default();
        let ledger =
            ApplicationLedger::new(Arc::new(FixtureUserRepository), Arc::clone(&postings), policy);
        PostingService::new(postings, ledger, policy)
    }

    fn posting(status: PostingStatus) -> JobPosting {
        JobPosting {
            id: PostingId::random(),
            company: "Acme".into(),
            location: "Remote".into(),
            title: "Engineer".into(),
            description: Some("Build things".into()),
            status,
            applicants: Vec::new(),
            revision: 4,
        }
    }

    #[fixture]
    fn admin() -> SessionContext {
        SessionContext::new(UserId::random(), Role::Administrator)
    }

    #[fixture]
    fn regular() -> SessionContext {
        SessionContext::new(UserId::random(), Role::Regular)
    }

    #[rstest]
    #[tokio::test]
    async fn create_assigns_id_and_first_revision(admin: SessionContext) {
        let mut repo = MockPostingRepository::new();
        repo.expect_insert().times(1).returning(|_| Ok(()));
        let new = NewPosting::try_new("Acme", "Remote", "Engineer", None).expect("valid posting");

        let created = service(repo)
            .create_posting(&admin, new)
            .await
            .expect("create succeeds");

        assert_eq!(created.revision, 1);
        assert_eq!(created.status, PostingStatus::Active);
        assert!(created.applicants.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn regular_users_cannot_create(regular: SessionContext) {
        let new = NewPosting::try_new("Acme", "Remote", "Engineer", None).expect("valid posting");
        let err = service(MockPostingRepository::new())
            .create_posting(&regular, new)
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn update_retries_after_a_revision_conflict(admin: SessionContext) {
        let stored = posting(PostingStatus::Active);
        let id = stored.id;
        let mut repo = MockPostingRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        let mut first = true;
        repo.expect_save().times(2).returning(move |saved, expected| {
            assert_eq!(saved.revision, expected + 1);
            if std::mem::take(&mut first) {
                Err(PostingRepositoryError::revision_mismatch(expected, expected + 1))
            } else {
                Ok(())
            }
        });
        let patch = PostingPatch::try_from_input(PostingPatchInput {
            status: Some(PostingStatus::Inactive),
            ..PostingPatchInput::default()
        })
        .expect("valid patch");

        let updated = service(repo)
            .update_posting(&admin, &id, patch)
            .await
            .expect("update succeeds");

        assert_eq!(updated.status, PostingStatus::Inactive);
        assert_eq!(updated.revision, 5);
        assert_eq!(updated.title, "Engineer");
    }

    #[rstest]
    #[tokio::test]
    async fn update_of_missing_posting_is_not_found(admin: SessionContext) {
        let mut repo = MockPostingRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        let patch = PostingPatch::try_from_input(PostingPatchInput {
            title: Some("Staff Engineer"),
            ..PostingPatchInput::default()
        })
        .expect("valid patch");

        let err = service(repo)
            .update_posting(&admin, &PostingId::random(), patch)
            .await
            .expect_err("missing");

        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn only_administrators_list_inactive_postings(regular: SessionContext) {
        let filter = PostingFilter {
            status: PostingStatus::Inactive,
            exclude_applied_by: None,
        };
        let err = service(MockPostingRepository::new())
            .list_postings(&regular, filter)
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn regular_users_may_only_exclude_their_own_applications(regular: SessionContext) {
        let filter = PostingFilter {
            status: PostingStatus::Active,
            exclude_applied_by: Some(UserId::random()),
        };
        let err = service(MockPostingRepository::new())
            .list_postings(&regular, filter)
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn unapplied_listing_hides_applied_postings(regular: SessionContext) {
        let mut applied = posting(PostingStatus::Active);
        applied.applicants.push(ApplicantRef {
            user_id: regular.user_id,
            status: ApplicationStatus::Pending,
        });
        let open = posting(PostingStatus::Active);
        let open_id = open.id;
        let mut repo = MockPostingRepository::new();
        repo.expect_list_by_status()
            .returning(move |_| Ok(vec![applied.clone(), open.clone()]));

        let filter = PostingFilter {
            status: PostingStatus::Active,
            exclude_applied_by: Some(regular.user_id),
        };
        let listed = service(repo)
            .list_postings(&regular, filter)
            .await
            .expect("listing succeeds");

        assert_eq!(listed.iter().map(|p| p.id).collect::<Vec<_>>(), vec![open_id]);
    }

    #[rstest]
    #[case(false, false, false)]
    #[case(true, false, true)]
    #[case(false, true, true)]
    #[tokio::test]
    async fn inactive_postings_are_visible_to_administrators_and_applicants(
        #[case] is_admin: bool,
        #[case] has_applied: bool,
        #[case] visible: bool,
    ) {
        let role = if is_admin { Role::Administrator } else { Role::Regular };
        let ctx = SessionContext::new(UserId::random(), role);
        let mut stored = posting(PostingStatus::Inactive);
        if has_applied {
            stored.applicants.push(ApplicantRef {
                user_id: ctx.user_id,
                status: ApplicationStatus::Approved,
            });
        }
        let id = stored.id;
        let mut repo = MockPostingRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));

        let result = service(repo).get_posting(&ctx, &id).await;

        match (visible, result) {
            (true, Ok(found)) => assert_eq!(found.id, id),
            (false, Err(err)) => assert_eq!(err.code(), ErrorCode::NotFound),
            (expected, other) => panic!("visible={expected}, got {other:?}"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn delete_of_missing_posting_is_not_found(admin: SessionContext) {
        let mut repo = MockPostingRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let err = service(repo)
            .delete_posting(&admin, &PostingId::random())
            .await
            .expect_err("missing");

        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
